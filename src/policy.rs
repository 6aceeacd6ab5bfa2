/// Roles permitted to use the admin surface, most privileged first. The
/// ordering carries an implicit privilege level used for display only; the
/// gate itself performs plain membership checks.
pub const RECOGNIZED_ROLES: [&str; 3] = ["owner", "admin", "editor"];

/// Membership test against [`RECOGNIZED_ROLES`]. Total: any string outside
/// the set returns false, including the empty string.
pub fn is_authorized_role(role: &str) -> bool {
    RECOGNIZED_ROLES.contains(&role)
}

/// Privilege level of a recognized role, 0 being the most privileged.
/// Display ordering only, never an authorization decision.
pub fn privilege(role: &str) -> Option<usize> {
    RECOGNIZED_ROLES.iter().position(|r| *r == role)
}
