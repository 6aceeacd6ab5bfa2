pub(super) fn server() -> String {
    String::new()
}

pub(super) fn empty_string() -> String {
    String::new()
}

pub(super) fn public_path() -> String {
    String::from("/")
}

pub(super) fn resolve_timeout_millis() -> u64 {
    5000
}

pub(super) fn session_path() -> String {
    String::from("~/.cache/backgate/session.json")
}
