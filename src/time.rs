use chrono::Local;

#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(test)]
static MOCK_OFFSET: AtomicU64 = AtomicU64::new(0);

pub fn current_timestamp() -> u64 {
    let now = Local::now().timestamp() as u64;

    #[cfg(test)]
    return now + MOCK_OFFSET.load(Ordering::Relaxed);

    #[cfg(not(test))]
    now
}

#[cfg(test)]
pub fn advance_mock_time(secs: u64) {
    MOCK_OFFSET.fetch_add(secs, Ordering::Relaxed);
}
