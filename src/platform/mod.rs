//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Durable key-value storage (LocalStorage on web, in-memory elsewhere)
//! - Wall-clock time for toast deadlines and export filenames

pub mod storage;

pub use storage::{MemoryStorage, StorageProvider};

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Today's local calendar date as `YYYY-MM-DD`
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{:04}-{:02}-{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date()
    )
}

/// Today's local calendar date as `YYYY-MM-DD`
#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_today_format() {
        let s = today();
        assert_eq!(s.len(), 10);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[7..8], "-");
        assert!(chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").is_ok());
    }
}
