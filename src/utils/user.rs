//! Identity of the person running the tool.

use std::env;

/// Fallback when no user can be determined.
pub const UNKNOWN_USER: &str = "unknown";

/// The current operating-system user name.
///
/// Reads `USER` (Unix) or `USERNAME` (Windows), falling back to `LOGNAME`
/// and finally to `"unknown"`.
#[must_use]
pub fn current_user() -> String {
    let candidates: &[&str] = if cfg!(windows) {
        &["USERNAME", "USER"]
    } else {
        &["USER", "LOGNAME"]
    };

    candidates
        .iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_never_empty() {
        assert!(!current_user().is_empty());
    }
}
