//! Folder-name derivation and validation of user-supplied names.

use crate::error::{Error, Result};

/// Derive a repository-style folder name from a display name.
///
/// Lowercases the name, turns spaces into hyphens and strips every character
/// that is not an ASCII letter, digit or hyphen.
///
/// ```
/// # use devmap::utils::derive_folder_name;
/// assert_eq!(derive_folder_name("My Cool App!"), "my-cool-app");
/// ```
#[must_use]
pub fn derive_folder_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Check that `name` can be used as a single directory component.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] for empty or whitespace-only names, `.`,
/// `..`, and names containing path separators or NUL bytes.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        Err(Error::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
