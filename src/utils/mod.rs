//! Utility functions and helpers.
//!
//! This module contains small helpers used throughout the application:
//! folder-name derivation, name validation and the current OS user.

pub mod naming;
pub mod user;

pub use naming::{derive_folder_name, validate_name};
pub use user::current_user;
