//! Name and extension checks applied before any mutation.

use crate::error::AppError;
use crate::paths::{SEPARATOR, extension_of};
use crate::result::AppResult;

/// Folder names: 1 to 100 characters.
pub const FOLDER_NAME_MAX: usize = 100;

/// File display names: 3 to 100 characters.
pub const FILE_NAME_MIN: usize = 3;
/// Upper bound for file display names.
pub const FILE_NAME_MAX: usize = 100;

/// Validate a folder name.
pub fn validate_folder_name(name: &str) -> AppResult<()> {
    validate_segment("Folder name", name, 1, FOLDER_NAME_MAX)
}

/// Validate a file display name.
pub fn validate_file_name(name: &str) -> AppResult<()> {
    validate_segment("File name", name, FILE_NAME_MIN, FILE_NAME_MAX)
}

fn validate_segment(label: &str, name: &str, min: usize, max: usize) -> AppResult<()> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Err(AppError::validation(format!("{label} cannot be empty")));
    }
    if len < min || len > max {
        return Err(AppError::validation(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    if name.contains(SEPARATOR) || name.contains('\\') {
        return Err(AppError::validation(format!(
            "{label} must not contain path separators"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation(format!(
            "{label} must not contain control characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("{label} '{name}' is reserved")));
    }
    Ok(())
}

/// Check a display name's extension against an optional allow-list.
///
/// Entries may be written with or without a leading dot and are compared
/// case-insensitively.
pub fn validate_extension(name: &str, allowed: Option<&[String]>) -> AppResult<()> {
    let Some(allowed) = allowed else {
        return Ok(());
    };

    let ext = extension_of(name).trim_start_matches('.').to_lowercase();
    let permitted = allowed
        .iter()
        .any(|a| a.trim_start_matches('.').to_lowercase() == ext);

    if permitted {
        Ok(())
    } else if ext.is_empty() {
        Err(AppError::validation(format!(
            "File '{name}' has no extension; allowed: {}",
            allowed.join(", ")
        )))
    } else {
        Err(AppError::validation(format!(
            "File extension '.{ext}' is not allowed; allowed: {}",
            allowed.join(", ")
        )))
    }
}
