/// Longest client filename kept in `original_filename`.
pub const MAX_UPLOAD_NAME_LEN: usize = 255;

/// Why a client-supplied upload filename was refused.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadNameError {
    Empty,
    TooLong,
    /// Contains `/` or `\`.
    PathSeparator,
    /// `..` on its own.
    Traversal,
    /// Starts with a dot.
    Hidden,
    /// NUL, CR, LF or any other ASCII control character.
    ControlCharacter,
}

impl UploadNameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::TooLong => "Filename must be at most 255 characters",
            Self::PathSeparator => "Invalid filename: path separators are not allowed",
            Self::Traversal => "Invalid filename: '..' is not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Check the filename of an uploaded image and return it trimmed.
///
/// The name is only ever stored and echoed back; files on disk get a
/// generated name. Control characters are refused since the name can end up
/// in response headers.
pub fn validate_upload_name(filename: &str) -> Result<&str, UploadNameError> {
    let name = filename.trim();

    if name.is_empty() {
        return Err(UploadNameError::Empty);
    }
    if name.chars().count() > MAX_UPLOAD_NAME_LEN {
        return Err(UploadNameError::TooLong);
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err(UploadNameError::ControlCharacter);
    }
    if name.contains(['/', '\\']) {
        return Err(UploadNameError::PathSeparator);
    }
    if name == ".." {
        return Err(UploadNameError::Traversal);
    }
    if name.starts_with('.') {
        return Err(UploadNameError::Hidden);
    }

    Ok(name)
}
