use crate::error::{ActionError, Result};

/// Substrings git refuses in ref names, plus the space character.
const FORBIDDEN_PATTERNS: [&str; 9] = ["..", "~", "^", ":", "?", "*", "[", "\\", " "];

/// Reject ref names that are invalid for git or unsafe to pass to a command.
///
/// Checked in order: empty, ASCII control characters, forbidden substrings,
/// leading/trailing `.` or `/`.
pub fn validate_ref_name(ref_name: &str) -> Result<()> {
    let invalid = |reason: String| ActionError::InvalidRef {
        ref_name: ref_name.to_string(),
        reason,
    };

    if ref_name.is_empty() {
        return Err(invalid("ref name cannot be empty".into()));
    }

    if let Some(position) = ref_name.chars().position(|c| (c as u32) < 32 || c as u32 == 127) {
        return Err(invalid(format!(
            "ref contains invalid control character at position {position}"
        )));
    }

    if let Some(pattern) = FORBIDDEN_PATTERNS.iter().find(|p| ref_name.contains(**p)) {
        return Err(invalid(format!("ref contains invalid pattern {pattern:?}")));
    }

    if ref_name.starts_with('.')
        || ref_name.ends_with('.')
        || ref_name.starts_with('/')
        || ref_name.ends_with('/')
    {
        return Err(invalid("ref cannot start or end with . or /".into()));
    }

    Ok(())
}
