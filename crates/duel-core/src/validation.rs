use crate::error::ServiceError;

/// Maximum length of a submitted prompt, in characters.
pub const MAX_PROMPT_CHARS: usize = 1000;

/// Normalize and validate a player handle: collapse inner whitespace, trim,
/// and require 2-64 characters.
pub fn normalize_handle(value: &str, field: &str) -> Result<String, ServiceError> {
    let cleaned = collapse_whitespace(value);
    let len = cleaned.chars().count();
    if !(2..=64).contains(&len) {
        return Err(ServiceError::validation(format!(
            "{} must be 2-64 characters.",
            field
        )));
    }
    Ok(cleaned)
}

/// Clean and validate a prompt: collapse whitespace, reject empty or
/// oversized input.
pub fn clean_prompt(value: &str) -> Result<String, ServiceError> {
    let cleaned = collapse_whitespace(value);
    if cleaned.is_empty() {
        return Err(ServiceError::validation("prompt cannot be empty."));
    }
    if cleaned.chars().count() > MAX_PROMPT_CHARS {
        return Err(ServiceError::validation(format!(
            "prompt must be {} characters or fewer.",
            MAX_PROMPT_CHARS
        )));
    }
    Ok(cleaned)
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_trimmed_and_collapsed() {
        let handle = normalize_handle("  Nova   Prime ", "player").unwrap();
        assert_eq!(handle, "Nova Prime");
    }

    #[test]
    fn handle_too_short_rejected() {
        assert!(matches!(
            normalize_handle("x", "player"),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn handle_too_long_rejected() {
        let long = "a".repeat(65);
        assert!(normalize_handle(&long, "player").is_err());
        let ok = "a".repeat(64);
        assert!(normalize_handle(&ok, "player").is_ok());
    }

    #[test]
    fn empty_prompt_rejected() {
        assert!(clean_prompt("   ").is_err());
    }

    #[test]
    fn oversized_prompt_rejected() {
        let long = "word ".repeat(300);
        assert!(clean_prompt(&long).is_err());
    }

    #[test]
    fn prompt_whitespace_collapsed() {
        assert_eq!(
            clean_prompt("  build a\n\n dashboard  ").unwrap(),
            "build a dashboard"
        );
    }
}
