//! Message template validation.

use crate::error::CoreError;

/// Maximum length (in characters) of a template body.
pub const MAX_TEMPLATE_LEN: usize = 4_096;

/// Validate a template body and return it trimmed.
pub fn validate_template_content(content: &str) -> Result<String, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Template content is required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_TEMPLATE_LEN {
        return Err(CoreError::Validation(format!(
            "Template content must be at most {MAX_TEMPLATE_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_and_trims_content() {
        let content = validate_template_content("  Hello there  ").unwrap();
        assert_eq!(content, "Hello there");
    }

    #[test]
    fn rejects_blank_content() {
        assert_matches!(
            validate_template_content("   "),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_oversized_content() {
        let content = "a".repeat(MAX_TEMPLATE_LEN + 1);
        assert_matches!(
            validate_template_content(&content),
            Err(CoreError::Validation(_))
        );
    }
}
