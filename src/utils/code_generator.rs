//! Short code generation and validation utilities.
//!
//! Provides cryptographically secure random code generation and validation
//! for custom user-provided codes.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Minimum/maximum length of a short code, custom or generated.
const MIN_CODE_LENGTH: usize = 3;
const MAX_CODE_LENGTH: usize = 50;

/// Reserved codes that cannot be used as short links.
///
/// These codes are reserved for system endpoints to prevent routing conflicts.
const RESERVED_CODES: &[&str] = &["stats", "health", "domains", "admin", "api", "dashboard"];

/// Generates a cryptographically secure random short code of the given
/// length.
///
/// Uses `getrandom` for entropy and encodes it as URL-safe base64 without
/// padding, whose alphabet (`A-Za-z0-9-_`) is exactly the short-code
/// charset; the encoded output is truncated to `length` characters.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7);
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
/// ```
pub fn generate_code(length: usize) -> String {
    let mut buffer = vec![0u8; length.max(1)];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
    encoded.chars().take(length).collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-50 characters
/// - Allowed characters: letters, digits, hyphens, underscores
/// - Cannot be a reserved system code
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
///
/// # Examples
///
/// ```ignore
/// // Valid codes
/// assert!(validate_custom_code("my-link-2024").is_ok());
/// assert!(validate_custom_code("Promo_2025").is_ok());
///
/// // Invalid codes
/// assert!(validate_custom_code("ab").is_err());           // Too short
/// assert!(validate_custom_code("my code").is_err());      // Space not allowed
/// assert!(validate_custom_code("admin").is_err());        // Reserved
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be 3-50 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, hyphens, and underscores",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_not_empty() {
        let code = generate_code(7);
        assert!(!code.is_empty());
    }

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code(7);
        assert_eq!(code.len(), 7);
    }

    #[test]
    fn test_generate_code_honors_configured_length() {
        for length in [3, 7, 32, 50] {
            assert_eq!(generate_code(length).len(), length);
        }
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        let code = generate_code(12);
        assert!(
            code.chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_code_produces_unique_codes() {
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            let code = generate_code(7);
            codes.insert(code);
        }

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_generate_code_no_padding() {
        let code = generate_code(7);
        assert!(!code.contains('='));
    }

    #[test]
    fn test_validate_minimum_length() {
        let result = validate_custom_code("abc");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_maximum_length() {
        let result = validate_custom_code(&"a".repeat(50));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_with_hyphens_in_middle() {
        let result = validate_custom_code("my-cool-link");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_only_digits() {
        let result = validate_custom_code("12345678");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_mixed_case() {
        let result = validate_custom_code("MyCode123");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_underscore_allowed() {
        let result = validate_custom_code("my_code_123");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_mixed_valid_chars() {
        let result = validate_custom_code("abc-123-xyz_ABC");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let result = validate_custom_code("ab");
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert!(err.to_string().contains("3-50 characters"));
    }

    #[test]
    fn test_validate_too_long() {
        let result = validate_custom_code(&"a".repeat(51));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_special_characters() {
        let result = validate_custom_code("my_code@123");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reserved_code_stats() {
        let result = validate_custom_code("stats");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reserved_code_admin() {
        let result = validate_custom_code("admin");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_all_reserved_codes() {
        for &reserved in RESERVED_CODES {
            let result = validate_custom_code(reserved);
            assert!(
                result.is_err(),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }
    }

    #[test]
    fn test_validate_spaces_not_allowed() {
        let result = validate_custom_code("my code 123");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_string() {
        let result = validate_custom_code("");
        assert!(result.is_err());
    }
}
