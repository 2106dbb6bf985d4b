//! Validator for the Ops Manager URL.

use anyhow::Result;

use crate::interaction::{InputValidator, InputValidatorResult};

/// Accepts empty input or an absolute http(s) URL.
#[derive(Clone)]
pub struct UrlValidator;

impl InputValidator for UrlValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult> {
        if input.is_empty() {
            return Ok(InputValidatorResult::Valid);
        }

        match ::url::Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(InputValidatorResult::Valid),
            _ => Ok(InputValidatorResult::Invalid(format!(
                "'{input}' is not a valid http(s) URL"
            ))),
        }
    }
}
