//! Validator for mandatory answers.

use anyhow::Result;

use crate::interaction::{InputValidator, InputValidatorResult};

#[derive(Clone)]
pub struct RequiredValidator;

impl InputValidator for RequiredValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult> {
        if input.trim().is_empty() {
            return Ok(InputValidatorResult::Invalid(
                "A value is required".to_string(),
            ));
        }
        Ok(InputValidatorResult::Valid)
    }
}
