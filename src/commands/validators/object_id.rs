//! Validator for organization and project IDs.

use anyhow::{Result, bail};

use crate::interaction::{InputValidator, InputValidatorResult};

const OBJECT_ID_LENGTH: usize = 24;

/// Check that `value` is a 24 character hexadecimal ObjectID.
pub fn validate_object_id(value: &str) -> Result<()> {
    if value.len() != OBJECT_ID_LENGTH || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("the provided value '{value}' is not a valid ID");
    }
    Ok(())
}

/// Validator for IDs entered at a prompt. An empty answer skips the property.
#[derive(Clone)]
pub struct ObjectIdValidator;

impl InputValidator for ObjectIdValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult> {
        if input.is_empty() {
            return Ok(InputValidatorResult::Valid);
        }

        Ok(match validate_object_id(input) {
            Ok(()) => InputValidatorResult::Valid,
            Err(e) => InputValidatorResult::Invalid(e.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_object_id() {
        assert!(validate_object_id("5e2211c17a3e5a48f5497de3").is_ok());
        assert!(validate_object_id("5E2211C17A3E5A48F5497DE3").is_ok());
        assert!(validate_object_id("5e2211c17a3e5a48f5497de").is_err());
        assert!(validate_object_id("5e2211c17a3e5a48f5497dez").is_err());
        assert!(validate_object_id("").is_err());
    }

    #[test]
    fn test_object_id_validator() {
        let validator = ObjectIdValidator;
        assert!(matches!(
            validator.validate("").unwrap(),
            InputValidatorResult::Valid
        ));
        assert!(matches!(
            validator.validate("5e2211c17a3e5a48f5497de3").unwrap(),
            InputValidatorResult::Valid
        ));
        assert!(matches!(
            validator.validate("project").unwrap(),
            InputValidatorResult::Invalid(_)
        ));
    }
}
