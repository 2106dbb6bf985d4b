use anyhow::{Result, anyhow};
use console::style;
use inquire::{
    Confirm, InquireError, Password, PasswordDisplayMode, Select, Text,
    validator::{ErrorMessage, StringValidator, Validation},
};

use super::{
    ConfirmationPrompt, ConfirmationPromptOptions, ConfirmationPromptResult, InputPrompt,
    InputPromptOptions, InputPromptResult, InputPromptValidator, InputValidatorResult,
    Interaction, PasswordPrompt, SelectPrompt, SelectPromptOptions, SelectPromptResult,
};

/// Escape and Ctrl-C cancel a prompt; every other failure is an error.
fn answered<T>(result: Result<T, InquireError>, prompt: &str) -> Result<Option<T>> {
    match result {
        Ok(answer) => Ok(Some(answer)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(anyhow!("error prompting for {prompt}: {err}")),
    }
}

impl ConfirmationPrompt for Interaction {
    fn confirm(&self, options: ConfirmationPromptOptions) -> Result<ConfirmationPromptResult> {
        if let Some(help_text) = &options.pre_confirmation_help_text {
            eprintln!("{}", style(help_text).yellow());
        }

        let mut prompt = Confirm::new(&options.message);
        if let Some(default) = options.default {
            prompt = prompt.with_default(default);
        }

        Ok(match answered(prompt.prompt(), "confirmation")? {
            Some(true) => ConfirmationPromptResult::Yes,
            Some(false) => ConfirmationPromptResult::No,
            None => ConfirmationPromptResult::Canceled,
        })
    }
}

impl StringValidator for InputPromptValidator {
    fn validate(&self, input: &str) -> Result<Validation, inquire::error::CustomUserError> {
        Ok(match self.0.validate(input)? {
            InputValidatorResult::Valid => Validation::Valid,
            InputValidatorResult::Invalid(message) => {
                Validation::Invalid(ErrorMessage::Custom(message))
            }
        })
    }
}

impl InputPrompt for Interaction {
    fn input(&self, options: InputPromptOptions) -> Result<InputPromptResult> {
        let mut prompt = Text::new(&options.message);
        if let Some(default) = options.default.as_deref() {
            prompt = prompt.with_default(default);
        }
        if let Some(validator) = options.validator {
            prompt = prompt.with_validator(validator);
        }

        Ok(match answered(prompt.prompt(), "input")? {
            Some(value) => InputPromptResult::Input(value),
            None => InputPromptResult::Canceled,
        })
    }
}

impl SelectPrompt for Interaction {
    fn select(&self, options: SelectPromptOptions) -> Result<SelectPromptResult> {
        let prompt = Select::new(&options.message, options.options);

        Ok(match answered(prompt.prompt(), "selection")? {
            Some(selected) => SelectPromptResult::Selected(selected),
            None => SelectPromptResult::Canceled,
        })
    }
}

impl PasswordPrompt for Interaction {
    fn password(&self, message: &str) -> Result<InputPromptResult> {
        let prompt = Password::new(message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation();

        Ok(match answered(prompt.prompt(), "password")? {
            Some(password) => InputPromptResult::Input(password),
            None => InputPromptResult::Canceled,
        })
    }
}
