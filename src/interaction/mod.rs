use std::sync::Arc;

use anyhow::Result;
use typed_builder::TypedBuilder;

mod input;
mod spinner;

#[derive(Debug, Default, Clone)]
pub struct Interaction;

impl Interaction {
    pub fn new() -> Self {
        Default::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ConfirmationPromptOptions {
    message: String,
    #[builder(default, setter(strip_option))]
    default: Option<bool>,
    /// Printed to stderr before the question, e.g. to describe what gets deleted.
    #[builder(default, setter(strip_option))]
    pre_confirmation_help_text: Option<String>,
}

pub enum ConfirmationPromptResult {
    Yes,
    No,
    Canceled,
}

pub trait ConfirmationPrompt {
    fn confirm(&self, options: ConfirmationPromptOptions) -> Result<ConfirmationPromptResult>;
}

#[derive(TypedBuilder)]
pub struct InputPromptOptions {
    pub message: String,
    #[builder(default, setter(strip_option(fallback = default_opt)))]
    pub default: Option<String>,
    #[builder(default, setter(strip_option))]
    pub validator: Option<InputPromptValidator>,
}

// Shared so prompt options stay cloneable and commands holding them stay `Send`.
#[derive(Clone)]
pub struct InputPromptValidator(Arc<dyn InputValidator + Send + Sync>);

impl InputPromptValidator {
    pub fn new(validator: impl InputValidator + Send + Sync + 'static) -> Self {
        Self(Arc::new(validator))
    }
}

pub trait InputValidator {
    fn validate(&self, input: &str) -> Result<InputValidatorResult>;
}

pub enum InputValidatorResult {
    Valid,
    Invalid(String),
}

pub enum InputPromptResult {
    Input(String),
    Canceled,
}

pub trait InputPrompt {
    fn input(&self, options: InputPromptOptions) -> Result<InputPromptResult>;
}

#[derive(Debug, PartialEq, Eq, TypedBuilder)]
pub struct SelectPromptOptions {
    #[builder(setter(transform = |s: impl Into<String>| s.into()))]
    message: String,
    #[builder(setter(transform = |items: impl IntoIterator<Item = impl Into<String>>| {
        items.into_iter().map(|s| s.into()).collect()
    }))]
    options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectPromptResult {
    Selected(String),
    Canceled,
}

pub trait SelectPrompt {
    fn select(&self, options: SelectPromptOptions) -> Result<SelectPromptResult>;
}

pub struct SpinnerHandle {
    stop_spinner: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl SpinnerHandle {
    pub fn new(stop_spinner: Box<dyn FnOnce() + Send + Sync>) -> Self {
        Self {
            stop_spinner: Some(stop_spinner),
        }
    }
}

impl Drop for SpinnerHandle {
    fn drop(&mut self) {
        if let Some(stop_spinner) = self.stop_spinner.take() {
            stop_spinner();
        }
    }
}

pub trait SpinnerInteraction {
    fn start_spinner(&self, message: String) -> Result<SpinnerHandle>;
}

/// Prompt for a secret without echoing it.
pub trait PasswordPrompt {
    fn password(&self, message: &str) -> Result<InputPromptResult>;
}
