//! Validators for user input, used by the interactive `config init` prompts and by flag checks.

pub mod object_id;
pub mod required;
pub mod url;

pub use object_id::{ObjectIdValidator, validate_object_id};
pub use required::RequiredValidator;
pub use url::UrlValidator;
