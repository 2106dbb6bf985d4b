//! This module contains the formatting logic for the application.
//!
//! The main entry point is the [`Formattable`] trait which provides a method to format an object
//! as plain text, JSON or through a user supplied Go template.
use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::template;

/// Format of the output.
///
/// Parsed from the `--output` flag or the `output` property of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Format {
    #[default]
    Plaintext,
    Json,
    GoTemplate(String),
    GoTemplateFile(PathBuf),
}

const GO_TEMPLATE_PREFIX: &str = "go-template=";
const GO_TEMPLATE_FILE_PREFIX: &str = "go-template-file=";

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(template) = s.strip_prefix(GO_TEMPLATE_PREFIX) {
            return Ok(Self::GoTemplate(template.to_string()));
        }

        if let Some(path) = s.strip_prefix(GO_TEMPLATE_FILE_PREFIX) {
            return Ok(Self::GoTemplateFile(PathBuf::from(path)));
        }

        match s {
            "" | "plaintext" | "text" => Ok(Self::Plaintext),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unsupported output format '{other}', use one of: plaintext, json, go-template=<template>, go-template-file=<path>"
            )),
        }
    }
}

/// Trait for types that can be formatted as text, JSON or through a Go template.
///
/// The main use of this trait is to format the output of commands.
/// Types implementing both [`Display`] and [`Serialize`] automatically get a default implementation.
pub trait Formattable {
    /// Format the output of the object.
    fn format(&self, format: &Format) -> Result<String>;
}

/// Implement [`Formattable`] for any type that implements [`Display`] and [`Serialize`].
///
/// Plain text uses the [`Display`] implementation, every other format works on the serialized form.
impl<T> Formattable for T
where
    T: Display + Serialize,
{
    fn format(&self, format: &Format) -> Result<String> {
        Ok(match format {
            Format::Plaintext => self.to_string(),
            Format::Json => serde_json::to_string_pretty(self).context("serializing to json")?,
            Format::GoTemplate(template) => {
                template::render(template, self).context("rendering go template")?
            }
            Format::GoTemplateFile(path) => {
                let template = std::fs::read_to_string(path).with_context(|| {
                    format!("reading go template file: {}", path.display())
                })?;
                template::render(&template, self).context("rendering go template file")?
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[derive(Serialize)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    impl Display for TestStruct {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}: {}", self.name, self.value)
        }
    }

    fn test_struct() -> TestStruct {
        TestStruct {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("plaintext".parse::<Format>().unwrap(), Format::Plaintext);
        assert_eq!(
            "go-template={{.name}}".parse::<Format>().unwrap(),
            Format::GoTemplate("{{.name}}".to_string())
        );
        assert_eq!(
            "go-template-file=/tmp/t.tmpl".parse::<Format>().unwrap(),
            Format::GoTemplateFile(PathBuf::from("/tmp/t.tmpl"))
        );
        assert!("yaml".parse::<Format>().is_err());
    }

    #[test]
    fn test_format_text() {
        let result = test_struct().format(&Format::Plaintext).unwrap();
        assert_eq!(result, "test: 42");
    }

    #[test]
    fn test_format_json() {
        let result = test_struct().format(&Format::Json).unwrap();
        assert_eq!(result, "{\n  \"name\": \"test\",\n  \"value\": 42\n}");
    }

    #[test]
    fn test_format_go_template() {
        let result = test_struct()
            .format(&Format::GoTemplate("{{.name}}={{.value}}".to_string()))
            .unwrap();
        assert_eq!(result, "test=42");
    }

    #[test]
    fn test_format_go_template_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name is {{{{.name}}}}").unwrap();

        let result = test_struct()
            .format(&Format::GoTemplateFile(file.path().to_path_buf()))
            .unwrap();
        assert_eq!(result, "name is test");
    }

    #[test]
    fn test_format_go_template_file_missing() {
        let result = test_struct().format(&Format::GoTemplateFile(PathBuf::from(
            "/does/not/exist.tmpl",
        )));
        assert!(result.is_err());
    }
}
