//! Go template rendering for command output.
//!
//! Outputs are rendered against their serialized JSON form, so templates address fields by their
//! wire names (`{{.name}}`, `{{.stateName}}`). Plain text output aligns tab separated cells the
//! same way the table output does.
use std::{collections::HashMap, fmt};

use anyhow::{Context, Result, anyhow};
use gtmpl_value::Value;
use serde::Serialize;
use tracing::debug;

use crate::table;

/// Render `template` against the serialized form of `value`.
pub fn render<T: Serialize + ?Sized>(template: &str, value: &T) -> Result<String> {
    let json = serde_json::to_value(value).context("serializing template input")?;
    gtmpl::template(template, to_template_value(json)).map_err(|e| anyhow!("{e}"))
}

/// Render a built-in template and align its tab separated cells into columns.
pub fn render_aligned<T: Serialize + ?Sized>(template: &str, value: &T) -> Result<String> {
    render(template, value).map(|rendered| table::align(&rendered))
}

/// Write the aligned rendering of a built-in template to a formatter.
///
/// Used by [`fmt::Display`] implementations of API outputs.
pub fn write<T: Serialize + ?Sized>(
    f: &mut fmt::Formatter<'_>,
    template: &str,
    value: &T,
) -> fmt::Result {
    match render_aligned(template, value) {
        Ok(rendered) => f.write_str(&rendered),
        Err(e) => {
            debug!(error = %e, "rendering template failed");
            write!(f, "error rendering output: {e}")
        }
    }
}

/// A response paired with the built-in template used for its plain text output.
///
/// Serializes exactly like the wrapped value, so JSON output is the API response itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Templated<T> {
    pub template: &'static str,
    pub value: T,
}

impl<T> Templated<T> {
    pub fn new(template: &'static str, value: T) -> Self {
        Self { template, value }
    }
}

impl<T: Serialize> Serialize for Templated<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<T: Serialize> fmt::Display for Templated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write(f, self.template, &self.value)
    }
}

fn to_template_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(to_template_value).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, to_template_value(v)))
                .collect::<HashMap<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_fields() {
        let value = json!({"name": "Cluster0", "stateName": "IDLE"});
        let rendered = render("{{.name}} is {{.stateName}}", &value).unwrap();
        assert_eq!(rendered, "Cluster0 is IDLE");
    }

    #[test]
    fn test_render_range() {
        let value = json!({"results": [{"id": "1"}, {"id": "2"}]});
        let rendered = render("{{range .results}}[{{.id}}]{{end}}", &value).unwrap();
        assert_eq!(rendered, "[1][2]");
    }

    #[test]
    fn test_render_numbers_and_bools() {
        let value = json!({"count": 3, "ratio": 1.5, "paused": false});
        let rendered = render("{{.count}} {{.ratio}} {{.paused}}", &value).unwrap();
        assert_eq!(rendered, "3 1.5 false");
    }

    #[test]
    fn test_render_invalid_template() {
        assert!(render("{{.name", &json!({"name": "x"})).is_err());
    }

    #[test]
    fn test_templated_output() {
        let output = Templated::new("Cluster '{{.name}}' is {{.stateName}}.\n", json!({"name": "Cluster0", "stateName": "IDLE"}));
        assert_eq!(output.to_string(), "Cluster 'Cluster0' is IDLE.\n");
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"name": "Cluster0", "stateName": "IDLE"})
        );
    }

    #[test]
    fn test_render_aligned() {
        let value = json!({"results": [{"id": "1", "name": "first"}, {"id": "22", "name": "second"}]});
        let rendered = render_aligned(
            "ID\tNAME{{range .results}}\n{{.id}}\t{{.name}}{{end}}\n",
            &value,
        )
        .unwrap();
        assert_eq!(rendered, "ID    NAME\n1     first\n22    second\n");
    }
}
