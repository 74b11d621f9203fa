//! Input-template rendering pipeline.
//!
//! A constraint's `input_template` is a Handlebars template producing JSON
//! that is decoded into the operator's typed input. Rendering is
//! non-strict and never HTML-escapes.
//!
//! Absent context parts need special care: a template may interpolate an
//! absent value either inside a JSON string (`"{{.foo}}"`) or as a bare
//! value (`"config": {{.config}}`). Null context values are first rendered
//! as the literal `<nil>` marker, then the marker is normalized after
//! rendering: quoted occurrences become the empty string, bare occurrences
//! become JSON `null`. Both positions decode cleanly either way.

use handlebars::{Handlebars, no_escape};
use serde::de::DeserializeOwned;
use serde_json::Value;

const NIL_MARKER: &str = "<nil>";

/// Rendering or decoding failure for one constraint's input template.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("rendering failed: {0}")]
    Render(String),
    #[error("decoding rendered input failed: {0}")]
    Decode(String),
    #[error("input validation failed: {0}")]
    Validation(String),
}

/// Operator inputs that can sanity-check themselves after decoding.
pub trait ValidatedInput {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn substitute_nulls(value: &mut Value) {
    match value {
        Value::Null => *value = Value::String(NIL_MARKER.into()),
        Value::Array(items) => items.iter_mut().for_each(substitute_nulls),
        Value::Object(map) => map.values_mut().for_each(substitute_nulls),
        _ => {}
    }
}

/// Renders `template` against `context` and decodes the result.
pub fn render_input<T>(template: &str, context: &Value) -> Result<T, TemplateError>
where
    T: DeserializeOwned + ValidatedInput,
{
    let mut context = context.clone();
    substitute_nulls(&mut context);

    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry.register_escape_fn(no_escape);
    let rendered = registry
        .render_template(template, &context)
        .map_err(|err| TemplateError::Render(err.to_string()))?;

    // Quoted markers collapse to empty strings, bare markers to null.
    let normalized = rendered
        .replace(&format!("\"{NIL_MARKER}\""), "\"\"")
        .replace(NIL_MARKER, "null");

    let input: T = serde_json::from_str(&normalized)
        .map_err(|err| TemplateError::Decode(err.to_string()))?;
    input.validate().map_err(TemplateError::Validation)?;
    Ok(input)
}
