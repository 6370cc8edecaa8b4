//! Create-note request body normalization
//!
//! Clients send the note as a JSON object, a JSON string containing that
//! object, or an urlencoded form. All shapes resolve to one `NoteInput`
//! here; anything else resolves to nothing.

use serde_json::{Map, Value};

use crate::data::NewNote;
use crate::error::AppError;

/// Error message for missing title/description
pub const MISSING_FIELDS_MESSAGE: &str = "title and description are required";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Fields extracted from a create-note body
///
/// JSON numbers and `true` are kept as their text. `null`, `false`, zero,
/// objects and arrays are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NoteInput {
    /// Normalize a raw request body
    ///
    /// # Returns
    /// `None` when the body does not resolve to an object
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(_) if is_form(content_type) => Some(Self::from_form(body)),
            Err(error) => {
                if !body.is_empty() {
                    tracing::warn!(%error, "Request body is not valid JSON");
                }
                None
            }
        }
    }

    /// Accept an object, or a string holding a JSON object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from_map(&map)),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Some(Self::from_map(&map)),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let field = |name: &str| map.get(name).and_then(scalar_text);
        Self {
            title: field("title"),
            description: field("description"),
        }
    }

    fn from_form(body: &[u8]) -> Self {
        let mut input = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "title" => input.title = Some(value.into_owned()),
                "description" => input.description = Some(value.into_owned()),
                _ => {}
            }
        }
        input
    }

    /// Require both fields to be present and non-empty
    pub fn validate(self) -> Result<NewNote, AppError> {
        match (self.title, self.description) {
            (Some(title), Some(description)) if !title.is_empty() && !description.is_empty() => {
                Ok(NewNote { title, description })
            }
            _ => Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Text stored for a JSON field value, `None` when it counts as missing
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(number) if number.as_f64().is_some_and(|n| n != 0.0) => {
            Some(number.to_string())
        }
        _ => None,
    }
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
