//! Form-field coercion and required-field checks.
//!
//! Submitted forms arrive as ordered `(name, raw)` string pairs. Each raw
//! value is decoded into a [`FormValue`] before it is sent to the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single decoded form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Null,
    Number(f64),
    Bool(bool),
    Text(String),
}

/// Flat request object sent as the JSON body of a calculation.
pub type FormObject = BTreeMap<String, FormValue>;

impl FormValue {
    /// Decodes a raw field value.
    ///
    /// Rules apply in order: `""` is `Null`; a numeric string (see
    /// [`is_numeric`]) is `Number`; the literals `"true"`/`"false"` are
    /// `Bool`; anything else is kept as `Text` unchanged.
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() {
            return FormValue::Null;
        }
        if let Some(number) = parse_numeric(raw) {
            return FormValue::Number(number);
        }
        match raw {
            "true" => FormValue::Bool(true),
            "false" => FormValue::Bool(false),
            _ => FormValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FormValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            FormValue::Null => true,
            FormValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

/// Numeric predicate used by [`FormValue::coerce`].
///
/// The value, with surrounding whitespace removed, must be non-empty, parse
/// completely as an `f64` (optional sign, decimal or exponent notation) and
/// be finite. `"1e3abc"`, `"0x10"`, `"inf"` and `"NaN"` are not numeric.
pub fn is_numeric(raw: &str) -> bool {
    parse_numeric(raw).is_some()
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Submitted form fields in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Coerces every submitted field. A repeated name keeps its last value.
pub fn form_data_to_object(form: &FormData) -> FormObject {
    form.iter()
        .map(|(name, raw)| (name.to_string(), FormValue::coerce(raw)))
        .collect()
}

/// One message per required field that is missing, null or empty, in the
/// order the fields were given.
pub fn validate_form_data(data: &FormObject, required_fields: &[&str]) -> Vec<String> {
    required_fields
        .iter()
        .filter(|field| data.get(**field).is_none_or(FormValue::is_blank))
        .map(|field| format!("{field} is required"))
        .collect()
}
