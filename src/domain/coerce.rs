//! Attribute coercion for `create` parameters
//!
//! A parameter token has the shape `name=value`. The value is converted
//! best-effort: integer first, then float, then kept as text.

use thiserror::Error;

use super::instance::{Instance, ModelError};
use super::value::AttrValue;

/// Value that triggers underscore-to-space substitution
pub const SPACED_STRING_MARKER: &str = "\"\"";

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Parameter '{0}' has no '='")]
    MissingEquals(String),

    #[error("Parameter '{0}' has an empty name")]
    EmptyName(String),
}

/// Converts raw text to the narrowest fitting value
///
/// Non-finite float spellings (`nan`, `inf`) stay text.
pub fn coerce(raw: &str) -> AttrValue {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return AttrValue::Int(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => AttrValue::Float(v),
        _ => AttrValue::Str(raw.to_string()),
    }
}

/// Parses one `name=value` token, splitting on the first `=`
pub fn parse_param(token: &str) -> Result<(String, AttrValue), ParamError> {
    let (name, value) = token
        .split_once('=')
        .ok_or_else(|| ParamError::MissingEquals(token.to_string()))?;

    if name.is_empty() {
        return Err(ParamError::EmptyName(token.to_string()));
    }

    let value = if value == SPACED_STRING_MARKER {
        value.replace('_', " ")
    } else {
        value.to_string()
    };

    Ok((name.to_string(), coerce(&value)))
}

/// Outcome of applying a single parameter token
#[derive(Debug, PartialEq)]
pub enum Applied {
    Set(String),
    Skipped(String),
}

/// Applies parameter tokens to an instance
///
/// Bad tokens are skipped one at a time; the rest are still applied.
pub fn apply_params<'a, I>(instance: &mut Instance, tokens: I) -> Vec<Applied>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|token| {
            let result = parse_param(token)
                .map_err(|e| e.to_string())
                .and_then(|(name, value)| {
                    instance
                        .set(&name, value)
                        .map(|_| name)
                        .map_err(|e: ModelError| e.to_string())
                });
            match result {
                Ok(name) => Applied::Set(name),
                Err(reason) => Applied::Skipped(reason),
            }
        })
        .collect()
}
