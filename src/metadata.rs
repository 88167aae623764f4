//! `METADATA.pb` record mapping.
//!
//! Each family directory in the source tree carries a `METADATA.pb` file in
//! protobuf text format. [`textproto`](crate::textproto) turns the text into a
//! schema-less message tree; this module reads the fields the catalog needs
//! out of that tree and builds a [`FontFamily`].
//!
//! ## Field mapping
//!
//! | Record field | Family field |
//! |---|---|
//! | `name` | `name` (and, slugged, `id`) |
//! | `designer`, `license`, `minisite_url` | same |
//! | `category` (repeated) | `category` |
//! | `subsets` (repeated) | `subsets` |
//! | `fonts { name style weight filename post_script_name full_name copyright }` | `fonts` |
//! | `axes { tag min_value max_value }` | `axes` |
//!
//! Every other field (`date_added`, `source`, `languages`, ...) is ignored.
//! Missing singular fields take the protobuf default (empty string, zero),
//! except `name`: the family id is derived from it and must be usable as a
//! single path component.
//! A field holding the wrong kind of value (a message where a string belongs,
//! a non-integer weight) is a [`MetadataError::InvalidField`].

use crate::naming;
use crate::textproto::{self, Message, Scalar, TextProtoError, Value};
use crate::types::{Font, FontFamily, VariationAxis};
use std::path::Path;
use thiserror::Error;

/// Exact file name of a family metadata record.
pub const METADATA_FILENAME: &str = "METADATA.pb";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] TextProtoError),
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Read and map a `METADATA.pb` file.
pub fn read_metadata(path: &Path) -> Result<FontFamily, MetadataError> {
    let text = std::fs::read_to_string(path)?;
    parse_metadata(&text)
}

/// Map the text of a `METADATA.pb` record into a [`FontFamily`].
pub fn parse_metadata(text: &str) -> Result<FontFamily, MetadataError> {
    let record = textproto::parse(text)?;

    let name = string_field(&record, "name")?;
    let id = naming::family_id(&name);
    if let Some(reason) = naming::unsafe_id_reason(&id) {
        return Err(invalid("name", format!("'{name}' {reason}")));
    }
    let fonts = record
        .get_all("fonts")
        .map(|value| font_from(message_value("fonts", value)?))
        .collect::<Result<Vec<_>, _>>()?;
    let axes = record
        .get_all("axes")
        .map(|value| axis_from(message_value("axes", value)?))
        .collect::<Result<Vec<_>, _>>()?;
    let minisite_url = Some(string_field(&record, "minisite_url")?).filter(|s| !s.is_empty());

    Ok(FontFamily {
        id,
        name,
        designer: string_field(&record, "designer")?,
        license: string_field(&record, "license")?,
        category: repeated_strings(&record, "category")?,
        fonts,
        subsets: repeated_strings(&record, "subsets")?,
        axes,
        minisite_url,
    })
}

fn font_from(msg: &Message) -> Result<Font, MetadataError> {
    Ok(Font {
        name: string_field(msg, "name")?,
        style: string_field(msg, "style")?,
        weight: integer_field(msg, "weight")?,
        filename: string_field(msg, "filename")?,
        post_script_name: string_field(msg, "post_script_name")?,
        full_name: string_field(msg, "full_name")?,
        copyright: string_field(msg, "copyright")?,
    })
}

fn axis_from(msg: &Message) -> Result<VariationAxis, MetadataError> {
    Ok(VariationAxis {
        tag: string_field(msg, "tag")?,
        min_value: float_field(msg, "min_value")?,
        max_value: float_field(msg, "max_value")?,
    })
}

// ---------------------------------------------------------------------------
// Typed field access
// ---------------------------------------------------------------------------

fn invalid(field: &str, reason: impl Into<String>) -> MetadataError {
    MetadataError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn message_value<'a>(field: &str, value: &'a Value) -> Result<&'a Message, MetadataError> {
    match value {
        Value::Message(msg) => Ok(msg),
        Value::Scalar(_) => Err(invalid(field, "expected a message")),
    }
}

fn string_value(field: &str, value: &Value) -> Result<String, MetadataError> {
    match value {
        Value::Scalar(Scalar::Str(s)) => Ok(s.clone()),
        _ => Err(invalid(field, "expected a string")),
    }
}

fn string_field(msg: &Message, field: &str) -> Result<String, MetadataError> {
    msg.get(field)
        .map(|value| string_value(field, value))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn repeated_strings(msg: &Message, field: &str) -> Result<Vec<String>, MetadataError> {
    msg.get_all(field)
        .map(|value| string_value(field, value))
        .collect()
}

fn number_text<'a>(msg: &'a Message, field: &str) -> Result<Option<&'a str>, MetadataError> {
    match msg.get(field) {
        None => Ok(None),
        Some(Value::Scalar(Scalar::Number(n))) => Ok(Some(n.as_str())),
        Some(_) => Err(invalid(field, "expected a number")),
    }
}

fn integer_field(msg: &Message, field: &str) -> Result<u32, MetadataError> {
    let Some(text) = number_text(msg, field)? else {
        return Ok(0);
    };
    text.parse::<u32>()
        .map_err(|_| invalid(field, format!("'{text}' is not a non-negative integer")))
}

fn float_field(msg: &Message, field: &str) -> Result<f32, MetadataError> {
    let Some(text) = number_text(msg, field)? else {
        return Ok(0.0);
    };
    text.trim_end_matches(['f', 'F'])
        .parse::<f32>()
        .map_err(|_| invalid(field, format!("'{text}' is not a number")))
}
