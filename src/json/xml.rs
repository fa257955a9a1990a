/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::entities::escape_into;
use crate::entities::predefined;

use super::JsonError;
use super::TEXT_KEY;

/// Options of the JSON to XML conversion.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlOptions {
    /// Undo the escaping of the `sanitize` JSON option in the text before
    /// it is escaped again for the output.
    #[serde(alias = "reSanitize")]
    pub resanitize: bool,
}

fn scalar(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn unsanitize(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace(predefined::LT, "<")
            .replace(predefined::GT, ">")
            .replace(predefined::AMP, "&"),
    )
}

fn write_text(out: &mut String, text: &str, options: &XmlOptions) {
    if options.resanitize {
        escape_into(&unsanitize(text), out);
    } else {
        escape_into(text, out);
    }
}

fn write_element(out: &mut String, name: &str, value: &Value, options: &XmlOptions) {
    match value {
        Value::Array(list) => {
            for item in list {
                write_element(out, name, item, options);
            }
        }
        Value::Object(object) => {
            out.push('<');
            out.push_str(name);
            for (key, value) in object.iter().filter(|(key, _)| *key != TEXT_KEY) {
                if let Some(s) = scalar(value) {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_into(&s, out);
                    out.push('"');
                }
            }
            out.push('>');
            write_content(out, object, options);
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        _ => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            if let Some(s) = scalar(value) {
                write_text(out, &s, options);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_content(out: &mut String, object: &Map<String, Value>, options: &XmlOptions) {
    if let Some(text) = object.get(TEXT_KEY).and_then(scalar) {
        write_text(out, &text, options);
    }
    for (key, value) in object {
        if key != TEXT_KEY && matches!(value, Value::Array(_) | Value::Object(_) | Value::Null) {
            write_element(out, key, value, options);
        }
    }
}

/// Converts a JSON value in the [JsonBuilder](super::JsonBuilder) layout
/// back to XML.
///
/// Scalar members become attributes, the `"$t"` member becomes the text
/// content, and objects, arrays and nulls become child elements. Scalars at the
/// top level have no element to belong to and are skipped.
///
/// ```
/// use serde_json::json;
/// use saxite::json::{XmlOptions, to_xml};
///
/// let value = json!({"a": {"id": 1, "b": [{"$t": "x<y"}, "z"]}});
/// assert_eq!(
///     to_xml(&value, &XmlOptions::default()),
///     r#"<a id="1"><b>x&lt;y</b><b>z</b></a>"#
/// );
/// ```
pub fn to_xml(value: &Value, options: &XmlOptions) -> String {
    let mut out = String::new();
    if let Value::Object(object) = value {
        for (key, value) in object {
            if matches!(value, Value::Array(_) | Value::Object(_) | Value::Null) {
                write_element(&mut out, key, value, options);
            }
        }
    }
    out
}

/// Parses the JSON text and converts it with [to_xml].
pub fn to_xml_str(json: &str, options: &XmlOptions) -> Result<String, JsonError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(to_xml(&value, options))
}
