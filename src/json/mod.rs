/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Conversion between XML documents and JSON values.
//!
//! Elements become objects holding their attributes, child elements are
//! stored under their names, and repeated names turn into arrays. Text
//! content is kept under the `"$t"` key:
//!
//! ```
//! use saxite::json::{JsonOptions, to_json};
//!
//! let value = to_json("<a id='1'><b>x</b><b>y</b></a>", &JsonOptions::default())?;
//! assert_eq!(
//!     value.to_string(),
//!     r#"{"a":{"id":"1","b":[{"$t":"x"},{"$t":"y"}]}}"#
//! );
//! # Ok::<(), saxite::json::JsonError>(())
//! ```

mod xml;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::SaxError;
use crate::SaxEvent;
use crate::SaxHandler;
use crate::SaxOptions;
use crate::SaxParser;

pub use xml::XmlOptions;
pub use xml::to_xml;
pub use xml::to_xml_str;

/// Key of the text content in the element objects.
pub const TEXT_KEY: &str = "$t";

/// Options of the XML to JSON conversion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Keep text only elements as `{"$t": text}` objects, so that the
    /// result can be converted back to the same XML.
    pub reversible: bool,
    /// Convert numeric values to numbers, and `true`, `yes`, `false`,
    /// `no` to booleans.
    pub coerce: bool,
    /// Trim the whitespace around the text.
    pub trim: bool,
    /// Escape `&`, `<` and `>` characters in the text.
    pub sanitize: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            reversible: true,
            coerce: false,
            trim: false,
            sanitize: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum JsonError {
    /// The XML document could not be parsed.
    #[error(transparent)]
    Sax(#[from] SaxError),

    /// The JSON document could not be parsed.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

struct Frame {
    name: String,
    object: Map<String, Value>,
    text: Option<String>,
    has_children: bool,
}

/// Builds a JSON value from the parser events.
///
/// Mixed content is not preserved: the text of an element with child
/// elements is dropped. Text outside of the root element is ignored.
pub struct JsonBuilder {
    options: JsonOptions,
    root: Map<String, Value>,
    stack: Vec<Frame>,
}

impl JsonBuilder {
    pub fn new(options: JsonOptions) -> Self {
        JsonBuilder {
            options,
            root: Map::new(),
            stack: Vec::new(),
        }
    }

    /// Elements converted so far.
    pub fn peek(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Takes the converted document, leaving the builder empty.
    pub fn take(&mut self) -> Value {
        self.stack.clear();
        Value::Object(std::mem::take(&mut self.root))
    }

    pub fn into_value(mut self) -> Value {
        self.take()
    }

    fn coerce(&self, value: &str) -> Value {
        if self.options.coerce {
            coerce(value)
        } else {
            Value::String(value.to_string())
        }
    }

    fn open(&mut self, name: &str, attributes: &[crate::Attribute]) {
        let object = attributes
            .iter()
            .map(|attr| (attr.name.clone(), self.coerce(&attr.value)))
            .collect();
        self.stack.push(Frame {
            name: name.to_string(),
            object,
            text: None,
            has_children: false,
        });
    }

    fn text(&mut self, data: &str) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let data = if self.options.trim { data.trim() } else { data };
        let text = frame.text.get_or_insert_with(String::new);
        if self.options.sanitize {
            sanitize_into(data, text);
        } else {
            text.push_str(data);
        }
    }

    fn close(&mut self) {
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        if let Some(text) = frame.text.take() {
            if !frame.has_children {
                let value = self.coerce(&text);
                frame.object.insert(TEXT_KEY.to_string(), value);
            }
        }
        let value = if !self.options.reversible
            && frame.object.len() == 1
            && frame.object.contains_key(TEXT_KEY)
        {
            frame.object.remove(TEXT_KEY).unwrap_or_default()
        } else {
            Value::Object(frame.object)
        };

        let parent = match self.stack.last_mut() {
            Some(parent) => {
                parent.has_children = true;
                &mut parent.object
            }
            None => &mut self.root,
        };
        match parent.get_mut(&frame.name) {
            None => {
                parent.insert(frame.name, value);
            }
            Some(Value::Array(list)) => list.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
}

impl Default for JsonBuilder {
    fn default() -> Self {
        Self::new(JsonOptions::default())
    }
}

impl SaxHandler for JsonBuilder {
    fn handle_event(&mut self, event: &SaxEvent<'_>) -> Result<(), SaxError> {
        match event {
            SaxEvent::OpenTag(tag) => self.open(&tag.name, &tag.attributes),
            SaxEvent::Text(text) | SaxEvent::CData(text) => self.text(text),
            SaxEvent::CloseTag(_) => self.close(),
            _ => (),
        }
        Ok(())
    }
}

/// Converts a numeric or boolean looking string to the typed value.
///
/// Empty and whitespace only strings stay as strings.
fn coerce(value: &str) -> Value {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Value::from(n);
        }
        let looks_numeric = trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        if looks_numeric {
            if let Some(n) = trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                return Value::Number(n);
            }
        }
    }
    match value.to_lowercase().as_str() {
        "true" | "yes" => Value::Bool(true),
        "false" | "no" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}

fn sanitize_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str(crate::entities::predefined::AMP),
            '<' => out.push_str(crate::entities::predefined::LT),
            '>' => out.push_str(crate::entities::predefined::GT),
            _ => out.push(c),
        }
    }
}

/// Parses the XML document with a strict parser and converts it to JSON.
pub fn to_json(xml: &str, options: &JsonOptions) -> Result<Value, JsonError> {
    let mut builder = JsonBuilder::new(options.clone());
    let mut parser = SaxParser::new(SaxOptions::strict());
    parser.write(&mut builder, xml)?;
    parser.close(&mut builder)?;
    Ok(builder.into_value())
}
