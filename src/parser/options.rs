/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use serde::Deserialize;
use serde::Serialize;

/// Parser configuration.
///
/// The options are fixed when the [SaxParser](crate::SaxParser) is created.
/// They can also be deserialized from a configuration file, field names
/// are accepted both in snake case and in their camel case spelling:
///
/// ```
/// let options: saxite::SaxOptions =
///     serde_json::from_str(r#"{"strict": true, "xmlns": true, "maxBufferLength": 65536}"#)?;
/// assert!(options.strict);
/// assert_eq!(options.max_buffer_length, Some(65536));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaxOptions {
    /// Treat every well-formedness violation as a fatal error.
    pub strict: bool,
    /// Fold tag and attribute names to lower case in lenient mode.
    ///
    /// Lenient mode folds names to upper case unless this is set.
    /// Strict mode never changes names.
    #[serde(alias = "lowercasetags", alias = "lowercaseTags")]
    pub lowercase: bool,
    /// Resolve namespace prefixes and report namespace bindings.
    pub xmlns: bool,
    /// Trim whitespace around text and comments.
    pub trim: bool,
    /// Collapse whitespace runs in text and comments to a single space.
    pub normalize: bool,
    /// Attach line and column information to errors.
    pub position: bool,
    /// Only recognize the five predefined XML entities.
    #[serde(alias = "strictEntities")]
    pub strict_entities: bool,
    /// Do not treat `<script>` content specially in lenient mode.
    pub noscript: bool,
    /// Limit for the internal buffers, unbounded when `None`.
    #[serde(alias = "maxBufferLength")]
    pub max_buffer_length: Option<usize>,
}

impl Default for SaxOptions {
    fn default() -> Self {
        SaxOptions {
            strict: false,
            lowercase: false,
            xmlns: false,
            trim: false,
            normalize: false,
            position: true,
            strict_entities: false,
            noscript: false,
            max_buffer_length: None,
        }
    }
}

impl SaxOptions {
    /// Default options with strict parsing enabled.
    pub fn strict() -> Self {
        SaxOptions {
            strict: true,
            ..SaxOptions::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_xmlns(mut self, xmlns: bool) -> Self {
        self.xmlns = xmlns;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_position(mut self, position: bool) -> Self {
        self.position = position;
        self
    }

    pub fn with_strict_entities(mut self, strict_entities: bool) -> Self {
        self.strict_entities = strict_entities;
        self
    }

    pub fn with_noscript(mut self, noscript: bool) -> Self {
        self.noscript = noscript;
        self
    }

    pub fn with_max_buffer_length(mut self, max: Option<usize>) -> Self {
        self.max_buffer_length = max;
        self
    }
}
