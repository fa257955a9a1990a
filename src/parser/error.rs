/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::fmt::Display;

use thiserror::Error;

use super::Location;

/// Details of a problem found in the input.
///
/// The description is one of the fixed messages of the parser; the detail
/// carries the offending name or value when there is one. The location is
/// only filled when position reporting is enabled in the
/// [SaxOptions](crate::SaxOptions).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Violation {
    pub description: &'static str,
    pub detail: Option<String>,
    pub location: Option<Location>,
}

impl Violation {
    pub(crate) fn new(description: &'static str) -> Self {
        Violation {
            description,
            detail: None,
            location: None,
        }
    }

    pub(crate) fn with_detail(description: &'static str, detail: impl Into<String>) -> Self {
        Violation {
            description,
            detail: Some(detail.into()),
            location: None,
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

/// Type of the error which happened during the SAX parsing.
///
/// These categories correspond to the distinct actions the caller might
/// take. In strict mode the first violation is stored in the parser and
/// returned from every write until [resume()](crate::SaxParser::resume)
/// is called. In lenient mode only buffer overflows are fatal.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SaxError {
    /// A syntax error is encountered in the XML input.
    ///
    /// Typical action is telling the violation to the user so they can fix the document.
    #[error("invalid xml syntax: {0}")]
    BadXml(Violation),

    /// An entity or character reference could not be decoded.
    #[error("invalid entity reference: {0}")]
    BadEntity(Violation),

    /// A buffer which cannot be flushed early grew over the configured limit.
    #[error("buffer limit exceeded: {0}")]
    BufferOverflow(Violation),

    /// Input was written after the end of the document without a reset.
    #[error("cannot write after close, reset the parser first")]
    WriteAfterClose,

    /// Event handler returned this error.
    ///
    /// This is intended for caller's handler to be able to abort the processing while
    /// signalling to the caller that the interruption is not caused by the parser itself.
    #[error("error from sax handler")]
    HandlerAbort,
}

impl SaxError {
    /// The violation behind the error, if the error is about the input.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            SaxError::BadXml(v) | SaxError::BadEntity(v) | SaxError::BufferOverflow(v) => Some(v),
            SaxError::WriteAfterClose | SaxError::HandlerAbort => None,
        }
    }

    pub(super) fn located(mut self, location: Location) -> Self {
        if let SaxError::BadXml(v) | SaxError::BadEntity(v) | SaxError::BufferOverflow(v) =
            &mut self
        {
            v.location = Some(location);
        }
        self
    }
}

pub(crate) mod description {
    pub(crate) const NON_WHITESPACE_BEFORE_ROOT: &str = "Non-whitespace before first tag";
    pub(crate) const TEXT_OUTSIDE_ROOT: &str = "Text data outside of root node";
    pub(crate) const UNENCODED_LT: &str = "Unencoded <";
    pub(crate) const MISPLACED_DOCTYPE: &str = "Inappropriately located doctype declaration";
    pub(crate) const MALFORMED_COMMENT: &str = "Malformed comment";
    pub(crate) const INVALID_TAG_NAME: &str = "Invalid character in tag name";
    pub(crate) const SLASH_WITHOUT_END: &str = "Forward-slash in opening tag not followed by >";
    pub(crate) const INVALID_ATTRIBUTE_NAME: &str = "Invalid attribute name";
    pub(crate) const ATTRIBUTE_WITHOUT_VALUE: &str = "Attribute without value";
    pub(crate) const UNQUOTED_ATTRIBUTE_VALUE: &str = "Unquoted attribute value";
    pub(crate) const NO_WHITESPACE_BETWEEN_ATTRIBUTES: &str = "No whitespace between attributes";
    pub(crate) const INVALID_CLOSE_TAG_NAME: &str = "Invalid tagname in closing tag";
    pub(crate) const INVALID_CLOSE_TAG_CHARS: &str = "Invalid characters in closing tag";
    pub(crate) const EMPTY_CLOSE_TAG: &str = "Weird empty close tag";
    pub(crate) const UNEXPECTED_CLOSE_TAG: &str = "Unexpected close tag";
    pub(crate) const UNMATCHED_CLOSE_TAG: &str = "Unmatched closing tag";
    pub(crate) const INVALID_ENTITY_NAME: &str = "Invalid character in entity name";
    pub(crate) const INVALID_ENTITY: &str = "Invalid character entity";
    pub(crate) const UNBOUND_PREFIX: &str = "Unbound namespace prefix";
    pub(crate) const XML_PREFIX_BINDING: &str =
        "xml: prefix must be bound to http://www.w3.org/XML/1998/namespace";
    pub(crate) const XMLNS_PREFIX_BINDING: &str =
        "xmlns: prefix must be bound to http://www.w3.org/2000/xmlns/";
    pub(crate) const UNCLOSED_ROOT: &str = "Unclosed root tag";
    pub(crate) const UNEXPECTED_END: &str = "Unexpected end";
    pub(crate) const MAX_BUFFER_LENGTH: &str = "Max buffer length exceeded";
}
