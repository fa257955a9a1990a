/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Incremental SAX parser for XML, with a lenient mode for HTML-ish input.
//!
//! ```
//! use saxite::{SaxError, SaxEvent, SaxHandler, SaxOptions, SaxParser};
//!
//! struct Titles(Vec<String>);
//!
//! impl SaxHandler for Titles {
//!     fn handle_event(&mut self, event: &SaxEvent<'_>) -> Result<(), SaxError> {
//!         if let SaxEvent::Text(text) = event {
//!             self.0.push(text.to_string());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut titles = Titles(Vec::new());
//! let mut parser = SaxParser::new(SaxOptions::strict());
//! parser.write(&mut titles, "<book><title>Tom &amp; Jer")?;
//! parser.write(&mut titles, "ry</title></book>")?;
//! parser.close(&mut titles)?;
//! assert_eq!(titles.0, ["Tom & Jerry"]);
//! assert_eq!(saxite::escape(&titles.0[0]), "Tom &amp; Jerry");
//! # Ok::<(), SaxError>(())
//! ```

mod chars;
pub mod entities;
pub mod json;
mod namespace;
mod parser;
mod stream;

pub use parser::Attribute;
pub use parser::EventKind;
pub use parser::Location;
pub use parser::QName;
pub use parser::SaxError;
pub use parser::SaxEvent;
pub use parser::SaxHandler;
pub use parser::SaxOptions;
pub use parser::SaxParser;
pub use parser::Tag;
pub use parser::UnknownEvent;
pub use parser::Violation;

pub use stream::Listener;
pub use stream::SaxStream;

pub use entities::escape;
pub use entities::escaped_size;

pub use namespace::XML_NAMESPACE;
pub use namespace::XMLNS_NAMESPACE;
