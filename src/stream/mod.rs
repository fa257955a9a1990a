/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::collections::HashMap;
use std::io;
use std::mem;

use log::debug;

use crate::EventKind;
use crate::SaxError;
use crate::SaxEvent;
use crate::SaxHandler;
use crate::SaxOptions;
use crate::SaxParser;
use crate::UnknownEvent;

/// Callback subscribed to a [SaxStream] event.
pub type Listener = Box<dyn FnMut(&SaxEvent<'_>) -> Result<(), SaxError>>;

#[derive(Default)]
struct Listeners {
    map: HashMap<EventKind, Vec<Listener>>,
}

impl Listeners {
    fn has(&self, kind: EventKind) -> bool {
        self.map.get(&kind).is_some_and(|list| !list.is_empty())
    }
}

impl SaxHandler for Listeners {
    fn handle_event(&mut self, event: &SaxEvent<'_>) -> Result<(), SaxError> {
        if let Some(list) = self.map.get_mut(&event.kind()) {
            for listener in list.iter_mut() {
                listener(event)?;
            }
        }
        Ok(())
    }
}

/// Push style wrapper around the [SaxParser].
///
/// Instead of a single handler, any number of listeners can subscribe
/// to the events by their names. Raw input is mirrored to the `data`
/// listeners after it is parsed.
///
/// When there are `error` listeners, violations are delivered to them and
/// the parser is resumed, so the writer is not interrupted. Without such
/// listeners the error is returned from [write()](SaxStream::write).
///
/// The stream also implements [std::io::Write], so documents can be
/// copied into it from any reader. Multi-byte characters split across
/// writes are reassembled.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use saxite::{SaxEvent, SaxOptions, SaxStream};
///
/// let names = Rc::new(RefCell::new(Vec::new()));
/// let mut stream = SaxStream::new(SaxOptions::strict());
/// let sink = names.clone();
/// stream.on("opentag", move |event| {
///     if let SaxEvent::OpenTag(tag) = event {
///         sink.borrow_mut().push(tag.name.clone());
///     }
///     Ok(())
/// })?;
///
/// std::io::copy(&mut "<a><b/></a>".as_bytes(), &mut stream)?;
/// stream.end()?;
/// assert_eq!(*names.borrow(), ["a", "b"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SaxStream {
    parser: SaxParser,
    listeners: Listeners,
    partial: Vec<u8>,
}

impl SaxStream {
    pub fn new(options: SaxOptions) -> SaxStream {
        SaxStream {
            parser: SaxParser::new(options),
            listeners: Listeners::default(),
            partial: Vec::new(),
        }
    }

    pub fn parser(&self) -> &SaxParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut SaxParser {
        &mut self.parser
    }

    /// Subscribes a listener to the named event.
    ///
    /// Names are the [EventKind] names, with or without the `on` prefix.
    pub fn on<F>(&mut self, name: &str, listener: F) -> Result<&mut Self, UnknownEvent>
    where
        F: FnMut(&SaxEvent<'_>) -> Result<(), SaxError> + 'static,
    {
        let kind = name.parse()?;
        Ok(self.on_event(kind, listener))
    }

    pub fn on_event<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: FnMut(&SaxEvent<'_>) -> Result<(), SaxError> + 'static,
    {
        self.listeners
            .map
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
        self
    }

    /// Removes all listeners of the named event.
    pub fn off(&mut self, name: &str) -> Result<&mut Self, UnknownEvent> {
        let kind = name.parse()?;
        Ok(self.off_event(kind))
    }

    pub fn off_event(&mut self, kind: EventKind) -> &mut Self {
        self.listeners.map.remove(&kind);
        self
    }

    /// Parses the chunk, then mirrors it to the `data` listeners.
    pub fn write(&mut self, chunk: &str) -> Result<(), SaxError> {
        let result = self.parser.write(&mut self.listeners, chunk);
        self.recover(result)?;
        self.listeners.handle_event(&SaxEvent::Data(chunk))
    }

    /// Ends the document.
    ///
    /// The parser is ready for the next document afterwards, even if this
    /// one ended badly. Such errors are only returned when there are no
    /// `error` listeners to receive them.
    pub fn end(&mut self) -> Result<(), SaxError> {
        if !self.partial.is_empty() {
            debug!(
                "dropping {} bytes of an incomplete utf-8 sequence",
                self.partial.len()
            );
            self.partial.clear();
        }
        match self.parser.end(&mut self.listeners) {
            Err(err) if err.violation().is_some() && self.listeners.has(EventKind::Error) => {
                Ok(())
            }
            result => result,
        }
    }

    /// Same as [end()](SaxStream::end).
    pub fn close(&mut self) -> Result<(), SaxError> {
        self.end()
    }

    /// Sends the pending text, CDATA, and script content.
    pub fn flush(&mut self) -> Result<(), SaxError> {
        let result = self.parser.flush(&mut self.listeners);
        self.recover(result)
    }

    /// Discards the current document, keeping the listeners.
    pub fn reset(&mut self) {
        self.parser.reset();
        self.partial.clear();
    }

    /// Clears the parser error and continues with the next chunk.
    pub fn resume(&mut self) -> &mut Self {
        self.parser.resume();
        self
    }

    /// True if the parser stored an error which the error listeners received.
    fn delivered(&self) -> bool {
        self.parser.error().is_some() && self.listeners.has(EventKind::Error)
    }

    fn recover(&mut self, result: Result<(), SaxError>) -> Result<(), SaxError> {
        match result {
            Err(_) if self.delivered() => {
                self.parser.resume();
                Ok(())
            }
            result => result,
        }
    }
}

impl Default for SaxStream {
    fn default() -> Self {
        Self::new(SaxOptions::default())
    }
}

impl io::Write for SaxStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = mem::take(&mut self.partial);
        bytes.extend_from_slice(buf);
        let complete = match std::str::from_utf8(&bytes) {
            Ok(s) => s.len(),
            // incomplete sequence at the end, wait for the rest
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        self.partial = bytes.split_off(complete);
        let chunk = std::str::from_utf8(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        SaxStream::write(self, chunk).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
