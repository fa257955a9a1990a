/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

mod buffers;
mod error;
mod event;
mod location;
mod options;

use std::mem;

use log::debug;
use log::trace;

use crate::chars::BYTE_ORDER_MARK;
use crate::chars::is_attrib_end;
use crate::chars::is_entity_body;
use crate::chars::is_entity_start;
use crate::chars::is_name_body;
use crate::chars::is_name_start;
use crate::chars::is_quote;
use crate::chars::is_whitespace;
use crate::chars::whitespace;
use crate::entities;
use crate::entities::EntityTable;
use crate::namespace::ScopeId;
use crate::namespace::Scopes;
use crate::namespace::XML_NAMESPACE;
use crate::namespace::XMLNS_NAMESPACE;
use crate::namespace::split_qname;

use buffers::BufferGuard;
use buffers::BufferKind;
use buffers::Buffers;
use error::description;
pub use error::SaxError;
pub use error::Violation;
pub use event::Attribute;
pub use event::EventKind;
pub use event::QName;
pub use event::SaxEvent;
pub use event::Tag;
pub use event::UnknownEvent;
pub use location::Location;
pub use options::SaxOptions;

/// Receiver of the parser events.
///
/// Events are delivered synchronously from inside the
/// [write()](SaxParser::write) call. Returning an error aborts the
/// write and the error is returned to the caller as is, the parser does
/// not store it. Use [SaxError::HandlerAbort] to signal that the
/// interruption was the handler's decision.
///
/// The construct being parsed when the handler failed is left half
/// done, so the parser must be [reset](SaxParser::reset) before it is
/// used again.
pub trait SaxHandler {
    fn handle_event(&mut self, event: &SaxEvent<'_>) -> Result<(), SaxError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Begin,
    BeginWhitespace,
    Text,
    TextEntity,
    OpenWaka,
    SgmlDecl,
    SgmlDeclQuoted,
    Doctype,
    DoctypeQuoted,
    DoctypeDtd,
    DoctypeDtdQuoted,
    CommentStarting,
    Comment,
    CommentEnding,
    CommentEnded,
    CData,
    CDataEnding,
    CDataEnding2,
    ProcInst,
    ProcInstBody,
    ProcInstEnding,
    OpenTag,
    OpenTagSlash,
    Attrib,
    AttribName,
    AttribNameSawWhite,
    AttribValue,
    AttribValueQuoted,
    AttribValueClosed,
    AttribValueUnquoted,
    AttribValueEntityQ,
    AttribValueEntityU,
    CloseTag,
    CloseTagSawWhite,
    Script,
    ScriptEnding,
}

const CDATA_KEYWORD: &str = "[CDATA[";
const DOCTYPE_KEYWORD: &str = "DOCTYPE";

fn is_script_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("script")
}

fn apply_text_options(options: &SaxOptions, s: &mut String) {
    if options.trim {
        let end = s.trim_end().len();
        s.truncate(end);
        let start = s.len() - s.trim_start().len();
        s.drain(..start);
    }
    if options.normalize {
        let mut out = String::with_capacity(s.len());
        let mut in_space = false;
        for c in s.chars() {
            if c.is_whitespace() {
                if !in_space {
                    out.push(' ');
                }
                in_space = true;
            } else {
                out.push(c);
                in_space = false;
            }
        }
        *s = out;
    }
}

/// SAX (Simple API for XML) based incremental XML parser.
///
/// This struct implements a SAX parser which processes the incoming
/// text one character at a time and invokes a handler for each
/// encountered XML construct. Input can be split at any character
/// boundary, the reported events do not depend on how the document is
/// chunked.
///
/// In strict mode the first well-formedness violation stops the parser.
/// In lenient mode the parser recovers from malformed markup the way web
/// browsers do with HTML, and only counts the violations.
///
/// # Examples
///
/// Typical usage:
/// ```
/// use saxite::{SaxError, SaxEvent, SaxHandler, SaxOptions, SaxParser};
///
/// // Example handler which collects the tag names
/// struct Handler {
///     names: Vec<String>,
/// }
/// impl SaxHandler for Handler {
///     fn handle_event(&mut self, event: &SaxEvent) -> Result<(), SaxError> {
///         if let SaxEvent::OpenTag(tag) = event {
///             self.names.push(tag.name.clone());
///         }
///         Ok(())
///     }
/// }
/// let mut handler = Handler { names: Vec::new() };
///
/// let mut parser = SaxParser::new(SaxOptions::strict());
/// parser.write(&mut handler, "<doc><a/>")?;
/// parser.write(&mut handler, "<b>text</b></doc>")?;
/// parser.close(&mut handler)?;
/// assert_eq!(handler.names, ["doc", "a", "b"]);
/// # Ok::<(), SaxError>(())
/// ```
///
/// Errors carry the location of the problem:
/// ```
/// # use saxite::{SaxError, SaxEvent, SaxHandler, SaxOptions, SaxParser};
/// # struct Handler;
/// # impl SaxHandler for Handler {
/// #     fn handle_event(&mut self, _event: &SaxEvent) -> Result<(), SaxError> {
/// #         Ok(())
/// #     }
/// # }
/// let mut parser = SaxParser::new(SaxOptions::strict());
/// match parser.write(&mut Handler, "<a>\n<b></a>") {
///     Err(SaxError::BadXml(violation)) => {
///         let location = violation.location.unwrap();
///         assert_eq!((location.line, location.column), (1, 7));
///     }
///     _ => unreachable!(),
/// }
/// ```
pub struct SaxParser {
    options: SaxOptions,
    state: State,
    buffers: Buffers,
    quote: char,
    tag: Option<Tag>,
    tags: Vec<Tag>,
    attrib_list: Vec<(String, String)>,
    scopes: Scopes,
    entity_table: EntityTable,
    noscript: bool,
    saw_root: bool,
    closed_root: bool,
    saw_doctype: bool,
    in_script: bool,
    start_tag_position: usize,
    location: Location,
    guard: BufferGuard,
    error: Option<SaxError>,
    closed: bool,
    nr_violations: usize,
    last_violation: Option<SaxError>,
}

impl SaxParser {
    /// Creates a new SAX parser instance.
    ///
    /// The instance is reset automatically at the end of each document and
    /// can be reused for the next one.
    pub fn new(options: SaxOptions) -> SaxParser {
        let entity_table = if options.strict_entities {
            EntityTable::Xml
        } else {
            EntityTable::Html
        };
        SaxParser {
            state: State::Begin,
            buffers: Buffers::default(),
            quote: '\0',
            tag: None,
            tags: Vec::new(),
            attrib_list: Vec::new(),
            scopes: Scopes::new(),
            entity_table,
            noscript: options.strict || options.noscript,
            saw_root: false,
            closed_root: false,
            saw_doctype: false,
            in_script: false,
            start_tag_position: 0,
            location: Location::new(),
            guard: BufferGuard::new(options.max_buffer_length),
            error: None,
            closed: false,
            nr_violations: 0,
            last_violation: None,
            options,
        }
    }

    /// Resets the parser into a clean state, keeping the options.
    ///
    /// Any partially parsed document and stored error are discarded.
    pub fn reset(&mut self) {
        self.state = State::Begin;
        self.buffers.clear();
        self.quote = '\0';
        self.tag = None;
        self.tags.clear();
        self.attrib_list.clear();
        self.scopes.reset();
        self.saw_root = false;
        self.closed_root = false;
        self.saw_doctype = false;
        self.in_script = false;
        self.start_tag_position = 0;
        self.location = Location::new();
        self.guard.reset();
        self.error = None;
        self.closed = false;
        self.nr_violations = 0;
        self.last_violation = None;
    }

    pub fn options(&self) -> &SaxOptions {
        &self.options
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Position of the last parsed character.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Number of currently open tags.
    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    /// Currently open tags, innermost last.
    pub fn open_tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The stored fatal error, if any.
    pub fn error(&self) -> Option<&SaxError> {
        self.error.as_ref()
    }

    /// True after the document has ended but the parser could not be reset
    /// because the handler failed on the end event.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// How many violations lenient mode recovered from in this document.
    pub fn violation_count(&self) -> usize {
        self.nr_violations
    }

    /// The last violation lenient mode recovered from.
    pub fn last_violation(&self) -> Option<&SaxError> {
        self.last_violation.as_ref()
    }

    /// Clears the stored error so that parsing can continue.
    ///
    /// The rest of the chunk which caused the error is not parsed.
    pub fn resume(&mut self) -> &mut Self {
        self.error = None;
        self
    }

    /// Parses a chunk of the document.
    ///
    /// Passing `None` signals the end of input, same as [end()](SaxParser::end).
    pub fn write<'a, H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        chunk: impl Into<Option<&'a str>>,
    ) -> Result<(), SaxError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.closed {
            return Err(SaxError::WriteAfterClose);
        }
        let Some(chunk) = chunk.into() else {
            return self.end(handler);
        };

        let mut pos = 0;
        while let Some(c) = chunk[pos..].chars().next() {
            pos += c.len_utf8();
            self.location.advance(c);

            if self.state == State::Text
                && self.saw_root
                && !self.closed_root
                && c != '<'
                && c != '&'
            {
                let rest = &chunk[pos..];
                let run = memchr::memchr2(b'<', b'&', rest.as_bytes()).unwrap_or(rest.len());
                self.buffers.text.push(c);
                self.buffers.text.push_str(&rest[..run]);
                self.location.advance_str(&rest[..run]);
                pos += run;
                continue;
            }

            self.parse_char(handler, c)?;
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
        }

        self.check_buffers(handler)
    }

    /// Signals the end of input, same as writing `None`.
    pub fn close<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        self.write(handler, None::<&str>)
    }

    /// Finishes the document.
    ///
    /// Pending text is flushed, the [End](SaxEvent::End) event is sent, and
    /// the parser is reset for the next document, which is announced with
    /// the [Ready](SaxEvent::Ready) event.
    ///
    /// Input ending inside a construct is an error in both modes, an
    /// unclosed root element only in strict mode. The document is still
    /// finished and the parser reset in that case, and the error is
    /// returned after the [Ready](SaxEvent::Ready) event.
    pub fn end<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.closed {
            return Err(SaxError::WriteAfterClose);
        }
        if self.saw_root && !self.closed_root {
            self.strict_fail(handler, Violation::new(description::UNCLOSED_ROOT))?;
        }
        if !matches!(
            self.state,
            State::Begin | State::BeginWhitespace | State::Text
        ) {
            let violation = Violation::new(description::UNEXPECTED_END);
            self.fail(handler, SaxError::BadXml(violation))?;
        }
        let failure = self.error.take();
        self.close_text(handler)?;
        self.closed = true;
        self.emit(handler, SaxEvent::End)?;
        self.reset();
        self.emit(handler, SaxEvent::Ready)?;
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Sends the pending text, CDATA, and script content without waiting
    /// for the end of the construct.
    pub fn flush<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        self.close_text(handler)?;
        if !self.buffers.cdata.is_empty() {
            self.emit(handler, SaxEvent::CData(&self.buffers.cdata))?;
            self.buffers.cdata.clear();
        }
        if !self.buffers.script.is_empty() {
            self.emit(handler, SaxEvent::Script(&self.buffers.script))?;
            self.buffers.script.clear();
        }
        Ok(())
    }

    fn emit<H: SaxHandler + ?Sized>(
        &self,
        handler: &mut H,
        event: SaxEvent<'_>,
    ) -> Result<(), SaxError> {
        if self.error.is_some() {
            return Ok(());
        }
        handler.handle_event(&event)
    }

    fn close_text<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        if self.buffers.text.is_empty() {
            return Ok(());
        }
        let mut text = mem::take(&mut self.buffers.text);
        apply_text_options(&self.options, &mut text);
        let result = if text.is_empty() {
            Ok(())
        } else {
            self.emit(handler, SaxEvent::Text(&text))
        };
        text.clear();
        self.buffers.text = text;
        result
    }

    fn located(&self, err: SaxError) -> SaxError {
        if self.options.position {
            err.located(self.location)
        } else {
            err
        }
    }

    /// Stores a fatal error and reports it to the handler.
    fn fail<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        err: SaxError,
    ) -> Result<(), SaxError> {
        if self.error.is_some() {
            return Ok(());
        }
        self.close_text(handler)?;
        let err = self.located(err);
        debug!("{err}");
        self.error = Some(err.clone());
        handler.handle_event(&SaxEvent::Error(&err))
    }

    /// Reports a violation, which is only fatal in strict mode.
    fn violation<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        err: SaxError,
    ) -> Result<(), SaxError> {
        if self.options.strict {
            return self.fail(handler, err);
        }
        let err = self.located(err);
        debug!("recovering from {err}");
        self.nr_violations += 1;
        self.last_violation = Some(err);
        Ok(())
    }

    fn strict_fail<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        violation: Violation,
    ) -> Result<(), SaxError> {
        self.violation(handler, SaxError::BadXml(violation))
    }

    fn check_buffers<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        let position = self.location.position;
        let Some(max) = self.guard.due(position) else {
            return Ok(());
        };
        let (over, longest) = self.buffers.over_limit(max);
        for kind in over {
            debug!("{} buffer is over the {} limit", kind.name(), max);
            match kind {
                BufferKind::Text => self.close_text(handler)?,
                BufferKind::CData => {
                    self.close_text(handler)?;
                    self.emit(handler, SaxEvent::CData(&self.buffers.cdata))?;
                    self.buffers.cdata.clear();
                }
                BufferKind::Script => {
                    self.close_text(handler)?;
                    self.emit(handler, SaxEvent::Script(&self.buffers.script))?;
                    self.buffers.script.clear();
                }
                _ => {
                    let violation =
                        Violation::with_detail(description::MAX_BUFFER_LENGTH, kind.name());
                    self.fail(handler, SaxError::BufferOverflow(violation))?;
                }
            }
        }
        self.guard.reschedule(position, longest);
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn fold_case(&self, name: &mut String) {
        if !self.options.strict {
            *name = if self.options.lowercase {
                name.to_lowercase()
            } else {
                name.to_uppercase()
            };
        }
    }

    fn parent_scope(&self) -> ScopeId {
        self.tags
            .last()
            .and_then(|tag| tag.scope)
            .unwrap_or(ScopeId::ROOT)
    }

    fn begin_whitespace<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        c: char,
    ) -> Result<(), SaxError> {
        if c == '<' {
            self.state = State::OpenWaka;
            self.start_tag_position = self.location.position;
        } else if !is_whitespace(c) {
            self.strict_fail(handler, Violation::new(description::NON_WHITESPACE_BEFORE_ROOT))?;
            self.buffers.text.clear();
            self.buffers.text.push(c);
            self.state = State::Text;
        }
        Ok(())
    }

    /// Checks if the SGML declaration collected so far plus `c` spells `keyword`.
    fn sgml_decl_is(&self, c: char, keyword: &str) -> bool {
        let decl = &self.buffers.sgml_decl;
        decl.len() + c.len_utf8() == keyword.len()
            && keyword.is_char_boundary(decl.len())
            && decl.eq_ignore_ascii_case(&keyword[..decl.len()])
            && keyword[decl.len()..]
                .chars()
                .next()
                .is_some_and(|k| k.eq_ignore_ascii_case(&c))
    }

    fn parse_char<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        c: char,
    ) -> Result<(), SaxError> {
        match self.state {
            State::Begin => {
                self.state = State::BeginWhitespace;
                if c != BYTE_ORDER_MARK {
                    self.begin_whitespace(handler, c)?;
                }
            }

            State::BeginWhitespace => self.begin_whitespace(handler, c)?,

            State::Text => {
                if c == '<' && !(self.saw_root && self.closed_root && !self.options.strict) {
                    self.state = State::OpenWaka;
                    self.start_tag_position = self.location.position;
                } else {
                    if !is_whitespace(c) && (!self.saw_root || self.closed_root) {
                        self.strict_fail(handler, Violation::new(description::TEXT_OUTSIDE_ROOT))?;
                    }
                    if c == '&' {
                        self.state = State::TextEntity;
                    } else {
                        self.buffers.text.push(c);
                    }
                }
            }

            State::Script => {
                if c == '<' {
                    self.state = State::ScriptEnding;
                } else {
                    self.buffers.script.push(c);
                }
            }

            State::ScriptEnding => {
                if c == '/' {
                    self.state = State::CloseTag;
                } else {
                    self.buffers.script.push('<');
                    self.buffers.script.push(c);
                    self.state = State::Script;
                }
            }

            State::OpenWaka => match c {
                '!' => {
                    self.state = State::SgmlDecl;
                    self.buffers.sgml_decl.clear();
                }
                whitespace!() => (),
                '/' => {
                    self.state = State::CloseTag;
                    self.buffers.tag_name.clear();
                }
                '?' => {
                    self.state = State::ProcInst;
                    self.buffers.proc_inst_name.clear();
                    self.buffers.proc_inst_body.clear();
                }
                _ if is_name_start(c) => {
                    self.state = State::OpenTag;
                    self.buffers.tag_name.clear();
                    self.buffers.tag_name.push(c);
                }
                _ => {
                    self.strict_fail(handler, Violation::new(description::UNENCODED_LT))?;
                    self.buffers.text.push('<');
                    // keep the whitespace which was skipped after the '<'
                    if self.start_tag_position + 1 < self.location.position {
                        let pad = self.location.position - self.start_tag_position - 1;
                        self.buffers.text.extend(std::iter::repeat_n(' ', pad));
                    }
                    self.buffers.text.push(c);
                    self.state = State::Text;
                }
            },

            State::SgmlDecl => {
                if self.sgml_decl_is(c, CDATA_KEYWORD) {
                    self.close_text(handler)?;
                    self.emit(handler, SaxEvent::OpenCData)?;
                    self.state = State::CData;
                    self.buffers.sgml_decl.clear();
                    self.buffers.cdata.clear();
                } else if c == '-' && self.buffers.sgml_decl.is_empty() {
                    self.state = State::CommentStarting;
                } else if self.sgml_decl_is(c, DOCTYPE_KEYWORD) {
                    self.state = State::Doctype;
                    if self.saw_doctype || self.saw_root {
                        self.strict_fail(handler, Violation::new(description::MISPLACED_DOCTYPE))?;
                    }
                    self.buffers.doctype.clear();
                    self.buffers.sgml_decl.clear();
                } else if c == '>' {
                    self.close_text(handler)?;
                    self.emit(handler, SaxEvent::SgmlDeclaration(&self.buffers.sgml_decl))?;
                    self.buffers.sgml_decl.clear();
                    self.state = State::Text;
                } else if is_quote(c) {
                    self.state = State::SgmlDeclQuoted;
                    self.quote = c;
                    self.buffers.sgml_decl.push(c);
                } else {
                    self.buffers.sgml_decl.push(c);
                }
            }

            State::SgmlDeclQuoted => {
                if c == self.quote {
                    self.state = State::SgmlDecl;
                    self.quote = '\0';
                }
                self.buffers.sgml_decl.push(c);
            }

            State::CommentStarting => {
                if c == '-' {
                    self.state = State::Comment;
                    self.buffers.comment.clear();
                } else {
                    // not a comment after all, a declaration starting with a dash
                    self.buffers.sgml_decl.push('-');
                    self.state = State::SgmlDecl;
                    return self.parse_char(handler, c);
                }
            }

            State::Doctype => {
                if c == '>' {
                    self.state = State::Text;
                    self.close_text(handler)?;
                    self.emit(handler, SaxEvent::Doctype(&self.buffers.doctype))?;
                    self.buffers.doctype.clear();
                    self.saw_doctype = true;
                } else {
                    self.buffers.doctype.push(c);
                    if c == '[' {
                        self.state = State::DoctypeDtd;
                    } else if is_quote(c) {
                        self.state = State::DoctypeQuoted;
                        self.quote = c;
                    }
                }
            }

            State::DoctypeQuoted => {
                self.buffers.doctype.push(c);
                if c == self.quote {
                    self.quote = '\0';
                    self.state = State::Doctype;
                }
            }

            State::DoctypeDtd => {
                self.buffers.doctype.push(c);
                if c == ']' {
                    self.state = State::Doctype;
                } else if is_quote(c) {
                    self.state = State::DoctypeDtdQuoted;
                    self.quote = c;
                }
            }

            State::DoctypeDtdQuoted => {
                self.buffers.doctype.push(c);
                if c == self.quote {
                    self.state = State::DoctypeDtd;
                    self.quote = '\0';
                }
            }

            State::Comment => {
                if c == '-' {
                    self.state = State::CommentEnding;
                } else {
                    self.buffers.comment.push(c);
                }
            }

            State::CommentEnding => {
                if c == '-' {
                    self.state = State::CommentEnded;
                    let mut comment = mem::take(&mut self.buffers.comment);
                    apply_text_options(&self.options, &mut comment);
                    if !comment.is_empty() {
                        self.close_text(handler)?;
                        self.emit(handler, SaxEvent::Comment(&comment))?;
                    }
                } else {
                    self.buffers.comment.push('-');
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                }
            }

            State::CommentEnded => {
                if c == '>' {
                    self.state = State::Text;
                } else {
                    self.strict_fail(handler, Violation::new(description::MALFORMED_COMMENT))?;
                    // the dashes did not end the comment, keep them as content
                    self.buffers.comment.push_str("--");
                    self.buffers.comment.push(c);
                    self.state = State::Comment;
                }
            }

            State::CData => {
                if c == ']' {
                    self.state = State::CDataEnding;
                } else {
                    self.buffers.cdata.push(c);
                }
            }

            State::CDataEnding => {
                if c == ']' {
                    self.state = State::CDataEnding2;
                } else {
                    self.buffers.cdata.push(']');
                    self.buffers.cdata.push(c);
                    self.state = State::CData;
                }
            }

            State::CDataEnding2 => match c {
                '>' => {
                    self.close_text(handler)?;
                    if !self.buffers.cdata.is_empty() {
                        self.emit(handler, SaxEvent::CData(&self.buffers.cdata))?;
                    }
                    self.emit(handler, SaxEvent::CloseCData)?;
                    self.buffers.cdata.clear();
                    self.state = State::Text;
                }
                ']' => self.buffers.cdata.push(']'),
                _ => {
                    self.buffers.cdata.push_str("]]");
                    self.buffers.cdata.push(c);
                    self.state = State::CData;
                }
            },

            State::ProcInst => match c {
                '?' => self.state = State::ProcInstEnding,
                whitespace!() => self.state = State::ProcInstBody,
                _ => self.buffers.proc_inst_name.push(c),
            },

            State::ProcInstBody => {
                if self.buffers.proc_inst_body.is_empty() && is_whitespace(c) {
                    // skip the leading whitespace
                } else if c == '?' {
                    self.state = State::ProcInstEnding;
                } else {
                    self.buffers.proc_inst_body.push(c);
                }
            }

            State::ProcInstEnding => {
                if c == '?' {
                    self.buffers.proc_inst_body.push('?');
                } else if c == '>' {
                    self.close_text(handler)?;
                    self.emit(
                        handler,
                        SaxEvent::ProcessingInstruction {
                            name: &self.buffers.proc_inst_name,
                            body: &self.buffers.proc_inst_body,
                        },
                    )?;
                    self.buffers.proc_inst_name.clear();
                    self.buffers.proc_inst_body.clear();
                    self.state = State::Text;
                } else {
                    self.buffers.proc_inst_body.push('?');
                    self.buffers.proc_inst_body.push(c);
                    self.state = State::ProcInstBody;
                }
            }

            State::OpenTag => {
                if is_name_body(c) {
                    self.buffers.tag_name.push(c);
                } else {
                    self.new_tag(handler)?;
                    match c {
                        '>' => self.open_tag(handler, false)?,
                        '/' => self.state = State::OpenTagSlash,
                        _ => {
                            if !is_whitespace(c) {
                                self.strict_fail(
                                    handler,
                                    Violation::with_detail(description::INVALID_TAG_NAME, c),
                                )?;
                            }
                            self.state = State::Attrib;
                        }
                    }
                }
            }

            State::OpenTagSlash => {
                if c == '>' {
                    self.open_tag(handler, true)?;
                    self.close_tag(handler)?;
                } else {
                    self.strict_fail(handler, Violation::new(description::SLASH_WITHOUT_END))?;
                    self.state = State::Attrib;
                }
            }

            State::Attrib => match c {
                whitespace!() => (),
                '>' => self.open_tag(handler, false)?,
                '/' => self.state = State::OpenTagSlash,
                _ if is_name_start(c) => {
                    self.buffers.attrib_name.clear();
                    self.buffers.attrib_name.push(c);
                    self.buffers.attrib_value.clear();
                    self.state = State::AttribName;
                }
                _ => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(description::INVALID_ATTRIBUTE_NAME, c),
                    )?;
                }
            },

            State::AttribName => match c {
                '=' => self.state = State::AttribValue,
                '>' => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(
                            description::ATTRIBUTE_WITHOUT_VALUE,
                            self.buffers.attrib_name.as_str(),
                        ),
                    )?;
                    self.buffers.attrib_value.clone_from(&self.buffers.attrib_name);
                    self.attrib(handler)?;
                    self.open_tag(handler, false)?;
                }
                whitespace!() => self.state = State::AttribNameSawWhite,
                _ if is_name_body(c) => self.buffers.attrib_name.push(c),
                _ => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(description::INVALID_ATTRIBUTE_NAME, c),
                    )?;
                }
            },

            State::AttribNameSawWhite => match c {
                '=' => self.state = State::AttribValue,
                whitespace!() => (),
                _ => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(
                            description::ATTRIBUTE_WITHOUT_VALUE,
                            self.buffers.attrib_name.as_str(),
                        ),
                    )?;
                    self.buffers.attrib_value.clear();
                    self.attrib(handler)?;
                    if c == '>' {
                        self.open_tag(handler, false)?;
                    } else if is_name_start(c) {
                        self.buffers.attrib_name.clear();
                        self.buffers.attrib_name.push(c);
                        self.state = State::AttribName;
                    } else {
                        self.strict_fail(
                            handler,
                            Violation::with_detail(description::INVALID_ATTRIBUTE_NAME, c),
                        )?;
                        self.state = State::Attrib;
                    }
                }
            },

            State::AttribValue => {
                if is_whitespace(c) {
                    // wait for the value
                } else if is_quote(c) {
                    self.quote = c;
                    self.state = State::AttribValueQuoted;
                } else {
                    self.strict_fail(handler, Violation::new(description::UNQUOTED_ATTRIBUTE_VALUE))?;
                    self.state = State::AttribValueUnquoted;
                    self.buffers.attrib_value.clear();
                    self.buffers.attrib_value.push(c);
                }
            }

            State::AttribValueQuoted => {
                if c == self.quote {
                    self.attrib(handler)?;
                    self.quote = '\0';
                    self.state = State::AttribValueClosed;
                } else if c == '&' {
                    self.state = State::AttribValueEntityQ;
                } else {
                    self.buffers.attrib_value.push(c);
                }
            }

            State::AttribValueClosed => match c {
                whitespace!() => self.state = State::Attrib,
                '>' => self.open_tag(handler, false)?,
                '/' => self.state = State::OpenTagSlash,
                _ if is_name_start(c) => {
                    self.strict_fail(
                        handler,
                        Violation::new(description::NO_WHITESPACE_BETWEEN_ATTRIBUTES),
                    )?;
                    self.buffers.attrib_name.clear();
                    self.buffers.attrib_name.push(c);
                    self.buffers.attrib_value.clear();
                    self.state = State::AttribName;
                }
                _ => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(description::INVALID_ATTRIBUTE_NAME, c),
                    )?;
                }
            },

            State::AttribValueUnquoted => {
                if !is_attrib_end(c) {
                    if c == '&' {
                        self.state = State::AttribValueEntityU;
                    } else {
                        self.buffers.attrib_value.push(c);
                    }
                } else {
                    self.attrib(handler)?;
                    if c == '>' {
                        self.open_tag(handler, false)?;
                    } else {
                        self.state = State::Attrib;
                    }
                }
            }

            State::CloseTag => self.parse_close_tag_char(handler, c)?,

            State::CloseTagSawWhite => match c {
                whitespace!() => (),
                '>' => self.close_tag(handler)?,
                _ => {
                    self.strict_fail(
                        handler,
                        Violation::with_detail(description::INVALID_CLOSE_TAG_CHARS, c),
                    )?;
                }
            },

            State::TextEntity | State::AttribValueEntityQ | State::AttribValueEntityU => {
                self.parse_entity_char(handler, c)?
            }
        }
        Ok(())
    }

    fn parse_close_tag_char<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        c: char,
    ) -> Result<(), SaxError> {
        if self.buffers.tag_name.is_empty() {
            if self.in_script && !is_name_start(c) {
                self.buffers.script.push_str("</");
                self.buffers.script.push(c);
                self.state = State::Script;
            } else if is_whitespace(c) {
                // wait for the name
            } else if c == '>' {
                self.close_tag(handler)?;
            } else if !is_name_start(c) {
                self.strict_fail(
                    handler,
                    Violation::with_detail(description::INVALID_CLOSE_TAG_NAME, c),
                )?;
            } else {
                self.buffers.tag_name.push(c);
            }
        } else if c == '>' {
            self.close_tag(handler)?;
        } else if is_name_body(c) {
            self.buffers.tag_name.push(c);
        } else if self.in_script && !(is_whitespace(c) && is_script_name(&self.buffers.tag_name))
        {
            self.buffers.script.push_str("</");
            self.buffers.script.push_str(&self.buffers.tag_name);
            self.buffers.script.push(c);
            self.buffers.tag_name.clear();
            self.state = State::Script;
        } else {
            if !is_whitespace(c) {
                self.strict_fail(
                    handler,
                    Violation::with_detail(description::INVALID_CLOSE_TAG_NAME, c),
                )?;
            }
            self.state = State::CloseTagSawWhite;
        }
        Ok(())
    }

    fn parse_entity_char<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        c: char,
    ) -> Result<(), SaxError> {
        let (return_state, in_text) = match self.state {
            State::TextEntity => (State::Text, true),
            State::AttribValueEntityQ => (State::AttribValueQuoted, false),
            _ => (State::AttribValueUnquoted, false),
        };

        if c == ';' {
            let decoded = entities::decode(self.entity_table, &self.buffers.entity);
            if decoded.is_none() {
                let violation = Violation::with_detail(
                    description::INVALID_ENTITY,
                    format!("&{};", self.buffers.entity),
                );
                self.violation(handler, SaxError::BadEntity(violation))?;
            }
            let entity = mem::take(&mut self.buffers.entity);
            let target = if in_text {
                &mut self.buffers.text
            } else {
                &mut self.buffers.attrib_value
            };
            match decoded {
                Some(decoded) => decoded.push_to(target),
                None => {
                    target.push('&');
                    target.push_str(&entity);
                    target.push(';');
                }
            }
            self.buffers.entity = entity;
            self.buffers.entity.clear();
            self.state = return_state;
        } else if (self.buffers.entity.is_empty() && is_entity_start(c))
            || (!self.buffers.entity.is_empty() && is_entity_body(c))
        {
            self.buffers.entity.push(c);
        } else {
            self.strict_fail(
                handler,
                Violation::with_detail(
                    description::INVALID_ENTITY_NAME,
                    format!("&{}{}", self.buffers.entity, c),
                ),
            )?;
            let target = if in_text {
                &mut self.buffers.text
            } else {
                &mut self.buffers.attrib_value
            };
            target.push('&');
            target.push_str(&self.buffers.entity);
            target.push(c);
            self.buffers.entity.clear();
            self.state = return_state;
        }
        Ok(())
    }

    /// Tag name is complete, starts collecting the attributes.
    fn new_tag<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        let mut name = mem::take(&mut self.buffers.tag_name);
        self.fold_case(&mut name);
        self.buffers.tag_name.push_str(&name);
        let scope = if self.options.xmlns {
            let parent = self.parent_scope();
            self.scopes.release_above(parent);
            Some(parent)
        } else {
            None
        };
        self.attrib_list.clear();
        self.close_text(handler)?;
        self.tag = Some(Tag::new(name, scope));
        if let Some(tag) = &self.tag {
            self.emit(handler, SaxEvent::OpenTagStart(tag))?;
        }
        Ok(())
    }

    /// Attribute name and value are complete.
    fn attrib<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        let mut name = mem::take(&mut self.buffers.attrib_name);
        self.fold_case(&mut name);
        let value = mem::take(&mut self.buffers.attrib_value);
        let Some(tag) = &self.tag else {
            return Ok(());
        };

        if tag.attribute(&name).is_some() || self.attrib_list.iter().any(|(n, _)| *n == name) {
            trace!("ignoring duplicate attribute {name}");
            return Ok(());
        }

        if self.options.xmlns {
            // attribute events are deferred until the tag is complete, so
            // that bindings declared later in the tag apply to all of them
            self.bind_namespace(handler, &name, &value)?;
            self.attrib_list.push((name, value));
            return Ok(());
        }

        let attribute = Attribute {
            name,
            value,
            ns: None,
        };
        self.close_text(handler)?;
        self.emit(handler, SaxEvent::Attribute(&attribute))?;
        if let Some(tag) = &mut self.tag {
            tag.attributes.push(attribute);
        }
        Ok(())
    }

    fn bind_namespace<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        name: &str,
        value: &str,
    ) -> Result<(), SaxError> {
        let (prefix, local) = split_qname(name, true);
        if prefix != "xmlns" {
            return Ok(());
        }
        if local == "xml" && value != XML_NAMESPACE {
            return self.strict_fail(
                handler,
                Violation::with_detail(description::XML_PREFIX_BINDING, value),
            );
        }
        if local == "xmlns" && value != XMLNS_NAMESPACE {
            return self.strict_fail(
                handler,
                Violation::with_detail(description::XMLNS_PREFIX_BINDING, value),
            );
        }
        let parent = self.parent_scope();
        if let Some(tag) = &mut self.tag {
            let scope = match tag.scope {
                Some(scope) if scope != parent => scope,
                _ => {
                    let scope = self.scopes.push(parent);
                    tag.scope = Some(scope);
                    scope
                }
            };
            self.scopes.bind(scope, local, value);
        }
        Ok(())
    }

    /// Start tag is complete.
    fn open_tag<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        self_closing: bool,
    ) -> Result<(), SaxError> {
        let Some(mut tag) = self.tag.take() else {
            return Ok(());
        };

        if self.options.xmlns {
            self.resolve_namespaces(handler, &mut tag)?;
        }

        tag.is_self_closing = self_closing;
        self.saw_root = true;
        self.close_text(handler)?;
        self.emit(handler, SaxEvent::OpenTag(&tag))?;
        trace!("opened <{}> at depth {}", tag.name, self.tags.len());

        let is_script = !self_closing && !self.noscript && is_script_name(&tag.name);
        self.tags.push(tag);
        if !self_closing {
            if is_script {
                self.in_script = true;
                self.state = State::Script;
            } else {
                self.state = State::Text;
            }
            self.buffers.tag_name.clear();
        }
        self.buffers.attrib_name.clear();
        self.buffers.attrib_value.clear();
        self.attrib_list.clear();
        Ok(())
    }

    fn resolve_namespaces<H: SaxHandler + ?Sized>(
        &mut self,
        handler: &mut H,
        tag: &mut Tag,
    ) -> Result<(), SaxError> {
        let scope = tag.scope.unwrap_or(ScopeId::ROOT);
        let (prefix, local) = split_qname(&tag.name, false);
        let mut uri = self
            .scopes
            .lookup(scope, prefix)
            .unwrap_or_default()
            .to_string();
        if !prefix.is_empty() && uri.is_empty() {
            self.strict_fail(
                handler,
                Violation::with_detail(description::UNBOUND_PREFIX, tag.name.as_str()),
            )?;
            uri = prefix.to_string();
        }
        tag.ns = Some(QName {
            prefix: prefix.to_string(),
            local: local.to_string(),
            uri,
        });

        if scope != self.parent_scope() {
            self.close_text(handler)?;
            for (prefix, uri) in self.scopes.own_bindings(scope) {
                self.emit(handler, SaxEvent::OpenNamespace { prefix, uri })?;
            }
        }

        // the default namespace does not apply to attributes
        for (name, value) in mem::take(&mut self.attrib_list) {
            let (prefix, local) = split_qname(&name, true);
            let mut uri = if prefix.is_empty() {
                String::new()
            } else {
                self.scopes
                    .lookup(scope, prefix)
                    .unwrap_or_default()
                    .to_string()
            };
            if !prefix.is_empty() && prefix != "xmlns" && uri.is_empty() {
                self.strict_fail(
                    handler,
                    Violation::with_detail(description::UNBOUND_PREFIX, prefix),
                )?;
                uri = prefix.to_string();
            }
            let ns = QName {
                prefix: prefix.to_string(),
                local: local.to_string(),
                uri,
            };
            let attribute = Attribute {
                name,
                value,
                ns: Some(ns),
            };
            self.close_text(handler)?;
            self.emit(handler, SaxEvent::Attribute(&attribute))?;
            tag.attributes.push(attribute);
        }
        Ok(())
    }

    /// End tag is complete.
    fn close_tag<H: SaxHandler + ?Sized>(&mut self, handler: &mut H) -> Result<(), SaxError> {
        if self.buffers.tag_name.is_empty() {
            self.strict_fail(handler, Violation::new(description::EMPTY_CLOSE_TAG))?;
            self.buffers.text.push_str("</>");
            self.state = State::Text;
            return Ok(());
        }

        if self.in_script {
            if !is_script_name(&self.buffers.tag_name) {
                self.buffers.script.push_str("</");
                self.buffers.script.push_str(&self.buffers.tag_name);
                self.buffers.script.push('>');
                self.buffers.tag_name.clear();
                self.state = State::Script;
                return Ok(());
            }
            if !self.buffers.script.is_empty() {
                self.close_text(handler)?;
                self.emit(handler, SaxEvent::Script(&self.buffers.script))?;
            }
            self.buffers.script.clear();
            self.in_script = false;
        }

        let raw_name = mem::take(&mut self.buffers.tag_name);
        let mut name = raw_name.clone();
        self.fold_case(&mut name);

        // <a><b></c></b></a> would close everything without this check
        let found = self.tags.iter().rposition(|tag| tag.name == name);
        let keep = found.unwrap_or(0);
        let skipped: Vec<String> = self.tags[keep..]
            .iter()
            .skip(usize::from(found.is_some()))
            .map(|tag| tag.name.clone())
            .collect();
        for open in skipped.iter().rev() {
            self.strict_fail(
                handler,
                Violation::with_detail(
                    description::UNEXPECTED_CLOSE_TAG,
                    format!("</{raw_name}> while <{open}> is open"),
                ),
            )?;
        }

        let Some(depth) = found else {
            self.strict_fail(
                handler,
                Violation::with_detail(description::UNMATCHED_CLOSE_TAG, raw_name.as_str()),
            )?;
            self.buffers.text.push_str("</");
            self.buffers.text.push_str(&raw_name);
            self.buffers.text.push('>');
            self.state = State::Text;
            return Ok(());
        };

        while self.tags.len() > depth {
            let Some(tag) = self.tags.pop() else {
                break;
            };
            self.close_text(handler)?;
            self.emit(handler, SaxEvent::CloseTag(&tag.name))?;
            trace!("closed <{}> at depth {}", tag.name, self.tags.len());

            let parent = self.parent_scope();
            if let Some(scope) = tag.scope {
                if self.options.xmlns && scope != parent {
                    for (prefix, uri) in self.scopes.own_bindings(scope) {
                        self.emit(handler, SaxEvent::CloseNamespace { prefix, uri })?;
                    }
                    self.scopes.release_above(parent);
                }
            }
        }
        if depth == 0 {
            self.closed_root = true;
        }
        self.buffers.attrib_name.clear();
        self.buffers.attrib_value.clear();
        self.attrib_list.clear();
        self.state = State::Text;
        Ok(())
    }
}

impl Default for SaxParser {
    fn default() -> Self {
        Self::new(SaxOptions::default())
    }
}

#[cfg(test)]
mod tests;
