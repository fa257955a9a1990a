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
use std::str::FromStr;

use crate::entities::escape_fmt;
use crate::namespace::ScopeId;

use super::SaxError;

/// Namespace information of a tag or attribute name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QName {
    /// Part of the name before the colon, empty when there is none.
    pub prefix: String,
    /// Part of the name after the colon.
    pub local: String,
    /// Namespace URI the prefix resolves to, empty for no namespace.
    pub uri: String,
}

/// A tag attribute.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attribute {
    pub name: String,
    /// Value with all references replaced by the actual characters.
    pub value: String,
    /// Only filled when namespace processing is enabled.
    pub ns: Option<QName>,
}

/// A start tag with its attributes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tag {
    pub name: String,
    /// Attributes in document order.
    ///
    /// Empty in the [OpenTagStart](SaxEvent::OpenTagStart) event, complete
    /// in the [OpenTag](SaxEvent::OpenTag) event.
    pub attributes: Vec<Attribute>,
    /// Only filled when namespace processing is enabled.
    pub ns: Option<QName>,
    /// True for empty element tags such as `<br/>`.
    pub is_self_closing: bool,
    pub(crate) scope: Option<ScopeId>,
}

impl Tag {
    pub(crate) fn new(name: String, scope: Option<ScopeId>) -> Tag {
        Tag {
            name,
            attributes: Vec::new(),
            ns: None,
            is_self_closing: false,
            scope,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Value of the named attribute.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_str())
    }

    /// Namespace URI of the tag, empty if namespace processing is disabled.
    pub fn uri(&self) -> &str {
        self.ns.as_ref().map_or("", |ns| ns.uri.as_str())
    }
}

/// Writes the start tag back as XML, with escaped attribute values.
impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}", self.name)?;
        for attribute in &self.attributes {
            write!(f, " {}=\"", attribute.name)?;
            escape_fmt(&attribute.value, f)?;
            f.write_str("\"")?;
        }
        if self.is_self_closing {
            f.write_str("/>")
        } else {
            f.write_str(">")
        }
    }
}

/// An XML construct reported by the parser.
///
/// Payloads borrow the parser buffers and are only valid during the
/// [handle_event()](super::SaxHandler::handle_event) call. Text, CDATA and
/// script content may arrive in several events if the parser is flushed
/// or the buffer limit is reached in the middle of a long run.
#[derive(Debug, Eq, PartialEq)]
pub enum SaxEvent<'a> {
    /// Parser is ready for a new document.
    Ready,
    /// Character data between tags, with references already decoded.
    Text(&'a str),
    /// A `<?name body?>` construct.
    ProcessingInstruction { name: &'a str, body: &'a str },
    /// A `<!...>` construct which is not a comment, CDATA or doctype.
    SgmlDeclaration(&'a str),
    /// Raw content of the doctype declaration after the `DOCTYPE` keyword.
    Doctype(&'a str),
    Comment(&'a str),
    /// Tag name is parsed, attributes are not yet known.
    OpenTagStart(&'a Tag),
    Attribute(&'a Attribute),
    /// Start tag is complete.
    OpenTag(&'a Tag),
    /// End of an element. Also sent right after an empty element tag.
    CloseTag(&'a str),
    OpenCData,
    CData(&'a str),
    CloseCData,
    /// Raw content of a `<script>` element in lenient mode.
    Script(&'a str),
    OpenNamespace { prefix: &'a str, uri: &'a str },
    CloseNamespace { prefix: &'a str, uri: &'a str },
    /// A fatal error; no further events follow until the parser is resumed.
    Error(&'a SaxError),
    /// Document is finished.
    End,
    /// Raw input chunk, only sent by the [SaxStream](crate::SaxStream).
    Data(&'a str),
}

impl SaxEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            SaxEvent::Ready => EventKind::Ready,
            SaxEvent::Text(_) => EventKind::Text,
            SaxEvent::ProcessingInstruction { .. } => EventKind::ProcessingInstruction,
            SaxEvent::SgmlDeclaration(_) => EventKind::SgmlDeclaration,
            SaxEvent::Doctype(_) => EventKind::Doctype,
            SaxEvent::Comment(_) => EventKind::Comment,
            SaxEvent::OpenTagStart(_) => EventKind::OpenTagStart,
            SaxEvent::Attribute(_) => EventKind::Attribute,
            SaxEvent::OpenTag(_) => EventKind::OpenTag,
            SaxEvent::CloseTag(_) => EventKind::CloseTag,
            SaxEvent::OpenCData => EventKind::OpenCData,
            SaxEvent::CData(_) => EventKind::CData,
            SaxEvent::CloseCData => EventKind::CloseCData,
            SaxEvent::Script(_) => EventKind::Script,
            SaxEvent::OpenNamespace { .. } => EventKind::OpenNamespace,
            SaxEvent::CloseNamespace { .. } => EventKind::CloseNamespace,
            SaxEvent::Error(_) => EventKind::Error,
            SaxEvent::End => EventKind::End,
            SaxEvent::Data(_) => EventKind::Data,
        }
    }
}

impl Display for SaxEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.kind();
        match self {
            SaxEvent::Ready
            | SaxEvent::OpenCData
            | SaxEvent::CloseCData
            | SaxEvent::End => write!(f, "{kind}"),
            SaxEvent::Text(s)
            | SaxEvent::SgmlDeclaration(s)
            | SaxEvent::Doctype(s)
            | SaxEvent::Comment(s)
            | SaxEvent::CData(s)
            | SaxEvent::Script(s)
            | SaxEvent::Data(s) => write!(f, "{kind} {s:?}"),
            SaxEvent::ProcessingInstruction { name, body } => write!(f, "{kind} {name} {body:?}"),
            SaxEvent::OpenTagStart(tag) => write!(f, "{kind} {}", tag.name),
            SaxEvent::OpenTag(tag) => {
                write!(f, "{kind} {}", tag.name)?;
                if let Some(ns) = &tag.ns {
                    write!(f, " {{{}}}", ns.uri)?;
                }
                if tag.is_self_closing {
                    f.write_str(" /")?;
                }
                Ok(())
            }
            SaxEvent::Attribute(attr) => {
                write!(f, "{kind} {}={:?}", attr.name, attr.value)?;
                if let Some(ns) = &attr.ns {
                    write!(f, " {{{}}}", ns.uri)?;
                }
                Ok(())
            }
            SaxEvent::CloseTag(name) => write!(f, "{kind} {name}"),
            SaxEvent::OpenNamespace { prefix, uri } | SaxEvent::CloseNamespace { prefix, uri } => {
                write!(f, "{kind} {prefix}={uri:?}")
            }
            SaxEvent::Error(err) => write!(f, "{kind} {err}"),
        }
    }
}

/// Names of the events, used to subscribe to a [SaxStream](crate::SaxStream).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    Ready,
    Text,
    ProcessingInstruction,
    SgmlDeclaration,
    Doctype,
    Comment,
    OpenTagStart,
    Attribute,
    OpenTag,
    CloseTag,
    OpenCData,
    CData,
    CloseCData,
    Script,
    OpenNamespace,
    CloseNamespace,
    Error,
    End,
    /// Raw input mirrored by the stream adapter.
    Data,
}

impl EventKind {
    pub const ALL: [EventKind; 19] = [
        EventKind::Ready,
        EventKind::Text,
        EventKind::ProcessingInstruction,
        EventKind::SgmlDeclaration,
        EventKind::Doctype,
        EventKind::Comment,
        EventKind::OpenTagStart,
        EventKind::Attribute,
        EventKind::OpenTag,
        EventKind::CloseTag,
        EventKind::OpenCData,
        EventKind::CData,
        EventKind::CloseCData,
        EventKind::Script,
        EventKind::OpenNamespace,
        EventKind::CloseNamespace,
        EventKind::Error,
        EventKind::End,
        EventKind::Data,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::Text => "text",
            EventKind::ProcessingInstruction => "processinginstruction",
            EventKind::SgmlDeclaration => "sgmldeclaration",
            EventKind::Doctype => "doctype",
            EventKind::Comment => "comment",
            EventKind::OpenTagStart => "opentagstart",
            EventKind::Attribute => "attribute",
            EventKind::OpenTag => "opentag",
            EventKind::CloseTag => "closetag",
            EventKind::OpenCData => "opencdata",
            EventKind::CData => "cdata",
            EventKind::CloseCData => "closecdata",
            EventKind::Script => "script",
            EventKind::OpenNamespace => "opennamespace",
            EventKind::CloseNamespace => "closenamespace",
            EventKind::Error => "error",
            EventKind::End => "end",
            EventKind::Data => "data",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unknown event name.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    /// Accepts the event names with or without the `on` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("on").unwrap_or(s);
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownEvent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!("onopentag".parse::<EventKind>(), Ok(EventKind::OpenTag));
        assert_eq!(
            "opentags".parse::<EventKind>(),
            Err(UnknownEvent("opentags".to_string()))
        );
    }

    #[test]
    fn display() {
        let mut tag = Tag::new("x".to_string(), None);
        tag.is_self_closing = true;
        assert_eq!(SaxEvent::OpenTag(&tag).to_string(), "opentag x /");
        assert_eq!(SaxEvent::Text("a\nb").to_string(), "text \"a\\nb\"");
        assert_eq!(
            SaxEvent::ProcessingInstruction {
                name: "xml",
                body: "version=\"1.0\""
            }
            .to_string(),
            "processinginstruction xml \"version=\\\"1.0\\\"\""
        );
        assert_eq!(SaxEvent::CloseCData.to_string(), "closecdata");
    }

    #[test]
    fn tag_as_xml() {
        let mut tag = Tag::new("a".to_string(), None);
        assert_eq!(tag.to_string(), "<a>");
        tag.attributes.push(Attribute {
            name: "href".to_string(),
            value: "x?a=1&b=\"<2>\"".to_string(),
            ns: None,
        });
        tag.is_self_closing = true;
        assert_eq!(
            tag.to_string(),
            "<a href=\"x?a=1&amp;b=&quot;&lt;2&gt;&quot;\"/>"
        );
    }
}
