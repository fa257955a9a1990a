/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

/// Accumulation buffers of the parser.
#[derive(Default)]
pub(super) struct Buffers {
    pub(super) text: String,
    pub(super) sgml_decl: String,
    pub(super) doctype: String,
    pub(super) proc_inst_name: String,
    pub(super) proc_inst_body: String,
    pub(super) comment: String,
    pub(super) cdata: String,
    pub(super) script: String,
    pub(super) tag_name: String,
    pub(super) attrib_name: String,
    pub(super) attrib_value: String,
    pub(super) entity: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum BufferKind {
    Text,
    SgmlDecl,
    Doctype,
    ProcInstName,
    ProcInstBody,
    Comment,
    CData,
    Script,
    TagName,
    AttribName,
    AttribValue,
    Entity,
}

impl BufferKind {
    const ALL: [BufferKind; 12] = [
        BufferKind::Comment,
        BufferKind::SgmlDecl,
        BufferKind::Text,
        BufferKind::TagName,
        BufferKind::Doctype,
        BufferKind::ProcInstName,
        BufferKind::ProcInstBody,
        BufferKind::Entity,
        BufferKind::AttribName,
        BufferKind::AttribValue,
        BufferKind::CData,
        BufferKind::Script,
    ];

    pub(super) fn name(self) -> &'static str {
        match self {
            BufferKind::Text => "text",
            BufferKind::SgmlDecl => "sgml declaration",
            BufferKind::Doctype => "doctype",
            BufferKind::ProcInstName => "processing instruction name",
            BufferKind::ProcInstBody => "processing instruction body",
            BufferKind::Comment => "comment",
            BufferKind::CData => "cdata",
            BufferKind::Script => "script",
            BufferKind::TagName => "tag name",
            BufferKind::AttribName => "attribute name",
            BufferKind::AttribValue => "attribute value",
            BufferKind::Entity => "entity",
        }
    }
}

impl Buffers {
    pub(super) fn get(&self, kind: BufferKind) -> &String {
        match kind {
            BufferKind::Text => &self.text,
            BufferKind::SgmlDecl => &self.sgml_decl,
            BufferKind::Doctype => &self.doctype,
            BufferKind::ProcInstName => &self.proc_inst_name,
            BufferKind::ProcInstBody => &self.proc_inst_body,
            BufferKind::Comment => &self.comment,
            BufferKind::CData => &self.cdata,
            BufferKind::Script => &self.script,
            BufferKind::TagName => &self.tag_name,
            BufferKind::AttribName => &self.attrib_name,
            BufferKind::AttribValue => &self.attrib_value,
            BufferKind::Entity => &self.entity,
        }
    }

    /// Buffers longer than `max`, with the length of the longest buffer.
    pub(super) fn over_limit(&self, max: usize) -> (Vec<BufferKind>, usize) {
        let mut longest = 0;
        let mut over = Vec::new();
        for kind in BufferKind::ALL {
            let len = self.get(kind).len();
            if len > max {
                over.push(kind);
            }
            longest = longest.max(len);
        }
        (over, longest)
    }

    pub(super) fn clear(&mut self) {
        self.text.clear();
        self.sgml_decl.clear();
        self.doctype.clear();
        self.proc_inst_name.clear();
        self.proc_inst_body.clear();
        self.comment.clear();
        self.cdata.clear();
        self.script.clear();
        self.tag_name.clear();
        self.attrib_name.clear();
        self.attrib_value.clear();
        self.entity.clear();
    }
}

const MIN_BUFFER_LENGTH: usize = 10;

/// Decides when the buffers need to be checked against the limit.
///
/// After a check, the next one is scheduled for the earliest position at
/// which any buffer could grow over the limit, so checks are as rare as
/// possible. Buffers are only checked once per write, a very large chunk
/// may thus grow a buffer past the limit before it is noticed.
pub(super) struct BufferGuard {
    max: Option<usize>,
    check_position: usize,
}

impl BufferGuard {
    pub(super) fn new(max: Option<usize>) -> Self {
        let max = max.map(|m| m.max(MIN_BUFFER_LENGTH));
        BufferGuard {
            max,
            check_position: max.unwrap_or(usize::MAX),
        }
    }

    pub(super) fn reset(&mut self) {
        self.check_position = self.max.unwrap_or(usize::MAX);
    }

    /// The limit, if a check is due at this position.
    pub(super) fn due(&self, position: usize) -> Option<usize> {
        self.max.filter(|_| position >= self.check_position)
    }

    pub(super) fn reschedule(&mut self, position: usize, longest: usize) {
        if let Some(max) = self.max {
            self.check_position = position + max.saturating_sub(longest);
        }
    }
}
