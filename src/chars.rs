/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Character classes used by the parser state machine.

pub(crate) const BYTE_ORDER_MARK: char = '\u{feff}';

macro_rules! whitespace {
    () => {
        ' ' | '\t' | '\r' | '\n'
    };
}
pub(crate) use whitespace;

#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, whitespace!())
}

#[inline]
pub(crate) fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Characters which end an unquoted attribute value.
#[inline]
pub(crate) fn is_attrib_end(c: char) -> bool {
    matches!(c, whitespace!() | '>')
}

/// NameStartChar production of the XML recommendation.
pub(crate) fn is_name_start(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{c0}'..='\u{d6}'
        | '\u{d8}'..='\u{f6}'
        | '\u{f8}'..='\u{2ff}'
        | '\u{370}'..='\u{37d}'
        | '\u{37f}'..='\u{1fff}'
        | '\u{200c}'..='\u{200d}'
        | '\u{2070}'..='\u{218f}'
        | '\u{2c00}'..='\u{2fef}'
        | '\u{3001}'..='\u{d7ff}'
        | '\u{f900}'..='\u{fdcf}'
        | '\u{fdf0}'..='\u{fffd}'
        | '\u{10000}'..='\u{effff}'
    )
}

/// NameChar production of the XML recommendation.
pub(crate) fn is_name_body(c: char) -> bool {
    is_name_start(c)
        || matches!(c,
            '-' | '.' | '0'..='9'
            | '\u{b7}'
            | '\u{300}'..='\u{36f}'
            | '\u{203f}'..='\u{2040}'
        )
}

#[inline]
pub(crate) fn is_entity_start(c: char) -> bool {
    c == '#' || is_name_start(c)
}

#[inline]
pub(crate) fn is_entity_body(c: char) -> bool {
    c == '#' || is_name_body(c)
}
