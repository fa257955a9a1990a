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

/// A position in the parser input character stream.
///
/// This struct is returned from the
/// [location()](crate::SaxParser::location) method and gives you
/// the position of the last parsed character in the input stream.
/// It is also attached to the violations when position tracking
/// is enabled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Location {
    /// Number of characters consumed.
    pub position: usize,
    /// How many lines have been parsed. Lines are separated by the newline character.
    pub line: usize,
    /// How many characters after the last newline character.
    pub column: usize,
}

impl Location {
    /// Creates a new location at the beginning of the input stream.
    pub fn new() -> Self {
        Location {
            position: 0,
            line: 0,
            column: 0,
        }
    }

    pub(super) fn advance(&mut self, c: char) {
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    /// Advances over a run of characters at once.
    pub(super) fn advance_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        match memchr::memrchr(b'\n', bytes) {
            Some(last) => {
                self.line += memchr::memchr_iter(b'\n', bytes).count();
                self.column = s[last + 1..].chars().count();
            }
            None => self.column += s.chars().count(),
        }
        self.position += s.chars().count();
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {}, position {}",
            self.line, self.column, self.position
        )
    }
}
