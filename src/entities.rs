/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Entity references: the predefined XML entities, the HTML entity set used
//! by lenient parsing, numeric character references, and output escaping.

use std::borrow::Cow;
use std::fmt;

pub mod predefined {
    pub const LT: &str = "&lt;";
    pub const GT: &str = "&gt;";
    pub const AMP: &str = "&amp;";
    pub const APOS: &str = "&apos;";
    pub const QUOT: &str = "&quot;";
}

/// Which named entities are recognized.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EntityTable {
    /// Only `amp`, `lt`, `gt`, `quot` and `apos`.
    Xml,
    /// The HTML 4 entity set.
    Html,
}

/// Replacement text of a successfully decoded reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Decoded {
    Named(&'static str),
    Char(char),
}

impl Decoded {
    pub(crate) fn push_to(self, buffer: &mut String) {
        match self {
            Decoded::Named(s) => buffer.push_str(s),
            Decoded::Char(c) => buffer.push(c),
        }
    }
}

fn xml_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "gt" => Some(">"),
        "lt" => Some("<"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        _ => None,
    }
}

fn html_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "gt" => ">",
        "lt" => "<",
        "quot" => "\"",
        "apos" => "'",
        "AElig" => "Æ",
        "Aacute" => "Á",
        "Acirc" => "Â",
        "Agrave" => "À",
        "Aring" => "Å",
        "Atilde" => "Ã",
        "Auml" => "Ä",
        "Ccedil" => "Ç",
        "ETH" => "Ð",
        "Eacute" => "É",
        "Ecirc" => "Ê",
        "Egrave" => "È",
        "Euml" => "Ë",
        "Iacute" => "Í",
        "Icirc" => "Î",
        "Igrave" => "Ì",
        "Iuml" => "Ï",
        "Ntilde" => "Ñ",
        "Oacute" => "Ó",
        "Ocirc" => "Ô",
        "Ograve" => "Ò",
        "Oslash" => "Ø",
        "Otilde" => "Õ",
        "Ouml" => "Ö",
        "THORN" => "Þ",
        "Uacute" => "Ú",
        "Ucirc" => "Û",
        "Ugrave" => "Ù",
        "Uuml" => "Ü",
        "Yacute" => "Ý",
        "aacute" => "á",
        "acirc" => "â",
        "aelig" => "æ",
        "agrave" => "à",
        "aring" => "å",
        "atilde" => "ã",
        "auml" => "ä",
        "ccedil" => "ç",
        "eacute" => "é",
        "ecirc" => "ê",
        "egrave" => "è",
        "eth" => "ð",
        "euml" => "ë",
        "iacute" => "í",
        "icirc" => "î",
        "igrave" => "ì",
        "iuml" => "ï",
        "ntilde" => "ñ",
        "oacute" => "ó",
        "ocirc" => "ô",
        "ograve" => "ò",
        "oslash" => "ø",
        "otilde" => "õ",
        "ouml" => "ö",
        "szlig" => "ß",
        "thorn" => "þ",
        "uacute" => "ú",
        "ucirc" => "û",
        "ugrave" => "ù",
        "uuml" => "ü",
        "yacute" => "ý",
        "yuml" => "ÿ",
        "copy" => "©",
        "reg" => "®",
        "nbsp" => "\u{a0}",
        "iexcl" => "¡",
        "cent" => "¢",
        "pound" => "£",
        "curren" => "¤",
        "yen" => "¥",
        "brvbar" => "¦",
        "sect" => "§",
        "uml" => "¨",
        "ordf" => "ª",
        "laquo" => "«",
        "not" => "¬",
        "shy" => "\u{ad}",
        "macr" => "¯",
        "deg" => "°",
        "plusmn" => "±",
        "sup1" => "¹",
        "sup2" => "²",
        "sup3" => "³",
        "acute" => "´",
        "micro" => "µ",
        "para" => "¶",
        "middot" => "·",
        "cedil" => "¸",
        "ordm" => "º",
        "raquo" => "»",
        "frac14" => "¼",
        "frac12" => "½",
        "frac34" => "¾",
        "iquest" => "¿",
        "times" => "×",
        "divide" => "÷",
        "OElig" => "Œ",
        "oelig" => "œ",
        "Scaron" => "Š",
        "scaron" => "š",
        "Yuml" => "Ÿ",
        "fnof" => "ƒ",
        "circ" => "ˆ",
        "tilde" => "˜",
        "Alpha" => "Α",
        "Beta" => "Β",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Epsilon" => "Ε",
        "Zeta" => "Ζ",
        "Eta" => "Η",
        "Theta" => "Θ",
        "Iota" => "Ι",
        "Kappa" => "Κ",
        "Lambda" => "Λ",
        "Mu" => "Μ",
        "Nu" => "Ν",
        "Xi" => "Ξ",
        "Omicron" => "Ο",
        "Pi" => "Π",
        "Rho" => "Ρ",
        "Sigma" => "Σ",
        "Tau" => "Τ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Chi" => "Χ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "omicron" => "ο",
        "pi" => "π",
        "rho" => "ρ",
        "sigmaf" => "ς",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "thetasym" => "ϑ",
        "upsih" => "ϒ",
        "piv" => "ϖ",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwnj" => "\u{200c}",
        "zwj" => "\u{200d}",
        "lrm" => "\u{200e}",
        "rlm" => "\u{200f}",
        "ndash" => "–",
        "mdash" => "—",
        "lsquo" => "‘",
        "rsquo" => "’",
        "sbquo" => "‚",
        "ldquo" => "“",
        "rdquo" => "”",
        "bdquo" => "„",
        "dagger" => "†",
        "Dagger" => "‡",
        "bull" => "•",
        "hellip" => "…",
        "permil" => "‰",
        "prime" => "′",
        "Prime" => "″",
        "lsaquo" => "‹",
        "rsaquo" => "›",
        "oline" => "‾",
        "frasl" => "⁄",
        "euro" => "€",
        "image" => "ℑ",
        "weierp" => "℘",
        "real" => "ℜ",
        "trade" => "™",
        "alefsym" => "ℵ",
        "larr" => "←",
        "uarr" => "↑",
        "rarr" => "→",
        "darr" => "↓",
        "harr" => "↔",
        "crarr" => "↵",
        "lArr" => "⇐",
        "uArr" => "⇑",
        "rArr" => "⇒",
        "dArr" => "⇓",
        "hArr" => "⇔",
        "forall" => "∀",
        "part" => "∂",
        "exist" => "∃",
        "empty" => "∅",
        "nabla" => "∇",
        "isin" => "∈",
        "notin" => "∉",
        "ni" => "∋",
        "prod" => "∏",
        "sum" => "∑",
        "minus" => "−",
        "lowast" => "∗",
        "radic" => "√",
        "prop" => "∝",
        "infin" => "∞",
        "ang" => "∠",
        "and" => "∧",
        "or" => "∨",
        "cap" => "∩",
        "cup" => "∪",
        "int" => "∫",
        "there4" => "∴",
        "sim" => "∼",
        "cong" => "≅",
        "asymp" => "≈",
        "ne" => "≠",
        "equiv" => "≡",
        "le" => "≤",
        "ge" => "≥",
        "sub" => "⊂",
        "sup" => "⊃",
        "nsub" => "⊄",
        "sube" => "⊆",
        "supe" => "⊇",
        "oplus" => "⊕",
        "otimes" => "⊗",
        "perp" => "⊥",
        "sdot" => "⋅",
        "lceil" => "⌈",
        "rceil" => "⌉",
        "lfloor" => "⌊",
        "rfloor" => "⌋",
        "lang" => "〈",
        "rang" => "〉",
        "loz" => "◊",
        "spades" => "♠",
        "clubs" => "♣",
        "hearts" => "♥",
        "diams" => "♦",
        _ => return None,
    };
    Some(s)
}

impl EntityTable {
    fn lookup(self, name: &str) -> Option<&'static str> {
        match self {
            EntityTable::Xml => xml_entity(name),
            EntityTable::Html => html_entity(name),
        }
    }
}

/// Decodes the name between `&` and `;`.
///
/// Named entities are looked up as written first, then in lower case.
/// Numeric references must spell their value canonically apart from
/// leading zeros, so `&#65;` and `&#x0041;` are accepted while `&#6x;`
/// or `&#0;` are not. Returns `None` for anything that does not decode.
pub(crate) fn decode(table: EntityTable, name: &str) -> Option<Decoded> {
    if let Some(s) = table.lookup(name) {
        return Some(Decoded::Named(s));
    }
    let lower = name.to_lowercase();
    if let Some(s) = table.lookup(&lower) {
        return Some(Decoded::Named(s));
    }
    let number = lower.strip_prefix('#')?;
    let (digits, radix) = match number.strip_prefix('x') {
        Some(hex) => (hex, 16),
        None => (number, 10),
    };
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(value).map(Decoded::Char)
}

/// Returns the length of the string after escaping.
///
/// Useful for reserving the output buffer before calling [escape_into].
pub fn escaped_size(s: &str) -> usize {
    let mut size = 0;
    for c in s.chars() {
        match c {
            '<' => size += predefined::LT.len(),
            '>' => size += predefined::GT.len(),
            '&' => size += predefined::AMP.len(),
            '\'' => size += predefined::APOS.len(),
            '"' => size += predefined::QUOT.len(),
            _ => size += c.len_utf8(),
        }
    }

    size
}

fn replacement(c: char) -> Option<&'static str> {
    match c {
        '<' => Some(predefined::LT),
        '>' => Some(predefined::GT),
        '&' => Some(predefined::AMP),
        '\'' => Some(predefined::APOS),
        '"' => Some(predefined::QUOT),
        _ => None,
    }
}

/// Appends the escaped form of `s` to `out`.
pub fn escape_into(s: &str, out: &mut String) {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        if let Some(rep) = replacement(c) {
            out.push_str(&s[back..pos]);
            out.push_str(rep);
            back = pos + 1;
        }
    }
    out.push_str(&s[back..]);
}

/// Escapes the five predefined XML characters.
///
/// Borrows the input when nothing needs escaping.
///
/// ```
/// assert_eq!(saxite::escape("a<b"), "a&lt;b");
/// assert_eq!(saxite::escape("plain"), "plain");
/// ```
pub fn escape(s: &str) -> Cow<'_, str> {
    let size = escaped_size(s);
    if size == s.len() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(size);
    escape_into(s, &mut out);
    Cow::Owned(out)
}

/// Writes the escaped form of `s` into a formatter.
pub fn escape_fmt(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut back = 0;
    for (pos, c) in s.char_indices() {
        if let Some(rep) = replacement(c) {
            f.write_str(&s[back..pos])?;
            f.write_str(rep)?;
            back = pos + 1;
        }
    }
    f.write_str(&s[back..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(table: EntityTable, name: &str) -> Option<String> {
        decode(table, name).map(|d| {
            let mut s = String::new();
            d.push_to(&mut s);
            s
        })
    }

    #[test]
    fn predefined_entities() {
        for table in [EntityTable::Xml, EntityTable::Html] {
            assert_eq!(text(table, "amp").as_deref(), Some("&"));
            assert_eq!(text(table, "lt").as_deref(), Some("<"));
            assert_eq!(text(table, "gt").as_deref(), Some(">"));
            assert_eq!(text(table, "quot").as_deref(), Some("\""));
            assert_eq!(text(table, "apos").as_deref(), Some("'"));
            assert_eq!(text(table, "AMP").as_deref(), Some("&"));
        }
    }

    #[test]
    fn html_entities() {
        assert_eq!(text(EntityTable::Html, "copy").as_deref(), Some("©"));
        assert_eq!(text(EntityTable::Html, "nbsp").as_deref(), Some("\u{a0}"));
        assert_eq!(text(EntityTable::Html, "Omega").as_deref(), Some("Ω"));
        assert_eq!(text(EntityTable::Html, "omega").as_deref(), Some("ω"));
        // falls back to lower case when the exact spelling is unknown
        assert_eq!(text(EntityTable::Html, "EURO").as_deref(), Some("€"));
        assert_eq!(text(EntityTable::Xml, "copy"), None);
        assert_eq!(text(EntityTable::Html, "lala"), None);
    }

    #[test]
    fn numeric_references() {
        let t = EntityTable::Xml;
        assert_eq!(text(t, "#65").as_deref(), Some("A"));
        assert_eq!(text(t, "#x41").as_deref(), Some("A"));
        assert_eq!(text(t, "#X41").as_deref(), Some("A"));
        assert_eq!(text(t, "#x3b").as_deref(), Some(";"));
        assert_eq!(text(t, "#x3B").as_deref(), Some(";"));
        assert_eq!(text(t, "#0065").as_deref(), Some("A"));
        assert_eq!(text(t, "#x10abc").as_deref(), Some("\u{10abc}"));
        assert_eq!(text(t, "#128512").as_deref(), Some("😀"));
    }

    #[test]
    fn bad_numeric_references() {
        let t = EntityTable::Xml;
        for name in [
            "#", "#x", "#0", "#x0", "#1a", "#xg1", "#-5", "#+5", "#xD800", "#x110000",
            "#99999999999",
        ] {
            assert_eq!(decode(t, name), None, "{name}");
        }
    }

    #[test]
    fn escape_size() {
        const NOESCAPE: &str = "abc$#@!%^*(){}[]=-+/.,;:FDSF3443";
        assert_eq!(escaped_size(NOESCAPE), NOESCAPE.len());
        assert_eq!(escaped_size("abc&def"), "abc&amp;def".len());
        assert_eq!(escaped_size("<>&'\""), "&lt;&gt;&amp;&apos;&quot;".len());
        assert_eq!(escaped_size("ğ<"), "ğ&lt;".len());
    }

    #[test]
    fn escaping() {
        assert!(matches!(escape("no markup"), Cow::Borrowed(_)));
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
        assert_eq!(escape("çğ & ü"), "çğ &amp; ü");
        let mut out = String::from(">");
        escape_into("1<2", &mut out);
        assert_eq!(out, ">1&lt;2");
    }
}
