/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use pretty_assertions::assert_eq;

use super::*;

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    fail_on: Option<EventKind>,
}

impl SaxHandler for Recorder {
    fn handle_event(&mut self, event: &SaxEvent) -> Result<(), SaxError> {
        self.events.push(event.to_string());
        if self.fail_on == Some(event.kind()) {
            return Err(SaxError::HandlerAbort);
        }
        Ok(())
    }
}

struct Tester {
    options: SaxOptions,
}

impl Tester {
    fn strict() -> Tester {
        Tester {
            options: SaxOptions::strict(),
        }
    }

    fn lenient() -> Tester {
        Tester {
            options: SaxOptions::default(),
        }
    }

    fn with(options: SaxOptions) -> Tester {
        Tester { options }
    }

    /// Returns the events without the final end and ready, and the number
    /// of violations recovered from before the end of the document.
    fn run<'a>(&self, chunks: impl Iterator<Item = &'a str>) -> (Vec<String>, usize) {
        let mut parser = SaxParser::new(self.options.clone());
        let mut recorder = Recorder::default();
        for chunk in chunks {
            assert_eq!(parser.write(&mut recorder, chunk), Ok(()));
        }
        let nr_violations = parser.violation_count();
        assert_eq!(parser.close(&mut recorder), Ok(()));
        let end = recorder.events.split_off(recorder.events.len() - 2);
        assert_eq!(end, ["end", "ready"]);
        (recorder.events, nr_violations)
    }

    /// Checks the events, returns the number of recovered violations.
    fn check(&self, s: &str, expected: &[&str]) -> usize {
        let (events, nr_violations) = self.run(std::iter::once(s));
        assert_eq!(events, expected);

        // now try char by char
        let mut buf = [0; 4];
        let chars: Vec<String> = s.chars().map(|c| c.encode_utf8(&mut buf).to_string()).collect();
        let (events, nr_chars_violations) = self.run(chars.iter().map(String::as_str));
        assert_eq!(events, expected);
        assert_eq!(nr_chars_violations, nr_violations);

        nr_violations
    }

    /// Parses until the first fatal error.
    ///
    /// Errors at the end of the document still end it, the end and ready
    /// events are removed from the returned events.
    fn check_error(&self, s: &str) -> (SaxError, Vec<String>) {
        let mut parser = SaxParser::new(self.options.clone());
        let mut recorder = Recorder::default();
        if let Err(err) = parser.write(&mut recorder, s) {
            assert_eq!(parser.error(), Some(&err));
            // error is sticky until resumed
            assert_eq!(parser.write(&mut recorder, "<x/>"), Err(err.clone()));
            return (err, recorder.events);
        }
        let err = parser.close(&mut recorder).unwrap_err();
        assert_eq!(parser.error(), None);
        assert_eq!(parser.depth(), 0);
        let end = recorder.events.split_off(recorder.events.len() - 2);
        assert_eq!(end, ["end", "ready"]);
        (err, recorder.events)
    }
}

fn description_of(err: &SaxError) -> &'static str {
    err.violation().map(|v| v.description).unwrap_or_default()
}

#[test]
fn tags() {
    Tester::strict().check(
        "<root a=\"1\">hi<child/></root>",
        &[
            "opentagstart root",
            r#"attribute a="1""#,
            "opentag root",
            r#"text "hi""#,
            "opentagstart child",
            "opentag child /",
            "closetag child",
            "closetag root",
        ],
    );

    Tester::strict().check(
        "  <lonely/>  \n",
        &[
            "opentagstart lonely",
            "opentag lonely /",
            "closetag lonely",
            r#"text "  \n""#,
        ],
    );

    Tester::strict().check(
        "<a b='x' c = \"y\" ><d\te='1'\n/></a>",
        &[
            "opentagstart a",
            r#"attribute b="x""#,
            r#"attribute c="y""#,
            "opentag a",
            "opentagstart d",
            r#"attribute e="1""#,
            "opentag d /",
            "closetag d",
            "closetag a",
        ],
    );

    Tester::strict().check(
        "\u{feff}<𝒜 ğ=\"ü\">ç</𝒜>",
        &[
            "opentagstart 𝒜",
            r#"attribute ğ="ü""#,
            "opentag 𝒜",
            r#"text "ç""#,
            "closetag 𝒜",
        ],
    );
}

#[test]
fn text_is_reported_once() {
    Tester::strict().check(
        "<a>one two\nthree<b/>four</a>",
        &[
            "opentagstart a",
            "opentag a",
            r#"text "one two\nthree""#,
            "opentagstart b",
            "opentag b /",
            "closetag b",
            r#"text "four""#,
            "closetag a",
        ],
    );
}

#[test]
fn lenient_name_folding() {
    let nr_violations = Tester::lenient().check(
        "<Div Class=x>t</div>",
        &[
            "opentagstart DIV",
            r#"attribute CLASS="x""#,
            "opentag DIV",
            r#"text "t""#,
            "closetag DIV",
        ],
    );
    assert_eq!(nr_violations, 1);

    Tester::with(SaxOptions::default().with_lowercase(true)).check(
        "<Div Class='x'>t</DIV>",
        &[
            "opentagstart div",
            r#"attribute class="x""#,
            "opentag div",
            r#"text "t""#,
            "closetag div",
        ],
    );

    // strict mode keeps the names and is case sensitive
    let (err, _) = Tester::strict().check_error("<Div></div>");
    assert_eq!(description_of(&err), description::UNEXPECTED_CLOSE_TAG);
}

#[test]
fn entities() {
    Tester::strict().check(
        "<a t=\"&lt;&#65;&#x42;&#x0043;\">&amp;&quot;&apos;&gt;&copy;&AMP;</a>",
        &[
            "opentagstart a",
            r#"attribute t="<ABC""#,
            "opentag a",
            r#"text "&\"'>©&""#,
            "closetag a",
        ],
    );

    Tester::strict().check(
        "<a>&#128512;&#x1F600;</a>",
        &["opentagstart a", "opentag a", r#"text "😀😀""#, "closetag a"],
    );

    let nr_violations = Tester::lenient().check(
        "<a x=y&amp;z>&bogus; &#xD800; & b</a>",
        &[
            "opentagstart A",
            r#"attribute X="y&z""#,
            "opentag A",
            r#"text "&bogus; &#xD800; & b""#,
            "closetag A",
        ],
    );
    // unquoted value, two unknown references, and the bare ampersand
    assert_eq!(nr_violations, 4);
}

#[test]
fn strict_entities() {
    let tester = Tester::with(SaxOptions::strict().with_strict_entities(true));
    tester.check(
        "<a>&lt;&#32;</a>",
        &["opentagstart a", "opentag a", r#"text "< ""#, "closetag a"],
    );

    let (err, events) = tester.check_error("<a>&copy;</a>");
    assert!(matches!(err, SaxError::BadEntity(_)));
    assert_eq!(
        err.violation().and_then(|v| v.detail.as_deref()),
        Some("&copy;")
    );
    assert_eq!(events.len(), 3);
    assert!(events[2].starts_with("error invalid entity reference"));
}

#[test]
fn declarations() {
    Tester::strict().check(
        "<?xml version=\"1.0\"?><!DOCTYPE html><!-- c --><r><![CDATA[ x]]y <z> ]]></r>",
        &[
            r#"processinginstruction xml "version=\"1.0\"""#,
            r#"doctype " html""#,
            r#"comment " c ""#,
            "opentagstart r",
            "opentag r",
            "opencdata",
            r#"cdata " x]]y <z> ""#,
            "closecdata",
            "closetag r",
        ],
    );

    Tester::strict().check(
        "<!DOCTYPE r [<!ENTITY e \"]\">]><!ELEMENT a \"b>c\"><!-x><r><![CDATA[]]></r>",
        &[
            r#"doctype " r [<!ENTITY e \"]\">]""#,
            r#"sgmldeclaration "ELEMENT a \"b>c\"""#,
            r#"sgmldeclaration "-x""#,
            "opentagstart r",
            "opentag r",
            "opencdata",
            "closecdata",
            "closetag r",
        ],
    );

    Tester::strict().check(
        "<r><?pi   body ? here??></r>",
        &[
            "opentagstart r",
            "opentag r",
            r#"processinginstruction pi "body ? here?""#,
            "closetag r",
        ],
    );

    let (err, _) = Tester::strict().check_error("<a><!DOCTYPE a></a>");
    assert_eq!(description_of(&err), description::MISPLACED_DOCTYPE);
}

#[test]
fn comments() {
    let nr_violations = Tester::lenient().check(
        "<a><!-- blah -- bloo --></a>",
        &[
            "opentagstart A",
            "opentag A",
            r#"comment " blah ""#,
            r#"comment "-- bloo ""#,
            "closetag A",
        ],
    );
    assert_eq!(nr_violations, 1);

    Tester::with(SaxOptions::strict().with_trim(true)).check(
        "<a><!--   --><!--  hi  --></a>",
        &["opentagstart a", "opentag a", r#"comment "hi""#, "closetag a"],
    );

    let (err, _) = Tester::strict().check_error("<a><!-- x -- y --></a>");
    assert_eq!(description_of(&err), description::MALFORMED_COMMENT);
}

#[test]
fn text_options() {
    Tester::with(SaxOptions::default().with_trim(true).with_normalize(true)).check(
        "<a>  hello \n\t world  <b/>   </a>",
        &[
            "opentagstart A",
            "opentag A",
            r#"text "hello world""#,
            "opentagstart B",
            "opentag B /",
            "closetag B",
            "closetag A",
        ],
    );

    Tester::with(SaxOptions::strict().with_normalize(true)).check(
        "<a>  x  </a>",
        &["opentagstart a", "opentag a", r#"text " x ""#, "closetag a"],
    );
}

#[test]
fn outside_root() {
    let nr_violations = Tester::lenient().check(
        "<a/>x<b>",
        &["opentagstart A", "opentag A /", "closetag A", r#"text "x<b>""#],
    );
    assert_eq!(nr_violations, 4);

    let nr_violations = Tester::lenient().check(
        "hi <a/>",
        &[r#"text "hi ""#, "opentagstart A", "opentag A /", "closetag A"],
    );
    assert_eq!(nr_violations, 2);

    let (err, _) = Tester::strict().check_error("x<a/>");
    assert_eq!(description_of(&err), description::NON_WHITESPACE_BEFORE_ROOT);

    let (err, _) = Tester::strict().check_error("<a/>x");
    assert_eq!(description_of(&err), description::TEXT_OUTSIDE_ROOT);

    Tester::strict().check(
        "<a/>\n \n",
        &[
            "opentagstart a",
            "opentag a /",
            "closetag a",
            r#"text "\n \n""#,
        ],
    );
}

#[test]
fn lenient_recovery() {
    let nr_violations = Tester::lenient().check(
        "<a>1 < 2</a>",
        &["opentagstart A", "opentag A", r#"text "1 < 2""#, "closetag A"],
    );
    assert_eq!(nr_violations, 1);

    let nr_violations = Tester::lenient().check(
        "<a><b></a>",
        &[
            "opentagstart A",
            "opentag A",
            "opentagstart B",
            "opentag B",
            "closetag B",
            "closetag A",
        ],
    );
    assert_eq!(nr_violations, 1);

    let nr_violations = Tester::lenient().check(
        "<a></b></></a>",
        &["opentagstart A", "opentag A", r#"text "</b></>""#, "closetag A"],
    );
    // unexpected and unmatched close tag, then the empty one
    assert_eq!(nr_violations, 3);

    let nr_violations = Tester::lenient().check(
        "<input disabled><a b c=\"1\"d='2'></a>",
        &[
            "opentagstart INPUT",
            r#"attribute DISABLED="disabled""#,
            "opentag INPUT",
            "opentagstart A",
            r#"attribute B="""#,
            r#"attribute C="1""#,
            r#"attribute D="2""#,
            "opentag A",
            "closetag A",
        ],
    );
    // two attributes without value and the missing whitespace
    assert_eq!(nr_violations, 3);
}

#[test]
fn duplicate_attributes() {
    Tester::strict().check(
        "<a x=\"1\" y='2' x=\"3\"/>",
        &[
            "opentagstart a",
            r#"attribute x="1""#,
            r#"attribute y="2""#,
            "opentag a /",
            "closetag a",
        ],
    );
}

#[test]
fn scripts() {
    Tester::lenient().check(
        "<script>if (a < b) {}</b></ x></script >",
        &[
            "opentagstart SCRIPT",
            "opentag SCRIPT",
            r#"script "if (a < b) {}</b></ x>""#,
            "closetag SCRIPT",
        ],
    );

    Tester::lenient().check(
        "<html><script></script></html>",
        &[
            "opentagstart HTML",
            "opentag HTML",
            "opentagstart SCRIPT",
            "opentag SCRIPT",
            "closetag SCRIPT",
            "closetag HTML",
        ],
    );

    Tester::strict().check(
        "<script>a &amp; b</script>",
        &[
            "opentagstart script",
            "opentag script",
            r#"text "a & b""#,
            "closetag script",
        ],
    );

    Tester::with(SaxOptions::default().with_noscript(true)).check(
        "<script>a</script>",
        &[
            "opentagstart SCRIPT",
            "opentag SCRIPT",
            r#"text "a""#,
            "closetag SCRIPT",
        ],
    );
}

#[test]
fn namespaces() {
    Tester::with(SaxOptions::strict().with_xmlns(true)).check(
        "<root xmlns=\"urn:d\" xmlns:p=\"urn:p\"><p:a p:x=\"1\" y=\"2\"/><b/></root>",
        &[
            "opentagstart root",
            r#"opennamespace ="urn:d""#,
            r#"opennamespace p="urn:p""#,
            r#"attribute xmlns="urn:d" {http://www.w3.org/2000/xmlns/}"#,
            r#"attribute xmlns:p="urn:p" {http://www.w3.org/2000/xmlns/}"#,
            "opentag root {urn:d}",
            "opentagstart p:a",
            r#"attribute p:x="1" {urn:p}"#,
            r#"attribute y="2" {}"#,
            "opentag p:a {urn:p} /",
            "closetag p:a",
            "opentagstart b",
            "opentag b {urn:d} /",
            "closetag b",
            "closetag root",
            r#"closenamespace ="urn:d""#,
            r#"closenamespace p="urn:p""#,
        ],
    );

    // bindings declared after a prefixed attribute still apply to it
    Tester::with(SaxOptions::strict().with_xmlns(true)).check(
        "<a q:x='1' xmlns:q='urn:q'><b xmlns:q='urn:r'/><q:c/></a>",
        &[
            "opentagstart a",
            r#"opennamespace q="urn:q""#,
            r#"attribute q:x="1" {urn:q}"#,
            r#"attribute xmlns:q="urn:q" {http://www.w3.org/2000/xmlns/}"#,
            "opentag a {}",
            "opentagstart b",
            r#"opennamespace q="urn:r""#,
            r#"attribute xmlns:q="urn:r" {http://www.w3.org/2000/xmlns/}"#,
            "opentag b {} /",
            "closetag b",
            r#"closenamespace q="urn:r""#,
            "opentagstart q:c",
            "opentag q:c {urn:q} /",
            "closetag q:c",
            "closetag a",
            r#"closenamespace q="urn:q""#,
        ],
    );

    Tester::with(SaxOptions::strict().with_xmlns(true)).check(
        "<xml:a xml:lang='tr'/>",
        &[
            "opentagstart xml:a",
            r#"attribute xml:lang="tr" {http://www.w3.org/XML/1998/namespace}"#,
            "opentag xml:a {http://www.w3.org/XML/1998/namespace} /",
            "closetag xml:a",
        ],
    );
}

#[test]
fn namespace_errors() {
    let tester = Tester::with(SaxOptions::strict().with_xmlns(true));

    let (err, _) = tester.check_error("<x:a/>");
    assert_eq!(description_of(&err), description::UNBOUND_PREFIX);

    let (err, _) = tester.check_error("<a y:b='1'/>");
    assert_eq!(description_of(&err), description::UNBOUND_PREFIX);

    let (err, _) = tester.check_error("<a xmlns:xml='urn:bad'/>");
    assert_eq!(description_of(&err), description::XML_PREFIX_BINDING);

    let (err, _) = tester.check_error("<a xmlns:xmlns='urn:bad'/>");
    assert_eq!(description_of(&err), description::XMLNS_PREFIX_BINDING);

    let nr_violations = Tester::with(
        SaxOptions::default()
            .with_xmlns(true)
            .with_lowercase(true),
    )
    .check(
        "<x:a/>",
        &["opentagstart x:a", "opentag x:a {x} /", "closetag x:a"],
    );
    assert_eq!(nr_violations, 1);
}

#[test]
fn error_location() {
    let (err, events) = Tester::strict().check_error("<a>\n<b></a>");
    assert_eq!(
        err,
        SaxError::BadXml(Violation {
            description: description::UNEXPECTED_CLOSE_TAG,
            detail: Some("</a> while <b> is open".to_string()),
            location: Some(Location {
                position: 11,
                line: 1,
                column: 7,
            }),
        })
    );
    assert_eq!(
        events,
        [
            "opentagstart a",
            "opentag a",
            r#"text "\n""#,
            "opentagstart b",
            "opentag b",
            "error invalid xml syntax: Unexpected close tag: </a> while <b> is open (line 1, column 7, position 11)",
        ]
    );

    let (err, _) = Tester::with(SaxOptions::strict().with_position(false)).check_error("<a>\n<b></a>");
    assert_eq!(err.violation().and_then(|v| v.location), None);
}

#[test]
fn single_error_event() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder::default();
    let err = parser.write(&mut recorder, "<a>hi<<b></c>").unwrap_err();
    assert_eq!(description_of(&err), description::UNENCODED_LT);
    assert_eq!(
        recorder.events,
        [
            "opentagstart a",
            "opentag a",
            r#"text "hi""#,
            "error invalid xml syntax: Unencoded < (line 0, column 7, position 7)",
        ]
    );
}

#[test]
fn resume() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder::default();
    assert!(parser.write(&mut recorder, "<a><b></a>").is_err());
    parser.resume();
    assert_eq!(parser.error(), None);
    // the mismatched close tag still closed the root
    assert_eq!(parser.depth(), 0);
    recorder.events.clear();
    assert_eq!(parser.close(&mut recorder), Ok(()));
    assert_eq!(recorder.events, ["end", "ready"]);
}

#[test]
fn end_of_document() {
    let (err, _) = Tester::strict().check_error("<a>");
    assert_eq!(description_of(&err), description::UNCLOSED_ROOT);

    let (err, _) = Tester::strict().check_error("<a></a><!-- x");
    assert_eq!(description_of(&err), description::UNEXPECTED_END);

    // input ending inside a construct is an error in lenient mode too
    let (err, events) = Tester::lenient().check_error("<a><!-- unterminated");
    assert_eq!(description_of(&err), description::UNEXPECTED_END);
    assert_eq!(events.len(), 3);
    assert!(events[2].starts_with("error invalid xml syntax: Unexpected end"));

    let mut parser = SaxParser::default();
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<a>x"), Ok(()));
    assert_eq!(parser.violation_count(), 0);
    assert_eq!(parser.end(&mut recorder), Ok(()));
    assert_eq!(
        recorder.events,
        ["opentagstart A", "opentag A", r#"text "x""#, "end", "ready"]
    );

    // parser is reusable after the end
    recorder.events.clear();
    assert_eq!(parser.write(&mut recorder, "<c/>"), Ok(()));
    assert_eq!(parser.write(&mut recorder, None::<&str>), Ok(()));
    assert_eq!(
        recorder.events,
        ["opentagstart C", "opentag C /", "closetag C", "end", "ready"]
    );
}

#[test]
fn broken_document_is_ended() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<a>hi"), Ok(()));
    let err = parser.close(&mut recorder).unwrap_err();
    assert_eq!(description_of(&err), description::UNCLOSED_ROOT);
    assert_eq!(recorder.events.len(), 6);
    assert_eq!(recorder.events[2], r#"text "hi""#);
    assert!(recorder.events[3].starts_with("error invalid xml syntax: Unclosed root tag"));
    assert_eq!(recorder.events[4..], ["end", "ready"]);

    // nothing is left of the broken document
    recorder.events.clear();
    parser.resume();
    assert_eq!(parser.close(&mut recorder), Ok(()));
    assert_eq!(recorder.events, ["end", "ready"]);

    recorder.events.clear();
    assert_eq!(parser.write(&mut recorder, "<b/>"), Ok(()));
    assert_eq!(parser.close(&mut recorder), Ok(()));
    assert_eq!(
        recorder.events,
        ["opentagstart b", "opentag b /", "closetag b", "end", "ready"]
    );
}

#[test]
fn write_after_close() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder {
        fail_on: Some(EventKind::End),
        ..Recorder::default()
    };
    assert_eq!(parser.write(&mut recorder, "<a/>"), Ok(()));
    assert_eq!(parser.close(&mut recorder), Err(SaxError::HandlerAbort));
    assert!(parser.is_closed());
    assert_eq!(
        parser.write(&mut recorder, "<b/>"),
        Err(SaxError::WriteAfterClose)
    );
    assert_eq!(parser.close(&mut recorder), Err(SaxError::WriteAfterClose));

    parser.reset();
    recorder.fail_on = None;
    assert_eq!(parser.write(&mut recorder, "<b/>"), Ok(()));
}

#[test]
fn handler_abort() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder {
        fail_on: Some(EventKind::OpenTag),
        ..Recorder::default()
    };
    assert_eq!(
        parser.write(&mut recorder, "<a><b/></a>"),
        Err(SaxError::HandlerAbort)
    );
    assert_eq!(recorder.events, ["opentagstart a", "opentag a"]);
    assert_eq!(parser.error(), None);

    // aborting in the middle of a tag name, then starting over
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder {
        fail_on: Some(EventKind::OpenTagStart),
        ..Recorder::default()
    };
    assert_eq!(
        parser.write(&mut recorder, "<a>text"),
        Err(SaxError::HandlerAbort)
    );
    parser.reset();
    recorder.fail_on = None;
    recorder.events.clear();
    assert_eq!(parser.write(&mut recorder, "<b>text</b>"), Ok(()));
    assert_eq!(
        recorder.events,
        ["opentagstart b", "opentag b", r#"text "text""#, "closetag b"]
    );
}

#[test]
fn buffer_limit() {
    let options = SaxOptions::strict().with_max_buffer_length(Some(10));
    let mut parser = SaxParser::new(options.clone());
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<r>"), Ok(()));
    assert_eq!(parser.write(&mut recorder, "0123456789abcdef"), Ok(()));
    // the long text run is sent before its end is seen
    assert_eq!(recorder.events.len(), 3);
    assert_eq!(parser.write(&mut recorder, "ghi</r>"), Ok(()));
    assert_eq!(
        recorder.events,
        [
            "opentagstart r",
            "opentag r",
            r#"text "0123456789abcdef""#,
            r#"text "ghi""#,
            "closetag r",
        ]
    );

    let mut parser = SaxParser::new(options.clone());
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<r><![CDATA[0123456789abcdef"), Ok(()));
    assert_eq!(parser.write(&mut recorder, "]]></r>"), Ok(()));
    assert_eq!(
        recorder.events,
        [
            "opentagstart r",
            "opentag r",
            "opencdata",
            r#"cdata "0123456789abcdef""#,
            "closecdata",
            "closetag r",
        ]
    );

    // lenient mode does not help with the other buffers
    let mut parser = SaxParser::new(SaxOptions::default().with_max_buffer_length(Some(10)));
    let mut recorder = Recorder::default();
    let err = parser
        .write(&mut recorder, "<r a=\"xxxxxxxxxxxxxxxxxxxx")
        .unwrap_err();
    assert!(matches!(err, SaxError::BufferOverflow(_)));
    assert_eq!(
        err.violation().and_then(|v| v.detail.as_deref()),
        Some("attribute value")
    );
}

#[test]
fn flush() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<r>abc"), Ok(()));
    assert_eq!(parser.flush(&mut recorder), Ok(()));
    assert_eq!(parser.write(&mut recorder, "def</r>"), Ok(()));
    assert_eq!(
        recorder.events,
        [
            "opentagstart r",
            "opentag r",
            r#"text "abc""#,
            r#"text "def""#,
            "closetag r",
        ]
    );
}

#[test]
fn location() {
    let mut parser = SaxParser::new(SaxOptions::strict());
    let mut recorder = Recorder::default();
    assert_eq!(parser.write(&mut recorder, "<a>\nğ\nxy"), Ok(()));
    assert_eq!(
        parser.location(),
        Location {
            position: 8,
            line: 2,
            column: 2,
        }
    );
    assert_eq!(parser.depth(), 1);
    assert_eq!(parser.open_tags()[0].name, "a");
}
