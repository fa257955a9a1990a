/*
** This file is a part of Saxite (incremental SAX parser for XML and HTML)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Saxite is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::io::Write;
use std::io::stdin;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::LevelFilter;
use log::debug;
use thiserror::Error;

use saxite::EventKind;
use saxite::SaxError;
use saxite::SaxEvent;
use saxite::SaxHandler;
use saxite::SaxOptions;
use saxite::SaxStream;
use saxite::json::JsonBuilder;
use saxite::json::JsonOptions;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Checks the well-formedness of XML documents, or how much a lenient
/// parser has to guess about HTML ones.
#[derive(Parser)]
#[command(name = "saxlint", version, about)]
struct Cli {
    /// Documents to check, standard input is read if none given
    files: Vec<PathBuf>,

    /// Overall statistics
    #[arg(short, long)]
    stat: bool,

    /// Tag counts
    #[arg(short, long)]
    count: bool,

    /// Print every parser event
    #[arg(short, long)]
    events: bool,

    /// Print the document converted to JSON
    #[arg(short, long)]
    json: bool,

    /// File read buffer size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer: usize,

    /// JSON file with the parser options, flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat every violation as an error
    #[arg(long)]
    strict: bool,

    /// Fold names to lower case in lenient mode
    #[arg(long)]
    lowercase: bool,

    /// Resolve namespaces
    #[arg(long)]
    xmlns: bool,

    /// Trim text and comments
    #[arg(long)]
    trim: bool,

    /// Collapse whitespace in text and comments
    #[arg(long)]
    normalize: bool,

    /// Only accept the predefined XML entities
    #[arg(long)]
    strict_entities: bool,

    /// Do not treat script elements specially
    #[arg(long)]
    noscript: bool,

    /// Limit for the parser buffers
    #[arg(long, value_name = "SIZE")]
    max_buffer: Option<usize>,

    /// Show debug logs
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum LintError {
    #[error("{0}")]
    Io(io::Error),

    #[error(transparent)]
    Sax(#[from] SaxError),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<io::Error> for LintError {
    fn from(err: io::Error) -> Self {
        // parser errors come back wrapped from the io::Write interface
        match err.get_ref().and_then(|e| e.downcast_ref::<SaxError>()) {
            Some(sax) => LintError::Sax(sax.clone()),
            None => LintError::Io(err),
        }
    }
}

impl Cli {
    fn options(&self) -> Result<SaxOptions, LintError> {
        let mut options = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => SaxOptions::default(),
        };
        options.strict |= self.strict;
        options.lowercase |= self.lowercase;
        options.xmlns |= self.xmlns;
        options.trim |= self.trim;
        options.normalize |= self.normalize;
        options.strict_entities |= self.strict_entities;
        options.noscript |= self.noscript;
        if self.max_buffer.is_some() {
            options.max_buffer_length = self.max_buffer;
        }
        Ok(options)
    }
}

#[derive(Default)]
struct Report {
    print_events: bool,
    level: usize,
    max_depth: usize,
    nr_tags: usize,
    nr_empty_tags: usize,
    nr_text_size: usize,
    tag_map: BTreeMap<String, usize>,
}

impl Report {
    fn clear(&mut self) {
        self.level = 0;
        self.max_depth = 0;
        self.nr_tags = 0;
        self.nr_empty_tags = 0;
        self.nr_text_size = 0;
        self.tag_map.clear();
    }
}

impl SaxHandler for Report {
    fn handle_event(&mut self, event: &SaxEvent) -> Result<(), SaxError> {
        if self.print_events {
            println!("{event}");
        }
        match event {
            SaxEvent::OpenTag(tag) => {
                if tag.is_self_closing {
                    self.nr_empty_tags += 1;
                } else {
                    self.nr_tags += 1;
                }
                self.level += 1;
                self.max_depth = self.max_depth.max(self.level);
                *self.tag_map.entry(tag.name.clone()).or_insert(0) += 1;
            }
            SaxEvent::CloseTag(_) => {
                self.level = self.level.saturating_sub(1);
            }
            SaxEvent::Text(text) | SaxEvent::CData(text) | SaxEvent::Script(text) => {
                self.nr_text_size += text.len();
            }
            _ => (),
        }
        Ok(())
    }
}

struct Linter {
    stream: SaxStream,
    report: Rc<RefCell<Report>>,
    json: Option<Rc<RefCell<JsonBuilder>>>,
    buffer_size: usize,
    do_stats: bool,
    do_tag_count: bool,
    nr_violations: usize,
}

impl Linter {
    fn new(cli: &Cli, options: SaxOptions) -> Self {
        let mut stream = SaxStream::new(options);

        let report = Rc::new(RefCell::new(Report {
            print_events: cli.events,
            ..Report::default()
        }));
        // errors are not subscribed, so that they stop the parsing
        for kind in EventKind::ALL {
            if kind != EventKind::Error && kind != EventKind::Data {
                let report = report.clone();
                stream.on_event(kind, move |event| report.borrow_mut().handle_event(event));
            }
        }

        let json = cli.json.then(|| {
            let builder = Rc::new(RefCell::new(JsonBuilder::new(JsonOptions::default())));
            for kind in [
                EventKind::OpenTag,
                EventKind::Text,
                EventKind::CData,
                EventKind::CloseTag,
            ] {
                let builder = builder.clone();
                stream.on_event(kind, move |event| builder.borrow_mut().handle_event(event));
            }
            builder
        });

        Linter {
            stream,
            report,
            json,
            buffer_size: cli.buffer.max(1),
            do_stats: cli.stat,
            do_tag_count: cli.count,
            nr_violations: 0,
        }
    }

    fn parse_file(&mut self, path: Option<&Path>) -> Result<(), LintError> {
        let mut f: Box<dyn Read> = match path {
            Some(path) => Box::new(File::open(path)?),
            None => Box::new(stdin()),
        };
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let bytes_read = f.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            self.stream.write_all(&buffer[..bytes_read])?;
        }
        // counters are cleared at the end of the document
        self.nr_violations = self.stream.parser().violation_count();
        Ok(self.stream.end()?)
    }

    fn report(&mut self) -> Result<(), LintError> {
        let mut report = self.report.borrow_mut();
        if self.do_stats {
            println!(
                "Tag pairs: {}, empty element tags: {}, max depth: {}",
                report.nr_tags, report.nr_empty_tags, report.max_depth
            );
            println!("Total size of character data: {} bytes.", report.nr_text_size);
            if self.nr_violations > 0 {
                println!("Recovered from {} violations.", self.nr_violations);
            }
        }
        if self.do_tag_count {
            println!("Tag counts:");
            for (tag, count) in report.tag_map.iter() {
                println!("  {tag}: {count}");
            }
        }
        report.clear();
        if let Some(builder) = &self.json {
            let value = builder.borrow_mut().take();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Ok(())
    }

    fn lint_file(&mut self, name: &str, path: Option<&Path>) -> bool {
        self.stream.reset();
        self.report.borrow_mut().clear();
        if let Some(builder) = &self.json {
            builder.borrow_mut().take();
        }
        debug!("checking {name}");
        let result = self.parse_file(path).and_then(|()| self.report());
        match result {
            Ok(()) => true,
            Err(LintError::Io(e)) => {
                eprintln!("Error reading file '{name}': {e}");
                false
            }
            Err(LintError::Sax(SaxError::BufferOverflow(violation))) => {
                eprintln!("Buffer limit exceeded in file '{name}': {violation}");
                false
            }
            Err(LintError::Sax(e)) => {
                eprintln!("Syntax error in file '{name}': {e}");
                false
            }
            Err(e) => {
                eprintln!("Error in file '{name}': {e}");
                false
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Cannot load the options: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut linter = Linter::new(&cli, options);
    if cli.files.is_empty() {
        if !linter.lint_file("stdin", None) {
            return ExitCode::FAILURE;
        }
    } else {
        for file in &cli.files {
            if !linter.lint_file(&file.display().to_string(), Some(file)) {
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
