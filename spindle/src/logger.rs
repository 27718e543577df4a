//! Sinks for parser traces.

use std::cell::RefCell;
use std::fmt::{self, Display};
use std::io::{self, Write};
use std::rc::Rc;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Structured data attached to a log line.
pub type Context = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Error => write!(f, "error"),
        }
    }
}

pub trait Logger {
    fn info(&mut self, message: &str, context: &Context);
    fn error(&mut self, message: &str, context: &Context);
}

/// Throws everything away.
#[derive(Debug, Default, Clone, Copy)]
pub struct NilLogger;

impl Logger for NilLogger {
    fn info(&mut self, _message: &str, _context: &Context) {}
    fn error(&mut self, _message: &str, _context: &Context) {}
}

/// Writes one line per entry: the level, a tab, the message and the context
/// as JSON. Errors are bold red when the writer supports color.
#[derive(Debug)]
pub struct CliLogger<W> {
    writer: W,
}

impl CliLogger<StandardStream> {
    pub fn stderr(choice: ColorChoice) -> CliLogger<StandardStream> {
        CliLogger::new(StandardStream::stderr(choice))
    }
}

impl<W: WriteColor> CliLogger<W> {
    pub fn new(writer: W) -> CliLogger<W> {
        CliLogger { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, level: Level, message: &str, context: &Context) -> io::Result<()> {
        let context = serde_json::to_string(context)?;
        let mut spec = ColorSpec::new();
        if level == Level::Error {
            spec.set_fg(Some(Color::Red)).set_bold(true);
        }
        self.writer.set_color(&spec)?;
        write!(
            self.writer,
            "{:<9}\t{} {}",
            format!("[{}]", level),
            message,
            context
        )?;
        self.writer.reset()?;
        writeln!(self.writer)
    }
}

impl<W: WriteColor> Logger for CliLogger<W> {
    // Tracing is best effort; a closed stderr must not break the parse.
    fn info(&mut self, message: &str, context: &Context) {
        let _ = self.write(Level::Info, message, context);
    }

    fn error(&mut self, message: &str, context: &Context) {
        let _ = self.write(Level::Error, message, context);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub context: Context,
}

/// Keeps every entry in memory. Clones share the same list, so a clone can
/// be handed to a debugger while the original is inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    records: Rc<RefCell<Vec<Record>>>,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str, context: &Context) {
        self.records.borrow_mut().push(Record {
            level,
            message: message.to_owned(),
            context: context.clone(),
        });
    }
}

impl Logger for Recorder {
    fn info(&mut self, message: &str, context: &Context) {
        self.push(Level::Info, message, context);
    }

    fn error(&mut self, message: &str, context: &Context) {
        self.push(Level::Error, message, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termcolor::{Ansi, NoColor};

    fn context() -> Context {
        let mut context = Context::new();
        context.insert("line".to_owned(), json!(1));
        context.insert("ops".to_owned(), json!(0));
        context
    }

    #[test]
    fn cli_format() {
        let mut logger = CliLogger::new(NoColor::new(Vec::new()));
        logger.info("> char(a)", &context());
        logger.error("< char(a)", &context());

        let out = String::from_utf8(logger.into_inner().into_inner()).unwrap();
        assert_eq!(
            out,
            "[info]   \t> char(a) {\"line\":1,\"ops\":0}\n\
             [error]  \t< char(a) {\"line\":1,\"ops\":0}\n"
        );
    }

    #[test]
    fn cli_errors_are_red() {
        let mut logger = CliLogger::new(Ansi::new(Vec::new()));
        logger.error("< eos", &Context::new());

        let out = String::from_utf8(logger.into_inner().into_inner()).unwrap();
        assert!(out.contains("\x1b[31m"), "out: {:?}", out);
        assert!(out.contains("\x1b[1m"), "out: {:?}", out);
        assert!(out.contains("< eos {}"), "out: {:?}", out);
    }

    #[test]
    fn recorder_is_shared() {
        let recorder = Recorder::new();
        let mut logger = recorder.clone();
        logger.info("one", &Context::new());
        logger.error("two", &context());
        NilLogger.info("dropped", &Context::new());

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[1].level, Level::Error);
        assert_eq!(records[1].context, context());
        assert_eq!(recorder.messages(), vec!["one", "two"]);
    }
}
