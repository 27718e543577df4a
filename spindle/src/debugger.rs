use std::collections::HashMap;
use std::time::Instant;

use crate::logger::{Context, Logger};
use crate::outcome::Outcome;
use crate::parser::Parser;
use crate::stream::Stream;
use crate::value::Value;

/// Identifies one in-flight parser invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invocation(u64);

/// Traces parser entry and exit to a [`Logger`], indenting by nesting depth.
pub struct Debugger {
    logger: Box<dyn Logger>,
    depth: usize,
    ops: u64,
    next: u64,
    starts: HashMap<Invocation, Instant>,
}

impl Debugger {
    pub fn new(logger: impl Logger + 'static) -> Debugger {
        Debugger {
            logger: Box::new(logger),
            depth: 0,
            ops: 0,
            next: 0,
            starts: HashMap::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of invocations that have exited so far.
    pub fn ops(&self) -> u64 {
        self.ops
    }

    pub fn enter(&mut self, parser: &Parser, stream: &dyn Stream) -> Invocation {
        self.info(&format!("> {}", parser), position(stream));
        self.depth += 1;

        let invocation = Invocation(self.next);
        self.next += 1;
        self.starts.insert(invocation, Instant::now());
        invocation
    }

    pub fn exit(
        &mut self,
        parser: &Parser,
        invocation: Invocation,
        stream: &dyn Stream,
        outcome: &Outcome,
    ) {
        let mut context = position(stream);
        if let Some(start) = self.starts.remove(&invocation) {
            let seconds = start.elapsed().as_secs_f64();
            context.insert(
                "duration".to_owned(),
                ((seconds * 1e6).round() / 1e6).into(),
            );
        }

        self.ops += 1;
        self.depth = self.depth.saturating_sub(1);

        let message = format!("< {}", parser);
        match outcome {
            Outcome::Failure(_) => self.error(&message, context),
            Outcome::Success(value) | Outcome::Skip(value) => {
                if let Value::Slice(slice) = value {
                    if let Ok(text) = slice.text() {
                        context.insert("consumed".to_owned(), text.into_owned().into());
                    }
                }
                self.info(&message, context);
            }
        }
    }

    pub fn info(&mut self, message: &str, context: Context) {
        let context = self.build(context);
        let message = self.pad(message);
        self.logger.info(&message, &context);
    }

    pub fn error(&mut self, message: &str, context: Context) {
        let context = self.build(context);
        let message = self.pad(message);
        self.logger.error(&message, &context);
    }

    fn pad(&self, message: &str) -> String {
        format!("{}{}", "  ".repeat(self.depth), message)
    }

    fn build(&self, mut context: Context) -> Context {
        context.insert("ops".to_owned(), self.ops.into());
        context
    }
}

fn position(stream: &dyn Stream) -> Context {
    let position = stream.position();
    let mut context = Context::new();
    context.insert("line".to_owned(), position.line.into());
    context.insert("column".to_owned(), position.column.into());
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{Level, Recorder};
    use crate::outcome::Failure;
    use crate::stream::CharStream;
    use serde_json::json;

    #[test]
    fn enter_and_exit() {
        let recorder = Recorder::new();
        let mut debugger = Debugger::new(recorder.clone());
        let mut stream = CharStream::new("ab");
        let parser = Parser::new("p", |_, _, _| Ok(Outcome::Success(Value::Null)));

        let outer = debugger.enter(&parser, &stream);
        let inner = debugger.enter(&parser, &stream);
        assert_eq!(debugger.depth(), 2);

        let slice = stream.consume().unwrap();
        debugger.exit(&parser, inner, &stream, &Outcome::Success(Value::Slice(slice)));
        debugger.exit(
            &parser,
            outer,
            &stream,
            &Outcome::Failure(Failure::new("p", "no")),
        );
        assert_eq!(debugger.depth(), 0);
        assert_eq!(debugger.ops(), 2);

        assert_eq!(recorder.messages(), vec!["> p", "  > p", "  < p", "< p"]);

        let records = recorder.records();
        assert_eq!(records[0].context.get("ops"), Some(&json!(0)));
        assert_eq!(records[0].context.get("line"), Some(&json!(1)));
        assert_eq!(records[0].context.get("column"), Some(&json!(0)));

        assert_eq!(records[2].level, Level::Info);
        assert_eq!(records[2].context.get("consumed"), Some(&json!("a")));
        assert_eq!(records[2].context.get("column"), Some(&json!(1)));
        assert_eq!(records[2].context.get("ops"), Some(&json!(1)));
        assert!(records[2].context.get("duration").is_some());

        assert_eq!(records[3].level, Level::Error);
        assert_eq!(records[3].context.get("consumed"), None);
        assert_eq!(records[3].context.get("ops"), Some(&json!(2)));
    }
}
