use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::debugger::Debugger;
use crate::mapper::Mapper;
use crate::outcome::Outcome;
use crate::stream::Stream;

/// Signature of a recognition function: the stream to read from, the label
/// of the parser running it and the debugger to forward to nested parsers.
pub type Recognize = dyn Fn(&mut dyn Stream, &str, Option<&mut Debugger>) -> Result<Outcome>;

/// A labelled recognition function plus an optional mapper.
///
/// Parsers are cheap to clone and never mutated: `label`, `map` and
/// `stringify` all return a new parser sharing the same recognition function.
#[derive(Clone)]
pub struct Parser {
    original_label: Rc<str>,
    label: Rc<str>,
    recognize: Rc<Recognize>,
    mapper: Option<Mapper>,
    stringify: Rc<dyn Fn(&str) -> String>,
}

impl Parser {
    pub fn new<F>(label: &str, recognize: F) -> Parser
    where
        F: Fn(&mut dyn Stream, &str, Option<&mut Debugger>) -> Result<Outcome> + 'static,
    {
        let label: Rc<str> = Rc::from(label);
        Parser {
            original_label: label.clone(),
            label,
            recognize: Rc::new(recognize),
            mapper: None,
            stringify: Rc::new(|label| label.to_owned()),
        }
    }

    /// Current label, e.g. `string•enclosed`.
    pub fn name(&self) -> &str {
        &self.label
    }

    /// Label the parser was created with.
    pub fn original_label(&self) -> &str {
        &self.original_label
    }

    /// Run against `stream` without tracing.
    pub fn parse(&self, stream: &mut dyn Stream) -> Result<Outcome> {
        self.invoke(stream, None)
    }

    /// Run against `stream`, reporting entry and exit to `debugger`.
    ///
    /// Failures are returned untouched; anything else goes through the
    /// mapper. Errors from recognition or mapping get this parser's label
    /// as context.
    pub fn invoke(
        &self,
        stream: &mut dyn Stream,
        mut debugger: Option<&mut Debugger>,
    ) -> Result<Outcome> {
        let invocation = debugger
            .as_deref_mut()
            .map(|debugger| debugger.enter(self, &*stream));

        let outcome = (self.recognize)(&mut *stream, self.name(), debugger.as_deref_mut())
            .with_context(|| self.label.to_string())?;

        if let (Some(debugger), Some(invocation)) = (debugger, invocation) {
            debugger.exit(self, invocation, &*stream, &outcome);
        }

        match (&self.mapper, outcome) {
            (_, outcome @ Outcome::Failure(_)) => Ok(outcome),
            (Some(mapper), outcome) => mapper
                .apply(outcome)
                .with_context(|| self.label.to_string()),
            (None, outcome) => Ok(outcome),
        }
    }

    /// Derive a parser labelled `name•original`.
    pub fn label(&self, name: &str) -> Parser {
        Parser {
            label: Rc::from(format!("{}•{}", name, self.original_label)),
            ..self.clone()
        }
    }

    /// Derive a parser whose successes go through `mapper`. Replaces any
    /// mapper set before; use [`Mapper::then`] to chain.
    pub fn map(&self, mapper: Mapper) -> Parser {
        Parser {
            mapper: Some(mapper),
            ..self.clone()
        }
    }

    /// Derive a parser rendered by `f`, which receives the current label.
    pub fn stringify<F>(&self, f: F) -> Parser
    where
        F: Fn(&str) -> String + 'static,
    {
        Parser {
            stringify: Rc::new(f),
            ..self.clone()
        }
    }
}

impl Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&(self.stringify)(&self.label))
    }
}

impl Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Parser")
            .field("label", &self.label)
            .field("mapped", &self.mapper.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{concat, skip};
    use crate::outcome::Failure;
    use crate::stream::CharStream;
    use crate::value::Value;
    use anyhow::anyhow;

    fn take(n: usize) -> Parser {
        Parser::new("take", move |stream, _, _| {
            let mut values = Vec::new();
            for _ in 0..n {
                values.push(Value::Slice(stream.consume()?));
            }
            Ok(Outcome::Success(Value::List(values)))
        })
    }

    #[test]
    fn labels_compose_from_original() {
        let parser = take(1);
        assert_eq!(parser.name(), "take");

        let labelled = parser.label("first").label("second");
        assert_eq!(labelled.name(), "second•take");
        assert_eq!(labelled.original_label(), "take");
        assert_eq!(parser.name(), "take", "source parser is untouched");

        let shown = labelled.stringify(|label| format!("<{}>", label));
        assert_eq!(shown.to_string(), "<second•take>");
        assert_eq!(labelled.to_string(), "second•take");
    }

    #[test]
    fn mapper_applies_to_success_only() {
        let mut stream = CharStream::new("abc");
        let got = take(2).map(concat()).parse(&mut stream).unwrap();
        assert_eq!(got, Outcome::success("ab"));

        let failing = Parser::new("fail", |_, label, _| {
            Ok(Outcome::Failure(Failure::new(label, "no")))
        })
        .label("x")
        .map(skip());
        let got = failing.parse(&mut stream).unwrap();
        assert_eq!(got, Outcome::Failure(Failure::new("x•fail", "no")));
    }

    #[test]
    fn map_replaces_previous_mapper() {
        let mut stream = CharStream::new("ab");
        let parser = take(2).map(skip()).map(concat());
        assert_eq!(parser.parse(&mut stream).unwrap(), Outcome::success("ab"));
    }

    #[test]
    fn errors_carry_labels() {
        let mut stream = CharStream::new("a");
        let err = take(2).label("pair").parse(&mut stream).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "pair•take: cannot consume past end of stream at offset 1"
        );

        let mut stream = CharStream::new("a");
        let broken = take(1).map(Mapper::new(|_| Err(anyhow!("boom"))));
        let err = broken.parse(&mut stream).unwrap_err();
        assert_eq!(format!("{:#}", err), "take: boom");
    }
}
