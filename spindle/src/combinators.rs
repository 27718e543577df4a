//! Parsers built out of other parsers.
//!
//! Combinators that may need to give back input they consumed run their
//! children inside a [`Transaction`](crate::Transaction), so a failing
//! combinator leaves the stream where it found it.

use std::rc::Rc;

use once_cell::unsync::OnceCell;
use termcolor::ColorChoice;

use crate::debugger::Debugger;
use crate::error::GrammarError;
use crate::logger::CliLogger;
use crate::outcome::{escape, Failure, Outcome};
use crate::parser::Parser;
use crate::primitives::any;
use crate::stream::{Stream, EOS};
use crate::value::Value;

fn join(parsers: &[Parser]) -> String {
    parsers
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Match every parser in order. Values of skipped outcomes are left out of
/// the resulting list.
pub fn seq(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let parsers: Rc<[Parser]> = parsers.into_iter().collect();
    let children = parsers.clone();
    Parser::new("seq", move |stream, _, mut debugger| {
        let mut transaction = stream.begin();
        let mut values = Vec::new();
        for parser in children.iter() {
            match parser.invoke(&mut transaction, debugger.as_deref_mut())? {
                Outcome::Failure(failure) => return Ok(Outcome::Failure(failure)),
                Outcome::Skip(_) => (),
                Outcome::Success(value) => values.push(value),
            }
        }
        transaction.commit();
        Ok(Outcome::Success(Value::List(values)))
    })
    .stringify(move |label| format!("{}({})", label, join(&parsers)))
}

/// Try each parser in turn and return the first success. When all of them
/// fail, the failure of the first one is returned.
pub fn alt(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let parsers: Rc<[Parser]> = parsers.into_iter().collect();
    let children = parsers.clone();
    Parser::new("alt", move |stream, label, mut debugger| {
        let mut first = None;
        for parser in children.iter() {
            let mut transaction = stream.begin();
            match parser.invoke(&mut transaction, debugger.as_deref_mut())? {
                Outcome::Failure(failure) => {
                    first.get_or_insert(failure);
                }
                outcome => {
                    transaction.commit();
                    return Ok(outcome);
                }
            }
        }
        Ok(Outcome::Failure(first.unwrap_or_else(|| {
            Failure::new(label, "Expected at least one alternative")
        })))
    })
    .stringify(move |label| format!("{}({})", label, join(&parsers)))
}

/// Match `parser` or nothing. Never fails; a miss yields null.
pub fn opt(parser: Parser) -> Parser {
    let child = parser.clone();
    Parser::new("opt", move |stream, _, debugger| {
        let mut transaction = stream.begin();
        match child.invoke(&mut transaction, debugger)? {
            Outcome::Failure(_) => Ok(Outcome::Success(Value::Null)),
            outcome => {
                transaction.commit();
                Ok(outcome)
            }
        }
    })
    .stringify(move |label| format!("{}({})", label, parser))
}

/// Match `parser` one or more times.
///
/// If the first attempt fails, its failure is returned. An iteration that
/// matches without consuming anything is kept and ends the loop.
pub fn many(parser: Parser) -> Parser {
    let child = parser.clone();
    Parser::new("many", move |stream, _, mut debugger| {
        let mut values = Vec::new();
        let mut matched = 0;
        loop {
            let mut transaction = stream.begin();
            let start = transaction.offset();
            match child.invoke(&mut transaction, debugger.as_deref_mut())? {
                Outcome::Failure(failure) if matched == 0 => {
                    return Ok(Outcome::Failure(failure))
                }
                Outcome::Failure(_) => break,
                Outcome::Skip(_) => (),
                Outcome::Success(value) => values.push(value),
            }
            let advanced = transaction.offset() > start;
            transaction.commit();
            matched += 1;
            if !advanced {
                break;
            }
        }
        Ok(Outcome::Success(Value::List(values)))
    })
    .stringify(move |label| format!("{}({})", label, parser))
}

/// Match `parser` exactly `times` times, all or nothing.
pub fn repeat(times: usize, parser: Parser) -> Parser {
    let child = parser.clone();
    Parser::new("repeat", move |stream, _, mut debugger| {
        let mut transaction = stream.begin();
        let mut values = Vec::with_capacity(times);
        for _ in 0..times {
            match child.invoke(&mut transaction, debugger.as_deref_mut())? {
                Outcome::Failure(failure) => return Ok(Outcome::Failure(failure)),
                Outcome::Skip(_) => (),
                Outcome::Success(value) => values.push(value),
            }
        }
        transaction.commit();
        Ok(Outcome::Success(Value::List(values)))
    })
    .stringify(move |label| format!("{}({}, {})", label, times, parser))
}

/// Match any single code point, unless one of `parsers` matches here.
pub fn not(parsers: impl IntoIterator<Item = Parser>) -> Parser {
    let parsers: Rc<[Parser]> = parsers.into_iter().collect();
    let children = parsers.clone();
    let fallback = any();
    Parser::new("not", move |stream, label, mut debugger| {
        for parser in children.iter() {
            let mut transaction = stream.begin();
            let probe = parser.invoke(&mut transaction, debugger.as_deref_mut())?;
            drop(transaction);
            if probe.is_success() {
                let current = stream
                    .current()?
                    .map_or_else(|| EOS.to_owned(), |c| escape(&c.to_string()));
                return Ok(Outcome::Failure(Failure::new(
                    label,
                    format!(
                        "Expected \"{}\" not to match, got \"{}\" at line {} offset {}",
                        parser,
                        current,
                        stream.position().line,
                        stream.offset()
                    ),
                )));
            }
        }
        fallback.invoke(stream, debugger)
    })
    .stringify(move |label| format!("{}({})", label, join(&parsers)))
}

/// A named slot for a parser that is defined after the parsers referring to
/// it, which is how recursive grammars are tied together.
///
/// The slot is filled once with [`Rule::bind`]. A grammar whose rule refers
/// back to itself forms an `Rc` cycle and is never freed; grammars are meant
/// to be built once and kept for the life of the program.
///
/// ```
/// use spindle::{alt, char, recurse, seq, CharStream, Rule};
///
/// let nested = Rule::new("nested");
/// let parser = alt([seq([char('('), recurse(&nested), char(')')]), char('x')]);
/// nested.bind(parser.clone()).unwrap();
///
/// let mut stream = CharStream::new("((x))");
/// assert!(parser.parse(&mut stream).unwrap().is_success());
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    name: Rc<str>,
    slot: Rc<OnceCell<Parser>>,
}

impl Rule {
    pub fn new(name: &str) -> Rule {
        Rule {
            name: Rc::from(name),
            slot: Rc::new(OnceCell::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bind(&self, parser: Parser) -> Result<(), GrammarError> {
        self.slot
            .set(parser)
            .map_err(|_| GrammarError::AlreadyBound {
                name: self.name.to_string(),
            })
    }

    pub fn parser(&self) -> Option<&Parser> {
        self.slot.get()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// Invoke whatever `rule` is bound to at the time of the call.
pub fn recurse(rule: &Rule) -> Parser {
    let target = rule.clone();
    let shown = rule.clone();
    Parser::new("recurse", move |stream, _, debugger| {
        let parser = target.parser().ok_or_else(|| GrammarError::Unbound {
            name: target.name().to_owned(),
        })?;
        parser.invoke(stream, debugger)
    })
    .stringify(move |label| match shown.parser() {
        Some(parser) => format!("{}({})", label, parser.name()),
        None => format!("{}({})", label, shown.name()),
    })
}

/// Match `before`, `content` then `after`, keeping only the content's
/// outcome. `after` defaults to `before`.
pub fn enclosed(before: Parser, content: Parser, after: impl Into<Option<Parser>>) -> Parser {
    let after = after.into().unwrap_or_else(|| before.clone());
    let shown = format!("{}, {}, {}", before, content, after);
    Parser::new("enclosed", move |stream, _, mut debugger| {
        let mut transaction = stream.begin();
        let opening = before.invoke(&mut transaction, debugger.as_deref_mut())?;
        if opening.is_failure() {
            return Ok(opening);
        }
        let outcome = content.invoke(&mut transaction, debugger.as_deref_mut())?;
        if outcome.is_failure() {
            return Ok(outcome);
        }
        let closing = after.invoke(&mut transaction, debugger)?;
        if closing.is_failure() {
            return Ok(closing);
        }
        transaction.commit();
        Ok(outcome)
    })
    .stringify(move |label| format!("{}({})", label, shown))
}

/// Match `item` one or more times with `separator` in between. A separator
/// not followed by an item is left unconsumed.
pub fn separated(separator: Parser, item: Parser) -> Parser {
    let shown = format!("{}, {}", separator, item);
    Parser::new("separated", move |stream, _, mut debugger| {
        let mut values = Vec::new();
        let mut matched = 0;
        loop {
            let mut transaction = stream.begin();
            let start = transaction.offset();
            if matched > 0
                && separator
                    .invoke(&mut transaction, debugger.as_deref_mut())?
                    .is_failure()
            {
                break;
            }
            match item.invoke(&mut transaction, debugger.as_deref_mut())? {
                Outcome::Failure(failure) if matched == 0 => {
                    return Ok(Outcome::Failure(failure))
                }
                Outcome::Failure(_) => break,
                Outcome::Skip(_) => (),
                Outcome::Success(value) => values.push(value),
            }
            let advanced = transaction.offset() > start;
            transaction.commit();
            matched += 1;
            if !advanced {
                break;
            }
        }
        Ok(Outcome::Success(Value::List(values)))
    })
    .stringify(move |label| format!("{}({})", label, shown))
}

/// Trace `parser` to stderr, unless the caller is already tracing.
pub fn debug(parser: Parser) -> Parser {
    let child = parser.clone();
    Parser::new("debug", move |stream, _, debugger| match debugger {
        Some(debugger) => child.invoke(stream, Some(debugger)),
        None => {
            let mut debugger = Debugger::new(CliLogger::stderr(ColorChoice::Auto));
            child.invoke(stream, Some(&mut debugger))
        }
    })
    .stringify(move |label| format!("{}({})", label, parser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{char, word};
    use crate::stream::CharStream;

    fn texts(outcome: Outcome) -> Vec<String> {
        match outcome.into_value().unwrap() {
            Value::List(list) => list.iter().map(|v| v.to_text().unwrap()).collect(),
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn stringify_nests() {
        let parser = seq([
            char('a'),
            alt([word("bc"), opt(char('d'))]),
            many(not([char('e')])),
            repeat(2, char('f')),
        ]);
        assert_eq!(
            parser.to_string(),
            "seq(char(a), alt(word(bc), opt(char(d))), many(not(char(e))), repeat(2, char(f)))"
        );
        assert_eq!(
            enclosed(char('"'), any(), None).to_string(),
            "enclosed(char(\"), any, char(\"))"
        );
        assert_eq!(
            separated(char(','), char('a')).label("list").to_string(),
            "list•separated(char(,), char(a))"
        );
    }

    #[test]
    fn seq_excludes_skips() {
        let mut stream = CharStream::new("a,b");
        let parser = seq([
            char('a'),
            char(',').map(crate::mapper::skip()),
            char('b'),
        ]);
        let got = parser.parse(&mut stream).unwrap();
        assert_eq!(texts(got), vec!["a", "b"]);
        assert!(stream.eos().unwrap());
    }

    #[test]
    fn empty_combinators() {
        let mut stream = CharStream::new("a");
        assert_eq!(
            seq(Vec::new()).parse(&mut stream).unwrap(),
            Outcome::Success(Value::List(Vec::new()))
        );
        let got = alt(Vec::new()).parse(&mut stream).unwrap();
        assert_eq!(
            got,
            Outcome::Failure(Failure::new("alt", "Expected at least one alternative"))
        );
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn many_stops_on_zero_width_match() {
        let mut stream = CharStream::new("ab");
        let got = many(opt(char('x'))).parse(&mut stream).unwrap();
        assert_eq!(got, Outcome::Success(Value::List(vec![Value::Null])));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn repeat_is_atomic() {
        let tests = vec![
            ("aaa", true, 2),
            ("aa", true, 2),
            ("ab", false, 0),
            ("", false, 0),
        ];
        for test in tests {
            let mut stream = CharStream::new(test.0);
            let got = repeat(2, char('a')).parse(&mut stream).unwrap();
            assert_eq!(got.is_success(), test.1, "test case: {:?}", test);
            assert_eq!(stream.offset(), test.2, "test case: {:?}", test);
        }
    }

    #[test]
    fn not_reports_matching_child() {
        let mut stream = CharStream::new("xbc");
        stream.consume().unwrap();
        let got = not([char('a'), char('b')]).parse(&mut stream).unwrap();
        assert_eq!(
            got,
            Outcome::Failure(Failure::new(
                "not",
                "Expected \"char(b)\" not to match, got \"b\" at line 1 offset 1"
            ))
        );
        assert_eq!(stream.offset(), 1);

        let mut stream = CharStream::new("");
        let got = not([char('a')]).parse(&mut stream).unwrap();
        assert_eq!(
            got,
            Outcome::Failure(Failure::new(
                "any",
                "Expected \"any\", got \"EOS\" at line 1 offset 0"
            ))
        );
    }

    #[test]
    fn enclosed_rolls_back() {
        let tests = vec![
            ("(a)", Some("a"), 3),
            ("(a", None, 0),
            ("(b)", None, 0),
            ("a)", None, 0),
        ];
        for test in tests {
            let mut stream = CharStream::new(test.0);
            let parser = enclosed(char('('), char('a'), char(')'));
            let got = parser.parse(&mut stream).unwrap();
            let got = got.into_value().ok().map(|v| v.to_text().unwrap());
            assert_eq!(got.as_deref(), test.1, "test case: {:?}", test);
            assert_eq!(stream.offset(), test.2, "test case: {:?}", test);
        }
    }

    #[test]
    fn rule_binds_once() {
        let rule = Rule::new("value");
        assert!(!rule.is_bound());

        let mut stream = CharStream::new("a");
        let err = recurse(&rule).parse(&mut stream).unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "recurse: rule 'value' was invoked before being bound"
        );
        assert!(matches!(
            err.downcast_ref::<GrammarError>(),
            Some(GrammarError::Unbound { .. })
        ));
        assert_eq!(recurse(&rule).to_string(), "recurse(value)");

        rule.bind(char('a').label("letter")).unwrap();
        assert!(rule.is_bound());
        assert_eq!(recurse(&rule).to_string(), "recurse(letter•char)");
        assert!(matches!(
            rule.bind(char('b')),
            Err(GrammarError::AlreadyBound { .. })
        ));
        assert!(recurse(&rule).parse(&mut stream).unwrap().is_success());
    }
}
