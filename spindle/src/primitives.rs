//! Recognizers that read the stream directly.

use regex::Regex;

use crate::error::{GrammarError, StreamError};
use crate::outcome::{escape, Failure, Outcome};
use crate::parser::Parser;
use crate::stream::{Stream, EOS};
use crate::value::Value;

fn describe(current: Option<char>) -> String {
    current.map_or_else(|| EOS.to_owned(), String::from)
}

/// Match exactly `expected`.
pub fn char(expected: char) -> Parser {
    Parser::new("char", move |stream, label, _| match stream.current()? {
        Some(c) if c == expected => Ok(Outcome::Success(Value::Slice(stream.consume()?))),
        current => Ok(Outcome::Failure(Failure::expected(
            label,
            &expected.to_string(),
            &describe(current),
            stream.position(),
        ))),
    })
    .stringify(move |label| format!("{}({})", label, escape(&expected.to_string())))
}

/// Match one code point against a regular expression.
pub fn pattern(re: &str) -> Result<Parser, GrammarError> {
    Ok(regex(Regex::new(re)?))
}

/// Like [`pattern`], with an already compiled expression.
pub fn regex(re: Regex) -> Parser {
    let source = re.as_str().to_owned();
    Parser::new("regex", move |stream, label, _| {
        let mut buf = [0; 4];
        match stream.current()? {
            Some(c) if re.is_match(c.encode_utf8(&mut buf)) => {
                Ok(Outcome::Success(Value::Slice(stream.consume()?)))
            }
            current => Ok(Outcome::Failure(Failure::expected(
                label,
                re.as_str(),
                &describe(current),
                stream.position(),
            ))),
        }
    })
    .stringify(move |label| format!("{}({})", label, source))
}

/// Match `word` verbatim.
pub fn word(word: &str) -> Parser {
    let expected = word.to_owned();
    let length = expected.chars().count();
    let shown = escape(word);
    Parser::new("word", move |stream, label, _| {
        let position = stream.position();
        if stream.eos()? {
            return Ok(Outcome::Failure(Failure::expected(
                label, &expected, EOS, position,
            )));
        }

        let offset = stream.offset();
        let actual = match stream.cut(offset, Some(length)) {
            Ok(actual) => actual,
            Err(StreamError::OutOfBounds { .. }) => {
                let rest = stream.cut(offset, None)?;
                return Ok(Outcome::Failure(Failure::expected(
                    label,
                    &expected,
                    &format!("{} . {}", rest, EOS),
                    position,
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if actual != expected {
            return Ok(Outcome::Failure(Failure::expected(
                label, &expected, &actual, position,
            )));
        }

        let slice = stream.slice(offset, length)?;
        for _ in 0..length {
            stream.consume()?;
        }
        Ok(Outcome::Success(Value::Slice(slice)))
    })
    .stringify(move |label| format!("{}({})", label, shown))
}

/// Match any single code point.
pub fn any() -> Parser {
    Parser::new("any", |stream, label, _| {
        if stream.eos()? {
            return Ok(Outcome::Failure(Failure::expected(
                label,
                "any",
                EOS,
                stream.position(),
            )));
        }
        Ok(Outcome::Success(Value::Slice(stream.consume()?)))
    })
}

/// Match the end of the stream. Succeeds with null.
pub fn eos() -> Parser {
    Parser::new("eos", |stream, label, _| match stream.current()? {
        Some(c) => Ok(Outcome::Failure(Failure::expected(
            label,
            EOS,
            &c.to_string(),
            stream.position(),
        ))),
        None => Ok(Outcome::Success(Value::Null)),
    })
}
