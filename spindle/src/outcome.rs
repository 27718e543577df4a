use thiserror::Error;

use crate::position::Position;
use crate::value::Value;

/// What a parser produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    /// A success whose value is left out of the lists built by `seq`, `many`
    /// and friends.
    Skip(Value),
    Failure(Failure),
}

impl Outcome {
    pub fn success(value: impl Into<Value>) -> Outcome {
        Outcome::Success(value.into())
    }

    /// Skip counts as success.
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Outcome::Skip(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(value) | Outcome::Skip(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_value(self) -> Result<Value, Failure> {
        match self {
            Outcome::Success(value) | Outcome::Skip(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }
}

/// A parser did not match. Unlike fatal errors, failures are ordinary values
/// that `alt`, `opt` and `not` recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label}: {message}")]
pub struct Failure {
    pub label: String,
    pub message: String,
}

impl Failure {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Failure {
        Failure {
            label: label.into(),
            message: message.into(),
        }
    }

    /// The usual `Expected "x", got "y" at line L offset C` failure.
    pub fn expected(label: &str, expected: &str, actual: &str, position: Position) -> Failure {
        Failure::new(
            label,
            format!(
                "Expected \"{}\", got \"{}\" at {}",
                escape(expected),
                escape(actual),
                position
            ),
        )
    }
}

/// Make control characters readable in diagnostics.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
