//! Transforms applied to a parser's outcome after it succeeds.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::rc::Rc;

use anyhow::{anyhow, Result};

use crate::outcome::Outcome;
use crate::value::Value;

/// A chainable `Outcome -> Outcome` transform.
///
/// Mappers may fail; a failing mapper aborts the parse with an error labelled
/// by the parser it is attached to.
#[derive(Clone)]
pub struct Mapper(Rc<dyn Fn(Outcome) -> Result<Outcome>>);

impl Mapper {
    pub fn new<F>(f: F) -> Mapper
    where
        F: Fn(Outcome) -> Result<Outcome> + 'static,
    {
        Mapper(Rc::new(f))
    }

    pub fn apply(&self, outcome: Outcome) -> Result<Outcome> {
        (self.0)(outcome)
    }

    /// Run this mapper, then feed its output to `next`.
    pub fn then(&self, next: Mapper) -> Mapper {
        let first = self.clone();
        Mapper::new(move |outcome| next.apply(first.apply(outcome)?))
    }
}

impl Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Mapper")
    }
}

/// Build a mapper over successful values. Failures pass through untouched.
fn on_value<F>(f: F) -> Mapper
where
    F: Fn(Value) -> Result<Outcome> + 'static,
{
    Mapper::new(move |outcome| match outcome {
        Outcome::Success(value) | Outcome::Skip(value) => f(value),
        failure => Ok(failure),
    })
}

fn list(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::List(list) => Ok(list),
        other => Err(anyhow!("expected a list, got {}", other.kind())),
    }
}

/// Join everything matched into one string.
pub fn concat() -> Mapper {
    on_value(|value| Ok(Outcome::Success(Value::String(value.to_text()?))))
}

/// Name the items of a list: the n-th item is stored under the n-th key.
pub fn structure<I, S>(keys: I) -> Mapper
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    on_value(move |value| {
        let items = list(value)?;
        if items.len() < keys.len() {
            return Err(anyhow!(
                "cannot name {} items with {} keys",
                items.len(),
                keys.len()
            ));
        }
        let map: BTreeMap<String, Value> = keys.iter().cloned().zip(items).collect();
        Ok(Outcome::Success(Value::Map(map)))
    })
}

pub fn nth(n: usize) -> Mapper {
    on_value(move |value| {
        let items = list(value)?;
        let len = items.len();
        items
            .into_iter()
            .nth(n)
            .map(Outcome::Success)
            .ok_or_else(|| anyhow!("index {} out of range for a list of {}", n, len))
    })
}

pub fn first() -> Mapper {
    nth(0)
}

pub fn last() -> Mapper {
    on_value(|value| {
        list(value)?
            .pop()
            .map(Outcome::Success)
            .ok_or_else(|| anyhow!("cannot take the last item of an empty list"))
    })
}

/// Replace whatever was matched with a constant.
pub fn value(constant: impl Into<Value>) -> Mapper {
    let constant = constant.into();
    on_value(move |_| Ok(Outcome::Success(constant.clone())))
}

/// Substitute `default` when the matched value is null or empty.
pub fn otherwise(default: impl Into<Value>) -> Mapper {
    let default = default.into();
    Mapper::new(move |outcome| match outcome.value() {
        Some(value) if value.is_empty() => Ok(Outcome::Success(default.clone())),
        _ => Ok(outcome),
    })
}

/// Keep the match but leave its value out of enclosing lists.
pub fn skip() -> Mapper {
    on_value(|value| Ok(Outcome::Skip(value)))
}

pub fn apply<F>(f: F) -> Mapper
where
    F: Fn(Value) -> Result<Value> + 'static,
{
    on_value(move |value| Ok(Outcome::Success(f(value)?)))
}
