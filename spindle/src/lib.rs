//! Parser combinators over a backtracking character stream.
//!
//! Grammars are plain values: small recognizers such as [`char`] and
//! [`word`] are composed with [`seq`], [`alt`], [`many`] and the other
//! combinators into parsers for whole languages. Running a parser yields an
//! [`Outcome`]: a `Success` or `Skip` carrying a [`Value`], or a
//! [`Failure`] describing what was expected. Errors that are not parse
//! failures, like an unbound [`Rule`], come back as `anyhow::Error` labelled
//! with every parser they passed through.
//!
//! ```
//! use spindle::mapper::concat;
//! use spindle::{char, many, pattern, separated, CharStream, Value};
//!
//! let number = many(pattern("[0-9]").unwrap()).map(concat());
//! let numbers = separated(char(','), number);
//!
//! let mut stream = CharStream::new("1,22,333");
//! let value = numbers.parse(&mut stream).unwrap().into_value().unwrap();
//! assert_eq!(value, Value::List(vec!["1".into(), "22".into(), "333".into()]));
//! ```

mod combinators;
mod debugger;
mod error;
mod outcome;
mod parser;
mod position;
mod primitives;
mod slice;
mod source;
mod stream;
mod value;

pub mod logger;
pub mod mapper;

pub use combinators::{
    alt, debug, enclosed, many, not, opt, recurse, repeat, separated, seq, Rule,
};
pub use debugger::{Debugger, Invocation};
pub use error::{GrammarError, StreamError};
pub use mapper::Mapper;
pub use outcome::{Failure, Outcome};
pub use parser::{Parser, Recognize};
pub use position::{Cursor, Position};
pub use primitives::{any, char, eos, pattern, regex, word};
pub use slice::Slice;
pub use source::{FileSource, Source, Text};
pub use stream::{CharStream, Stream, Transaction, EOS};
pub use value::Value;
