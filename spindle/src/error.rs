use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Faults raised while moving through or reading from a stream. These are
/// never parse failures: a recognizer that triggers one has asked for
/// something outside the input.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("range {start}..{end} is out of bounds")]
    OutOfBounds { start: usize, end: usize },
    #[error("cannot consume past end of stream at offset {offset}")]
    EndOfStream { offset: usize },
    #[error("cannot move to offset {offset} before transaction start {base}")]
    BeforeTransaction { offset: usize, base: usize },
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
}

/// Mistakes in how a grammar was put together.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("rule '{name}' was invoked before being bound")]
    Unbound { name: String },
    #[error("rule '{name}' is already bound")]
    AlreadyBound { name: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let tests: Vec<(Box<dyn std::error::Error>, &str)> = vec![
            (
                Box::new(StreamError::OutOfBounds { start: 0, end: 10 }),
                "range 0..10 is out of bounds",
            ),
            (
                Box::new(StreamError::EndOfStream { offset: 3 }),
                "cannot consume past end of stream at offset 3",
            ),
            (
                Box::new(StreamError::BeforeTransaction { offset: 1, base: 2 }),
                "cannot move to offset 1 before transaction start 2",
            ),
            (
                Box::new(GrammarError::Unbound {
                    name: "value".to_owned(),
                }),
                "rule 'value' was invoked before being bound",
            ),
        ];
        for (err, expected) in tests {
            assert_eq!(err.to_string(), expected);
        }
    }
}
