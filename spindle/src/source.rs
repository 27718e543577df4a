//! Text providers backing streams and slices.
//!
//! Every offset handed to a source counts code points, not bytes.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::StreamError;

/// Read-only access to some text by code point offset.
pub trait Source {
    /// Returns the code point at `offset`, or `None` past the end. Fails
    /// when the text past what is already available cannot be read.
    fn char_at(&self, offset: usize) -> Result<Option<char>, StreamError>;

    /// Returns `length` code points starting at `offset`, or everything up to
    /// the end when `length` is `None`.
    fn cut(&self, offset: usize, length: Option<usize>) -> Result<Cow<'_, str>, StreamError>;
}

/// Decoded text along with the byte index of every code point.
#[derive(Debug, Default)]
struct Buffer {
    text: String,
    bounds: Vec<usize>,
}

impl Buffer {
    fn push_str(&mut self, s: &str) {
        let base = self.text.len();
        self.bounds.extend(s.char_indices().map(|(idx, _)| base + idx));
        self.text.push_str(s);
    }

    fn len(&self) -> usize {
        self.bounds.len()
    }

    fn byte(&self, offset: usize) -> usize {
        self.bounds.get(offset).copied().unwrap_or(self.text.len())
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        let start = *self.bounds.get(offset)?;
        self.text[start..].chars().next()
    }

    fn cut(&self, offset: usize, length: Option<usize>) -> Result<&str, StreamError> {
        let len = self.len();
        let end = match length {
            Some(length) => offset.saturating_add(length),
            None => len,
        };
        if offset > len || end > len || end < offset {
            return Err(StreamError::OutOfBounds { start: offset, end });
        }
        Ok(&self.text[self.byte(offset)..self.byte(end)])
    }
}

/// In-memory text.
#[derive(Debug)]
pub struct Text(Buffer);

impl Text {
    pub fn new(text: impl Into<String>) -> Text {
        let text = text.into();
        let mut buffer = Buffer::default();
        buffer.push_str(&text);
        Text(buffer)
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }
}

impl Source for Text {
    fn char_at(&self, offset: usize) -> Result<Option<char>, StreamError> {
        Ok(self.0.char_at(offset))
    }

    fn cut(&self, offset: usize, length: Option<usize>) -> Result<Cow<'_, str>, StreamError> {
        self.0.cut(offset, length).map(Cow::Borrowed)
    }
}

/// Text read from a file on demand, one line at a time.
///
/// Lines are only pulled in once something asks for an offset past what has
/// been buffered so far. Text before a line that fails to read stays
/// available; asking for anything past it reports the read error.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: RefCell<BufReader<File>>,
    buffer: RefCell<Buffer>,
    exhausted: Cell<bool>,
    failure: RefCell<Option<String>>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<FileSource, StreamError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| StreamError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(FileSource {
            path,
            reader: RefCell::new(BufReader::new(file)),
            buffer: RefCell::new(Buffer::default()),
            exhausted: Cell::new(false),
            failure: RefCell::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read lines until at least `count` code points are buffered or the
    /// file runs out.
    fn fill(&self, count: usize) {
        while self.buffer.borrow().len() < count && !self.exhausted.get() {
            let mut line = String::new();
            let read = self.reader.borrow_mut().read_line(&mut line);
            match read {
                Ok(0) => self.exhausted.set(true),
                Ok(_) => self.buffer.borrow_mut().push_str(&line),
                Err(e) => {
                    *self.failure.borrow_mut() = Some(e.to_string());
                    self.exhausted.set(true);
                }
            }
        }
    }

    fn check(&self) -> Result<(), StreamError> {
        match &*self.failure.borrow() {
            Some(message) => Err(StreamError::Read {
                path: self.path.clone(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Source for FileSource {
    fn char_at(&self, offset: usize) -> Result<Option<char>, StreamError> {
        self.fill(offset.saturating_add(1));
        match self.buffer.borrow().char_at(offset) {
            Some(c) => Ok(Some(c)),
            None => {
                self.check()?;
                Ok(None)
            }
        }
    }

    fn cut(&self, offset: usize, length: Option<usize>) -> Result<Cow<'_, str>, StreamError> {
        match length {
            Some(length) => self.fill(offset.saturating_add(length)),
            None => self.fill(usize::MAX),
        }
        self.check()?;
        let buffer = self.buffer.borrow();
        let text = buffer.cut(offset, length)?;
        Ok(Cow::Owned(text.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_cut() {
        let text = Text::new("a😁c");
        let tests = vec![
            (0, None, Some("a😁c")),
            (0, Some(1), Some("a")),
            (1, None, Some("😁c")),
            (1, Some(1), Some("😁")),
            (3, None, Some("")),
            (3, Some(0), Some("")),
            (0, Some(10), None),
            (4, None, None),
        ];
        for test in tests {
            let got = text.cut(test.0, test.1).ok();
            assert_eq!(got.as_deref(), test.2, "test case: {:?}", test);
        }
    }

    #[test]
    fn text_char_at() {
        let text = Text::new("a😁c");
        assert_eq!(text.len(), 3);
        let tests = vec![(0, Some('a')), (1, Some('😁')), (2, Some('c')), (3, None)];
        for test in tests {
            assert_eq!(text.char_at(test.0).unwrap(), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn missing_file() {
        let err = FileSource::open("does/not/exist.json").unwrap_err();
        assert!(matches!(err, StreamError::Open { .. }), "err: {:?}", err);
    }
}
