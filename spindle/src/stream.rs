use std::fmt::{self, Debug};
use std::path::Path;
use std::rc::Rc;

use crate::error::StreamError;
use crate::position::{Cursor, Position};
use crate::slice::Slice;
use crate::source::{FileSource, Source, Text};

/// How the end of input is spelled in diagnostics.
pub const EOS: &str = "EOS";

/// Cursor over some input.
///
/// Offsets count code points. The cursor only moves through `consume`,
/// `seek` and `restore`; the text itself is never modified.
pub trait Stream {
    /// Open a checkpoint. Work done through the returned transaction is only
    /// kept if it is committed.
    fn begin(&mut self) -> Transaction<'_>;

    /// The code point under the cursor, `None` at end of stream.
    fn current(&self) -> Result<Option<char>, StreamError>;

    /// Move past the current code point, returning a slice over it.
    fn consume(&mut self) -> Result<Slice, StreamError>;

    /// Move to `offset`, recomputing the line and column.
    fn seek(&mut self, offset: usize) -> Result<(), StreamError>;

    /// Copy `length` code points starting at `offset`, or everything up to
    /// the end when `length` is `None`.
    fn cut(&self, offset: usize, length: Option<usize>) -> Result<String, StreamError>;

    /// Slice over an arbitrary region of the input.
    fn slice(&self, offset: usize, length: usize) -> Result<Slice, StreamError>;

    fn checkpoint(&self) -> Cursor;

    /// Jump back (or forward) to a cursor taken from this stream.
    fn restore(&mut self, cursor: Cursor) -> Result<(), StreamError>;

    fn eos(&self) -> Result<bool, StreamError> {
        Ok(self.current()?.is_none())
    }

    fn offset(&self) -> usize {
        self.checkpoint().offset
    }

    fn position(&self) -> Position {
        self.checkpoint().position()
    }
}

/// Stream over a [`Source`], in-memory text by default.
pub struct CharStream {
    source: Rc<dyn Source>,
    cursor: Cursor,
}

impl CharStream {
    pub fn new(text: impl Into<String>) -> CharStream {
        Self::from_source(Rc::new(Text::new(text)))
    }

    /// Stream the contents of a file, reading it as the parse goes.
    pub fn open(path: impl AsRef<Path>) -> Result<CharStream, StreamError> {
        Ok(Self::from_source(Rc::new(FileSource::open(path)?)))
    }

    pub fn from_source(source: Rc<dyn Source>) -> CharStream {
        CharStream {
            source,
            cursor: Cursor::default(),
        }
    }
}

impl Debug for CharStream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CharStream")
            .field("cursor", &self.cursor)
            .field("current", &self.current().ok().flatten())
            .finish()
    }
}

impl Stream for CharStream {
    fn begin(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    fn current(&self) -> Result<Option<char>, StreamError> {
        self.source.char_at(self.cursor.offset)
    }

    fn consume(&mut self) -> Result<Slice, StreamError> {
        let offset = self.cursor.offset;
        let c = self
            .source
            .char_at(offset)?
            .ok_or(StreamError::EndOfStream { offset })?;
        let slice = Slice::new(self.source.clone(), offset, 1);
        self.cursor.advance(c);
        Ok(slice)
    }

    fn seek(&mut self, offset: usize) -> Result<(), StreamError> {
        let cursor = Cursor::after(&self.source.cut(0, Some(offset))?);
        self.cursor = cursor;
        Ok(())
    }

    fn cut(&self, offset: usize, length: Option<usize>) -> Result<String, StreamError> {
        Ok(self.source.cut(offset, length)?.into_owned())
    }

    fn slice(&self, offset: usize, length: usize) -> Result<Slice, StreamError> {
        self.source.cut(offset, Some(length))?;
        Ok(Slice::new(self.source.clone(), offset, length))
    }

    fn checkpoint(&self) -> Cursor {
        self.cursor
    }

    fn restore(&mut self, cursor: Cursor) -> Result<(), StreamError> {
        self.cursor = cursor;
        Ok(())
    }
}

/// A speculative view of a parent stream.
///
/// Consuming through a transaction moves the parent's cursor. Calling
/// [`Transaction::commit`] keeps that progress; dropping the transaction
/// without committing puts the parent back where it was when the
/// transaction began. Transactions nest, since they are streams themselves.
///
/// ```
/// use spindle::{CharStream, Stream};
///
/// let mut stream = CharStream::new("ab");
/// {
///     let mut transaction = stream.begin();
///     transaction.consume().unwrap();
///     assert_eq!(transaction.offset(), 1);
/// }
/// assert_eq!(stream.offset(), 0);
///
/// let mut transaction = stream.begin();
/// transaction.consume().unwrap();
/// transaction.commit();
/// assert_eq!(stream.offset(), 1);
/// ```
pub struct Transaction<'a> {
    parent: &'a mut dyn Stream,
    base: Cursor,
    committed: bool,
}

impl<'a> Transaction<'a> {
    fn new(parent: &'a mut dyn Stream) -> Transaction<'a> {
        let base = parent.checkpoint();
        Transaction {
            parent,
            base,
            committed: false,
        }
    }

    /// Keep everything consumed through this transaction.
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Where the parent was when this transaction began.
    pub fn base(&self) -> Cursor {
        self.base
    }

    fn guard(&self, offset: usize) -> Result<(), StreamError> {
        if offset < self.base.offset {
            Err(StreamError::BeforeTransaction {
                offset,
                base: self.base.offset,
            })
        } else {
            Ok(())
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // Our base is never below the parent's own base.
            let _ = self.parent.restore(self.base);
        }
    }
}

impl Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("base", &self.base)
            .field("cursor", &self.parent.checkpoint())
            .finish()
    }
}

impl Stream for Transaction<'_> {
    fn begin(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    fn current(&self) -> Result<Option<char>, StreamError> {
        self.parent.current()
    }

    fn consume(&mut self) -> Result<Slice, StreamError> {
        self.parent.consume()
    }

    fn seek(&mut self, offset: usize) -> Result<(), StreamError> {
        self.guard(offset)?;
        self.parent.seek(offset)
    }

    fn cut(&self, offset: usize, length: Option<usize>) -> Result<String, StreamError> {
        self.parent.cut(offset, length)
    }

    fn slice(&self, offset: usize, length: usize) -> Result<Slice, StreamError> {
        self.parent.slice(offset, length)
    }

    fn checkpoint(&self) -> Cursor {
        self.parent.checkpoint()
    }

    fn restore(&mut self, cursor: Cursor) -> Result<(), StreamError> {
        self.guard(cursor.offset)?;
        self.parent.restore(cursor)
    }
}
