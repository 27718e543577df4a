use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;

use crate::error::StreamError;
use crate::source::Source;

/// A region of consumed input. The text is only cut out of the source when
/// asked for.
#[derive(Clone)]
pub struct Slice {
    source: Rc<dyn Source>,
    offset: usize,
    length: usize,
}

impl Slice {
    pub(crate) fn new(source: Rc<dyn Source>, offset: usize, length: usize) -> Slice {
        Slice {
            source,
            offset,
            length,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Offset right after the last code point.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn text(&self) -> Result<Cow<'_, str>, StreamError> {
        self.source.cut(self.offset, Some(self.length))
    }

    /// Check if this slice covers the entirety of the other slice. Slices
    /// over different sources never contain each other.
    pub fn contains(&self, other: &Slice) -> bool {
        self.same_source(other) && self.offset <= other.offset && self.end() >= other.end()
    }

    fn same_source(&self, other: &Slice) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.source) as *const (),
            Rc::as_ptr(&other.source) as *const (),
        )
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.text().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Slice")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .field("text", &self.text().ok())
            .finish()
    }
}

impl PartialEq for Slice {
    fn eq(&self, other: &Slice) -> bool {
        match (self.text(), other.text()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
