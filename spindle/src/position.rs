use std::fmt::{self, Display};

const FIRST_LINE: usize = 1;
const FIRST_COLUMN: usize = 0;

/// A line/column pair for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {} offset {}", self.line, self.column)
    }
}

/// Keep track of where a stream is, in code points, along with the line and
/// column of that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Cursor {
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Move past `c`. The column resets right after a newline.
    pub fn advance(&mut self, c: char) {
        self.offset += 1;
        if c == '\n' {
            self.line += 1;
            self.column = FIRST_COLUMN;
        } else {
            self.column += 1;
        }
    }

    /// Build the cursor sitting at the end of `prefix`.
    pub fn after(prefix: &str) -> Cursor {
        let mut cursor = Cursor::default();
        for c in prefix.chars() {
            cursor.advance(c);
        }
        cursor
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            offset: 0,
            line: FIRST_LINE,
            column: FIRST_COLUMN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_after_prefix() {
        let tests = vec![
            ("", 0, 1, 0),
            ("abc", 3, 1, 3),
            ("a\n", 2, 2, 0),
            ("a\nbc", 4, 2, 2),
            ("a\n\n😁", 4, 3, 1),
        ];
        for test in tests {
            let c = Cursor::after(test.0);
            assert_eq!(
                (c.offset, c.line, c.column),
                (test.1, test.2, test.3),
                "test case: {:?}",
                test
            );
        }
    }

    #[test]
    fn cursor_advance_multiple() {
        let mut c = Cursor::default();
        c.advance('a');
        c.advance('\n');
        c.advance('b');
        assert_eq!(c.position(), Position { line: 2, column: 1 }, "cursor: {:?}", c);
    }
}
