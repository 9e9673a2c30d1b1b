//! Character sources the reader pulls from.
//!
//! The reader needs exactly one character of lookahead, so a source only has
//! to support `read` and a single-slot `unread`. Anything that can do that
//! (an in-memory buffer, a blocking stream, a socket) can sit behind
//! [`CharSource`].

use std::io::{self, BufRead};
use std::iter::Map;
use std::vec;

use crate::error::ReadError;

pub trait CharSource {
    /// Next character, or `Ok(None)` once the input is exhausted.
    fn read(&mut self) -> Result<Option<char>, ReadError>;

    /// Push `ch` back so the next `read` returns it. At most one character
    /// may be pending; a second `unread` without a `read` in between fails
    /// with [`ReadError::DoublePushback`].
    fn unread(&mut self, ch: char) -> Result<(), ReadError>;
}

// ============================================================================
// Buffer-backed source
// ============================================================================

pub struct StringSource {
    input: Vec<char>,
    position: usize,
    pushed_back: bool,
}

impl StringSource {
    pub fn new(input: &str) -> Self {
        StringSource {
            input: input.chars().collect(),
            position: 0,
            pushed_back: false,
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }
}

impl From<&str> for StringSource {
    fn from(input: &str) -> Self {
        StringSource::new(input)
    }
}

impl CharSource for StringSource {
    fn read(&mut self) -> Result<Option<char>, ReadError> {
        self.pushed_back = false;
        if self.is_eof() {
            return Ok(None);
        }
        let ch = self.input[self.position];
        self.position += 1;
        Ok(Some(ch))
    }

    fn unread(&mut self, ch: char) -> Result<(), ReadError> {
        if self.pushed_back {
            return Err(ReadError::DoublePushback);
        }
        if self.position == 0 {
            return Err(ReadError::UnreadBeforeRead);
        }
        self.position -= 1;
        debug_assert_eq!(self.input[self.position], ch, "unread of a character never read");
        self.pushed_back = true;
        Ok(())
    }
}

// ============================================================================
// Stream-backed source
// ============================================================================

/// Wraps a blocking stream of decoded characters with one pushback slot.
pub struct StreamSource<I> {
    chars: I,
    pushback: Option<char>,
}

impl<I> StreamSource<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    pub fn new(chars: I) -> Self {
        StreamSource {
            chars,
            pushback: None,
        }
    }
}

impl<I> StreamSource<Map<I, fn(char) -> io::Result<char>>>
where
    I: Iterator<Item = char>,
{
    /// Adapt an infallible character iterator.
    pub fn from_chars(chars: I) -> Self {
        StreamSource::new(chars.map(Ok as fn(char) -> io::Result<char>))
    }
}

impl<R: BufRead> StreamSource<Utf8Chars<R>> {
    pub fn from_reader(reader: R) -> Self {
        StreamSource::new(Utf8Chars::new(reader))
    }
}

impl<I> CharSource for StreamSource<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    fn read(&mut self) -> Result<Option<char>, ReadError> {
        if let Some(ch) = self.pushback.take() {
            return Ok(Some(ch));
        }
        match self.chars.next() {
            Some(Ok(ch)) => Ok(Some(ch)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    fn unread(&mut self, ch: char) -> Result<(), ReadError> {
        if self.pushback.is_some() {
            return Err(ReadError::DoublePushback);
        }
        self.pushback = Some(ch);
        Ok(())
    }
}

/// Decodes a byte reader into characters one line at a time.
///
/// Blocks whenever the underlying reader does. Invalid UTF-8 is reported as
/// an `InvalidData` error and ends the iteration.
pub struct Utf8Chars<R> {
    reader: R,
    pending: vec::IntoIter<char>,
    done: bool,
}

impl<R: BufRead> Utf8Chars<R> {
    pub fn new(reader: R) -> Self {
        Utf8Chars {
            reader,
            pending: Vec::new().into_iter(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Utf8Chars<R> {
    type Item = io::Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ch) = self.pending.next() {
                return Some(Ok(ch));
            }
            if self.done {
                return None;
            }
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => self.pending = line.chars().collect::<Vec<_>>().into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
