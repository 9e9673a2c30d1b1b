//! Single-pass reader.
//!
//! [`read`] skips whitespace, pulls one character and either hands control to
//! the handler registered for that character or accumulates a number/symbol
//! token. Handlers call back into [`read`] for nested forms, so list, quote
//! and keyword nesting is plain recursion over one shared [`CharSource`].

use std::io;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::error::ReadError;
use crate::interner::InternedSymbol;
use crate::language::{AtomType, FALSE, NIL, TRUE, Value};
use crate::source::{CharSource, StreamSource, StringSource};

// ============================================================================
// Character Classes
// ============================================================================

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | ',')
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Characters that end a token: whitespace and every dispatch trigger.
pub fn is_terminator(ch: char) -> bool {
    is_whitespace(ch) || MacroHandler::for_char(ch).is_some()
}

/// Consume whitespace and push back the first other character.
///
/// Fails with [`ReadError::EndOfInput`] if the source runs dry first, so the
/// caller can tell "nothing left" from "a form starts here".
pub fn eat_whitespace<S>(src: &mut S) -> Result<(), ReadError>
where
    S: CharSource + ?Sized,
{
    loop {
        match src.read()? {
            Some(ch) if is_whitespace(ch) => continue,
            Some(ch) => return src.unread(ch),
            None => return Err(ReadError::EndOfInput),
        }
    }
}

// ============================================================================
// Dispatch Table
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroHandler {
    List,
    UnmatchedClose,
    Quote,
    Keyword,
}

static HANDLERS: Lazy<FxHashMap<char, MacroHandler>> = Lazy::new(|| {
    FxHashMap::from_iter([
        ('(', MacroHandler::List),
        (')', MacroHandler::UnmatchedClose),
        ('\'', MacroHandler::Quote),
        (':', MacroHandler::Keyword),
    ])
});

impl MacroHandler {
    pub fn for_char(ch: char) -> Option<MacroHandler> {
        HANDLERS.get(&ch).copied()
    }

    /// Run the handler; `trigger` has already been consumed from `src`.
    pub fn invoke<S>(self, src: &mut S, trigger: char) -> Result<Value, ReadError>
    where
        S: CharSource + ?Sized,
    {
        tracing::trace!(handler = ?self, %trigger, "dispatch");
        match self {
            MacroHandler::List => read_list(src),
            MacroHandler::UnmatchedClose => Err(ReadError::UnmatchedClose),
            MacroHandler::Quote => read_quote(src),
            MacroHandler::Keyword => read_keyword(src),
        }
    }
}

fn read_list<S>(src: &mut S) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    let mut items = Vec::new();
    loop {
        eat_whitespace(src)?;
        match src.read()? {
            Some(')') => return Ok(Value::list(items)),
            Some(ch) => {
                src.unread(ch)?;
                items.push(read(src, true)?);
            }
            // eat_whitespace just pushed a character back
            None => return Err(ReadError::EndOfInput),
        }
    }
}

fn read_quote<S>(src: &mut S) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    let item = read(src, true)?;
    let quote = Value::Atom(AtomType::Symbol(InternedSymbol::quote()));
    Ok(Value::list([quote, item]))
}

fn read_keyword<S>(src: &mut S) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    match read(src, true)? {
        Value::Atom(AtomType::Symbol(sym)) => Ok(Value::Atom(AtomType::Keyword(sym))),
        other => Err(ReadError::KeywordNotSymbol {
            found: other.to_string(),
        }),
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// Accumulate `first` and every following character up to end of input or a
/// terminator. The terminator is pushed back for the next read.
fn read_token<S>(src: &mut S, first: char) -> Result<String, ReadError>
where
    S: CharSource + ?Sized,
{
    let mut token = String::from(first);
    while let Some(ch) = src.read()? {
        if is_terminator(ch) {
            src.unread(ch)?;
            break;
        }
        token.push(ch);
    }
    tracing::trace!(%token, "token");
    Ok(token)
}

fn read_number<S>(src: &mut S, first: char) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    let text = read_token(src, first)?;
    match text.parse::<i64>() {
        Ok(n) => Ok(Value::int(n)),
        Err(_) => Err(ReadError::MalformedLiteral { text }),
    }
}

fn read_symbol<S>(src: &mut S, first: char) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    let text = read_token(src, first)?;
    Ok(match text.as_str() {
        "true" => TRUE,
        "false" => FALSE,
        "nil" => NIL,
        name => Value::symbol(name),
    })
}

// ============================================================================
// Entry Points
// ============================================================================

/// Read one form from `src`.
///
/// With `error_on_eof` unset, running out of input before a form starts
/// yields [`Value::Eof`] instead of [`ReadError::EndOfInput`]. Running out
/// inside a form is always an error.
pub fn read<S>(src: &mut S, error_on_eof: bool) -> Result<Value, ReadError>
where
    S: CharSource + ?Sized,
{
    match eat_whitespace(src) {
        Ok(()) => {}
        Err(ReadError::EndOfInput) if !error_on_eof => return Ok(Value::Eof),
        Err(e) => return Err(e),
    }

    let Some(ch) = src.read()? else {
        return Err(ReadError::EndOfInput);
    };

    if let Some(handler) = MacroHandler::for_char(ch) {
        return handler.invoke(src, ch);
    }

    // A lone '-' or '-foo' lands here too and fails as a malformed literal.
    if is_digit(ch) || ch == '-' {
        return read_number(src, ch);
    }

    read_symbol(src, ch)
}

/// Read one form from an in-memory string.
pub fn read_str(input: &str, error_on_eof: bool) -> Result<Value, ReadError> {
    let result = read(&mut StringSource::new(input), error_on_eof);
    if let Err(e) = &result {
        tracing::debug!(error = %e, "read failed");
    }
    result
}

/// Read one form from a stream session. The session keeps its pushback slot
/// between calls, so successive calls see every character exactly once.
pub fn read_stream<I>(src: &mut StreamSource<I>, error_on_eof: bool) -> Result<Value, ReadError>
where
    I: Iterator<Item = io::Result<char>>,
{
    read(src, error_on_eof)
}

/// Read forms until the input is exhausted.
pub fn read_all<S>(src: &mut S) -> Result<Vec<Value>, ReadError>
where
    S: CharSource + ?Sized,
{
    forms(src).collect()
}

/// Iterate over the forms in `src`, stopping at end of input or after the
/// first error.
pub fn forms<S>(src: &mut S) -> Forms<'_, S>
where
    S: CharSource + ?Sized,
{
    Forms { src, done: false }
}

pub struct Forms<'a, S: ?Sized> {
    src: &'a mut S,
    done: bool,
}

impl<S> Iterator for Forms<'_, S>
where
    S: CharSource + ?Sized,
{
    type Item = Result<Value, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read(&mut *self.src, false) {
            Ok(Value::Eof) => {
                self.done = true;
                None
            }
            Ok(value) => Some(Ok(value)),
            Err(e) => {
                tracing::debug!(error = %e, "read failed");
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
