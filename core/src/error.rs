use std::io;

use thiserror::Error;

/// Broad class of a [`ReadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EndOfInput,
    Syntax,
    Precondition,
    MalformedLiteral,
    Io,
}

/// Every way a read can fail. Any of these aborts the whole read; the
/// source is left wherever the failure happened.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Input ran out inside a form, or before any form in strict mode.
    #[error("unexpected end of input")]
    EndOfInput,

    #[error("syntax error: unmatched ')'")]
    UnmatchedClose,

    #[error("syntax error: ':' must be followed by a symbol, found {found}")]
    KeywordNotSymbol { found: String },

    /// `unread` called twice without a `read` in between.
    #[error("cannot push back more than one character")]
    DoublePushback,

    /// `unread` called before anything was read from the source.
    #[error("unread without a preceding read")]
    UnreadBeforeRead,

    #[error("malformed integer literal '{text}'")]
    MalformedLiteral { text: String },

    #[error("i/o error while reading: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReadError::EndOfInput => ErrorKind::EndOfInput,
            ReadError::UnmatchedClose | ReadError::KeywordNotSymbol { .. } => ErrorKind::Syntax,
            ReadError::DoublePushback | ReadError::UnreadBeforeRead => ErrorKind::Precondition,
            ReadError::MalformedLiteral { .. } => ErrorKind::MalformedLiteral,
            ReadError::Io(_) => ErrorKind::Io,
        }
    }

    /// True when more input could still complete the form.
    ///
    /// `"(()"` is incomplete while `"())"` is simply wrong; an interactive
    /// caller can prompt for another line in the first case.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ReadError::EndOfInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_follow_variants() {
        assert_eq!(ReadError::EndOfInput.kind(), ErrorKind::EndOfInput);
        assert_eq!(ReadError::UnmatchedClose.kind(), ErrorKind::Syntax);
        assert_eq!(
            ReadError::KeywordNotSymbol {
                found: "1".to_string()
            }
            .kind(),
            ErrorKind::Syntax
        );
        assert_eq!(ReadError::DoublePushback.kind(), ErrorKind::Precondition);
        assert_eq!(ReadError::UnreadBeforeRead.kind(), ErrorKind::Precondition);
        assert_eq!(
            ReadError::MalformedLiteral {
                text: "-".to_string()
            }
            .kind(),
            ErrorKind::MalformedLiteral
        );
    }

    #[test]
    fn test_only_end_of_input_is_incomplete() {
        assert!(ReadError::EndOfInput.is_incomplete());
        assert!(!ReadError::UnmatchedClose.is_incomplete());
        assert!(!ReadError::DoublePushback.is_incomplete());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ReadError::MalformedLiteral {
                text: "12ab".to_string()
            }
            .to_string(),
            "malformed integer literal '12ab'"
        );
        assert_eq!(
            ReadError::KeywordNotSymbol {
                found: "1".to_string()
            }
            .to_string(),
            "syntax error: ':' must be followed by a symbol, found 1"
        );
    }

    #[test]
    fn test_pushback_messages_name_the_violation() {
        assert_eq!(
            ReadError::UnreadBeforeRead.to_string(),
            "unread without a preceding read"
        );
        assert_eq!(
            ReadError::DoublePushback.to_string(),
            "cannot push back more than one character"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: ReadError = io::Error::new(io::ErrorKind::InvalidData, "bad utf-8").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
