//! Reader for the consread Lisp surface syntax
//!
//! Turns characters into syntax values: lists, symbols, keywords, integers,
//! booleans, `nil` and an end-of-input marker. Evaluation lives elsewhere;
//! this crate only reads.

pub mod error;
pub mod interner;
pub mod language;
pub mod reader;
pub mod source;

// Re-export commonly used items for convenience
pub use error::{ErrorKind, ReadError};
pub use interner::InternedSymbol;
pub use language::{AtomType, ConsCell, EOF, FALSE, NIL, TRUE, Value, cons};
pub use reader::{MacroHandler, forms, read, read_all, read_str, read_stream};
pub use source::{CharSource, StreamSource, StringSource, Utf8Chars};
