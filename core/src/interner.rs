use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

/// Backing table for every symbol and keyword name the reader produces.
static INTERNER: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// Head symbol of every `'x` expansion, interned once.
static QUOTE: Lazy<InternedSymbol> = Lazy::new(|| InternedSymbol::new("quote"));

/// A name that has been interned in the global string interner.
///
/// Two handles compare equal exactly when they were created from the same
/// text, so symbol comparison never touches the string data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    /// Intern a string and return its handle
    pub fn new(s: &str) -> Self {
        let mut interner = INTERNER.write().unwrap_or_else(PoisonError::into_inner);
        InternedSymbol(interner.get_or_intern(s))
    }

    /// The `quote` symbol the quote reader wraps its item in
    pub fn quote() -> Self {
        *QUOTE
    }

    /// Resolve the handle back to an owned copy of its text
    pub fn resolve(&self) -> String {
        self.with_str(str::to_string)
    }

    /// Run `f` against the interned text without allocating
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let interner = INTERNER.read().unwrap_or_else(PoisonError::into_inner);
        // Handles are only minted by `new`, and the interner never forgets.
        let s = interner
            .resolve(self.0)
            .expect("interned symbol missing from interner");
        f(s)
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "{s}"))
    }
}
