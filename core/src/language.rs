use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use crate::interner::InternedSymbol;

// ============================================================================
// Core Type System
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AtomType {
    Symbol(InternedSymbol),
    /// Keywords share the interner with symbols but are a separate value space:
    /// `:foo` never equals `foo`.
    Keyword(InternedSymbol),
    Number(i64),
    Bool(bool),
}

/// Immutable pair. Chains of cells ending in `Value::Nil` are lists.
///
/// Equality, hashing, `Debug` and drop walk the `cdr` chain iteratively, so
/// only nesting through `car` costs stack; list length never does.
#[derive(Clone)]
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// A syntax value produced by the reader.
#[derive(Clone, Debug)]
pub enum Value {
    Atom(AtomType),
    Cons(Arc<ConsCell>),
    /// Empty list, and the terminator of every proper list
    Nil,
    /// Returned by a tolerant top-level read that found no more content
    Eof,
}

impl Drop for ConsCell {
    fn drop(&mut self) {
        let mut tail = mem::replace(&mut self.cdr, Value::Nil);
        while let Value::Cons(cell) = tail {
            match Arc::try_unwrap(cell) {
                // The unwrapped cell drops with a `Nil` cdr, so this never recurses.
                Ok(mut owned) => tail = mem::replace(&mut owned.cdr, Value::Nil),
                // Someone else still holds the rest of the chain.
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            match (a, b) {
                (Value::Cons(x), Value::Cons(y)) => {
                    if Arc::ptr_eq(x, y) {
                        return true;
                    }
                    if x.car != y.car {
                        return false;
                    }
                    a = &x.cdr;
                    b = &y.cdr;
                }
                (Value::Atom(x), Value::Atom(y)) => return x == y,
                (Value::Nil, Value::Nil) | (Value::Eof, Value::Eof) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut current = self;
        loop {
            mem::discriminant(current).hash(state);
            match current {
                Value::Cons(cell) => {
                    cell.car.hash(state);
                    current = &cell.cdr;
                }
                Value::Atom(atom) => return atom.hash(state),
                Value::Nil | Value::Eof => return,
            }
        }
    }
}

impl PartialEq for ConsCell {
    fn eq(&self, other: &Self) -> bool {
        self.car == other.car && self.cdr == other.cdr
    }
}

impl Eq for ConsCell {}

impl Hash for ConsCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.car.hash(state);
        self.cdr.hash(state);
    }
}

impl fmt::Debug for ConsCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        list.entry(&self.car);
        let mut tail = &self.cdr;
        while let Value::Cons(cell) = tail {
            list.entry(&cell.car);
            tail = &cell.cdr;
        }
        if !matches!(tail, Value::Nil) {
            list.entry(&format_args!(". {tail:?}"));
        }
        list.finish()
    }
}

pub const NIL: Value = Value::Nil;
pub const TRUE: Value = Value::Atom(AtomType::Bool(true));
pub const FALSE: Value = Value::Atom(AtomType::Bool(false));
pub const EOF: Value = Value::Eof;

impl Value {
    pub fn symbol(name: &str) -> Value {
        Value::Atom(AtomType::Symbol(InternedSymbol::new(name)))
    }

    pub fn keyword(name: &str) -> Value {
        Value::Atom(AtomType::Keyword(InternedSymbol::new(name)))
    }

    pub fn int(n: i64) -> Value {
        Value::Atom(AtomType::Number(n))
    }

    /// Build a proper list holding `items` in order.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        items
            .into_iter()
            .rev()
            .fold(Value::Nil, |acc, val| cons(val, acc))
    }

    pub fn car(&self) -> Option<&Value> {
        match self {
            Value::Cons(cell) => Some(&cell.car),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<&Value> {
        match self {
            Value::Cons(cell) => Some(&cell.cdr),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<InternedSymbol> {
        match self {
            Value::Atom(AtomType::Symbol(sym)) => Some(*sym),
            _ => None,
        }
    }

    /// Name of a keyword, without the leading `:`
    pub fn as_keyword(&self) -> Option<InternedSymbol> {
        match self {
            Value::Atom(AtomType::Keyword(name)) => Some(*name),
            _ => None,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Value::Eof)
    }

    /// Walk the elements of a list. Stops at the first non-pair tail, so an
    /// improper tail is not yielded.
    pub fn iter(&self) -> ListIter<'_> {
        ListIter { current: self }
    }

    /// Collect a proper list into a vector, or `None` if `self` is not one.
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Value::Nil => return Some(items),
                Value::Cons(cell) => {
                    items.push(cell.car.clone());
                    current = &cell.cdr;
                }
                _ => return None,
            }
        }
    }
}

pub struct ListIter<'a> {
    current: &'a Value,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current {
            Value::Cons(cell) => {
                self.current = &cell.cdr;
                Some(&cell.car)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AtomType::Symbol(s) => write!(f, "{s}"),
            AtomType::Keyword(k) => write!(f, ":{k}"),
            AtomType::Number(n) => write!(f, "{n}"),
            AtomType::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Atom(atom) => write!(f, "{atom}"),
            Value::Nil => write!(f, "nil"),
            Value::Eof => write!(f, "#<eof>"),
            Value::Cons(_) => {
                write!(f, "(")?;
                let mut current = self;
                while let Value::Cons(cell) = current {
                    write!(f, "{}", cell.car)?;
                    match &cell.cdr {
                        Value::Nil => break,
                        Value::Cons(_) => {
                            write!(f, " ")?;
                            current = &cell.cdr;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// Primitive Operations
// ============================================================================

pub fn cons(car: Value, cdr: Value) -> Value {
    Value::Cons(Arc::new(ConsCell { car, cdr }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_order() {
        let list = Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert_eq!(list.car(), Some(&Value::int(1)));
        assert_eq!(
            list.to_vec(),
            Some(vec![Value::int(1), Value::int(2), Value::int(3)])
        );
    }

    #[test]
    fn test_empty_list_is_nil() {
        assert_eq!(Value::list(Vec::new()), NIL);
    }

    #[test]
    fn test_keyword_and_symbol_are_distinct() {
        assert_ne!(Value::keyword("foo"), Value::symbol("foo"));
        assert_eq!(Value::keyword("foo"), Value::keyword("foo"));
    }

    #[test]
    fn test_as_symbol_only_matches_symbols() {
        let sym = Value::symbol("name");
        assert_eq!(sym.as_symbol().map(|s| s.resolve()), Some("name".to_string()));
        assert_eq!(Value::keyword("name").as_symbol(), None);
        assert_eq!(Value::int(1).as_symbol(), None);
    }

    #[test]
    fn test_as_keyword_shares_symbol_name() {
        let kw = Value::keyword("name");
        assert_eq!(kw.as_keyword(), Value::symbol("name").as_symbol());
        assert_eq!(Value::symbol("name").as_keyword(), None);
    }

    #[test]
    fn test_long_list_equality_hash_and_drop() {
        use std::collections::hash_map::DefaultHasher;

        let build = || Value::list((0..300_000).map(Value::int).collect::<Vec<_>>());
        let (a, b) = (build(), build());
        assert_eq!(a, b);
        assert_ne!(a, cons(Value::int(-1), b.clone()));

        let digest = |v: &Value| {
            let mut hasher = DefaultHasher::new();
            v.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(digest(&a), digest(&b));
        assert!(format!("{a:?}").starts_with("Cons([Atom(Number(0))"));
        drop(a);
        drop(b);
    }

    #[test]
    fn test_shared_tail_survives_dropping_one_owner() {
        let tail = Value::list((0..10).map(Value::int).collect::<Vec<_>>());
        let head = cons(Value::symbol("h"), tail.clone());
        drop(head);
        assert_eq!(tail.iter().count(), 10);
    }

    #[test]
    fn test_eof_differs_from_nil_and_false() {
        assert_ne!(EOF, NIL);
        assert_ne!(EOF, FALSE);
        assert!(EOF.is_eof());
        assert!(!NIL.is_eof());
    }

    #[test]
    fn test_display_surface_syntax() {
        let list = Value::list(vec![
            Value::symbol("quote"),
            Value::keyword("k"),
            TRUE,
            NIL,
            Value::int(-4),
        ]);
        assert_eq!(list.to_string(), "(quote :k true nil -4)");
        assert_eq!(EOF.to_string(), "#<eof>");
    }

    #[test]
    fn test_display_improper_tail() {
        let pair = cons(Value::symbol("a"), Value::symbol("b"));
        assert_eq!(pair.to_string(), "(a . b)");
        assert_eq!(pair.to_vec(), None);
        assert_eq!(pair.iter().count(), 1);
    }

    #[test]
    fn test_values_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
    }
}
