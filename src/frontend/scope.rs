//! Persistent symbol tables for the semantic pass
//!
//! A `Scope` is an immutable snapshot. Extending it yields a new snapshot
//! that shares its parent, so a child scope never leaks names back into the
//! scope it was derived from.

use std::collections::HashMap;
use std::rc::Rc;

use crate::frontend::ast::Type;

#[derive(Debug)]
struct Frame {
    symbols: HashMap<String, Type>,
    parent: Option<Rc<Frame>>,
}

/// Name to type bindings visible at some point in the tree
#[derive(Debug, Clone, Default)]
pub struct Scope {
    frame: Option<Rc<Frame>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new snapshot with `bindings` layered over this one.
    /// A later binding shadows an earlier one with the same name.
    pub fn with<I>(&self, bindings: I) -> Scope
    where
        I: IntoIterator<Item = (String, Type)>,
    {
        let symbols: HashMap<String, Type> = bindings.into_iter().collect();
        if symbols.is_empty() {
            return self.clone();
        }

        Scope {
            frame: Some(Rc::new(Frame {
                symbols,
                parent: self.frame.clone(),
            })),
        }
    }

    /// Snapshot with a single extra binding
    pub fn bind(&self, name: impl Into<String>, ty: Type) -> Scope {
        self.with([(name.into(), ty)])
    }

    pub fn lookup(&self, name: &str) -> Option<&Type> {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            if let Some(ty) = f.symbols.get(name) {
                return Some(ty);
            }
            frame = f.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
