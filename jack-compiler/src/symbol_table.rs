//! Class-level and subroutine-level symbol tables.
//!
//! Two scopes only: `static`/`field` live at class scope for the whole
//! class; `argument`/`local` live at subroutine scope and are wiped by
//! [`SymbolTable::start_subroutine`] between subroutines. Lookup checks
//! subroutine scope first, then falls back to class scope, matching Jack's
//! shadowing rules (a method's arguments and locals shadow class fields).

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub type_name: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    class_counts: [u16; 2],
    subroutine_counts: [u16; 2],
}

fn class_slot(kind: Kind) -> usize {
    match kind {
        Kind::Static => 0,
        Kind::Field => 1,
        _ => panic!("{kind:?} is not a class-scope kind"),
    }
}

fn subroutine_slot(kind: Kind) -> usize {
    match kind {
        Kind::Argument => 0,
        Kind::Local => 1,
        _ => panic!("{kind:?} is not a subroutine-scope kind"),
    }
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears argument/local scope and their counters. Class scope
    /// (static/field) is untouched — it lives for the whole class.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.subroutine_counts = [0, 0];
    }

    /// Defines a new symbol, returning the index assigned within its kind.
    pub fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> u16 {
        match kind {
            Kind::Static | Kind::Field => {
                let slot = class_slot(kind);
                let index = self.class_counts[slot];
                self.class_counts[slot] += 1;
                self.class_scope.insert(
                    name.to_string(),
                    Entry {
                        type_name: type_name.to_string(),
                        kind,
                        index,
                    },
                );
                index
            }
            Kind::Argument | Kind::Local => {
                let slot = subroutine_slot(kind);
                let index = self.subroutine_counts[slot];
                self.subroutine_counts[slot] += 1;
                self.subroutine_scope.insert(
                    name.to_string(),
                    Entry {
                        type_name: type_name.to_string(),
                        kind,
                        index,
                    },
                );
                index
            }
        }
    }

    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static | Kind::Field => self.class_counts[class_slot(kind)],
            Kind::Argument | Kind::Local => self.subroutine_counts[subroutine_slot(kind)],
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|e| e.kind)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|e| e.type_name.as_str())
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|e| e.index)
    }
}
