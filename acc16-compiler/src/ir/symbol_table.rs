use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Storage slot, assigned in declaration order starting at 0
    pub slot: usize,
}

/// Flat (single-scope) table of declared variables.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Symbols indexed by slot number
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol, assigning it the next free slot.
    ///
    /// If the name is already declared the existing symbol is returned as
    /// `Err` and the table is left untouched.
    pub fn declare(&mut self, name: &str) -> Result<&Symbol, &Symbol> {
        if let Some(&slot) = self.by_name.get(name) {
            return Err(&self.symbols[slot]);
        }
        let slot = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            slot,
        });
        self.by_name.insert(name.to_string(), slot);
        Ok(&self.symbols[slot])
    }

    /// Lookup a symbol by name
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&slot| &self.symbols[slot])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_declaration_order() {
        let mut table = SymbolTable::new();
        for name in ["x", "y", "z"] {
            table.declare(name).unwrap();
        }
        let slots: Vec<_> = table.iter().map(|s| (s.name.as_str(), s.slot)).collect();
        assert_eq!(slots, vec![("x", 0), ("y", 1), ("z", 2)]);
    }

    #[test]
    fn redeclaration_returns_existing_symbol() {
        let mut table = SymbolTable::new();
        table.declare("a").unwrap();
        table.declare("b").unwrap();
        let existing = table.declare("a").unwrap_err();
        assert_eq!(existing.slot, 0);
        assert_eq!(table.len(), 2);
    }
}
