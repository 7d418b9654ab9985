//! The operator-precedence table (spec §4.2), shared between the parser
//! (which mutates it when it parses an operator declaration) and the
//! lowering pass (which only reads it, to tell a user-operator call apart
//! from a built-in).

use ksc_util::{FxHashMap, FxHashSet, Symbol};

/// `spelling -> precedence` for infix use, plus the set of spellings
/// declared as prefix (unary) operators.
///
/// Seeded with the four built-ins spec §3 requires always be present:
/// `=` at 2, `<` at 10, `+`/`-` at 20, `*` at 40.
pub struct OperatorTable {
    infix: FxHashMap<Symbol, i64>,
    prefix: FxHashSet<Symbol>,
}

impl OperatorTable {
    pub fn new(interner: &mut ksc_util::Interner) -> Self {
        let mut infix = FxHashMap::default();
        infix.insert(interner.intern("="), 2);
        infix.insert(interner.intern("<"), 10);
        infix.insert(interner.intern("+"), 20);
        infix.insert(interner.intern("-"), 20);
        infix.insert(interner.intern("*"), 40);
        Self {
            infix,
            prefix: FxHashSet::default(),
        }
    }

    /// Install (or overwrite) an infix precedence for `spelling`.
    pub fn install(&mut self, spelling: Symbol, precedence: i64) {
        self.infix.insert(spelling, precedence);
    }

    /// Declare `spelling` usable as a prefix operator.
    pub fn install_prefix(&mut self, spelling: Symbol) {
        self.prefix.insert(spelling);
    }

    /// The infix precedence of `spelling`, or `None` if it has never been
    /// installed - which the Pratt loop treats as "lower than any
    /// threshold" and uses to terminate (spec §3).
    pub fn lookup(&self, spelling: Symbol) -> Option<i64> {
        self.infix.get(&spelling).copied()
    }

    pub fn is_prefix(&self, spelling: Symbol) -> bool {
        self.prefix.contains(&spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksc_util::Interner;

    #[test]
    fn builtins_are_seeded() {
        let mut interner = Interner::new();
        let table = OperatorTable::new(&mut interner);
        let eq = interner.intern("=");
        let lt = interner.intern("<");
        let plus = interner.intern("+");
        let minus = interner.intern("-");
        let star = interner.intern("*");
        assert_eq!(table.lookup(eq), Some(2));
        assert_eq!(table.lookup(lt), Some(10));
        assert_eq!(table.lookup(plus), Some(20));
        assert_eq!(table.lookup(minus), Some(20));
        assert_eq!(table.lookup(star), Some(40));
    }

    #[test]
    fn unknown_spelling_is_none() {
        let mut interner = Interner::new();
        let table = OperatorTable::new(&mut interner);
        let unknown = interner.intern("~>");
        assert_eq!(table.lookup(unknown), None);
    }

    #[test]
    fn install_is_visible_to_subsequent_lookups() {
        let mut interner = Interner::new();
        let mut table = OperatorTable::new(&mut interner);
        let custom = interner.intern("|>");
        assert_eq!(table.lookup(custom), None);
        table.install(custom, 5);
        assert_eq!(table.lookup(custom), Some(5));
    }

    #[test]
    fn installed_precedence_is_never_silently_removed() {
        let mut interner = Interner::new();
        let mut table = OperatorTable::new(&mut interner);
        let plus = interner.intern("+");
        table.install(plus, 99);
        assert_eq!(table.lookup(plus), Some(99));
    }
}
