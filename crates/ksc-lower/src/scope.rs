//! The named-value scope spec §3 describes: source name -> IR storage
//! location, shadowed on entry to a `Let`/`For` body and restored on exit.
//!
//! Every binding this core ever introduces (a function parameter, a `let`
//! binding, a `for` induction variable) is a stack slot - a `Value`
//! produced by `build_alloca` - never the raw value itself, since `=` must
//! be able to rewrite it later (spec §4.4's stack-slot promotion scheme).

use ksc_util::{FxHashMap, Symbol};

use ksc_ir::Value;

#[derive(Default)]
pub struct Scope {
    frames: Vec<FxHashMap<Symbol, Value>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Open a new shadowing frame (spec §3: "shadowed on entry to `Let`
    /// and `For` bodies").
    pub fn push_frame(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Close the innermost frame (spec §3: "restored on exit").
    pub fn pop_frame(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the outermost scope frame");
    }

    pub fn bind(&mut self, name: Symbol, slot: Value) {
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .insert(name, slot);
    }

    /// The innermost binding of `name`, if any - frames are searched from
    /// innermost to outermost so a `let`/`for` shadow wins over an outer
    /// binding of the same spelling.
    pub fn lookup(&self, name: Symbol) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(&name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksc_ir::InstId;
    use ksc_util::Interner;

    fn slot(n: u32) -> Value {
        Value::Inst(InstId(n))
    }

    #[test]
    fn inner_frame_shadows_outer_binding() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut scope = Scope::new();
        scope.bind(x, slot(1));
        scope.push_frame();
        scope.bind(x, slot(2));
        assert_eq!(scope.lookup(x), Some(slot(2)));
        scope.pop_frame();
        assert_eq!(scope.lookup(x), Some(slot(1)));
    }

    #[test]
    fn unbound_name_is_none() {
        let mut interner = Interner::new();
        let y = interner.intern("y");
        let scope = Scope::new();
        assert_eq!(scope.lookup(y), None);
    }
}
