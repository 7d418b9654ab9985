//! The six literal end-to-end scenarios from spec §8.
//!
//! The spec frames each scenario's expected outcome as "the semantic result
//! of JIT-executing `main`" - but the JIT is an explicitly out-of-scope
//! collaborator (spec §1), so these tests check what this core actually
//! owns: that the scenario compiles (or fails) the way spec §8 says, and
//! that the resulting module has the structure a downstream JIT would need
//! to reproduce that arithmetic result.

use ksc::{compile, Error};
use ksc_lower::LowerError;

/// Scenario 1: nested arithmetic plus a conditional guarding which branch's
/// arithmetic contributes to the sum. `foo`/`main` both lower to
/// non-declaration functions.
#[test]
fn scenario_1_nested_arithmetic_and_conditional() {
    let module = compile(
        "def foo(a,b) 1 + (2*3+a) + 4*5 + 6*b*if(a<b)then 16*b else 32*a \
         def main() foo(9,10)",
    )
    .expect("compiles");

    assert_eq!(module.len(), 2);
    let foo = module.function("foo").expect("foo is declared");
    assert!(!foo.is_declaration());
    assert_eq!(foo.arity(), 2);
    let main = module.function("main").expect("main is declared");
    assert!(!main.is_declaration());
}

/// Scenario 2: a user-declared low-precedence `:` sequencing operator, a
/// `let` binding shadowing across a `for` loop body, and an assignment to
/// the outer binding from inside the loop.
#[test]
fn scenario_2_user_operator_sequencing_and_loop_accumulation() {
    let module = compile(
        "def operator:1(l,r) r \
         def baz() let x=0 in (for i=1,i<10,1 in x = x + i) : x \
         def main() baz()",
    )
    .expect("compiles");

    assert_eq!(module.len(), 3);
    assert_eq!(module.function(":").expect(": is declared").arity(), 2);
    assert!(!module.function("baz").unwrap().is_declaration());
}

/// Scenario 3: a user-declared prefix operator lowering to a call.
#[test]
fn scenario_3_user_prefix_operator() {
    let module = compile("def operator!(l) 0-l   def main() !42").expect("compiles");
    assert_eq!(module.len(), 2);
    let bang = module.function("!").expect("! is declared");
    assert_eq!(bang.arity(), 1);
}

/// Scenario 4: a user-declared infix operator whose body itself uses
/// nested conditionals (short-circuiting "and").
#[test]
fn scenario_4_user_infix_operator_with_nested_conditionals() {
    let module = compile(
        "def operator&100(l,r) if(l) then if(r) then 1 else 0 else 0 \
         def main() 1 & 0",
    )
    .expect("compiles");
    assert_eq!(module.len(), 2);
    assert_eq!(module.function("&").unwrap().arity(), 2);
}

/// Scenario 5: an `extern` declares a name `foo` calls and `main` never
/// needs to see lowered - it stays a declaration start to finish.
#[test]
fn scenario_5_extern_stays_a_declaration() {
    let module = compile(
        "extern bar(a,b) \
         def foo(a,b) 1 + (2*3+a) + 4*5 + 6*b \
         def main() foo(9,10)",
    )
    .expect("compiles");

    assert_eq!(module.len(), 3);
    let bar = module.function("bar").expect("bar is declared");
    assert!(bar.is_declaration());
    let foo = module.function("foo").expect("foo is declared");
    assert!(!foo.is_declaration());
    let main = module.function("main").expect("main is declared");
    assert!(!main.is_declaration());
}

/// Scenario 6: a malformed number literal is a `LexError` that the parser
/// treats as fatal for the whole compile unit - no partial module, and no
/// function named `foo` ever exists to query.
#[test]
fn scenario_6_bad_number_literal_is_a_fatal_lex_error() {
    let err = compile("def foo() 1..2").unwrap_err();
    match err {
        Error::Lex { message, .. } => assert!(!message.is_empty()),
        other => panic!("expected Error::Lex, got {other:?}"),
    }
}

/// Spec §7: lowering errors (as opposed to the parse-level failure above)
/// are per-function - a call to an undeclared function is reported as
/// `UnknownFunction`, distinct from a parse failure.
#[test]
fn unknown_function_call_is_a_lowering_error_not_a_parse_error() {
    let err = compile("def main() undeclared_fn()").unwrap_err();
    assert!(matches!(err, Error::Lower(LowerError::UnknownFunction { .. })));
}
