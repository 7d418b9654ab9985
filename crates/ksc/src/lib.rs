//! ksc - the facade spec §6 describes: turn source text into a verified,
//! optionally-optimized [`ksc_ir::Module`] in one call.
//!
//! `compile`/`compile_with` wire together every phase this workspace owns -
//! [`ksc_par::Parser`] over an [`ksc_lex::Lexer`], [`ksc_lower::lower_program`]
//! against a [`ksc_ir::ModuleBuilder`], then the fixed optimization pipeline
//! and structural verifier, one function at a time - so a caller never has
//! to know any of those crates exist.

use ksc_ir::{verify_function, ModuleBuilder};
use ksc_lower::{lower_program, LowerError};
use ksc_par::Parser;
use ksc_util::{Interner, Origin, Span};

pub use ksc_ir::{BasicBlock, Function, Inst, Module, Terminator, Type, Value};
pub use ksc_lower::Scope;

/// Knobs for one [`compile_with`] call. The only knob this core has is
/// whether the fixed five-pass pipeline (spec §4.4/§5) runs at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Everything that can stop a compile, unified across the three phases
/// that can each fail on their own (spec §7).
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum Error {
    /// The lexer could not make sense of a token (spec §7's `LexError`; spec
    /// §8 scenario 6's malformed-number case) - the parser surfaces this as
    /// soon as it reaches the `Token::Invalid` the lexer produced.
    #[error("{message} at {span:?}")]
    Lex { message: String, span: Span },

    /// A fatal diagnostic from the parser itself - a malformed top-level
    /// item that isn't a lexer failure (spec §7: the rest of the unit is
    /// discarded).
    #[error("{message} at {span:?}")]
    Parse { message: String, span: Span },

    /// Lowering or verification failed for one function; the rest of the
    /// module still lowered (spec §7's "drop only the offending
    /// function").
    #[error(transparent)]
    Lower(#[from] LowerError),
}

impl Error {
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lex { span, .. } | Error::Parse { span, .. } => Some(*span),
            Error::Lower(err) => err.span(),
        }
    }
}

/// The result of a successful [`compile`]: a verified [`Module`] paired
/// with the [`Interner`] that minted every `Symbol` inside it.
///
/// Spec §6's external surface - `Module::function(name)`,
/// `Function::arity()`/`return_type()`/`is_declaration()`, and the textual
/// dump - is described entirely in terms of plain strings; nothing downstream
/// of this facade should have to know `Symbol`/`Interner` exist. Bundling
/// the two here, instead of handing back a bare `Module` whose names a
/// caller has no way to resolve, is what makes that true: a [`Module`] alone
/// is meaningless once its `Interner` has been dropped.
pub struct CompiledModule {
    module: Module,
    interner: Interner,
}

impl CompiledModule {
    /// The underlying [`Module`], for a caller that wants to walk it
    /// directly (e.g. a downstream codegen/JIT collaborator, which works in
    /// terms of `FunctionId`s it already has rather than names).
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// The function named `name`, or `None` if no such function was
    /// declared or defined - spec §6's `Module::function(name)`, resolved
    /// by string instead of a caller-unreachable `Symbol`.
    pub fn function(&self, name: &str) -> Option<&Function> {
        let symbol = self.interner.get(name)?;
        self.module.function(symbol)
    }

    pub fn len(&self) -> usize {
        self.module.len()
    }

    pub fn is_empty(&self) -> bool {
        self.module.is_empty()
    }

    /// Render this module in the stable text format spec §6 requires for
    /// golden tests.
    pub fn dump(&self) -> String {
        ksc_ir::dump_module(&self.module, &self.interner)
    }

    /// Unwrap into the raw parts, for a caller that needs the `Interner`
    /// itself (e.g. to resolve a `Symbol` it got from walking `Function`'s
    /// `param_names`).
    pub fn into_parts(self) -> (Module, Interner) {
        (self.module, self.interner)
    }
}

/// Compile `source` with the default options (optimizations on).
pub fn compile(source: &str) -> Result<CompiledModule, Error> {
    compile_with(source, CompileOptions::default())
}

/// Compile `source`, producing a verified [`CompiledModule`].
///
/// Parse errors abort the whole compile (spec §7: a malformed top-level
/// item discards the rest of the unit). Past that point, a function that
/// fails to lower or to verify is dropped and reported, but every other
/// function in `source` still compiles - matching `ksc_lower`'s own
/// per-function recovery.
pub fn compile_with(source: &str, options: CompileOptions) -> Result<CompiledModule, Error> {
    let mut interner = Interner::new();
    let parser = Parser::new(source, &mut interner);
    let (items, handler) = parser.parse_program();

    if let Some(diagnostic) = handler.first_error() {
        return Err(match diagnostic.origin {
            Origin::Lex => Error::Lex {
                message: diagnostic.message.clone(),
                span: diagnostic.span,
            },
            Origin::Parse => Error::Parse {
                message: diagnostic.message.clone(),
                span: diagnostic.span,
            },
        });
    }

    let mut builder = ModuleBuilder::new();
    let lowered = lower_program(&items, &mut interner, &mut builder);
    if let Some(err) = lowered.errors.into_iter().next() {
        return Err(Error::Lower(err));
    }

    let mut module = builder.into_module();

    if options.optimize {
        for function in module.functions.as_mut_slice() {
            if !function.is_declaration() {
                ksc_ir::run_pipeline(function);
            }
        }
    }

    for (_, function) in module.iter() {
        verify_function(function, function.name, |symbol| {
            interner.resolve(symbol).to_string()
        })
        .map_err(LowerError::from)?;
    }

    Ok(CompiledModule { module, interner })
}
