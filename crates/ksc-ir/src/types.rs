//! The two result types the core ever needs (spec §4.5): every function
//! parameter and every intermediate value is `f64`; the only other type a
//! function can return is `i32`, and only `main` ever does (spec §4.4's
//! `Function` rule, spec §8's "Main signature" invariant).

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    F64,
    I32,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::F64 => write!(f, "double"),
            Type::I32 => write!(f, "i32"),
        }
    }
}
