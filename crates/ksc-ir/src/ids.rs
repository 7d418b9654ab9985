//! Typed arena handles (spec §9: "cross-references ... as stable
//! indices/handles into the arena, never as owning links").

use ksc_util::index_vec::define_idx;

define_idx!(FunctionId);
define_idx!(BlockId);
define_idx!(InstId);
