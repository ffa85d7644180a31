//! faxc-util - Shared infrastructure for the Fax C-subset compiler.
//!
//! Every other crate in the workspace depends on this one for:
//!
//! - [`symbol`]: interned identifiers/keywords (`Symbol`).
//! - [`index_vec`]: typed-index arenas (`IndexVec<I, T>`).
//! - [`diagnostic`]: the compiler's unified error/warning/success/important
//!   message shape.
//! - [`unique`]: the monotonic per-prefix name generator used to mint
//!   temporaries (`r1, r2, ...`) and basic-block labels (`_L1, _L2, ...`).
//!
//! None of these types carry source positions beyond what is needed for
//! error messages; the core data path (tokens, parse tree, IR) is
//! position-free per the data model.

pub mod diagnostic;
pub mod index_vec;
pub mod symbol;
pub mod unique;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use rustc_hash::{FxHashMap, FxHashSet};
pub use symbol::Symbol;
pub use unique::Unique;
