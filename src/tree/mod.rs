// =====================================================================
// File: tree/mod.rs
//
// Description:
//   Private engine module: one generic B-tree (`engine::Tree`) plus its
//   node storage (`node`) and cursor (`cursor`). Every public facade in
//   this crate wraps a `Tree`; only `Cursor` itself is re-exported.
// =====================================================================
pub(crate) mod cursor;
pub(crate) mod engine;
pub(crate) mod node;

pub use cursor::Cursor;
