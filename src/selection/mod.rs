//! Selection store: the single owner of the category -> item mapping.
//!
//! Rule components never mutate the mapping themselves. They are registered
//! as [`SelectionHook`]s and the store runs them synchronously after every
//! `set`, committing only writes that change the state. Callers therefore
//! never observe a half-derived selection.

mod store;
mod types;

pub use store::SelectionStore;
pub use types::*;
