//! Domain layer: tree values and their shape descriptors
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod node;
pub mod spec;

pub use error::{TreeError, TreeResult};
pub use node::{PyTree, Tracked};
pub use spec::{NodeKind, TreeSpec};
