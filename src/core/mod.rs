//! Core data model: the grain record and its index-addressed store.

pub mod grain;
pub mod store;

pub use grain::Grain;
pub use store::GrainStore;
