//! Storage implementations of the service traits

pub mod in_memory;

pub use in_memory::{InMemoryPostService, InMemorySettingsStore, InMemoryUserService};
