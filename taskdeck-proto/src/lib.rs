//! Shared type and wire-format definitions for TaskDeck.

pub mod identity;
pub mod task;
pub mod wire;
