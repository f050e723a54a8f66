//! Short-lived conversation context for the chat gateway.
//!
//! A [`ConversationStore`] maps a three-character code to the last answer
//! given in that conversation. Entries older than [`EXPIRATION_WINDOW`] are
//! removed by [`ConversationStore::sweep`], which [`spawn_sweeper`] runs on a
//! fixed period until shutdown.

mod store;
mod sweeper;

pub use store::{CODE_LEN, ConversationStore, EXPIRATION_WINDOW};
pub use sweeper::{DEFAULT_SWEEP_PERIOD, spawn_sweeper};
