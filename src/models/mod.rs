//! Data models for the pickup basketball game listing service.
//!
//! Field names serialize in camelCase to match the web client.

mod game;
mod identity;
mod meta;

pub use game::*;
pub use identity::*;
pub use meta::*;
