//! Domain types for the shield providers.
//!
//! This module contains the message shapes exchanged with the host and the
//! per-invocation decision artifacts.

mod message;
mod outcome;

pub use message::*;
pub use outcome::*;
