//! Body container and collision pipeline wiring.
//!
//! Owns the registered bodies and the persistent broad-phase state, and
//! dispatches surviving candidate pairs to the narrow-phase engines.
//! Contacts flow out to an external constraint solver.

pub mod body;
pub mod world;

pub use body::Body;
pub use world::{Contact, World, DEFAULT_ENVELOPE};
