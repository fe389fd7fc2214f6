// kiwi-common - Shared types for the KiwiStore line protocol
//
// Endpoint validation and command encoding; no I/O lives here.

pub mod command;
pub mod endpoint;
pub mod error;

// Re-export for convenience
pub use command::*;
pub use endpoint::*;
pub use error::*;
