//! Type definitions for intake storage.

mod form;
mod history;
mod ids;
mod invitations;

// Re-export all types from submodules
pub use form::*;
pub use history::*;
pub use ids::*;
pub use invitations::*;
