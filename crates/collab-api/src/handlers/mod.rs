//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod channels;
pub mod directory;
pub mod dms;
pub mod events;
pub mod files;
pub mod health;
pub mod members;
pub mod messages;
pub mod polls;
pub mod presence;
pub mod quick_replies;
pub mod reactions;
pub mod read_state;
pub mod saved;
pub mod search;
