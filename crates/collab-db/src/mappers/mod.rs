//! Entity to model mappers
//!
//! This module provides conversions between domain entities (collab-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod channel;
mod message;
mod poll;
mod saved;

pub use channel::{ChannelInsert, MemberInsert};
pub use message::{ids, MessageInsert};
pub use poll::assemble_poll;
