//! Value objects - immutable types that represent domain concepts

mod canonical_pair;
mod snowflake;

pub use canonical_pair::CanonicalPair;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
