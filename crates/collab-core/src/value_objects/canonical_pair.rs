//! Unordered pair of user ids, stored sorted
//!
//! Direct channels are keyed by this pair so that `(a, b)` and `(b, a)`
//! resolve to the same row.

use crate::error::DomainError;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    low: Snowflake,
    high: Snowflake,
}

impl CanonicalPair {
    /// Fails for a user paired with themselves.
    pub fn new(a: Snowflake, b: Snowflake) -> Result<Self, DomainError> {
        if a == b {
            return Err(DomainError::ValidationError(
                "a direct channel needs two distinct users".to_string(),
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    #[inline]
    pub fn low(&self) -> Snowflake {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Snowflake {
        self.high
    }

    pub fn contains(&self, user_id: Snowflake) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The participant that is not `user_id`
    pub fn other(&self, user_id: Snowflake) -> Option<Snowflake> {
        if self.low == user_id {
            Some(self.high)
        } else if self.high == user_id {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn members(&self) -> [Snowflake; 2] {
        [self.low, self.high]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_independent() {
        let a = Snowflake::new(20);
        let b = Snowflake::new(10);
        let ab = CanonicalPair::new(a, b).unwrap();
        let ba = CanonicalPair::new(b, a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.low(), b);
        assert_eq!(ab.high(), a);
    }

    #[test]
    fn test_self_pair_rejected() {
        let a = Snowflake::new(5);
        let err = CanonicalPair::new(a, a).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_other() {
        let pair = CanonicalPair::new(Snowflake::new(1), Snowflake::new(2)).unwrap();
        assert_eq!(pair.other(Snowflake::new(1)), Some(Snowflake::new(2)));
        assert_eq!(pair.other(Snowflake::new(3)), None);
        assert!(pair.contains(Snowflake::new(2)));
    }
}
