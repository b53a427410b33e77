//! LayerZero endpoint identifiers
//!
//! Every chain registered with LayerZero is addressed by a numeric endpoint
//! ID (EID) rather than its native chain id. Version 2 mainnet EIDs sit in
//! the 30xxx range and version 2 testnet EIDs in the 40xxx range; version 1
//! used small three to five digit values. EIDs come from the published
//! registry, so this is an open newtype rather than a closed enum.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// LayerZero endpoint identifier for a chain.
///
/// # Example
///
/// ```rust
/// use tix_ops::Eid;
///
/// let base_sepolia = Eid::new(40245);
/// assert_eq!(base_sepolia.as_u32(), 40245);
/// assert_eq!("40245".parse::<Eid>().unwrap(), base_sepolia);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Eid(u32);

impl Eid {
    /// Creates an EID from its numeric value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric EID value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Eid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Eid> for u32 {
    fn from(eid: Eid) -> Self {
        eid.0
    }
}

impl FromStr for Eid {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl fmt::Display for Eid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("40245", 40245)]
    #[case("30110", 30110)]
    #[case(" 40231 ", 40231)]
    fn parses_registry_strings(#[case] input: &str, #[case] expected: u32) {
        let eid: Eid = input.parse().unwrap();
        assert_eq!(eid.as_u32(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-1")]
    fn rejects_non_numeric_strings(#[case] input: &str) {
        assert!(input.parse::<Eid>().is_err());
    }

    #[test]
    fn displays_bare_number() {
        assert_eq!(Eid::new(40245).to_string(), "40245");
    }

    #[test]
    fn orders_numerically() {
        assert!(Eid::new(30110) < Eid::new(40245));
    }

    #[test]
    fn round_trips_through_u32() {
        let eid = Eid::from(30184u32);
        assert_eq!(u32::from(eid), 30184);
    }
}
