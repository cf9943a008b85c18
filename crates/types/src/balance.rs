use core::fmt;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::felt::Felt;

const FRI_PER_STRK: f64 = 1e18;

/// A token balance in FRI, the smallest STRK unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance(BigUint);

impl Balance {
    /// Builds a balance from the `[low, high]` halves of a u256.
    pub fn from_u256(low: &Felt, high: &Felt) -> Self {
        let low = BigUint::from_bytes_be(&low.to_bytes_be());
        let high = BigUint::from_bytes_be(&high.to_bytes_be());
        Self((high << 128u32) + low)
    }

    pub fn fri(&self) -> &BigUint {
        &self.0
    }

    /// Approximate balance in STRK.
    pub fn strk(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::MAX) / FRI_PER_STRK
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} FRI ({:.6} STRK)", self.0, self.strk())
    }
}
