//! Conversions between field elements and the textual and integer forms
//! used on the wire.

use core::fmt::Write;

pub use starknet_crypto::Felt;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FeltError {
    #[error("invalid hex field element: {0:?}")]
    InvalidHex(String),

    #[error("field element {0} does not fit in {1} bits")]
    Overflow(String, u32),

    #[error("short string {0:?} is longer than 31 bytes")]
    ShortStringTooLong(String),
}

/// Renders a field element as a `0x`-prefixed hex string without leading zeros.
pub fn to_hex(felt: &Felt) -> String {
    let mut out = String::with_capacity(66);
    out.push_str("0x");

    let mut started = false;
    for byte in felt.to_bytes_be() {
        if started {
            let _ = write!(out, "{byte:02x}");
        } else if byte != 0 {
            let _ = write!(out, "{byte:x}");
            started = true;
        }
    }

    if !started {
        out.push('0');
    }

    out
}

/// Parses a hex string, with or without the `0x` prefix, into a field element.
pub fn from_hex(s: &str) -> Result<Felt, FeltError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.is_empty() || digits.len() > 64 {
        return Err(FeltError::InvalidHex(s.to_string()));
    }

    let mut bytes = [0u8; 32];
    for (i, c) in digits.chars().rev().enumerate() {
        let nibble = c
            .to_digit(16)
            .ok_or_else(|| FeltError::InvalidHex(s.to_string()))? as u8;

        bytes[31 - i / 2] |= nibble << ((i % 2) * 4);
    }

    Ok(Felt::from_bytes_be(&bytes))
}

/// Encodes an ASCII short string (at most 31 bytes) as a field element.
pub fn from_short_string(s: &str) -> Result<Felt, FeltError> {
    let raw = s.as_bytes();
    if raw.len() > 31 {
        return Err(FeltError::ShortStringTooLong(s.to_string()));
    }

    let mut bytes = [0u8; 32];
    bytes[32 - raw.len()..].copy_from_slice(raw);
    Ok(Felt::from_bytes_be(&bytes))
}

/// Decodes a field element holding a short string, dropping leading zero bytes.
pub fn to_short_string(felt: &Felt) -> String {
    felt.to_bytes_be()
        .iter()
        .skip_while(|b| **b == 0)
        .map(|b| char::from(*b))
        .collect()
}

pub fn to_u64(felt: &Felt) -> Result<u64, FeltError> {
    let bytes = felt.to_bytes_be();
    if bytes[..24].iter().any(|b| *b != 0) {
        return Err(FeltError::Overflow(to_hex(felt), 64));
    }

    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[24..]);
    Ok(u64::from_be_bytes(buf))
}

pub fn to_u128(felt: &Felt) -> Result<u128, FeltError> {
    let bytes = felt.to_bytes_be();
    if bytes[..16].iter().any(|b| *b != 0) {
        return Err(FeltError::Overflow(to_hex(felt), 128));
    }

    let mut buf = [0u8; 16];
    buf.copy_from_slice(&bytes[16..]);
    Ok(u128::from_be_bytes(buf))
}

/// Defines a `Copy` newtype over [`Felt`] rendered as hex in text and serde.
macro_rules! felt_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name(Felt);

        impl $name {
            pub const ZERO: Self = Self(Felt::ZERO);

            pub const fn new(felt: Felt) -> Self {
                Self(felt)
            }

            pub fn from_hex(s: &str) -> Result<Self, $crate::felt::FeltError> {
                $crate::felt::from_hex(s).map(Self)
            }

            pub fn as_felt(&self) -> &Felt {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == Felt::ZERO
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl From<Felt> for $name {
            fn from(felt: Felt) -> Self {
                Self(felt)
            }
        }

        impl From<$name> for Felt {
            fn from(value: $name) -> Felt {
                value.0
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::felt::FeltError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&$crate::felt::to_hex(&self.0))
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&$crate::felt::to_hex(&self.0))
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use felt_newtype;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_strips_leading_zeros() {
        let felt = from_hex("0x000000abc").unwrap();
        assert_eq!(to_hex(&felt), "0xabc");
        assert_eq!(to_hex(&Felt::ZERO), "0x0");
        assert_eq!(from_hex("abc").unwrap(), felt);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(from_hex("0x").is_err());
        assert!(from_hex("0xzz").is_err());
        assert!(from_hex(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn short_strings() {
        let felt = from_short_string("SN_MAIN").unwrap();
        assert_eq!(to_hex(&felt), "0x534e5f4d41494e");
        assert_eq!(to_short_string(&felt), "SN_MAIN");
        assert!(from_short_string(&"a".repeat(32)).is_err());
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(to_u64(&Felt::from(42u64)).unwrap(), 42);
        assert_eq!(to_u128(&Felt::from(u128::MAX)).unwrap(), u128::MAX);
        assert!(to_u64(&Felt::from(u128::MAX)).is_err());
    }
}
