//! Arbitrary-precision amounts used for gas prices, fees, and spend totals.
//!
//! Two external representations exist:
//!
//! - **text**: the chain's hex-quantity form (`0x0`, `0x2a`, ...), used on the
//!   JSON-RPC wire. Only the magnitude is encoded.
//! - **binary**: a storage form where byte 0 is a sign flag (`0` non-negative,
//!   `1` negative) followed by the big-endian magnitude with no leading zeros.
//!   An absent amount stores as an empty buffer, which reads back as zero.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Num, Signed, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClientError;

const SIGN_NON_NEGATIVE: u8 = 0;
const SIGN_NEGATIVE: u8 = 1;

/// Hex quantities on the wire are at most 256 bits.
const MAX_TEXT_DIGITS: usize = 64;

/// A signed integer of unbounded size.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigAmount(BigInt);

impl BigAmount {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn into_bigint(self) -> BigInt {
        self.0
    }

    /// Narrow to `u64`, returning `None` for negative or oversized values.
    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(&self.0).ok()
    }

    pub fn to_hex(&self) -> String {
        encode_text(self)
    }

    pub fn from_hex(text: &str) -> Result<Self, ClientError> {
        decode_text(text)
    }

    pub fn to_storage_bytes(&self) -> Vec<u8> {
        encode_binary(Some(self))
    }

    pub fn from_storage_bytes(bytes: &[u8]) -> Result<Self, ClientError> {
        decode_binary(bytes)
    }
}

/// Encode as `0x` followed by the minimal lowercase hex digits of `|v|`.
pub fn encode_text(v: &BigAmount) -> String {
    format!("0x{}", v.0.magnitude().to_str_radix(16))
}

/// Decode a `0x`-prefixed hex quantity.
///
/// Rejects the empty string, a missing prefix, a bare `0x`, leading zero
/// digits (other than `0x0` itself), non-hex characters, and values wider
/// than 256 bits.
pub fn decode_text(text: &str) -> Result<BigAmount, ClientError> {
    if text.is_empty() {
        return Err(ClientError::MalformedNumber("empty hex string".to_owned()));
    }
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| ClientError::MalformedNumber(format!("`{text}` is missing 0x prefix")))?;
    if digits.is_empty() {
        return Err(ClientError::MalformedNumber(format!(
            "`{text}` has no hex digits"
        )));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(ClientError::MalformedNumber(format!(
            "`{text}` has leading zero digits"
        )));
    }
    if digits.len() > MAX_TEXT_DIGITS {
        return Err(ClientError::MalformedNumber(format!(
            "`{text}` exceeds 256 bits"
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ClientError::MalformedNumber(format!(
            "`{text}` contains invalid hex digits"
        )));
    }

    let magnitude = BigUint::from_str_radix(digits, 16)
        .map_err(|e| ClientError::MalformedNumber(format!("`{text}`: {e}")))?;
    Ok(BigAmount(BigInt::from_biguint(Sign::Plus, magnitude)))
}

/// Encode for storage: empty for `None`, otherwise sign byte + magnitude.
pub fn encode_binary(v: Option<&BigAmount>) -> Vec<u8> {
    let Some(v) = v else {
        return Vec::new();
    };

    let sign = if v.is_negative() {
        SIGN_NEGATIVE
    } else {
        SIGN_NON_NEGATIVE
    };

    // `to_bytes_be` yields `[0]` for zero; storage keeps the magnitude empty.
    let magnitude = if v.is_zero() {
        Vec::new()
    } else {
        v.0.magnitude().to_bytes_be()
    };

    let mut out = Vec::with_capacity(magnitude.len() + 1);
    out.push(sign);
    out.extend_from_slice(&magnitude);
    out
}

/// Decode the storage form. An empty buffer and a lone sign byte both yield zero.
pub fn decode_binary(bytes: &[u8]) -> Result<BigAmount, ClientError> {
    let Some((&sign, magnitude)) = bytes.split_first() else {
        return Ok(BigAmount::zero());
    };

    let sign = match sign {
        SIGN_NON_NEGATIVE => Sign::Plus,
        SIGN_NEGATIVE => Sign::Minus,
        other => {
            return Err(ClientError::MalformedNumber(format!(
                "invalid sign byte {other:#04x}"
            )));
        }
    };

    let magnitude = BigUint::from_bytes_be(magnitude);
    Ok(BigAmount(BigInt::from_biguint(sign, magnitude)))
}

impl fmt::Display for BigAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BigAmount {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_text(s)
    }
}

impl From<BigInt> for BigAmount {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<u64> for BigAmount {
    fn from(value: u64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<i64> for BigAmount {
    fn from(value: i64) -> Self {
        Self(BigInt::from(value))
    }
}

impl Serialize for BigAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_text(self))
    }
}

impl<'de> Deserialize<'de> for BigAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        decode_text(&text).map_err(serde::de::Error::custom)
    }
}
