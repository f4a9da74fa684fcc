use std::fmt;

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A binary consensus value, or the marker for "no majority seen".
///
/// On the wire `Zero` and `One` are the JSON numbers `0` and `1`, and
/// `Undecided` is the string `"?"`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum Value {
    Zero,
    One,
    Undecided,
}

impl Value {
    /// Whether this is one of the two decidable bits.
    pub fn is_bit(&self) -> bool {
        !matches!(self, Value::Undecided)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Zero => f.write_str("0"),
            Value::One => f.write_str("1"),
            Value::Undecided => f.write_str("?"),
        }
    }
}

/// Sampling a [`Value`] yields a uniform bit, never [`Value::Undecided`].
impl Distribution<Value> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        if rng.gen::<bool>() {
            Value::One
        } else {
            Value::Zero
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid consensus value `{0}`, expected 0, 1 or \"?\"")]
pub struct InvalidValue(pub String);

impl TryFrom<u8> for Value {
    type Error = InvalidValue;

    fn try_from(bit: u8) -> Result<Self, Self::Error> {
        match bit {
            0 => Ok(Value::Zero),
            1 => Ok(Value::One),
            other => Err(InvalidValue(other.to_string())),
        }
    }
}

impl std::str::FromStr for Value {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Value::Zero),
            "1" => Ok(Value::One),
            "?" => Ok(Value::Undecided),
            other => Err(InvalidValue(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bit(u8),
    Symbol(String),
}

impl TryFrom<RawValue> for Value {
    type Error = InvalidValue;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Bit(bit) => Value::try_from(bit),
            RawValue::Symbol(symbol) => symbol.parse(),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Zero => RawValue::Bit(0),
            Value::One => RawValue::Bit(1),
            Value::Undecided => RawValue::Symbol("?".to_string()),
        }
    }
}
