use std::fmt::Display;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use thiserror::Error;

/// The finest resolution an [`Amount`] can represent, in decimal places.
pub const MAX_DECIMAL_PLACES: usize = 2;

// Amounts larger than this lose cent precision when round-tripped through an f64.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_991.0;

//--------------------------------------       Amount        ---------------------------------------------------------
/// A fixed-point monetary amount, stored as a whole number of hundredths.
///
/// On the wire, amounts are plain JSON numbers (`10.5`, `12`, `0.01`), which is what browser clients send. Whole
/// amounts serialize as integers so that `12` does not come back as `12.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountConversionError {
    #[error("Amount can have at most {MAX_DECIMAL_PLACES} decimal places, but {0} were given")]
    TooPrecise(usize),
    #[error("Value cannot be represented as an amount: {0}")]
    OutOfRange(String),
}

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Convert a JSON number into an amount. Numbers with more than [`MAX_DECIMAL_PLACES`] fractional digits are
    /// rejected rather than rounded.
    pub fn from_number(n: &Number) -> Result<Self, AmountConversionError> {
        let places = decimal_places(n);
        if places > MAX_DECIMAL_PLACES {
            return Err(AmountConversionError::TooPrecise(places));
        }
        if let Some(whole) = n.as_i64() {
            return whole.checked_mul(100).map(Self).ok_or_else(|| AmountConversionError::OutOfRange(n.to_string()));
        }
        let value = n.as_f64().ok_or_else(|| AmountConversionError::OutOfRange(n.to_string()))?;
        let cents = (value * 100.0).round();
        if !cents.is_finite() || cents.abs() > MAX_EXACT_CENTS {
            return Err(AmountConversionError::OutOfRange(n.to_string()));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }
}

impl From<i64> for Amount {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            #[allow(clippy::cast_precision_loss)]
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        let n = Number::deserialize(deserializer)?;
        Amount::from_number(&n).map_err(de::Error::custom)
    }
}

/// The number of significant fractional digits in a JSON number, as a client would have written it.
///
/// serde_json renders floats in their shortest round-trip form, so `10.10` becomes `10.1` and `0.001` stays `0.001`.
/// Exponent notation (`1.25e-1`) is taken into account.
pub fn decimal_places(n: &Number) -> usize {
    let repr = n.to_string();
    let (mantissa, exponent) = match repr.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&repr[..i], repr[i + 1..].parse::<i64>().unwrap_or(0)),
        None => (repr.as_str(), 0),
    };
    let fraction = mantissa.split_once('.').map(|(_, f)| f.trim_end_matches('0').len()).unwrap_or(0);
    #[allow(clippy::cast_possible_wrap)]
    let places = fraction as i64 - exponent;
    usize::try_from(places).unwrap_or(0)
}
