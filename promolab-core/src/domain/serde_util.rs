//! Field deserializers for the campaign file.
//!
//! Numeric columns may be written as integers or floats (`4` or `4.0`).
//! Identifier and count columns accept either form as long as the value is
//! a whole number that fits the target type.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Unexpected, Visitor};

use super::ids::{LocationId, MarketId, Promotion};

struct WholeNumber<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for WholeNumber<T>
where
    T: TryFrom<u64>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative whole number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &"a smaller whole number"))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        match u64::try_from(v) {
            Ok(n) => self.visit_u64(n),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<T, E> {
        // 2^64 as f64; anything at or above it cannot be a u64.
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < 18_446_744_073_709_551_616.0 {
            self.visit_u64(v as u64)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        let trimmed = v.trim();
        if let Ok(n) = trimmed.parse::<u64>() {
            return self.visit_u64(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => self.visit_f64(f),
            Err(_) => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}

/// Whole number written as an integer or an integral float.
pub(crate) fn whole<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    deserializer.deserialize_any(WholeNumber(PhantomData))
}

pub(crate) fn promotion<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Promotion, D::Error> {
    whole(deserializer).map(Promotion)
}

pub(crate) fn market_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MarketId, D::Error> {
    whole(deserializer).map(MarketId)
}

pub(crate) fn location_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LocationId, D::Error> {
    whole(deserializer).map(LocationId)
}
