//! Serde adapters for base-unit token amounts.
//!
//! The aggregator sends amounts as decimal strings so values above 2^53 survive
//! JSON. These adapters keep them as `u64` in memory and as strings on the wire.

use serde::{de, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(u64),
}

fn parse<E: de::Error>(raw: RawAmount) -> Result<u64, E> {
    match raw {
        RawAmount::Number(n) => Ok(n),
        RawAmount::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| E::custom(format!("invalid base-unit amount '{}': {}", s, e))),
    }
}

pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    parse(RawAmount::deserialize(deserializer)?)
}

/// Same as the parent module, for fields the aggregator may omit or null out.
pub mod option {
    use super::{parse, RawAmount};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawAmount>::deserialize(deserializer)? {
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }
}
