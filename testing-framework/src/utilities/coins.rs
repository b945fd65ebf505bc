// File: testing-framework/src/utilities/coins.rs
//
// Serde helpers for coin amounts in YAML files
//
// Amounts are written as decimal coin strings ("0.2", "1_000") or whole
// coin integers (1000) and held as nano units.

use nft_common::utils::{from_nano, to_nano};
use serde::{de, Deserialize, Deserializer, Serializer};

use nft_common::config::COIN_VALUE;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Whole(u64),
    Text(String),
}

impl RawAmount {
    fn into_nano<E: de::Error>(self) -> Result<u128, E> {
        match self {
            RawAmount::Whole(coins) => (coins as u128)
                .checked_mul(COIN_VALUE)
                .ok_or_else(|| E::custom(format!("amount overflow: {}", coins))),
            RawAmount::Text(text) => to_nano(&text).map_err(E::custom),
        }
    }
}

/// Serialize nano units as a decimal coin string
pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&from_nano(*value))
}

/// Deserialize a coin string or whole coin integer into nano units
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
    RawAmount::deserialize(deserializer)?.into_nano()
}

/// Same as this module, for optional amounts
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&from_nano(*value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u128>, D::Error> {
        Option::<RawAmount>::deserialize(deserializer)?
            .map(RawAmount::into_nano)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super")]
        value: u128,
        #[serde(default, with = "super::option")]
        limit: Option<u128>,
    }

    #[test]
    fn test_decimal_and_whole_amounts() {
        let holder: Holder = serde_yaml::from_str("value: \"0.2\"").unwrap();
        assert_eq!(holder.value, 200_000_000);
        assert_eq!(holder.limit, None);

        let holder: Holder = serde_yaml::from_str("value: 3\nlimit: \"1_000\"").unwrap();
        assert_eq!(holder.value, 3_000_000_000);
        assert_eq!(holder.limit, Some(1_000_000_000_000));
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert!(serde_yaml::from_str::<Holder>("value: \"abc\"").is_err());
        assert!(serde_yaml::from_str::<Holder>("value: \"0.0000000001\"").is_err());
    }

    #[test]
    fn test_serializes_as_coin_string() {
        let holder = Holder {
            value: 1_500_000_000,
            limit: None,
        };
        let yaml = serde_yaml::to_string(&holder).unwrap();
        assert!(yaml.contains("1.5"));
        assert_eq!(serde_yaml::from_str::<Holder>(&yaml).unwrap(), holder);
    }
}
