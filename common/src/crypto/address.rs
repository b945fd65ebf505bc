use super::{error::CryptoError, Hash, HASH_SIZE};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    convert::TryInto,
    fmt::{Display, Formatter},
    str::FromStr,
};

/// Basechain id, where every sandbox account lives unless configured otherwise
pub const BASECHAIN: i8 = 0;

/// Internal account address: a workchain id plus the 256-bit account id
///
/// Contract addresses are derived from the representation hash of their
/// `StateInit` cell, so two deployments of the same code and data always
/// land on the same address.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Debug, Hash)]
pub struct Address {
    workchain: i8,
    hash: Hash,
}

impl Address {
    pub const fn new(workchain: i8, hash: Hash) -> Self {
        Self { workchain, hash }
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Raw representation `"<workchain>:<hex account id>"`
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, self.hash.to_hex())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.workchain, self.hash)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, account) = s
            .split_once(':')
            .ok_or_else(|| CryptoError::InvalidAddress(s.to_string()))?;

        let workchain: i8 = workchain
            .parse()
            .map_err(|_| CryptoError::InvalidWorkchain(workchain.to_string()))?;

        let bytes = hex::decode(account).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let len = bytes.len();
        let bytes: [u8; HASH_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidHashLength {
                len,
                expected: HASH_SIZE,
            })?;

        Ok(Self::new(workchain, Hash::new(bytes)))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_raw_string())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(SerdeError::custom)
    }
}
