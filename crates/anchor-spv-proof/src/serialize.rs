//! Serde adapters encoding byte fields as lowercase hex strings.

pub mod hex_bytes {
    use serde::de::Error as SerdeError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        hex::decode(&hex_string).map_err(SerdeError::custom)
    }
}

pub mod hex_hash {
    use serde::de::Error as SerdeError;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::codec::Hash256;

    pub fn serialize<S>(hash: &Hash256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(hash))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Hash256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_string).map_err(SerdeError::custom)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| SerdeError::custom(format!("expected 32-byte hash, got {len} bytes")))
    }
}
