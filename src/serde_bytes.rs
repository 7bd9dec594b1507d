//! Serde helpers for byte payloads
//!
//! Transactions carry opaque byte blobs (raw data, contract parameters)
//! that serialize as hex strings for interchange with the host app.

use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize `Vec<u8>` as a hex string
pub mod hex_vec {
    use super::*;

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
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Blob {
        #[serde(with = "super::hex_vec")]
        data: Vec<u8>,
    }

    #[test]
    fn test_hex_vec_roundtrip() {
        let blob = Blob {
            data: vec![0xde, 0xad, 0xbe, 0xef],
        };
        let json = serde_json::to_string(&blob).unwrap();
        assert!(json.contains("deadbeef"));

        let back: Blob = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, blob.data);
    }

    #[test]
    fn test_hex_vec_accepts_0x_prefix() {
        let back: Blob = serde_json::from_str(r#"{"data":"0x0102"}"#).unwrap();
        assert_eq!(back.data, vec![1, 2]);
    }
}
