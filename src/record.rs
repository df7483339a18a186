use ethereum_types::H256;
use serde::{Deserialize, Serialize};

/// A raw log as returned by `eth_getLogs`.
///
/// `topics[0]` is the event signature hash, the remaining topics hold the
/// indexed parameters and `data` the ABI-encoded non-indexed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub topics: Vec<H256>,
    #[serde(with = "serde_hex::bytes")]
    pub data: Vec<u8>,
    #[serde(with = "serde_hex::quantity")]
    pub block_number: u64,
    #[serde(with = "serde_hex::quantity")]
    pub log_index: u64,
}

impl LogRecord {
    /// The signature topic, absent for anonymous events.
    pub fn signature_topic(&self) -> Option<&H256> {
        self.topics.first()
    }
}

// JSON-RPC encodes byte strings as `0x`-prefixed hex and integers as
// `0x`-prefixed hex quantities without leading zeros.
mod serde_hex {
    fn strip(s: &str) -> &str {
        s.strip_prefix("0x").unwrap_or(s)
    }

    pub mod bytes {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            hex::decode(super::strip(&s)).map_err(D::Error::custom)
        }
    }

    pub mod quantity {
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&format!("{:#x}", value))
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            u64::from_str_radix(super::strip(&s), 16).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn deserialize_rpc_log() {
        let json = r#"{
            "address": "0xe41d2489571d322189246dafa5ebde1f4699f498",
            "topics": [
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                "0x000000000000000000000000d03dd4c1a8a21f1e5c0d0f2fbcb7b3f8c2d1aeb2"
            ],
            "data": "0x00000000000000000000000000000000000000000000000000000000000003e8",
            "blockNumber": "0x5bad55",
            "transactionHash": "0x1cc3fe8bd3a5d2b2d1a8a1e4cd4e1e2a3aebd0a4d3b2a1c0f9e8d7c6b5a49382",
            "logIndex": "0x1a",
            "removed": false
        }"#;

        let log: LogRecord = serde_json::from_str(json).unwrap();

        assert_eq!(log.topics.len(), 2);
        assert_eq!(
            log.signature_topic(),
            Some(&"ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef".parse().unwrap())
        );
        assert_eq!(log.data.len(), 32);
        assert_eq!(&log.data[30..], &[0x03u8, 0xe8][..]);
        assert_eq!(log.block_number, 6_008_149);
        assert_eq!(log.log_index, 26);
    }

    #[test]
    fn serialize_rpc_log() {
        let log = LogRecord {
            topics: vec![H256::repeat_byte(0x11)],
            data: vec![0xab, 0xcd],
            block_number: 16,
            log_index: 0,
        };

        let json = serde_json::to_value(&log).unwrap();

        assert_eq!(json["data"], "0xabcd");
        assert_eq!(json["blockNumber"], "0x10");
        assert_eq!(json["logIndex"], "0x0");
        assert_eq!(serde_json::from_value::<LogRecord>(json).unwrap(), log);
    }

    #[test]
    fn rejects_bad_hex() {
        let json = r#"{"topics":[],"data":"0xzz","blockNumber":"0x1","logIndex":"0x0"}"#;

        assert!(serde_json::from_str::<LogRecord>(json).is_err());
    }
}
