use std::{convert::TryInto, fmt, str::FromStr};

use ethereum_types::H256;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::trace;

use crate::{
    types::parsers, DecodedEvent, EncodeError, LogRecord, MalformedLog, ParseError, Type, Value,
};

/// Size of an ABI word, topic or data slot.
pub const WORD_SIZE: usize = 32;

/// Event parameter definition.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct EventParam {
    /// Parameter name, possibly empty.
    #[serde(default)]
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub type_: Type,
    /// Whether the value is stored in a topic instead of the log data.
    #[serde(default)]
    pub indexed: bool,
}

/// Contract event definition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EventDescriptor {
    /// Event name.
    pub name: String,
    /// Event inputs, in declaration order.
    pub inputs: Vec<EventParam>,
}

impl EventDescriptor {
    pub fn new(name: impl Into<String>, inputs: Vec<EventParam>) -> Self {
        EventDescriptor {
            name: name.into(),
            inputs,
        }
    }

    /// Returns the event's canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.inputs
                .iter()
                .map(|param| param.type_.to_string())
                .collect::<Vec<_>>()
                .join(",")
        )
    }

    /// Compute the event's topic hash.
    pub fn signature_hash(&self) -> H256 {
        signature_hash(&self.signature())
    }

    /// Name under which the `i`-th input shows up in decoded events.
    /// Unnamed inputs are called `arg0`, `arg1`, ...
    pub fn param_name(&self, i: usize) -> String {
        match self.inputs.get(i) {
            Some(param) if !param.name.is_empty() => param.name.clone(),
            _ => format!("arg{}", i),
        }
    }

    /// Number of inputs stored in topics.
    pub fn indexed_count(&self) -> usize {
        self.inputs.iter().filter(|input| input.indexed).count()
    }

    /// Number of inputs stored in the log data.
    pub fn data_count(&self) -> usize {
        self.inputs.len() - self.indexed_count()
    }

    /// Decode a log whose first topic is this event's signature hash.
    ///
    /// Indexed inputs are read from `topics[1..]` and the rest from
    /// consecutive 32-byte words of `data`, both in declaration order.
    pub fn decode_log(&self, log: &LogRecord) -> Result<DecodedEvent, MalformedLog> {
        let expected_topics = 1 + self.indexed_count();
        if log.topics.len() != expected_topics {
            return Err(MalformedLog::TopicCount {
                event: self.name.clone(),
                expected: expected_topics,
                actual: log.topics.len(),
            });
        }

        if log.data.len() % WORD_SIZE != 0 {
            return Err(MalformedLog::DataAlignment {
                event: self.name.clone(),
                len: log.data.len(),
            });
        }

        let expected_data = self.data_count() * WORD_SIZE;
        if log.data.len() < expected_data {
            return Err(MalformedLog::DataTooShort {
                event: self.name.clone(),
                expected: expected_data,
                actual: log.data.len(),
            });
        }
        if log.data.len() > expected_data {
            trace!(
                event = %self.name,
                extra = log.data.len() - expected_data,
                "ignoring trailing log data"
            );
        }

        let mut topics = log.topics.iter().skip(1);
        let mut slots = log.data.chunks_exact(WORD_SIZE);

        let mut params = IndexMap::with_capacity(self.inputs.len());
        for (i, input) in self.inputs.iter().enumerate() {
            let word: [u8; WORD_SIZE] = if input.indexed {
                topics
                    .next()
                    .map(|topic| topic.to_fixed_bytes())
                    .ok_or_else(|| MalformedLog::TopicCount {
                        event: self.name.clone(),
                        expected: expected_topics,
                        actual: log.topics.len(),
                    })?
            } else {
                slots
                    .next()
                    .and_then(|slot| slot.try_into().ok())
                    .ok_or_else(|| MalformedLog::DataTooShort {
                        event: self.name.clone(),
                        expected: expected_data,
                        actual: log.data.len(),
                    })?
            };

            let name = self.param_name(i);
            let value = Value::decode_word(&input.type_, &word).map_err(|reason| {
                MalformedLog::InvalidWord {
                    event: self.name.clone(),
                    param: name.clone(),
                    reason,
                }
            })?;

            params.insert(name, value);
        }

        Ok(DecodedEvent {
            name: self.name.clone(),
            params,
            block_number: log.block_number,
            log_index: log.log_index,
        })
    }

    /// Build a log for this event from `values` given in declaration order.
    pub fn encode_log(
        &self,
        values: &[Value],
        block_number: u64,
        log_index: u64,
    ) -> Result<LogRecord, EncodeError> {
        if values.len() != self.inputs.len() {
            return Err(EncodeError::Arity {
                event: self.name.clone(),
                expected: self.inputs.len(),
                actual: values.len(),
            });
        }

        let mut topics = vec![self.signature_hash()];
        let mut data = Vec::with_capacity(self.data_count() * WORD_SIZE);

        for (i, (input, value)) in self.inputs.iter().zip(values).enumerate() {
            if !value.fits(&input.type_) {
                return Err(EncodeError::TypeMismatch {
                    event: self.name.clone(),
                    param: self.param_name(i),
                    expected: input.type_.clone(),
                });
            }

            let word = value.encode_word();
            if input.indexed {
                topics.push(H256::from(word));
            } else {
                data.extend_from_slice(&word);
            }
        }

        Ok(LogRecord {
            topics,
            data,
            block_number,
            log_index,
        })
    }
}

impl fmt::Display for EventDescriptor {
    /// Writes the human-readable declaration accepted by `from_str`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", input.type_)?;
            if input.indexed {
                f.write_str(" indexed")?;
            }
            if !input.name.is_empty() {
                write!(f, " {}", input.name)?;
            }
        }
        f.write_str(")")
    }
}

impl FromStr for EventDescriptor {
    type Err = ParseError;

    /// Parses a declaration like `Transfer(address indexed from, address indexed to, uint256 value)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parsers::parse_exact_event(s)
            .map(|(_, (name, inputs))| EventDescriptor::new(name, inputs))
            .map_err(|e| ParseError {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for EventDescriptor {
    /// Reads a JSON ABI event fragment.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Fragment {
            #[serde(rename = "type")]
            type_: Option<String>,
            name: String,
            #[serde(default)]
            inputs: Vec<EventParam>,
            #[serde(default)]
            anonymous: bool,
        }

        let fragment = Fragment::deserialize(deserializer)?;

        if let Some(type_) = fragment.type_.filter(|t| t != "event") {
            return Err(serde::de::Error::custom(format!(
                "expected an event fragment, found `{}`",
                type_
            )));
        }

        if fragment.anonymous {
            return Err(serde::de::Error::custom(format!(
                "anonymous event `{}` has no signature topic",
                fragment.name
            )));
        }

        Ok(EventDescriptor::new(fragment.name, fragment.inputs))
    }
}

/// Keccak-256 of a canonical event signature.
pub fn signature_hash(signature: &str) -> H256 {
    use tiny_keccak::{Hasher, Keccak};

    let mut keccak_out = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(signature.as_bytes());
    hasher.finalize(&mut keccak_out);

    H256::from_slice(&keccak_out)
}
