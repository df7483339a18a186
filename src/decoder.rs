use std::{
    collections::{hash_map::Entry, HashMap, HashSet},
    fmt,
};

use ethereum_types::H256;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::{EventDescriptor, LogRecord, MalformedLog, RegistryError, Value};

/// A log decoded against a known event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedEvent {
    /// Name of the matched event.
    pub name: String,
    /// Decoded parameters keyed by name, in declaration order.
    pub params: IndexMap<String, Value>,
    pub block_number: u64,
    pub log_index: u64,
}

impl DecodedEvent {
    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

impl fmt::Display for DecodedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, ") block {} log {}", self.block_number, self.log_index)
    }
}

/// Outcome of classifying a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Event(DecodedEvent),
    /// No registered event matches the log's signature topic. `topic` is
    /// `None` when the log has no topics at all.
    Unrecognized { topic: Option<H256> },
}

impl Decoded {
    pub fn event(&self) -> Option<&DecodedEvent> {
        match self {
            Decoded::Event(event) => Some(event),
            Decoded::Unrecognized { .. } => None,
        }
    }

    pub fn into_event(self) -> Option<DecodedEvent> {
        match self {
            Decoded::Event(event) => Some(event),
            Decoded::Unrecognized { .. } => None,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Decoded::Unrecognized { .. })
    }
}

/// Registry of known events keyed by signature hash.
///
/// The registry is fixed at construction, so a decoder can be shared by
/// reference between threads and `decode` called concurrently.
#[derive(Debug, Clone, Default)]
pub struct LogDecoder {
    events: HashMap<H256, EventDescriptor>,
}

impl LogDecoder {
    /// Build a decoder for the given events.
    ///
    /// Fails if two events share a signature hash, if an event repeats a
    /// parameter name, if a parameter type has a width the ABI does not
    /// allow, or if a non-indexed parameter has a dynamic type.
    pub fn new<I>(descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = EventDescriptor>,
    {
        let mut events = HashMap::new();

        for descriptor in descriptors {
            check_layout(&descriptor)?;

            let hash = descriptor.signature_hash();
            match events.entry(hash) {
                Entry::Occupied(_) => {
                    return Err(RegistryError::DuplicateSignature {
                        signature: descriptor.signature(),
                        hash,
                    })
                }
                Entry::Vacant(slot) => {
                    debug!(
                        event = %descriptor.name,
                        signature = %descriptor.signature(),
                        hash = ?hash,
                        "registered event"
                    );
                    slot.insert(descriptor);
                }
            }
        }

        Ok(LogDecoder { events })
    }

    /// Classify and decode a single log.
    ///
    /// Logs without topics or with an unknown signature topic are
    /// `Unrecognized`; only a matched log with an inconsistent layout is an
    /// error.
    pub fn decode(&self, log: &LogRecord) -> Result<Decoded, MalformedLog> {
        let topic = match log.signature_topic() {
            Some(topic) => topic,
            None => {
                debug!(block = log.block_number, log_index = log.log_index, "log has no topics");
                return Ok(Decoded::Unrecognized { topic: None });
            }
        };

        match self.events.get(topic) {
            Some(descriptor) => descriptor.decode_log(log).map(Decoded::Event),
            None => {
                debug!(
                    topic = ?topic,
                    block = log.block_number,
                    log_index = log.log_index,
                    "unrecognized log"
                );
                Ok(Decoded::Unrecognized {
                    topic: Some(*topic),
                })
            }
        }
    }

    /// Decode every log in order, one result per log.
    pub fn decode_all<'a, I>(
        &'a self,
        logs: I,
    ) -> impl Iterator<Item = Result<Decoded, MalformedLog>> + 'a
    where
        I: IntoIterator<Item = &'a LogRecord>,
        I::IntoIter: 'a,
    {
        logs.into_iter().map(move |log| self.decode(log))
    }

    /// The event registered under `hash`.
    pub fn descriptor(&self, hash: &H256) -> Option<&EventDescriptor> {
        self.events.get(hash)
    }

    /// All registered events, in no particular order.
    pub fn descriptors(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn check_layout(descriptor: &EventDescriptor) -> Result<(), RegistryError> {
    let mut names = HashSet::with_capacity(descriptor.inputs.len());

    for (i, input) in descriptor.inputs.iter().enumerate() {
        let name = descriptor.param_name(i);

        if !input.type_.has_valid_width() {
            return Err(RegistryError::InvalidType {
                event: descriptor.name.clone(),
                param: name,
                type_: input.type_.clone(),
            });
        }

        if !input.indexed && input.type_.is_dynamic() {
            return Err(RegistryError::UnsupportedParameter {
                event: descriptor.name.clone(),
                param: name,
                type_: input.type_.clone(),
            });
        }

        if !names.insert(name.clone()) {
            return Err(RegistryError::DuplicateParameter {
                event: descriptor.name.clone(),
                param: name,
            });
        }
    }

    Ok(())
}
