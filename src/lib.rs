//! Decode Ethereum event logs into typed events.
//!
//! A [`LogDecoder`] is built once from the [`EventDescriptor`]s of the events
//! you care about and then classifies raw [`LogRecord`]s by their signature
//! topic, decoding the ones it knows into [`DecodedEvent`]s.
//!
//! ```
//! use ethereum_log_decoder::{Decoded, EventDescriptor, LogDecoder, LogRecord};
//!
//! let transfer: EventDescriptor =
//!     "Transfer(address indexed from, address indexed to, uint256 tokens)".parse()?;
//! let decoder = LogDecoder::new(vec![transfer])?;
//!
//! match decoder.decode(&LogRecord::default())? {
//!     Decoded::Event(event) => println!("{}", event),
//!     Decoded::Unrecognized { .. } => println!("not a Transfer"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decoder;
mod error;
mod event;
mod record;
mod types;
mod values;

pub use decoder::*;
pub use error::*;
pub use event::*;
pub use record::*;
pub use types::*;
pub use values::*;
