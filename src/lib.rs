//! Decoder for NMEA 0183 AIVDM/AIVDO sentences carrying AIS payloads.
//!
//! The pipeline validates the NMEA envelope and checksum, de-armors the
//! 6-bit payload, decodes Position Report Class A (types 1, 2, 3) and
//! Static/Voyage (type 5) messages, and emits one immutable [`AisRecord`]
//! per observation, keyed by a deterministic MMSI-derived MAC-48 so that
//! device trackers can file vessels alongside other phys. Feeds may also
//! deliver pre-parsed JSON objects; those take the same record shape
//! through [`DecodePipeline::decode_json`].
//!
//! The decoder is stateless: fragments of multi-sentence messages are not
//! reassembled here, and no per-vessel state is kept.

pub mod bitvec;
pub mod config;
pub mod decoder;
pub mod errors;
pub mod identity;
pub mod models;
pub mod mqtt;
pub mod nmea;
pub mod pipeline;
pub mod sixbit;

pub use errors::{AisDecoderError, DecodeError};
pub use models::{AisRecord, Channel, Mmsi, RecordBody};
pub use pipeline::DecodePipeline;
