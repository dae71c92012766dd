//! NMEA 0183 envelope validation and AIVDM frame interpretation.
//!
//! The envelope layer checks `!…*HH` framing and the XOR checksum, then
//! splits the content into comma-separated fields. The frame layer gives
//! those fields their AIVDM meaning: talker, fragment bookkeeping,
//! sequential id, channel, armored payload and fill-bit count.

use tracing::debug;

use crate::errors::DecodeError;
use crate::models::Channel;

/// A checksum-verified NMEA sentence split into content fields.
#[derive(Debug, Clone)]
pub struct NmeaEnvelope {
    fields: Vec<String>,
}

impl NmeaEnvelope {
    /// Validate one line and split its content.
    ///
    /// Requirements, in order: the first byte is `'!'`; the last `'*'` is
    /// followed by exactly two hex digits; the XOR of every byte strictly
    /// between `'!'` and `'*'` equals the hex value; the content splits
    /// into 6 or 7 comma-separated fields (the trailing fill-bit field is
    /// optional).
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if !line.starts_with('!') {
            return Err(DecodeError::BadEnvelope(
                "sentence does not start with '!'".to_string(),
            ));
        }

        let star = line
            .rfind('*')
            .ok_or_else(|| DecodeError::BadEnvelope("no checksum delimiter '*'".to_string()))?;
        let suffix = &line[star + 1..];
        if suffix.len() != 2 || !suffix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DecodeError::BadEnvelope(format!(
                "checksum {suffix:?} is not two hex digits"
            )));
        }
        let expected = u8::from_str_radix(suffix, 16)
            .map_err(|_| DecodeError::BadEnvelope(format!("checksum {suffix:?} unparsable")))?;

        let content = &line[1..star];
        let computed = content.bytes().fold(0u8, |acc, b| acc ^ b);
        if computed != expected {
            return Err(DecodeError::ChecksumFailed { expected, computed });
        }

        let fields: Vec<String> = content.split(',').map(str::to_string).collect();
        if fields.len() < 6 || fields.len() > 7 {
            return Err(DecodeError::BadFrame(format!(
                "expected 6 or 7 content fields, found {}",
                fields.len()
            )));
        }

        Ok(NmeaEnvelope { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Sentence talker: received traffic or own-vessel report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Talker {
    /// `AIVDM`, messages received from other vessels
    Vdm,
    /// `AIVDO`, own-vessel messages
    Vdo,
}

/// Interpreted AIVDM/AIVDO content fields.
#[derive(Debug, Clone)]
pub struct AivdmFrame {
    pub talker: Talker,
    /// Total sentences carrying this message, >= 1
    pub fragment_count: u32,
    /// Position of this sentence in the group, >= 1
    pub fragment_number: u32,
    /// Sequential message id grouping the fragments, if any
    pub sequential_id: Option<String>,
    pub channel: Channel,
    /// Armored payload, never empty
    pub payload: String,
    /// Encode-time padding bits to drop from the payload tail, 0..=5
    pub fill_bits: u8,
}

impl AivdmFrame {
    pub fn from_envelope(envelope: &NmeaEnvelope) -> Result<Self, DecodeError> {
        let fields = envelope.fields();

        let talker = match fields[0].as_str() {
            "AIVDM" => Talker::Vdm,
            "AIVDO" => Talker::Vdo,
            other => return Err(DecodeError::NotAivdm(other.to_string())),
        };

        let fragment_count = parse_fragment(&fields[1], "fragment count")?;
        let fragment_number = parse_fragment(&fields[2], "fragment number")?;

        let sequential_id = if fields[3].is_empty() {
            None
        } else {
            Some(fields[3].clone())
        };

        let channel = Channel::parse(&fields[4]);

        let payload = fields[5].clone();
        if payload.is_empty() {
            return Err(DecodeError::BadFrame("empty armored payload".to_string()));
        }

        let fill_bits = match fields.get(6) {
            Some(f) if f.len() == 1 && ('0'..='5').contains(&f.chars().next().unwrap_or('0')) => {
                f.as_bytes()[0] - b'0'
            }
            Some(f) => {
                debug!("unexpected fill bit field {:?}, assuming 0", f);
                0
            }
            None => 0,
        };

        Ok(AivdmFrame {
            talker,
            fragment_count,
            fragment_number,
            sequential_id,
            channel,
            payload,
            fill_bits,
        })
    }

    /// True for sentences past the first of a multi-fragment group.
    pub fn is_continuation(&self) -> bool {
        self.fragment_count > 1 && self.fragment_number != 1
    }
}

fn parse_fragment(field: &str, what: &str) -> Result<u32, DecodeError> {
    let value: u32 = field
        .parse()
        .map_err(|_| DecodeError::BadFrame(format!("{what} {field:?} is not a number")))?;
    if value == 0 {
        return Err(DecodeError::BadFrame(format!("{what} must be at least 1")));
    }
    Ok(value)
}
