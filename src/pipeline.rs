//! Decode pipeline façade.
//!
//! Orchestrates envelope validation, frame interpretation, payload
//! de-armoring, message decoding and identity mapping into a single
//! per-sentence call. The pipeline is stateless and reentrant: every call
//! owns its transient bit buffer, so callers may decode from any number of
//! threads without synchronization.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::bitvec::BitVector;
use crate::config::DecoderConfig;
use crate::decoder;
use crate::errors::DecodeError;
use crate::identity;
use crate::models::{AisRecord, Channel, Eta, Mmsi, PositionReport, RecordBody, StaticVoyage};
use crate::nmea::{AivdmFrame, NmeaEnvelope};
use crate::sixbit;

/// Keys under which a feed may wrap the raw sentence in a JSON object.
const RAW_SENTENCE_KEYS: [&str; 4] = ["raw_sentence", "raw", "line", "sentence"];

/// Stateless decoder for AIVDM/AIVDO sentences and pre-parsed feed objects.
#[derive(Debug, Clone, Default)]
pub struct DecodePipeline {
    config: DecoderConfig,
}

impl DecodePipeline {
    pub fn new(config: DecoderConfig) -> Self {
        DecodePipeline { config }
    }

    /// Decode one NMEA sentence into a vessel observation.
    pub fn decode_sentence(
        &self,
        line: &str,
        now: DateTime<Utc>,
    ) -> Result<AisRecord, DecodeError> {
        let envelope = NmeaEnvelope::parse(line)?;
        let frame = AivdmFrame::from_envelope(&envelope)?;

        if frame.is_continuation() && self.config.require_fragment_reassembly_upstream {
            return Err(DecodeError::FragmentedUnsupported {
                number: frame.fragment_number,
                count: frame.fragment_count,
            });
        }

        // The message type is the first six payload bits, i.e. the first
        // armor character. An undecodable first character leaves no type to
        // dispatch on, strict mode or not.
        let first = frame.payload.chars().next().unwrap_or('\0');
        let message_type =
            sixbit::decode_armor_char(first).ok_or(DecodeError::InvalidArmor(first))?;
        if message_type == 0 {
            return Err(DecodeError::UnsupportedType(0));
        }

        let bits =
            BitVector::from_armored(&frame.payload, frame.fill_bits, self.config.strict_armor)?;

        // A multi-fragment message attempted without reassembly only covers
        // the first fragment's bits; the rest read as "not available".
        let lenient =
            frame.fragment_count > 1 && !self.config.require_fragment_reassembly_upstream;
        let message = decoder::decode_message(&bits, lenient)?;

        Ok(AisRecord {
            message_type: message.message_type,
            repeat_indicator: message.repeat_indicator,
            mmsi: message.mmsi,
            channel: frame.channel,
            mac: identity::mmsi_to_mac(message.mmsi),
            frequency_khz: frame.channel.frequency_khz(),
            received_at: now,
            body: message.body,
        })
    }

    /// Decode a pre-parsed feed object.
    ///
    /// An object wrapping a raw sentence under one of the
    /// [`RAW_SENTENCE_KEYS`] re-enters [`Self::decode_sentence`]; otherwise
    /// the object's own fields are read, provided `mmsi` is present.
    /// Missing fields take their AIS "not available" codes.
    pub fn decode_json(&self, value: &Value, now: DateTime<Utc>) -> Result<AisRecord, DecodeError> {
        if let Some(line) = RAW_SENTENCE_KEYS
            .iter()
            .filter_map(|k| value.get(k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
        {
            return self.decode_sentence(line, now);
        }

        let obj = value
            .as_object()
            .ok_or_else(|| DecodeError::BadFrame("feed payload is not an object".to_string()))?;

        let mmsi = match obj.get("mmsi") {
            Some(Value::Number(n)) => {
                let raw = n
                    .as_u64()
                    .ok_or_else(|| DecodeError::BadIdentity(n.to_string()))?;
                Mmsi::try_from(raw)?
            }
            Some(Value::String(s)) => s.parse::<Mmsi>()?,
            _ => return Err(DecodeError::BadFrame("no mmsi in feed object".to_string())),
        };

        let message_type = first_u64(obj, &["message_type"]);
        let (message_type, body) = match message_type {
            Some(t @ 1..=3) => (t as u8, RecordBody::PositionReport(position_from_json(obj))),
            Some(5) => (5, RecordBody::StaticVoyage(voyage_from_json(obj))),
            Some(other) => return Err(DecodeError::UnsupportedType(other.min(255) as u8)),
            None if obj.contains_key("lat") && obj.contains_key("lon") => {
                (1, RecordBody::PositionReport(position_from_json(obj)))
            }
            None if STATIC_HINT_KEYS.iter().any(|k| obj.contains_key(*k)) => {
                (5, RecordBody::StaticVoyage(voyage_from_json(obj)))
            }
            None => {
                return Err(DecodeError::BadFrame(
                    "feed object carries no decodable fields".to_string(),
                ))
            }
        };

        let channel = first_str(obj, &["channel"])
            .map(Channel::parse)
            .unwrap_or(Channel::Unknown);
        // An explicit receiver frequency (in Hz) wins over the channel hint
        let frequency_khz = first_u64(obj, &["frequency"])
            .map(|hz| (hz / 1000) as u32)
            .unwrap_or_else(|| channel.frequency_khz());

        Ok(AisRecord {
            message_type,
            repeat_indicator: first_u64(obj, &["repeat_indicator"]).unwrap_or(0) as u8,
            mmsi,
            channel,
            mac: identity::mmsi_to_mac(mmsi),
            frequency_khz,
            received_at: now,
            body,
        })
    }

    /// Decode an opaque feed payload: a raw sentence if it starts with
    /// `'!'`, a JSON object if it starts with `'{'`.
    pub fn decode_payload(
        &self,
        raw: &[u8],
        now: DateTime<Utc>,
    ) -> Result<AisRecord, DecodeError> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| DecodeError::BadEnvelope("payload is not UTF-8".to_string()))?
            .trim();
        match text.as_bytes().first() {
            Some(b'!') => self.decode_sentence(text, now),
            Some(b'{') => {
                let value: Value = serde_json::from_str(text)
                    .map_err(|e| DecodeError::BadFrame(format!("invalid feed JSON: {e}")))?;
                self.decode_json(&value, now)
            }
            _ => Err(DecodeError::BadEnvelope(
                "payload is neither an NMEA sentence nor JSON".to_string(),
            )),
        }
    }
}

/// Keys whose presence marks a pre-parsed static/voyage object.
const STATIC_HINT_KEYS: [&str; 11] = [
    "vessel_name",
    "shipname",
    "name",
    "callsign",
    "imo_number",
    "imo",
    "destination",
    "ship_type",
    "shiptype",
    "eta_str",
    "eta",
];

fn first_str<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_str))
}

fn first_u64(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_u64))
}

fn first_i64(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_i64))
}

fn first_f64(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_f64))
}

/// Accepts JSON booleans as well as 0/1 numbers for the flag fields.
fn first_bool(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| match obj.get(*k) {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Number(n)) => n.as_u64().map(|v| v != 0),
        _ => None,
    })
}

fn position_from_json(obj: &serde_json::Map<String, Value>) -> PositionReport {
    PositionReport {
        nav_status: first_u64(obj, &["nav_status", "navstatus"]).unwrap_or(15) as u8,
        rot: first_i64(obj, &["rot"]).unwrap_or(-128) as i8,
        sog: first_f64(obj, &["sog", "speed"]).unwrap_or(102.3),
        pos_accuracy: first_bool(obj, &["pos_accuracy"]).unwrap_or(false),
        lon: first_f64(obj, &["lon"]).unwrap_or(181.0),
        lat: first_f64(obj, &["lat"]).unwrap_or(91.0),
        cog: first_f64(obj, &["cog", "course"]).unwrap_or(360.0),
        true_heading: first_u64(obj, &["true_heading"]).unwrap_or(511) as u16,
        timestamp: first_u64(obj, &["timestamp"]).unwrap_or(60) as u8,
        maneuver_indicator: first_u64(obj, &["maneuver_indicator"]).unwrap_or(0) as u8,
        raim_flag: first_bool(obj, &["raim_flag"]).unwrap_or(false),
        radio_status: first_u64(obj, &["radio_status"]).unwrap_or(0) as u32,
    }
}

fn voyage_from_json(obj: &serde_json::Map<String, Value>) -> StaticVoyage {
    let eta = Eta {
        month: first_u64(obj, &["eta_month"]).unwrap_or(0) as u8,
        day: first_u64(obj, &["eta_day"]).unwrap_or(0) as u8,
        hour: first_u64(obj, &["eta_hour"]).unwrap_or(24) as u8,
        minute: first_u64(obj, &["eta_minute"]).unwrap_or(60) as u8,
    };
    let eta_str = first_str(obj, &["eta_str", "eta"])
        .map(str::to_string)
        .unwrap_or_else(|| eta.formatted());

    StaticVoyage {
        ais_version: first_u64(obj, &["ais_version"]).unwrap_or(0) as u8,
        imo_number: first_u64(obj, &["imo_number", "imo"]).unwrap_or(0) as u32,
        callsign: first_str(obj, &["callsign"]).unwrap_or_default().to_string(),
        vessel_name: first_str(obj, &["vessel_name", "shipname", "name"])
            .unwrap_or_default()
            .to_string(),
        ship_type: first_u64(obj, &["ship_type", "shiptype"]).unwrap_or(0) as u8,
        dim_to_bow: first_u64(obj, &["dim_to_bow"]).unwrap_or(0) as u16,
        dim_to_stern: first_u64(obj, &["dim_to_stern"]).unwrap_or(0) as u16,
        dim_to_port: first_u64(obj, &["dim_to_port"]).unwrap_or(0) as u8,
        dim_to_starboard: first_u64(obj, &["dim_to_starboard"]).unwrap_or(0) as u8,
        epfd_fix_type: first_u64(obj, &["epfd_fix_type"]).unwrap_or(0) as u8,
        eta,
        eta_str,
        draught: first_f64(obj, &["draught"]).unwrap_or(0.0),
        destination: first_str(obj, &["destination"])
            .unwrap_or_default()
            .to_string(),
        dte: first_u64(obj, &["dte"]).unwrap_or(1) as u8,
    }
}
