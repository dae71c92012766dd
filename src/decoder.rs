//! Message-type dispatch and per-type field maps.
//!
//! Decoders are pure functions over a [`BitVector`]; they hold no state and
//! either produce a complete body or fail the sentence. Offsets and widths
//! follow ITU-R M.1371 for Position Report Class A (types 1, 2, 3) and
//! Static/Voyage data (type 5).

use crate::bitvec::BitVector;
use crate::errors::DecodeError;
use crate::models::{Eta, Mmsi, PositionReport, RecordBody, StaticVoyage};

/// Common header plus the type-specific body, before envelope context
/// (channel, MAC, timestamps) is attached.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub message_type: u8,
    pub repeat_indicator: u8,
    pub mmsi: Mmsi,
    pub body: RecordBody,
}

/// Decode a payload bit buffer into a typed message.
///
/// `lenient` relaxes reads past the end of the buffer to the field's
/// "not available" code; it is set when a multi-fragment message is
/// attempted from its first fragment only.
pub fn decode_message(bits: &BitVector, lenient: bool) -> Result<DecodedMessage, DecodeError> {
    let message_type = bits.uint(0, 6)? as u8;
    let repeat_indicator = bits.uint(6, 2)? as u8;
    let mmsi = Mmsi::try_from(bits.uint(8, 30)?)?;

    let body = match message_type {
        1 | 2 | 3 => RecordBody::PositionReport(decode_position_report(bits)?),
        5 => RecordBody::StaticVoyage(decode_static_voyage(bits, lenient)?),
        other => return Err(DecodeError::UnsupportedType(other)),
    };

    Ok(DecodedMessage {
        message_type,
        repeat_indicator,
        mmsi,
        body,
    })
}

/// Position Report Class A field map.
///
/// Payloads of at least 149 bits are accepted; the trailing 19-bit
/// communication state reads as 0 when the transmitter cut it short.
fn decode_position_report(bits: &BitVector) -> Result<PositionReport, DecodeError> {
    Ok(PositionReport {
        nav_status: bits.uint(38, 4)? as u8,
        rot: bits.int(42, 8)? as i8,
        sog: bits.uint(50, 10)? as f64 / 10.0,
        pos_accuracy: bits.uint(60, 1)? == 1,
        lon: bits.int(61, 28)? as f64 / 600_000.0,
        lat: bits.int(89, 27)? as f64 / 600_000.0,
        cog: bits.uint(116, 12)? as f64 / 10.0,
        true_heading: bits.uint(128, 9)? as u16,
        timestamp: bits.uint(137, 6)? as u8,
        maneuver_indicator: bits.uint(143, 2)? as u8,
        // 3 spare bits at 145
        raim_flag: bits.uint(148, 1)? == 1,
        radio_status: bits.uint(149, 19).unwrap_or(0) as u32,
    })
}

/// Static and voyage data field map, 423 bits nominal.
fn decode_static_voyage(bits: &BitVector, lenient: bool) -> Result<StaticVoyage, DecodeError> {
    let eta = Eta {
        month: uint_or(bits, 274, 4, lenient, 0)? as u8,
        day: uint_or(bits, 278, 5, lenient, 0)? as u8,
        hour: uint_or(bits, 283, 5, lenient, 24)? as u8,
        minute: uint_or(bits, 288, 6, lenient, 60)? as u8,
    };

    Ok(StaticVoyage {
        ais_version: uint_or(bits, 38, 2, lenient, 0)? as u8,
        imo_number: uint_or(bits, 40, 30, lenient, 0)? as u32,
        callsign: string_or(bits, 70, 7, lenient)?,
        vessel_name: string_or(bits, 112, 20, lenient)?,
        ship_type: uint_or(bits, 232, 8, lenient, 0)? as u8,
        dim_to_bow: uint_or(bits, 240, 9, lenient, 0)? as u16,
        dim_to_stern: uint_or(bits, 249, 9, lenient, 0)? as u16,
        dim_to_port: uint_or(bits, 258, 6, lenient, 0)? as u8,
        dim_to_starboard: uint_or(bits, 264, 6, lenient, 0)? as u8,
        epfd_fix_type: uint_or(bits, 270, 4, lenient, 0)? as u8,
        eta_str: eta.formatted(),
        eta,
        draught: uint_or(bits, 294, 8, lenient, 0)? as f64 / 10.0,
        destination: string_or(bits, 302, 20, lenient)?,
        dte: uint_or(bits, 422, 1, lenient, 1)? as u8,
    })
}

fn uint_or(
    bits: &BitVector,
    start: usize,
    width: usize,
    lenient: bool,
    default: u64,
) -> Result<u64, DecodeError> {
    match bits.uint(start, width) {
        Ok(v) => Ok(v),
        Err(DecodeError::Truncated { .. }) if lenient => Ok(default),
        Err(e) => Err(e),
    }
}

fn string_or(
    bits: &BitVector,
    start: usize,
    n_chars: usize,
    lenient: bool,
) -> Result<String, DecodeError> {
    match bits.armored_string(start, n_chars) {
        Ok(s) => Ok(s),
        Err(DecodeError::Truncated { .. }) if lenient => Ok(String::new()),
        Err(e) => Err(e),
    }
}
