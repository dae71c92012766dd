//! Data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DecodeError;
use crate::identity::MacAddr;

/// Maritime Mobile Service Identity.
///
/// A 30-bit field on the wire, presented externally as a nine-digit decimal
/// string with leading zeros preserved. Values that do not fit nine digits
/// are rejected, so the string form is always exactly nine characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mmsi(u32);

impl Mmsi {
    /// Raw numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Mmsi {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > 999_999_999 {
            return Err(DecodeError::BadIdentity(value.to_string()));
        }
        Ok(Mmsi(value))
    }
}

impl TryFrom<u64> for Mmsi {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| DecodeError::BadIdentity(value.to_string()))
            .and_then(Mmsi::try_from)
    }
}

impl std::str::FromStr for Mmsi {
    type Err = DecodeError;

    /// Parse the external key form: exactly nine decimal digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DecodeError::BadIdentity(s.to_string()));
        }
        let value = s
            .parse::<u32>()
            .map_err(|_| DecodeError::BadIdentity(s.to_string()))?;
        Ok(Mmsi(value))
    }
}

impl std::fmt::Display for Mmsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl Serialize for Mmsi {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// AIS VHF channel from the NMEA envelope.
///
/// Channel A is 161.975 MHz, channel B is 162.025 MHz. Receivers that do not
/// report the channel leave the field empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    A,
    B,
    #[default]
    Unknown,
}

impl Channel {
    pub fn parse(s: &str) -> Channel {
        match s {
            "A" => Channel::A,
            "B" => Channel::B,
            _ => Channel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::A => "A",
            Channel::B => "B",
            Channel::Unknown => "",
        }
    }

    /// Carrier frequency hint in kHz; an unknown channel defaults to A.
    pub fn frequency_khz(&self) -> u32 {
        match self {
            Channel::A | Channel::Unknown => 161_975,
            Channel::B => 162_025,
        }
    }
}

impl From<String> for Channel {
    fn from(s: String) -> Self {
        Channel::parse(&s)
    }
}

impl From<Channel> for String {
    fn from(c: Channel) -> Self {
        c.as_str().to_string()
    }
}

/// Estimated time of arrival, raw field values.
///
/// - month: 1-12; 0 = not available
/// - day: 1-31; 0 = not available
/// - hour: 0-23; 24 = not available
/// - minute: 0-59; 60 = not available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct Eta {
    #[serde(rename = "eta_month")]
    pub month: u8,
    #[serde(rename = "eta_day")]
    pub day: u8,
    #[serde(rename = "eta_hour")]
    pub hour: u8,
    #[serde(rename = "eta_minute")]
    pub minute: u8,
}

impl Eta {
    /// The reserved "not available" encoding for every component.
    pub fn not_available() -> Eta {
        Eta {
            month: 0,
            day: 0,
            hour: 24,
            minute: 60,
        }
    }

    fn is_available(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour <= 23
            && self.minute <= 59
    }

    /// `"MM-DD HH:MM UTC"` when every component is in range, else `"N/A"`.
    pub fn formatted(&self) -> String {
        if self.is_available() {
            format!(
                "{:02}-{:02} {:02}:{:02} UTC",
                self.month, self.day, self.hour, self.minute
            )
        } else {
            "N/A".to_string()
        }
    }
}

/// Position Report Class A, message types 1, 2 and 3.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    /// Navigational status
    ///
    /// Value range between 0 - 15.
    /// - 0 = under way using engine
    /// - 1 = at anchor
    /// - 2 = not under command
    /// - 3 = restricted maneuverability
    /// - 5 = moored
    /// - 6 = aground
    /// - 7 = engaged in fishing
    /// - 8 = under way sailing
    /// - 15 = default
    pub nav_status: u8,
    /// Rate of turn, ROT[AIS], raw signed value.
    ///
    /// Values range between -128 - 127. -128 indicates that value is not
    /// available (default). +-127 means turning at 720 degrees per minute
    /// or higher.
    pub rot: i8,
    /// Speed over ground in knots, 102.3 = not available
    pub sog: f64,
    /// Position accuracy, true = high (<10 m), false = low
    pub pos_accuracy: bool,
    /// Longitude in WGS84 decimal degrees, 181.0 = not available
    pub lon: f64,
    /// Latitude in WGS84 decimal degrees, 91.0 = not available
    pub lat: f64,
    /// Course over ground in degrees, 360.0 = not available
    pub cog: f64,
    /// True heading in degrees (0-359), 511 = not available
    pub true_heading: u16,
    /// UTC second of the position fix (0-59)
    ///
    /// - 60 = not available
    /// - 61 = manual input mode
    /// - 62 = dead reckoning
    /// - 63 = positioning system inoperative
    pub timestamp: u8,
    /// Special maneuver indicator, 0 = not available, 1 = no, 2 = yes
    pub maneuver_indicator: u8,
    /// Receiver autonomous integrity monitoring flag
    pub raim_flag: bool,
    /// SOTDMA/ITDMA communication state, opaque 19-bit value
    pub radio_status: u32,
}

/// Static and voyage related data, message type 5.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticVoyage {
    /// AIS version indicator, 0 = ITU1371, 1-3 future editions
    pub ais_version: u8,
    /// International Maritime Organization number, 0 = not available
    pub imo_number: u32,
    /// Call sign, maximum 7 six-bit characters
    pub callsign: String,
    /// Name of the vessel, maximum 20 six-bit characters
    pub vessel_name: String,
    /// Type of ship and cargo
    pub ship_type: u8,
    /// Distance from reference point to bow, meters
    pub dim_to_bow: u16,
    /// Distance from reference point to stern, meters
    pub dim_to_stern: u16,
    /// Distance from reference point to port side, meters
    pub dim_to_port: u8,
    /// Distance from reference point to starboard side, meters
    pub dim_to_starboard: u8,
    /// Type of electronic position fixing device
    ///
    /// - 0 = undefined (default)
    /// - 1 = GPS
    /// - 2 = GLONASS
    /// - 3 = combined GPS/GLONASS
    /// - 8 = Galileo
    /// - 15 = internal GNSS
    pub epfd_fix_type: u8,
    /// Estimated time of arrival, raw components
    #[serde(flatten)]
    pub eta: Eta,
    /// `"MM-DD HH:MM UTC"` when the ETA is available, else `"N/A"`
    pub eta_str: String,
    /// Maximum present static draught in meters, 25.5 = 25.5 m or greater
    pub draught: f64,
    /// Destination, maximum 20 six-bit characters
    pub destination: String,
    /// Data terminal equipment flag, 0 = ready, 1 = not ready
    pub dte: u8,
}

/// Message-type specific record body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordBody {
    PositionReport(PositionReport),
    StaticVoyage(StaticVoyage),
}

/// One decoded vessel observation.
///
/// Constructed per sentence, immutable afterwards. The `mac` field is the
/// link-layer key derived from the MMSI; consumers use it to attribute the
/// observation to a tracked device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AisRecord {
    /// AIS message type, 1-63
    pub message_type: u8,
    /// Repeat indicator, 0-3
    pub repeat_indicator: u8,
    /// Maritime Mobile Service Identity, nine-digit external key
    pub mmsi: Mmsi,
    /// VHF channel from the NMEA envelope
    pub channel: Channel,
    /// Link-layer identifier derived from the MMSI
    pub mac: MacAddr,
    /// Carrier frequency hint in kHz
    pub frequency_khz: u32,
    /// When the sentence was received
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: RecordBody,
}
