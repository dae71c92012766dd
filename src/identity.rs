//! Deterministic MMSI to link-layer identifier mapping.
//!
//! Vessel observations are keyed by a MAC-48 so the outer device tracker can
//! file them alongside every other phy. The address is locally administered
//! (first byte 0x02) and namespaced with the literal bytes `'A'`, `'I'`; the
//! low 24 bits of the MMSI fill the rest. Two MMSIs differing only above
//! bit 23 would collide, but the mapping is stable per MMSI, which is what
//! the tracker needs.

use serde::Serialize;

use crate::models::Mmsi;

/// A MAC-48 link-layer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }

    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Derive the AIS-namespaced MAC for a vessel.
pub fn mmsi_to_mac(mmsi: Mmsi) -> MacAddr {
    let v = mmsi.value();
    MacAddr([
        0x02, // locally administered
        0x41, // 'A'
        0x49, // 'I'
        (v >> 16) as u8,
        (v >> 8) as u8,
        v as u8,
    ])
}
