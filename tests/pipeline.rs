use chrono::{DateTime, Utc};

use ais_decoder::bitvec::BitVector;
use ais_decoder::config::DecoderConfig;
use ais_decoder::errors::DecodeError;
use ais_decoder::models::RecordBody;
use ais_decoder::pipeline::DecodePipeline;

fn pipeline() -> DecodePipeline {
    DecodePipeline::new(DecoderConfig::default())
}

fn attempt_fragments_pipeline() -> DecodePipeline {
    DecodePipeline::new(DecoderConfig {
        require_fragment_reassembly_upstream: false,
        ..DecoderConfig::default()
    })
}

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_668_075_025, 0).unwrap()
}

/// Frame content fields into a checksummed NMEA sentence.
fn sentence(content: &str) -> String {
    let checksum = content.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("!{content}*{checksum:02X}")
}

/// Append `width` bits of `value`, MSB first.
fn push_bits(acc: &mut Vec<bool>, value: u64, width: usize) {
    for i in (0..width).rev() {
        acc.push((value >> i) & 1 == 1);
    }
}

fn push_text(acc: &mut Vec<bool>, text: &str, n_chars: usize) {
    for i in 0..n_chars {
        let v = match text.as_bytes().get(i) {
            Some(&b) if b >= 64 => u64::from(b - 64),
            Some(&b) => u64::from(b),
            None => 0, // '@' fill
        };
        push_bits(acc, v, 6);
    }
}

/// Pack accumulated bits into an armored payload string.
fn armor_bits(acc: &[bool]) -> String {
    acc.chunks(6)
        .map(|chunk| {
            let mut v = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                if bit {
                    v |= 1 << (5 - i);
                }
            }
            char::from(if v > 39 { v + 48 + 8 } else { v + 48 })
        })
        .collect()
}

/// Build a nominal 168-bit Class A position report payload.
fn type1_payload(mmsi: u64, lat_deg: f64, lon_deg: f64, sog_tenths: u64) -> String {
    let mut acc = Vec::new();
    push_bits(&mut acc, 1, 6); // message type
    push_bits(&mut acc, 0, 2); // repeat
    push_bits(&mut acc, mmsi, 30);
    push_bits(&mut acc, 0, 4); // nav status
    push_bits(&mut acc, 0x80, 8); // rot, not available
    push_bits(&mut acc, sog_tenths, 10);
    push_bits(&mut acc, 0, 1); // position accuracy
    let lon = ((lon_deg * 600_000.0).round() as i64 as u64) & ((1 << 28) - 1);
    let lat = ((lat_deg * 600_000.0).round() as i64 as u64) & ((1 << 27) - 1);
    push_bits(&mut acc, lon, 28);
    push_bits(&mut acc, lat, 27);
    push_bits(&mut acc, 0, 12); // cog
    push_bits(&mut acc, 511, 9); // heading, not available
    push_bits(&mut acc, 14, 6); // timestamp
    push_bits(&mut acc, 0, 2); // maneuver
    push_bits(&mut acc, 0, 3); // spare
    push_bits(&mut acc, 0, 1); // raim
    push_bits(&mut acc, 0, 19); // radio
    armor_bits(&acc)
}

/// Build a nominal 424-bit static/voyage payload.
fn type5_payload(mmsi: u64, name: &str, destination: &str) -> String {
    let mut acc = Vec::new();
    push_bits(&mut acc, 5, 6); // message type
    push_bits(&mut acc, 0, 2); // repeat
    push_bits(&mut acc, mmsi, 30);
    push_bits(&mut acc, 0, 2); // ais version
    push_bits(&mut acc, 9_074_729, 30); // imo
    push_text(&mut acc, "3FOF8", 7); // callsign
    push_text(&mut acc, name, 20);
    push_bits(&mut acc, 70, 8); // ship type
    push_bits(&mut acc, 160, 9); // dim to bow
    push_bits(&mut acc, 33, 9); // dim to stern
    push_bits(&mut acc, 20, 6); // dim to port
    push_bits(&mut acc, 12, 6); // dim to starboard
    push_bits(&mut acc, 1, 4); // epfd
    push_bits(&mut acc, 11, 4); // eta month
    push_bits(&mut acc, 6, 5); // eta day
    push_bits(&mut acc, 3, 5); // eta hour
    push_bits(&mut acc, 0, 6); // eta minute
    push_bits(&mut acc, 68, 8); // draught, 6.8 m
    push_text(&mut acc, destination, 20);
    push_bits(&mut acc, 0, 1); // dte
    push_bits(&mut acc, 0, 1); // spare
    armor_bits(&acc)
}

#[test]
fn decodes_class_a_position_report() {
    let record = pipeline()
        .decode_sentence("!AIVDM,1,1,,A,133m@ogP00PD;88MD5MTDww@2D7k,0*46", now())
        .unwrap();

    assert_eq!(record.message_type, 1);
    assert_eq!(record.mmsi.to_string(), "205344990");
    assert_eq!(record.channel.as_str(), "A");
    assert_eq!(record.frequency_khz, 161_975);

    let RecordBody::PositionReport(report) = &record.body else {
        panic!("expected a position report");
    };
    assert!((report.sog - 0.0).abs() < 1e-9);
    assert!((report.lat - 51.2296).abs() < 1e-3);
    assert!((report.lon - 4.4070).abs() < 1e-3);
    assert_eq!(report.rot, -128);
    assert_eq!(report.true_heading, 511);
}

#[test]
fn mmsi_is_the_30_bits_at_offset_8() {
    let content = format!(
        "AIVDM,1,1,,B,{},0",
        type1_payload(227_006_760, 49.4755, 0.1313, 0)
    );
    let record = pipeline().decode_sentence(&sentence(&content), now()).unwrap();

    assert_eq!(record.mmsi.to_string(), "227006760");
    let RecordBody::PositionReport(report) = &record.body else {
        panic!("expected a position report");
    };
    assert!((report.lat - 49.4755).abs() < 1e-4);
    assert!((report.lon - 0.1313).abs() < 1e-4);
    assert!((report.sog - 0.0).abs() < 1e-9);
}

#[test]
fn mmsi_preserves_leading_zeros() {
    let content = format!("AIVDM,1,1,,A,{},0", type1_payload(6_760, 60.0, 20.0, 17));
    let record = pipeline().decode_sentence(&sentence(&content), now()).unwrap();
    assert_eq!(record.mmsi.to_string(), "000006760");
}

#[test]
fn checksum_mismatch_yields_no_record() {
    let result = pipeline().decode_sentence("!AIVDM,1,1,,A,133m@ogP00PD;88MD5MTDww@2D7k,0*00", now());
    assert!(matches!(result, Err(DecodeError::ChecksumFailed { .. })));
}

#[test]
fn corrupted_payload_fails_the_checksum() {
    let good = sentence("AIVDM,1,1,,A,133m@ogP00PD;88MD5MTDww@2D7k,0");
    // Flip a single armor character without touching the checksum field
    let corrupted = good.replacen("ogP", "ogQ", 1);
    assert!(matches!(
        pipeline().decode_sentence(&corrupted, now()),
        Err(DecodeError::ChecksumFailed { .. })
    ));
}

#[test]
fn base_station_report_is_unsupported() {
    // First payload character '4' decodes to message type 4
    let payload = format!("4{}", &type1_payload(2_573_105, 59.0, 10.0, 0)[1..]);
    let content = format!("AIVDM,1,1,,A,{payload},0");
    assert!(matches!(
        pipeline().decode_sentence(&sentence(&content), now()),
        Err(DecodeError::UnsupportedType(4))
    ));
}

#[test]
fn static_voyage_decodes_and_trims_strings() {
    let content = format!(
        "AIVDM,1,1,,B,{},2",
        type5_payload(227_006_760, "EVER GIVEN", "ROTTERDAM")
    );
    let record = pipeline().decode_sentence(&sentence(&content), now()).unwrap();

    assert_eq!(record.message_type, 5);
    let RecordBody::StaticVoyage(voyage) = &record.body else {
        panic!("expected static/voyage data");
    };
    // The wire field is "EVER GIVEN@@@@@@@@@@"
    assert_eq!(voyage.vessel_name, "EVER GIVEN");
    assert_eq!(voyage.callsign, "3FOF8");
    assert_eq!(voyage.destination, "ROTTERDAM");
    assert_eq!(voyage.eta_str, "11-06 03:00 UTC");
    assert!((voyage.draught - 6.8).abs() < 1e-9);
}

#[test]
fn fragmented_type5_default_policy() {
    let first = sentence("AIVDM,2,1,3,B,55P5TL01VIaAL@7WKO@mBplU@<PDhh000000001S;AJ::4A80?4i@E53,0");
    let second = sentence("AIVDM,2,2,3,B,1@0000000000000,2");
    let p = pipeline();

    // The continuation fragment is dropped outright
    assert!(matches!(
        p.decode_sentence(&second, now()),
        Err(DecodeError::FragmentedUnsupported {
            number: 2,
            count: 2
        })
    ));
    // The first fragment is attempted, but a type 5 does not fit in it
    assert!(matches!(
        p.decode_sentence(&first, now()),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn fragmented_type5_attempt_policy() {
    let first = sentence("AIVDM,2,1,3,B,55P5TL01VIaAL@7WKO@mBplU@<PDhh000000001S;AJ::4A80?4i@E53,0");
    let record = attempt_fragments_pipeline()
        .decode_sentence(&first, now())
        .unwrap();

    assert_eq!(record.message_type, 5);
    assert_eq!(record.mmsi.to_string(), "369190000");
    let RecordBody::StaticVoyage(voyage) = &record.body else {
        panic!("expected static/voyage data");
    };
    // Fields beyond the first fragment's coverage read as unavailable
    assert_eq!(voyage.destination, "");
    assert_eq!(voyage.dte, 1);
}

#[test]
fn mac_key_is_stable_and_namespaced() {
    let content = format!(
        "AIVDM,1,1,,B,{},0",
        type1_payload(227_006_760, 49.4755, 0.1313, 0)
    );
    let p = pipeline();
    let a = p.decode_sentence(&sentence(&content), now()).unwrap();
    let b = p.decode_sentence(&sentence(&content), now()).unwrap();

    // 227006760 = 0x0D87D928, low 24 bits fill the address tail
    assert_eq!(a.mac.to_string(), "02:41:49:87:D9:28");
    assert_eq!(a.mac, b.mac);
}

#[test]
fn armor_round_trip_reconstructs_values() {
    for (value, width) in [
        (0u64, 6),
        (1, 6),
        (0b101010_110011, 12),
        (227_006_760, 30),
        (0xDEAD_BEEF_CAFE, 48),
        ((1 << 60) - 1, 60),
    ] {
        let mut acc = Vec::new();
        push_bits(&mut acc, value, width);
        let armored = armor_bits(&acc);
        let bits = BitVector::from_armored(&armored, 0, true).unwrap();
        assert_eq!(bits.len(), width);
        assert_eq!(bits.uint(0, width).unwrap(), value, "width {width}");
    }
}

#[test]
fn json_feed_payloads_take_the_same_shape() {
    let p = pipeline();

    // Wrapped raw sentence
    let line = sentence("AIVDM,1,1,,A,133m@ogP00PD;88MD5MTDww@2D7k,0");
    let wrapped = format!("{{\"raw_sentence\": {line:?}}}");
    let record = p.decode_payload(wrapped.as_bytes(), now()).unwrap();
    assert_eq!(record.mmsi.to_string(), "205344990");

    // Pre-parsed fields with alias keys
    let parsed = br#"{
        "mmsi": 230123456,
        "shipname": "ARUNA CIHAN",
        "imo": 9543756,
        "shiptype": 70,
        "callsign": "V7WW7",
        "destination": "UST LUGA"
    }"#;
    let record = p.decode_payload(parsed, now()).unwrap();
    assert_eq!(record.message_type, 5);
    assert_eq!(record.mmsi.to_string(), "230123456");
    let RecordBody::StaticVoyage(voyage) = &record.body else {
        panic!("expected static/voyage data");
    };
    assert_eq!(voyage.vessel_name, "ARUNA CIHAN");
    assert_eq!(voyage.imo_number, 9_543_756);
}

#[test]
fn own_vessel_sentences_decode() {
    let content = format!(
        "AIVDO,1,1,,B,{},0",
        type1_payload(230_123_456, 60.03802, 20.345818, 107)
    );
    let record = pipeline().decode_sentence(&sentence(&content), now()).unwrap();
    assert_eq!(record.mmsi.to_string(), "230123456");
    let RecordBody::PositionReport(report) = &record.body else {
        panic!("expected a position report");
    };
    assert!((report.sog - 10.7).abs() < 1e-9);
}

#[test]
fn emitted_record_carries_stable_keys() {
    let content = format!(
        "AIVDM,1,1,,B,{},0",
        type1_payload(227_006_760, 49.4755, 0.1313, 0)
    );
    let record = pipeline().decode_sentence(&sentence(&content), now()).unwrap();
    let json = serde_json::to_value(&record).unwrap();

    for key in [
        "message_type",
        "repeat_indicator",
        "mmsi",
        "channel",
        "mac",
        "frequency_khz",
        "received_at",
        "nav_status",
        "rot",
        "sog",
        "pos_accuracy",
        "lon",
        "lat",
        "cog",
        "true_heading",
        "timestamp",
        "maneuver_indicator",
        "raim_flag",
        "radio_status",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["mmsi"], "227006760");
    assert_eq!(json["mac"], "02:41:49:87:D9:28");
}
