//! Scenario coverage for minimal packets, rejected/truncated decodes, TLV
//! overflow, and a full-packet JSON round trip. A weather-bundle scenario
//! with `air_quality_index`/`radiation` alongside the other weather fields
//! is exercised, in adapted form, by `roundtrip.rs`'s quantisation-tolerance
//! test instead — this crate's variant 0 does not carry those two fields,
//! which live in their own variants here; see DESIGN.md.
use lorawire::core::FieldValue;
use lorawire::error::{CodecError, DecodeError, TlvError};
use lorawire::infra::codec::tlv::TlvEntry;
use lorawire::protocol::decoder;
use lorawire::protocol::encoder::Encoder;
use lorawire::protocol::json;

/// variant=0, station=1, sequence=1, only battery(75%, charging).
#[test]
fn s1_minimal_battery_packet() {
    let mut enc = Encoder::new();
    enc.begin(0, 1, 1).unwrap();
    enc.encode_field(FieldValue::Battery {
        level_pct: 75,
        charging: true,
    })
    .unwrap();
    let mut buf = [0u8; 16];
    let len = enc.end(&mut buf).unwrap();
    assert_eq!(len, 6);

    let record = decoder::decode(&buf[..len]).unwrap();
    let FieldValue::Battery { level_pct, charging } =
        record.get(lorawire::core::FieldId::Battery).unwrap()
    else {
        panic!("expected battery")
    };
    assert!((*level_pct as i32).clamp(71, 79) == *level_pct as i32);
    assert!(*charging);
}

/// Minimal empty packet variant=0 station=0 seq=0 is exactly
/// `00 00 00 00 00`, and decodes to an empty mask.
#[test]
fn s3_empty_packet_is_five_zero_bytes() {
    let mut enc = Encoder::new();
    enc.begin(0, 0, 0).unwrap();
    let mut buf = [0u8; 16];
    let len = enc.end(&mut buf).unwrap();
    assert_eq!(&buf[..len], &[0, 0, 0, 0, 0]);

    let record = decoder::decode(&buf[..len]).unwrap();
    assert_eq!(record.field_count, 0);
}

/// Reserved variant packet `F0 00 00 00 00` reports `DecodeError::Variant`.
#[test]
fn s4_reserved_variant_is_rejected() {
    let bytes = [0xF0, 0x00, 0x00, 0x00, 0x00];
    assert!(matches!(
        decoder::decode(&bytes),
        Err(CodecError::Decode(DecodeError::Variant))
    ));
}

/// A packet truncated to its first 5 bytes reports a truncation error.
#[test]
fn s5_truncated_packet_is_rejected() {
    let mut enc = Encoder::new();
    enc.begin(0, 1, 1).unwrap();
    enc.encode_field(FieldValue::Battery {
        level_pct: 50,
        charging: false,
    })
    .unwrap();
    enc.encode_field(FieldValue::Environment {
        temperature: 20.0,
        pressure: 1000,
        humidity: 40,
    })
    .unwrap();
    let mut buf = [0u8; 16];
    let len = enc.end(&mut buf).unwrap();
    assert!(len > 5);

    let truncated = &buf[..5];
    assert!(matches!(
        decoder::decode(truncated),
        Err(CodecError::Decode(DecodeError::Truncated { .. }))
    ));
}

/// An 8-entry TLV table rejects a 9th entry.
#[test]
fn s6_a_ninth_tlv_entry_overflows() {
    let mut enc = Encoder::new();
    enc.begin(0, 1, 1).unwrap();
    for _ in 0..8 {
        enc.encode_tlv(TlvEntry::userdata(&[0]).unwrap()).unwrap();
    }
    let err = enc
        .encode_tlv(TlvEntry::userdata(&[0]).unwrap())
        .unwrap_err();
    assert!(matches!(err, CodecError::Tlv(TlvError::Full)));
}

/// Encode a full variant-0 packet, decode to JSON, encode back from JSON:
/// bytes equal the originals.
#[test]
fn s7_full_packet_json_round_trip() {
    let mut enc = Encoder::new();
    enc.begin(0, 1, 1).unwrap();
    enc.encode_field(FieldValue::Battery {
        level_pct: 88,
        charging: false,
    })
    .unwrap();
    enc.encode_field(FieldValue::Link {
        rssi_dbm: -100,
        snr_db: -5.0,
    })
    .unwrap();
    enc.encode_field(FieldValue::Environment {
        temperature: -5.25,
        pressure: 980,
        humidity: 90,
    })
    .unwrap();
    enc.encode_field(FieldValue::Wind {
        speed_ms: 12.0,
        dir_deg: 270,
        gust_ms: 18.5,
    })
    .unwrap();
    enc.encode_field(FieldValue::Rain {
        rate_mmh: 0,
        size_mm: 0.0,
    })
    .unwrap();
    enc.encode_field(FieldValue::Solar {
        irradiance_wm2: 0,
        uv_index: 0,
    })
    .unwrap();
    enc.encode_field(FieldValue::Clouds(8)).unwrap();
    enc.encode_field(FieldValue::Position {
        lat: 59.334591,
        lon: 18.063240,
    })
    .unwrap();
    enc.encode_field(FieldValue::DateTime(3_456_000)).unwrap();
    enc.encode_field(FieldValue::Flags(0x01)).unwrap();
    enc.encode_tlv(TlvEntry::status("OK").unwrap()).unwrap();

    let mut buf = [0u8; 64];
    let len = enc.end(&mut buf).unwrap();
    let original = &buf[..len];

    let value = json::decode_to_json(original).unwrap();
    let rebuilt = json::encode_from_json(&value).unwrap();
    assert_eq!(original, rebuilt.as_slice());
}
