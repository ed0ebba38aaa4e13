//! # Quickstart
//!
//! Minimal walkthrough of `lorawire`:
//! - Build a weather-station packet (variant 0) with the encoder
//! - Decode it back
//! - Project the decoded record to JSON
//!
//! This example uses `std` for a quick trial run; the crate itself runs
//! `no_std` by default.
//!
//! ```bash
//! cargo run --example quickstart --features std,json,dump
//! ```

use lorawire::core::FieldValue;
use lorawire::protocol::encoder::Encoder;
use lorawire::protocol::{decoder, json};

fn main() {
    println!("=== lorawire quickstart ===\n");

    // ======================================================================
    // 1. Encode a weather-station packet (variant 0)
    // ======================================================================
    println!("1. Encoding a variant-0 weather packet");

    let mut encoder = Encoder::new();
    encoder.begin(0, 142, 7).expect("valid header");
    encoder
        .encode_field(FieldValue::Battery {
            level_pct: 82,
            charging: false,
        })
        .expect("battery has a slot in variant 0");
    encoder
        .encode_field(FieldValue::Environment {
            temperature: -5.25,
            pressure: 1013,
            humidity: 64,
        })
        .expect("environment has a slot in variant 0");
    encoder
        .encode_field(FieldValue::Wind {
            speed_ms: 3.4,
            dir_deg: 225,
            gust_ms: 6.1,
        })
        .expect("wind has a slot in variant 0");
    encoder
        .encode_field(FieldValue::Clouds(5))
        .expect("clouds has a slot in variant 0");

    let mut buf = [0u8; 64];
    let len = encoder.end(&mut buf).expect("packet fits in 64 bytes");
    let packet = &buf[..len];

    print!("   Wire bytes ({len}): ");
    for byte in packet {
        print!("{byte:02X} ");
    }
    println!("\n");

    // ======================================================================
    // 2. Decode it back
    // ======================================================================
    println!("2. Decoding the packet");

    let record = decoder::decode(packet).expect("valid packet");
    println!(
        "   station={} sequence={} fields={}\n",
        record.header.station, record.header.sequence, record.field_count
    );

    // ======================================================================
    // 3. Project to JSON, keyed by the variant's own slot labels
    // ======================================================================
    println!("3. Projecting to JSON");

    let value = json::record_to_json(&record).expect("variant 0 is known");
    println!("   {}\n", serde_json::to_string_pretty(&value).unwrap());

    // Round-trip: the JSON carries everything needed to rebuild the exact
    // same bytes.
    let rebuilt = json::encode_from_json(&value).expect("round-trips");
    assert_eq!(rebuilt.as_slice(), packet);
    println!("Round trip complete: JSON re-encodes to the identical bytes.");
}
