//! Hex + bit-annotated dump of the raw packet bytes: one line per byte, its
//! hex value and binary form, plus the wire-layout structure (`'header'`,
//! `'pres0'`, `'temperature: 9 bits'`, `'tlv'`) occupying that byte. A
//! capture that doesn't decode (malformed, or a reserved/unknown variant)
//! still renders, just without annotations.
use super::ScratchWriter;
use core::fmt::Write;

#[cfg(feature = "decoder")]
use crate::core::MAX_SLOTS;
#[cfg(feature = "decoder")]
use crate::infra::codec::registry;
#[cfg(feature = "decoder")]
use crate::protocol::decoder;
#[cfg(feature = "decoder")]
use crate::protocol::variant_map;

#[cfg(feature = "decoder")]
const MAX_SPANS: usize = MAX_SLOTS + crate::core::MAX_PRESENCE_BYTES + 2;

#[cfg(feature = "decoder")]
#[derive(Clone, Copy)]
enum SpanKind {
    Header,
    Presence(usize),
    Field(&'static str, usize),
    Tlv,
}

#[cfg(feature = "decoder")]
#[derive(Clone, Copy)]
struct Span {
    start_bit: usize,
    end_bit: usize,
    kind: SpanKind,
}

#[cfg(feature = "decoder")]
fn build_spans(bytes: &[u8]) -> [Option<Span>; MAX_SPANS] {
    let mut spans: [Option<Span>; MAX_SPANS] = [None; MAX_SPANS];
    let mut n = 0;

    let Ok(record) = decoder::decode(bytes) else {
        return spans;
    };
    let Ok(table) = variant_map::lookup(record.header.variant) else {
        return spans;
    };

    spans[n] = Some(Span {
        start_bit: 0,
        end_bit: 32,
        kind: SpanKind::Header,
    });
    n += 1;

    let highest_slot = record.fields.iter().rposition(|f| f.is_some());
    let presence_bytes = match highest_slot {
        None => 1,
        Some(h) if h < 6 => 1,
        Some(h) => 1 + (h - 6) / 7 + 1,
    };
    for b in 0..presence_bytes {
        spans[n] = Some(Span {
            start_bit: 32 + b * 8,
            end_bit: 32 + (b + 1) * 8,
            kind: SpanKind::Presence(b),
        });
        n += 1;
    }

    let mut bit_cursor = 32 + presence_bytes * 8;
    for (slot_idx, slot) in table.slots.iter().enumerate() {
        let Some(entry) = slot else { continue };
        let Some(value) = &record.fields[slot_idx] else {
            continue;
        };
        let width = registry::descriptor(entry.field).map(|d| (d.width)(value)).unwrap_or(0) as usize;
        if n < MAX_SPANS {
            spans[n] = Some(Span {
                start_bit: bit_cursor,
                end_bit: bit_cursor + width,
                kind: SpanKind::Field(entry.label, width),
            });
            n += 1;
        }
        bit_cursor += width;
    }

    if record.tlv.len > 0 && n < MAX_SPANS {
        spans[n] = Some(Span {
            start_bit: bit_cursor,
            end_bit: bytes.len() * 8,
            kind: SpanKind::Tlv,
        });
    }

    spans
}

/// Render `bytes` as an annotated hex/binary dump into `out`. Returns the
/// number of bytes written to `out`, or `Err(())` if `out` was too small.
#[cfg(feature = "decoder")]
pub fn dump(bytes: &[u8], out: &mut [u8]) -> Result<usize, ()> {
    let mut w = ScratchWriter::new(out);
    let spans = build_spans(bytes);
    for (i, byte) in bytes.iter().enumerate() {
        let byte_start = i * 8;
        let byte_end = byte_start + 8;
        write!(w, "{i:3}: 0x{byte:02X}  {byte:08b}").map_err(|_| ())?;
        let mut first = true;
        for span in spans.iter().flatten() {
            if span.start_bit >= byte_end || span.end_bit <= byte_start {
                continue;
            }
            write!(w, "{}", if first { "  " } else { ", " }).map_err(|_| ())?;
            first = false;
            match span.kind {
                SpanKind::Header => write!(w, "'header'"),
                SpanKind::Presence(idx) => write!(w, "'pres{idx}'"),
                SpanKind::Field(label, bits) => write!(w, "'{label}: {bits} bits'"),
                SpanKind::Tlv => write!(w, "'tlv'"),
            }
            .map_err(|_| ())?;
        }
        writeln!(w).map_err(|_| ())?;
    }
    Ok(w.len())
}

/// Without the `decoder` feature there is no way to resolve field
/// boundaries, so this renders plain hex/binary lines only.
#[cfg(not(feature = "decoder"))]
pub fn dump(bytes: &[u8], out: &mut [u8]) -> Result<usize, ()> {
    let mut w = ScratchWriter::new(out);
    for (i, byte) in bytes.iter().enumerate() {
        writeln!(w, "{i:3}: 0x{byte:02X}  {byte:08b}").map_err(|_| ())?;
    }
    Ok(w.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_renders_one_line_per_byte() {
        let bytes = [0xF0u8, 0x0A];
        let mut out = [0u8; 128];
        let len = dump(&bytes, &mut out).unwrap();
        let text = core::str::from_utf8(&out[..len]).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("0xF0"));
        assert!(text.contains("11110000"));
    }

    #[test]
    fn dump_reports_an_undersized_buffer() {
        let bytes = [0xFFu8; 4];
        let mut out = [0u8; 2];
        assert!(dump(&bytes, &mut out).is_err());
    }

    #[test]
    #[cfg(all(feature = "decoder", feature = "encoder"))]
    fn dump_annotates_the_header_and_presence_bytes_of_a_valid_packet() {
        use crate::core::FieldValue;
        use crate::protocol::encoder::Encoder;

        let mut enc = Encoder::new();
        enc.begin(0, 1, 2).unwrap();
        enc.encode_field(FieldValue::Clouds(4)).unwrap();
        let mut buf = [0u8; 32];
        let len = enc.end(&mut buf).unwrap();

        let mut out = [0u8; 1024];
        let out_len = dump(&buf[..len], &mut out).unwrap();
        let text = core::str::from_utf8(&out[..out_len]).unwrap();
        assert!(text.contains("'header'"));
        assert!(text.contains("'pres0'"));
        assert!(text.contains("'clouds:"));
    }
}
