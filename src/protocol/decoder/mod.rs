//! Packet decoder: a single-shot byte-slice-to-[`DecodedRecord`]
//! pass, plus [`peek`] for header-only inspection (a gateway deduplicating
//! on `station`/`sequence` has no reason to pay for a full field decode).
use crate::core::{FieldId, FieldsPresent, PacketHeader, MAX_SLOTS};
use crate::error::{CodecError, DecodeError};
use crate::infra::codec::bits::BitReader;
use crate::infra::codec::presence::PresenceChain;
use crate::infra::codec::registry;
use crate::infra::codec::tlv::TlvTable;
use crate::protocol::record::DecodedRecord;
use crate::protocol::variant_map;

/// Minimum packet size: 4-byte header plus at least one presence byte.
const MIN_PACKET_BYTES: usize = 5;

/// Parse only the fixed 32-bit header, without resolving a variant table or
/// touching the presence chain. Never fails on a reserved variant: header
/// inspection is meant to stay usable even for packets the active variant
/// set can't fully decode (a gateway deduplicating by `station`/`sequence`
/// still needs the header from a packet on a variant it doesn't recognize).
pub fn peek(bytes: &[u8]) -> Result<PacketHeader, CodecError> {
    if bytes.len() < 4 {
        return Err(DecodeError::Short(bytes.len()).into());
    }
    let mut r = BitReader::new(bytes);
    Ok(read_header(&mut r)?)
}

fn read_header(r: &mut BitReader) -> Result<PacketHeader, DecodeError> {
    let variant = r.get(4, "header.variant")? as u8;
    let station = r.get(12, "header.station")? as u16;
    let sequence = r.get(16, "header.sequence")? as u16;
    Ok(PacketHeader {
        variant,
        station,
        sequence,
    })
}

/// Decode a full packet from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<DecodedRecord, CodecError> {
    if bytes.len() < MIN_PACKET_BYTES {
        return Err(DecodeError::Short(bytes.len()).into());
    }
    let mut r = BitReader::new(bytes);
    let header = read_header(&mut r)?;
    if header.variant == 15 {
        #[cfg(feature = "defmt")]
        defmt::warn!("decode: reserved variant 15 rejected");
        return Err(DecodeError::Variant.into());
    }
    let table = variant_map::lookup(header.variant).map_err(|_| DecodeError::VariantUnknown(header.variant))?;
    #[cfg(feature = "defmt")]
    defmt::trace!("decode: variant={} station={} sequence={}", header.variant, header.station, header.sequence);

    let presence = PresenceChain::decode(&mut r, table.num_pres_bytes)?;

    let mut fields: [Option<crate::core::FieldValue>; MAX_SLOTS] = [None; MAX_SLOTS];
    let mut field_count = 0usize;
    for (slot_idx, slot) in table.slots.iter().enumerate() {
        if !presence.slots.get(slot_idx).copied().unwrap_or(false) {
            continue;
        }
        let Some(entry) = slot else { continue };
        let descriptor = registry::descriptor(entry.field)
            .unwrap_or_else(|| panic!("no registry row for {:?}", entry.field));
        let value = (descriptor.decode)(&mut r)?;
        fields[slot_idx] = Some(value);
        field_count += 1;
    }

    let tlv = if presence.tlv_present {
        TlvTable::decode(&mut r)?
    } else {
        TlvTable::default()
    };

    Ok(DecodedRecord {
        header,
        fields,
        field_count,
        tlv,
    })
}

/// The [`FieldsPresent`] bitmap implied by a decoded record's fields.
pub fn present_mask(record: &DecodedRecord) -> FieldsPresent {
    let mut mask = FieldsPresent::empty();
    for value in record.fields() {
        mask.set(value.id());
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;
    use crate::protocol::encoder::Encoder;

    #[test]
    fn too_short_a_buffer_is_rejected() {
        assert!(matches!(decode(&[0u8; 3]), Err(CodecError::Decode(DecodeError::Short(3)))));
    }

    #[test]
    fn variant_15_is_rejected() {
        // variant:4=1111, station/sequence: zero.
        let bytes = [0xF0, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(decode(&bytes), Err(CodecError::Decode(DecodeError::Variant))));
    }

    #[test]
    fn round_trips_through_encoder_and_decoder() {
        let mut enc = Encoder::new();
        enc.begin(0, 42, 7).unwrap();
        enc.encode_field(FieldValue::Battery {
            level_pct: 80,
            charging: true,
        })
        .unwrap();
        enc.encode_field(FieldValue::Clouds(3)).unwrap();
        let mut buf = [0u8; 32];
        let len = enc.end(&mut buf).unwrap();

        let record = decode(&buf[..len]).unwrap();
        assert_eq!(record.header.station, 42);
        assert_eq!(record.header.sequence, 7);
        let FieldValue::Battery { level_pct, charging } = record.get(FieldId::Battery).unwrap() else {
            panic!("expected battery field")
        };
        assert!((*level_pct as i32 - 80).abs() <= 4);
        assert!(*charging);
        assert_eq!(record.get(FieldId::Clouds), Some(&FieldValue::Clouds(3)));
    }

    #[test]
    fn peek_reads_the_header_of_an_otherwise_undecodable_packet() {
        let bytes = [0xF0, 0x00, 0x00, 0x00];
        let header = peek(&bytes).unwrap();
        assert_eq!(header.variant, 15);
    }
}
