//! Packet encoder: `begin` → repeated `encode_*` → `end`. Range
//! errors on an individual field leave the session in `Begun` so the caller
//! can retry with a corrected value; a buffer overflow in `end` is fatal and
//! poisons the session, since the in-progress field set cannot be salvaged
//! into a smaller buffer.
use crate::core::{FieldId, FieldValue, PacketHeader, MAX_SLOTS};
use crate::error::{CodecError, ContextError, FieldError, HeaderError};
use crate::infra::codec::bits::BitWriter;
use crate::infra::codec::presence::PresenceChain;
use crate::infra::codec::registry;
use crate::infra::codec::tlv::TlvEntry;
use crate::protocol::variant_map::{self, VariantDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncoderState {
    Idle,
    Begun,
    Ended,
}

/// Builds one packet at a time; call [`Encoder::begin`] again to reuse the
/// same instance (and its backing field-slot array) for the next packet.
pub struct Encoder {
    state: EncoderState,
    header: Option<PacketHeader>,
    table: Option<VariantDescriptor>,
    fields: [Option<FieldValue>; MAX_SLOTS],
    tlv: crate::infra::codec::tlv::TlvTable,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            state: EncoderState::Idle,
            header: None,
            table: None,
            fields: [None; MAX_SLOTS],
            tlv: crate::infra::codec::tlv::TlvTable::default(),
        }
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new packet. May be called again after [`Encoder::end`] to
    /// reuse the instance; calling it again before `end` re-starts the
    /// session (the partially-built packet so far is discarded).
    pub fn begin(&mut self, variant: u8, station: u16, sequence: u16) -> Result<(), CodecError> {
        if station > 0x0FFF {
            return Err(HeaderError::StationOutOfRange(station).into());
        }
        let table = variant_map::lookup(variant)?;
        #[cfg(feature = "defmt")]
        defmt::trace!("begin: variant={} station={} sequence={}", variant, station, sequence);
        self.header = Some(PacketHeader {
            variant,
            station,
            sequence,
        });
        self.table = Some(table);
        self.fields = [None; MAX_SLOTS];
        self.tlv = crate::infra::codec::tlv::TlvTable::default();
        self.state = EncoderState::Begun;
        Ok(())
    }

    fn require_begun(&self) -> Result<VariantDescriptor, CodecError> {
        match self.state {
            EncoderState::Begun => Ok(self.table.expect("Begun implies a resolved table")),
            EncoderState::Idle => Err(ContextError::NotBegun.into()),
            EncoderState::Ended => Err(ContextError::AlreadyEnded.into()),
        }
    }

    /// Stage one field's value. Fails without changing session state if the
    /// active variant has no slot for this field-type, or the field was
    /// already staged this session.
    pub fn encode_field(&mut self, value: FieldValue) -> Result<(), CodecError> {
        let table = self.require_begun()?;
        let id = value.id();
        let slot = variant_map::slot_of(table.slots, id).ok_or(FieldError::NotInVariant(id))?;
        if self.fields[slot].is_some() {
            return Err(ContextError::DuplicateField(id).into());
        }
        self.fields[slot] = Some(value);
        Ok(())
    }

    /// Stage one TLV entry, up to [`crate::core::MAX_TLV_ENTRIES`].
    pub fn encode_tlv(&mut self, entry: TlvEntry) -> Result<(), CodecError> {
        self.require_begun()?;
        self.tlv.push(entry)?;
        Ok(())
    }

    /// Finish the packet, writing it into `out`. Returns the number of bytes
    /// written. Slots are emitted in the variant's declared order, not
    /// insertion order.
    pub fn end(&mut self, out: &mut [u8]) -> Result<usize, CodecError> {
        let table = self.require_begun()?;
        match self.write(table, out) {
            Ok(len) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("end: wrote {} bytes", len);
                self.state = EncoderState::Ended;
                Ok(len)
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("end: failed, poisoning session");
                // A failed `end` cannot be retried into a larger buffer by
                // replaying only the tail, so the session is poisoned.
                self.state = EncoderState::Ended;
                Err(e)
            }
        }
    }

    fn write(&self, table: VariantDescriptor, out: &mut [u8]) -> Result<usize, CodecError> {
        let header = self.header.expect("Begun implies a header");
        let mut presence = PresenceChain::default();
        for (i, slot) in table.slots.iter().enumerate() {
            if slot.is_some() {
                presence.slots[i] = self.fields[i].is_some();
            }
        }
        presence.tlv_present = self.tlv.len > 0;

        let mut w = BitWriter::new(out);
        w.put(header.variant as u32, 4)?;
        w.put(header.station as u32, 12)?;
        w.put(header.sequence as u32, 16)?;
        presence.encode(&mut w)?;
        for value in self.fields.iter().flatten() {
            let descriptor = registry::descriptor(value.id())
                .unwrap_or_else(|| panic!("no registry row for {:?}", value.id()));
            (descriptor.encode)(&mut w, value)?;
        }
        if presence.tlv_present {
            self.tlv.encode(&mut w)?;
        }
        Ok(w.byte_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_field_before_begin_fails() {
        let mut enc = Encoder::new();
        let err = enc.encode_field(FieldValue::Flags(0)).unwrap_err();
        assert!(matches!(err, CodecError::Context(ContextError::NotBegun)));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let mut enc = Encoder::new();
        enc.begin(0, 1, 1).unwrap();
        enc.encode_field(FieldValue::Battery {
            level_pct: 50,
            charging: false,
        })
        .unwrap();
        let err = enc
            .encode_field(FieldValue::Battery {
                level_pct: 60,
                charging: false,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Context(ContextError::DuplicateField(FieldId::Battery))
        ));
    }

    #[test]
    fn field_not_in_variant_is_rejected() {
        let mut enc = Encoder::new();
        enc.begin(2, 1, 1).unwrap(); // variant 2 = radiation, no `wind` slot
        let err = enc
            .encode_field(FieldValue::Wind {
                speed_ms: 0.0,
                dir_deg: 0,
                gust_ms: 0.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Field(FieldError::NotInVariant(FieldId::Wind))
        ));
    }

    #[test]
    fn end_before_begin_fails() {
        let mut enc = Encoder::new();
        let mut buf = [0u8; 16];
        assert!(matches!(
            enc.end(&mut buf),
            Err(CodecError::Context(ContextError::NotBegun))
        ));
    }

    #[test]
    fn a_minimal_packet_encodes_without_error() {
        let mut enc = Encoder::new();
        enc.begin(0, 42, 7).unwrap();
        enc.encode_field(FieldValue::Battery {
            level_pct: 80,
            charging: false,
        })
        .unwrap();
        let mut buf = [0u8; 32];
        let len = enc.end(&mut buf).unwrap();
        assert!(len > 0);
    }
}
