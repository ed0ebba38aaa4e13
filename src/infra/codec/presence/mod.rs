//! The presence chain: which of a variant's slots are populated,
//! packed as a minimal prefix of 1-byte groups. Byte 0 carries 6 slot bits, a
//! `tlv_present` bit, and an extension bit; each following byte carries 7
//! slot bits and an extension bit. Encoding stops at the highest populated
//! slot rather than always emitting all [`MAX_PRESENCE_BYTES`] bytes.
use crate::core::{MAX_PRESENCE_BYTES, MAX_SLOTS};
use crate::error::DecodeError;
use crate::infra::codec::bits::{BitReader, BitWriter};

/// Slot bits for one packet, indexed by the active variant's slot order
/// (not by [`crate::core::FieldId`] directly — the variant map is what
/// assigns a field-type to a slot).
#[derive(Debug, Clone, Copy)]
pub struct PresenceChain {
    pub slots: [bool; MAX_SLOTS],
    pub tlv_present: bool,
}

impl Default for PresenceChain {
    fn default() -> Self {
        Self {
            slots: [false; MAX_SLOTS],
            tlv_present: false,
        }
    }
}

impl PresenceChain {
    fn highest_set(&self) -> Option<usize> {
        self.slots.iter().rposition(|&b| b)
    }

    /// How many presence bytes this chain needs, given its highest set slot.
    fn bytes_needed(&self) -> usize {
        match self.highest_set() {
            None => 1,
            Some(h) if h < 6 => 1,
            Some(h) => 1 + (h - 6) / 7 + 1,
        }
    }

    pub fn encode(&self, w: &mut BitWriter) -> Result<(), crate::error::BufferError> {
        let needed = self.bytes_needed();
        for i in 0..6 {
            w.put_bit(self.slots[i])?;
        }
        w.put_bit(self.tlv_present)?;
        w.put_bit(needed > 1)?;
        for byte_idx in 1..needed {
            let base = 6 + 7 * (byte_idx - 1);
            for i in 0..7 {
                w.put_bit(self.slots.get(base + i).copied().unwrap_or(false))?;
            }
            w.put_bit(byte_idx < needed - 1)?;
        }
        Ok(())
    }

    /// `num_pres_bytes` is the active variant's own declared cap (from its
    /// `VariantDescriptor`); a chain whose extension bits run past it is
    /// rejected even if it would still fit under [`MAX_PRESENCE_BYTES`].
    pub fn decode(r: &mut BitReader, num_pres_bytes: usize) -> Result<Self, DecodeError> {
        let cap = num_pres_bytes.min(MAX_PRESENCE_BYTES);
        let mut chain = Self::default();
        for i in 0..6 {
            chain.slots[i] = r.get_bit("presence.slots0")?;
        }
        chain.tlv_present = r.get_bit("presence.tlv_present")?;
        let mut ext = r.get_bit("presence.ext0")?;
        let mut byte_idx = 1usize;
        while ext {
            if byte_idx >= cap {
                return Err(DecodeError::PresenceOverflow);
            }
            let base = 6 + 7 * (byte_idx - 1);
            for i in 0..7 {
                let bit = r.get_bit("presence.slots")?;
                if base + i < MAX_SLOTS {
                    chain.slots[base + i] = bit;
                }
            }
            ext = r.get_bit("presence.ext")?;
            byte_idx += 1;
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_encodes_to_one_byte() {
        let chain = PresenceChain::default();
        let mut buf = [0u8; 1];
        {
            let mut w = BitWriter::new(&mut buf);
            chain.encode(&mut w).unwrap();
        }
        assert_eq!(buf, [0x00]);
    }

    #[test]
    fn a_slot_within_the_first_byte_needs_no_extension() {
        let mut chain = PresenceChain::default();
        chain.slots[2] = true;
        let mut buf = [0u8; 1];
        {
            let mut w = BitWriter::new(&mut buf);
            chain.encode(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = PresenceChain::decode(&mut r, MAX_PRESENCE_BYTES).unwrap();
        assert!(back.slots[2]);
        assert!(back.slots.iter().enumerate().all(|(i, &s)| i == 2 || !s));
    }

    #[test]
    fn a_slot_past_the_first_byte_sets_the_extension_bit() {
        let mut chain = PresenceChain::default();
        chain.slots[10] = true;
        chain.tlv_present = true;
        let mut buf = [0u8; 2];
        {
            let mut w = BitWriter::new(&mut buf);
            chain.encode(&mut w).unwrap();
        }
        assert_eq!(buf[0] & 0b0000_0001, 1); // ext bit set
        let mut r = BitReader::new(&buf);
        let back = PresenceChain::decode(&mut r, MAX_PRESENCE_BYTES).unwrap();
        assert!(back.tlv_present);
        assert!(back.slots[10]);
    }

    #[test]
    fn round_trips_a_slot_in_the_final_presence_byte() {
        let mut chain = PresenceChain::default();
        chain.slots[MAX_SLOTS - 1] = true;
        let mut buf = [0u8; MAX_PRESENCE_BYTES];
        {
            let mut w = BitWriter::new(&mut buf);
            chain.encode(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = PresenceChain::decode(&mut r, MAX_PRESENCE_BYTES).unwrap();
        assert!(back.slots[MAX_SLOTS - 1]);
    }

    #[test]
    fn more_extension_bits_than_the_cap_is_rejected() {
        let mut buf = [0xFFu8; MAX_PRESENCE_BYTES + 1];
        // Every byte, including one past MAX_PRESENCE_BYTES, sets its ext bit.
        for b in buf.iter_mut() {
            *b = 0xFF;
        }
        let mut r = BitReader::new(&buf);
        assert!(matches!(
            PresenceChain::decode(&mut r, MAX_PRESENCE_BYTES),
            Err(DecodeError::PresenceOverflow)
        ));
    }

    #[test]
    fn a_variants_own_cap_is_enforced_even_under_the_global_limit() {
        // Variant 0 declares 1 presence byte's worth of slots here; a forged
        // extension bit chaining past that must fail even though 2 bytes is
        // still under MAX_PRESENCE_BYTES.
        let buf = [0xFFu8, 0xFF];
        let mut r = BitReader::new(&buf);
        assert!(matches!(
            PresenceChain::decode(&mut r, 1),
            Err(DecodeError::PresenceOverflow)
        ));
    }
}
