//! Bit-level codec machinery: the reader/writer pair, the quantisation
//! maps, the static field registry, the presence chain, TLV metadata, and
//! the image field's own compressors.
pub mod bits;
#[cfg(feature = "field-image")]
pub mod image;
pub mod presence;
pub mod quantiser;
pub mod registry;
pub mod tlv;
