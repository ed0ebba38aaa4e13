//! Error taxonomy for the telemetry codec, namespaced by the phase that can
//! raise it (context, buffer, header, field, TLV, image, decode, JSON).
//! Every public operation returns one of these instead of panicking.
use thiserror_no_std::Error;

use crate::core::FieldId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Encoder state-machine misuse (`idle`/`begun`/`ended` transitions).
pub enum ContextError {
    /// `encode_*` called before `begin`.
    #[error("encoder has not been begun")]
    NotBegun,
    /// `encode_*` or `end` called after `end`.
    #[error("encoder session already ended")]
    AlreadyEnded,
    /// The same field-type was encoded twice in one session.
    #[error("field {0:?} already present in this packet")]
    DuplicateField(FieldId),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Output-buffer capacity failures. Fatal: the partial buffer is invalid.
pub enum BufferError {
    /// Buffer cannot even hold the 5-byte minimum (header + 1 presence byte).
    #[error("buffer too small for header: need at least {need}, have {have}")]
    TooSmallForHeader { need: usize, have: usize },
    /// Writing the next field or the TLV block would overflow the buffer.
    #[error("buffer too small: cursor at bit {cursor}, need {need} more bits, capacity {capacity} bits")]
    TooSmall {
        cursor: usize,
        need: usize,
        capacity: usize,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Header (variant/station/sequence) construction failures.
pub enum HeaderError {
    /// Variant 15 is reserved and can never be encoded.
    #[error("variant 15 is reserved")]
    VariantReserved,
    /// Variant id does not index any entry in the supplied variant map.
    #[error("variant {0} unknown to the configured variant map")]
    VariantUnknown(u8),
    /// Station id does not fit in 12 bits.
    #[error("station {0} exceeds the 12-bit range (0..4095)")]
    StationOutOfRange(u16),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Per-field domain violations detected before quantisation.
pub enum FieldError {
    /// Value fell outside the field's documented closed interval.
    #[error("field {field:?} value out of range [{low}, {high}]")]
    OutOfRange {
        field: FieldId,
        low: f64,
        high: f64,
    },
    /// Field-type is not declared in any slot of the active variant.
    #[error("field {0:?} has no slot in the active variant")]
    NotInVariant(FieldId),
    /// Sub-field bitmap (air_quality_pm / air_quality_gas) had no slots present.
    #[error("field {0:?} requires at least one populated sub-slot")]
    EmptyBitmap(FieldId),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// TLV block violations.
pub enum TlvError {
    /// `type` nibble/byte exceeded the 6-bit type space (0..63).
    #[error("TLV type {0} exceeds the 6-bit range (0..63)")]
    TypeOutOfRange(u8),
    /// Raw or string payload exceeded 255 bytes/units.
    #[error("TLV payload length {0} exceeds 255")]
    LengthOutOfRange(usize),
    /// The 8-entry table is full.
    #[error("TLV table is full (max 8 entries)")]
    Full,
    /// A character fell outside the 6-bit string charset.
    #[error("character {0:?} is not in the TLV 6-bit charset")]
    StrCharInvalid(char),
    /// VERSION/CONFIG helper received an odd number of key/value tokens.
    #[error("VERSION/CONFIG payload must have an even key/value token count, got {0}")]
    KvCountMismatch(usize),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Image field violations.
pub enum ImageError {
    /// `pixel_format` tier 3 is reserved.
    #[error("image pixel_format tier 3 is reserved")]
    PixelFormatHigh,
    /// `size_tier` tier 3 is reserved.
    #[error("image size_tier 3 is reserved")]
    SizeTierHigh,
    /// `compression` tier 3 is reserved.
    #[error("image compression tier 3 is reserved")]
    CompressionHigh,
    /// Payload length exceeds 254 bytes.
    #[error("image payload length {0} exceeds 254 bytes")]
    LengthOutOfRange(usize),
    /// Compressor could not shrink the payload into the available space.
    #[error("image compression overflowed the output buffer")]
    CompressionOverflow,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Decode-time failures (distinct from encode-time field/buffer errors).
pub enum DecodeError {
    /// Fewer than 5 bytes supplied.
    #[error("packet too short: {0} bytes, need at least 5")]
    Short(usize),
    /// A field or TLV entry's declared width ran past the end of the slice.
    #[error("packet truncated while reading {what}")]
    Truncated { what: &'static str },
    /// The header's variant nibble was `1111` (reserved).
    #[error("variant 15 is reserved and cannot be decoded")]
    Variant,
    /// Variant id does not index any entry in the supplied variant map.
    #[error("variant {0} unknown to the configured variant map")]
    VariantUnknown(u8),
    /// Presence chain grew past the variant's declared number of presence bytes.
    #[error("presence chain exceeded the variant's declared length")]
    PresenceOverflow,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// JSON projection failures.
pub enum JsonError {
    /// The text was not valid JSON, or not an object at the top level.
    #[error("JSON parse failure")]
    Parse,
    /// `variant`, `station`, or `sequence` was absent from the object.
    #[error("JSON object missing required field {0}")]
    MissingField(&'static str),
    /// A value had the wrong JSON type for its target field.
    #[error("JSON field {0} had an unexpected type")]
    TypeMismatch(&'static str),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Top-level error, composing every phase-specific family.
pub enum CodecError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Tlv(#[from] TlvError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] JsonError),
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}
