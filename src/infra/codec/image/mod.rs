//! The `image` field: a small compressed thumbnail carried inline in a
//! packet. Control header (`pixel_format:2 | size_tier:2 | compression:2 |
//! flags:4 | length:8`) followed by `length` bytes of payload, compressed
//! with one of two fixed, allocation-free codecs:
//!
//! - **RLE**: `(count:u8, value:u8)` pairs, runs of 1..=255.
//! - **window**: an LZSS variant pinned at an 8-bit back-reference offset
//!   and a 4-bit match length (a heatshrink-style window/lookahead split,
//!   fixed rather than left configurable).
use crate::core::MAX_IMAGE_BYTES;
use crate::error::ImageError;
use crate::infra::codec::bits::{BitReader, BitWriter};

/// Fixed-capacity image payload buffer (compressed or raw, caller's choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePayload {
    pub len: usize,
    pub data: [u8; MAX_IMAGE_BYTES],
}

impl Default for ImagePayload {
    fn default() -> Self {
        Self {
            len: 0,
            data: [0; MAX_IMAGE_BYTES],
        }
    }
}

impl ImagePayload {
    pub fn from_slice(slice: &[u8]) -> Result<Self, ImageError> {
        if slice.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::LengthOutOfRange(slice.len()));
        }
        let mut out = Self::default();
        out.data[..slice.len()].copy_from_slice(slice);
        out.len = slice.len();
        Ok(out)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// Decoded `image` field: the control header plus its (still compressed,
/// or raw if `compression == Compression::None`) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageField {
    pub pixel_format: PixelFormat,
    pub size_tier: SizeTier,
    pub compression: Compression,
    pub flags: u8,
    pub payload: ImagePayload,
}

/// 1-bit monochrome, 4-bit/16-level grayscale, or 4bpp 16-level grayscale
/// ("grey16"). All three are grayscale or bilevel; none carries color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    Mono1 = 0,
    Gray4 = 1,
    Grey16 = 2,
}

/// Fixed pixel dimensions for the thumbnail: 24x18, 48x32, or 64x48.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SizeTier {
    Px24x18 = 0,
    Px48x32 = 1,
    Px64x48 = 2,
}

impl SizeTier {
    /// `(width, height)` in pixels for this tier.
    pub fn dimensions(self) -> (u16, u16) {
        match self {
            Self::Px24x18 => (24, 18),
            Self::Px48x32 => (48, 32),
            Self::Px64x48 => (64, 48),
        }
    }
}

/// Named bits within the 4-bit `flags` field; the remaining bits are
/// reserved.
pub const FLAG_INVERT: u8 = 0b0001;
pub const FLAG_FRAGMENT: u8 = 0b0010;

impl ImageField {
    pub fn invert(&self) -> bool {
        self.flags & FLAG_INVERT != 0
    }

    pub fn fragment(&self) -> bool {
        self.flags & FLAG_FRAGMENT != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Compression {
    None = 0,
    Rle = 1,
    Window = 2,
}

impl PixelFormat {
    fn from_code(code: u32) -> Result<Self, ImageError> {
        match code {
            0 => Ok(Self::Mono1),
            1 => Ok(Self::Gray4),
            2 => Ok(Self::Grey16),
            _ => Err(ImageError::PixelFormatHigh),
        }
    }
}

impl SizeTier {
    fn from_code(code: u32) -> Result<Self, ImageError> {
        match code {
            0 => Ok(Self::Px24x18),
            1 => Ok(Self::Px48x32),
            2 => Ok(Self::Px64x48),
            _ => Err(ImageError::SizeTierHigh),
        }
    }
}

impl Compression {
    fn from_code(code: u32) -> Result<Self, ImageError> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Rle),
            2 => Ok(Self::Window),
            _ => Err(ImageError::CompressionHigh),
        }
    }
}

/// Bit width of the control header (`pixel_format:2 | size_tier:2 |
/// compression:2 | flags:4 | length:8`).
pub const CONTROL_HEADER_BITS: u16 = 18;

impl ImageField {
    /// Wire width of this field, header plus payload.
    pub fn wire_width(&self) -> u16 {
        CONTROL_HEADER_BITS + self.payload.len as u16 * 8
    }

    pub fn encode(&self, w: &mut BitWriter) -> Result<(), crate::error::CodecError> {
        if self.payload.len > MAX_IMAGE_BYTES {
            return Err(ImageError::LengthOutOfRange(self.payload.len).into());
        }
        w.put(self.pixel_format as u32, 2)?;
        w.put(self.size_tier as u32, 2)?;
        w.put(self.compression as u32, 2)?;
        w.put(self.flags as u32, 4)?;
        w.put(self.payload.len as u32, 8)?;
        w.put_slice(self.payload.as_slice())?;
        Ok(())
    }

    pub fn decode(r: &mut BitReader) -> Result<Self, crate::error::CodecError> {
        let pixel_format = r.get(2, "image.pixel_format")?;
        let size_tier = r.get(2, "image.size_tier")?;
        let compression = r.get(2, "image.compression")?;
        let flags = r.get(4, "image.flags")? as u8;
        let length = r.get(8, "image.length")? as usize;
        let slice = r.get_slice(length)?;
        let pixel_format = PixelFormat::from_code(pixel_format)?;
        let size_tier = SizeTier::from_code(size_tier)?;
        let compression = Compression::from_code(compression)?;
        let payload = ImagePayload::from_slice(slice)?;
        Ok(Self {
            pixel_format,
            size_tier,
            compression,
            flags,
            payload,
        })
    }
}

/// RLE-encode `input` into `out` as `(count, value)` pairs, runs capped at 255.
pub fn rle_encode(input: &[u8], out: &mut [u8]) -> Result<usize, ImageError> {
    let mut out_len = 0usize;
    let mut i = 0usize;
    while i < input.len() {
        let byte = input[i];
        let mut run = 1usize;
        while i + run < input.len() && input[i + run] == byte && run < 255 {
            run += 1;
        }
        if out_len + 2 > out.len() {
            return Err(ImageError::CompressionOverflow);
        }
        out[out_len] = run as u8;
        out[out_len + 1] = byte;
        out_len += 2;
        i += run;
    }
    Ok(out_len)
}

/// Inverse of [`rle_encode`].
pub fn rle_decode(input: &[u8], out: &mut [u8]) -> Result<usize, ImageError> {
    let mut out_len = 0usize;
    let mut i = 0usize;
    while i + 1 < input.len() {
        let run = input[i] as usize;
        let byte = input[i + 1];
        if out_len + run > out.len() {
            return Err(ImageError::CompressionOverflow);
        }
        out[out_len..out_len + run].fill(byte);
        out_len += run;
        i += 2;
    }
    Ok(out_len)
}

const WINDOW_BITS: u32 = 8;
const WINDOW_SIZE: usize = 1 << WINDOW_BITS; // 256
const LOOKAHEAD_BITS: u32 = 4;
const MIN_MATCH: usize = 2;
const MAX_MATCH: usize = MIN_MATCH + ((1 << LOOKAHEAD_BITS) - 1); // 17

/// LZSS-style window compressor, pinned at an 8-bit offset / 4-bit length
/// back-reference.
/// Token layout: a 1-bit tag (`1` = literal byte follows, `0` = back-reference
/// `offset:8, length:4` follows, `length` biased by `MIN_MATCH`).
pub fn window_encode(input: &[u8], out: &mut [u8]) -> Result<usize, ImageError> {
    let mut w = BitWriter::new(out);
    let mut i = 0usize;
    while i < input.len() {
        let window_start = i.saturating_sub(WINDOW_SIZE);
        let mut best_len = 0usize;
        let mut best_off = 0usize;
        for start in window_start..i {
            let max_len = (input.len() - i).min(MAX_MATCH).min(i - start + WINDOW_SIZE);
            let mut len = 0usize;
            while len < max_len && input[start + len] == input[i + len] {
                len += 1;
            }
            if len > best_len {
                best_len = len;
                best_off = i - start;
            }
        }
        if best_len >= MIN_MATCH {
            w.put_bit(false).map_err(|_| ImageError::CompressionOverflow)?;
            w.put((best_off - 1) as u32, WINDOW_BITS as u8)
                .map_err(|_| ImageError::CompressionOverflow)?;
            w.put((best_len - MIN_MATCH) as u32, LOOKAHEAD_BITS as u8)
                .map_err(|_| ImageError::CompressionOverflow)?;
            i += best_len;
        } else {
            w.put_bit(true).map_err(|_| ImageError::CompressionOverflow)?;
            w.put(input[i] as u32, 8)
                .map_err(|_| ImageError::CompressionOverflow)?;
            i += 1;
        }
    }
    Ok(w.byte_len())
}

/// Inverse of [`window_encode`]. Stops when the compressed bitstream is
/// exhausted (any trailing bits are byte-alignment padding, never a token).
pub fn window_decode(input: &[u8], out: &mut [u8]) -> Result<usize, ImageError> {
    let mut r = BitReader::new(input);
    let mut out_len = 0usize;
    loop {
        let tag = match r.get_bit("image.window.tag") {
            Ok(t) => t,
            Err(_) => break,
        };
        if tag {
            let byte = match r.get(8, "image.window.literal") {
                Ok(b) => b as u8,
                Err(_) => break,
            };
            if out_len >= out.len() {
                return Err(ImageError::CompressionOverflow);
            }
            out[out_len] = byte;
            out_len += 1;
        } else {
            let off = match r.get(WINDOW_BITS as u8, "image.window.offset") {
                Ok(v) => v as usize + 1,
                Err(_) => break,
            };
            let len = match r.get(LOOKAHEAD_BITS as u8, "image.window.length") {
                Ok(v) => v as usize + MIN_MATCH,
                Err(_) => break,
            };
            if off > out_len || out_len + len > out.len() {
                return Err(ImageError::CompressionOverflow);
            }
            let start = out_len - off;
            for k in 0..len {
                out[out_len + k] = out[start + k];
            }
            out_len += len;
        }
    }
    Ok(out_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_round_trips() {
        let input = [1u8, 1, 1, 2, 3, 3, 3, 3, 3];
        let mut enc = [0u8; 32];
        let enc_len = rle_encode(&input, &mut enc).unwrap();
        let mut dec = [0u8; 32];
        let dec_len = rle_decode(&enc[..enc_len], &mut dec).unwrap();
        assert_eq!(&dec[..dec_len], &input);
    }

    #[test]
    fn rle_splits_runs_longer_than_255() {
        let input = [7u8; 300];
        let mut enc = [0u8; 8];
        let enc_len = rle_encode(&input, &mut enc).unwrap();
        assert_eq!(enc_len, 4); // two (count,value) pairs: 255 + 45
        let mut dec = [0u8; 300];
        let dec_len = rle_decode(&enc[..enc_len], &mut dec).unwrap();
        assert_eq!(&dec[..dec_len], &input[..]);
    }

    #[test]
    fn window_round_trips_repetitive_data() {
        let input = b"ababababababababab";
        let mut enc = [0u8; 64];
        let enc_len = window_encode(input, &mut enc).unwrap();
        let mut dec = [0u8; 64];
        let dec_len = window_decode(&enc[..enc_len], &mut dec).unwrap();
        assert_eq!(&dec[..dec_len], input);
    }

    #[test]
    fn window_round_trips_incompressible_data() {
        let input: [u8; 6] = [1, 200, 3, 250, 5, 9];
        let mut enc = [0u8; 32];
        let enc_len = window_encode(&input, &mut enc).unwrap();
        let mut dec = [0u8; 32];
        let dec_len = window_decode(&enc[..enc_len], &mut dec).unwrap();
        assert_eq!(&dec[..dec_len], &input);
    }
}
