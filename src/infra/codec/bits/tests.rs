//! Exhaustive test suite for BitReader and BitWriter edge cases, MSB-first.
use super::*;

#[test]
/// Sequential aligned reads across byte boundaries.
fn test_read_aligned_bytes() {
    let data = [0x12, 0x34, 0x56, 0x78];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.get(8, "a").unwrap(), 0x12);
    assert_eq!(reader.get(16, "b").unwrap(), 0x3456);
    assert_eq!(reader.get(8, "c").unwrap(), 0x78);
}

#[test]
/// Non-aligned reads crossing a byte boundary, MSB-first within each byte.
fn test_read_non_aligned_bytes() {
    // byte0 = 1011_0100, byte1 = 1100_0101
    let data = [0b1011_0100, 0b1100_0101];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.get(3, "x").unwrap(), 0b101); // top 3 bits of byte0
    assert_eq!(reader.get(5, "y").unwrap(), 0b10100); // remaining 5 bits of byte0
    assert_eq!(reader.get(8, "z").unwrap(), 0xC5); // all of byte1
}

#[test]
/// A field spanning three bytes after a non-zero starting offset.
fn test_read_spanning_multiple_bytes() {
    let data = [0b1010_1111, 0b1111_1010, 0b0000_0000];
    let mut reader = BitReader::new(&data);
    reader.advance(4).unwrap();
    // Next 12 bits: low nibble of byte0 (1111) + byte1 (1111_1010) = 0xFFA
    assert_eq!(reader.get(12, "span").unwrap(), 0xFFA);
}

#[test]
/// Detects out-of-bounds reads.
fn test_read_out_of_bounds() {
    let data = [0xFF];
    let mut reader = BitReader::new(&data);
    assert!(reader.get(8, "ok").is_ok());
    assert!(matches!(
        reader.get(1, "over"),
        Err(DecodeError::Truncated { what: "over" })
    ));
}

#[test]
/// Read a full 32-bit word.
fn test_read_max() {
    let data = [0x11, 0x22, 0x33, 0x44];
    let mut reader = BitReader::new(&data);
    assert_eq!(reader.get(32, "w").unwrap(), 0x11223344);
}

#[test]
/// Reading from an empty buffer fails immediately.
fn test_read_empty_buffer() {
    let data: [u8; 0] = [];
    let mut reader = BitReader::new(&data);
    assert!(reader.get(1, "e").is_err());
}

#[test]
/// Advance the cursor then perform a nominal read.
fn test_read_advance_cursor() {
    let data: [u8; 2] = [0xFF, 0xAF]; // 1111_1111 1010_1111
    let mut reader = BitReader::new(&data);
    reader.advance(12).unwrap();
    assert_eq!(reader.get(4, "tail").unwrap(), 0b1111);
}

#[test]
/// Refuses to advance past the end of the buffer.
fn test_read_advance_out_of_bounds() {
    let data: [u8; 2] = [0xFF, 0xFF];
    let mut reader = BitReader::new(&data);
    assert!(reader.advance(17).is_err());
}

#[test]
/// Extract an aligned byte slice.
fn test_read_slice() {
    let data = [0xFF, 0xAF, 0xE2, 0xF1, 0xBC];
    let mut reader = BitReader::new(&data);
    reader.advance(8).unwrap();
    assert_eq!(reader.get_slice(2).unwrap(), &[0xAF, 0xE2]);
}

#[test]
/// Aligned write of a full byte.
fn test_write_aligned_bytes() {
    let mut buffer = [0xEF, 0xBE];
    let mut writer = BitWriter::new(&mut buffer);
    writer.put(0xDE, 8).unwrap();
    assert_eq!(buffer, [0xDE, 0xBE]);
}

#[test]
/// Write a field starting at a non-byte-aligned offset, MSB-first.
fn test_write_non_aligned_bytes() {
    let mut buffer = [0x00, 0x00];
    let mut writer = BitWriter::new(&mut buffer);
    writer.advance(3).unwrap();
    writer.put(0b10110, 5).unwrap();
    assert_eq!(buffer, [0b0001_0110, 0x00]);
}

#[test]
/// Writing past the buffer capacity fails.
fn test_write_out_of_bounds() {
    let mut buffer = [0xFF];
    let mut writer = BitWriter::new(&mut buffer);
    writer.advance(4).unwrap();
    assert!(writer.put(0xFF, 5).is_err());
}

#[test]
/// Sequential writes from a byte-aligned cursor.
fn test_write_multiple_bytes() {
    let mut buffer = [0xFF, 0xFF, 0xFF];
    let mut writer = BitWriter::new(&mut buffer);
    writer.advance(8).unwrap();
    writer.put(0xDAFA, 16).unwrap();
    assert_eq!(buffer, [0xFF, 0xDA, 0xFA]);
}

#[test]
/// `byte_len` rounds the bit cursor up to a whole number of bytes.
fn test_byte_len_rounds_up() {
    let mut buffer = [0u8; 4];
    let mut writer = BitWriter::new(&mut buffer);
    writer.put(0b101, 3).unwrap();
    assert_eq!(writer.byte_len(), 1);
}

#[test]
/// Copy an aligned slice over the whole buffer.
fn test_write_slice() {
    let slice = [0xDF, 0xCF, 0xE2];
    let mut buffer = [0x00; 3];
    let mut writer = BitWriter::new(&mut buffer);
    writer.put_slice(&slice).unwrap();
    assert_eq!(&buffer, &slice);
}

#[test]
/// Round-trip: write then read back the same bit pattern.
fn test_roundtrip_write_then_read() {
    let mut buffer = [0u8; 4];
    {
        let mut writer = BitWriter::new(&mut buffer);
        writer.put(0b101, 3).unwrap();
        writer.put(0x7F, 7).unwrap();
        writer.put(0xABCD, 16).unwrap();
    }
    let mut reader = BitReader::new(&buffer);
    assert_eq!(reader.get(3, "a").unwrap(), 0b101);
    assert_eq!(reader.get(7, "b").unwrap(), 0x7F);
    assert_eq!(reader.get(16, "c").unwrap(), 0xABCD);
}
