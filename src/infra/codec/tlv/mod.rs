//! TLV metadata block: up to [`MAX_TLV_ENTRIES`] chained entries,
//! each `format:1 | type:6 | more:1 | length:8 | data`. `format` selects
//! between raw bytes and a 6-bit packed charset string; `more` chains to the
//! next entry instead of a separate count prefix.
use crate::core::{TlvBytes, TlvString, MAX_TLV_ENTRIES, MAX_TLV_UNITS};
use crate::error::{CodecError, TlvError};
use crate::infra::codec::bits::{BitReader, BitWriter};

/// Well-known TLV type codes. Any other code in `0..=63` is
/// carried opaquely as raw bytes.
pub const TYPE_VERSION: u8 = 0x01;
pub const TYPE_STATUS: u8 = 0x02;
pub const TYPE_HEALTH: u8 = 0x03;
pub const TYPE_CONFIG: u8 = 0x04;
pub const TYPE_DIAGNOSTIC: u8 = 0x05;
pub const TYPE_USERDATA: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlvPayload {
    Bytes(TlvBytes),
    Str(TlvString),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvEntry {
    pub type_code: u8,
    pub payload: TlvPayload,
}

impl TlvEntry {
    pub fn bytes(type_code: u8, data: &[u8]) -> Result<Self, TlvError> {
        if type_code > 63 {
            return Err(TlvError::TypeOutOfRange(type_code));
        }
        if data.len() > MAX_TLV_UNITS {
            return Err(TlvError::LengthOutOfRange(data.len()));
        }
        Ok(Self {
            type_code,
            payload: TlvPayload::Bytes(TlvBytes::from_slice(data)),
        })
    }

    pub fn string(type_code: u8, s: &str) -> Result<Self, TlvError> {
        if type_code > 63 {
            return Err(TlvError::TypeOutOfRange(type_code));
        }
        for c in s.chars() {
            encode_char(c)?;
        }
        if s.chars().count() > MAX_TLV_UNITS {
            return Err(TlvError::LengthOutOfRange(s.chars().count()));
        }
        Ok(Self {
            type_code,
            payload: TlvPayload::Str(TlvString::from_str(s)),
        })
    }

    /// `VERSION` TLV: `key=value` pairs joined space-separated, e.g.
    /// `"FW=1.2 HW=A1"`.
    pub fn version(s: &str) -> Result<Self, TlvError> {
        validate_kv(s)?;
        Self::string(TYPE_VERSION, s)
    }

    pub fn status(s: &str) -> Result<Self, TlvError> {
        Self::string(TYPE_STATUS, s)
    }

    pub fn health(data: &[u8]) -> Result<Self, TlvError> {
        Self::bytes(TYPE_HEALTH, data)
    }

    /// `CONFIG` TLV: same `key=value` convention as `VERSION`.
    pub fn config(s: &str) -> Result<Self, TlvError> {
        validate_kv(s)?;
        Self::string(TYPE_CONFIG, s)
    }

    pub fn diagnostic(data: &[u8]) -> Result<Self, TlvError> {
        Self::bytes(TYPE_DIAGNOSTIC, data)
    }

    pub fn userdata(data: &[u8]) -> Result<Self, TlvError> {
        Self::bytes(TYPE_USERDATA, data)
    }

    fn is_string(&self) -> bool {
        matches!(self.payload, TlvPayload::Str(_))
    }

    fn unit_count(&self) -> usize {
        match &self.payload {
            TlvPayload::Bytes(b) => b.len,
            TlvPayload::Str(s) => s.len,
        }
    }
}

/// `key=value key=value ...`: splitting on both the pair separator (space)
/// and the key/value separator (`=`) must leave an even number of tokens,
/// i.e. every key has a matching value.
fn validate_kv(s: &str) -> Result<(), TlvError> {
    let count = s.split(|c| c == ' ' || c == '=').filter(|t| !t.is_empty()).count();
    if count % 2 != 0 {
        return Err(TlvError::KvCountMismatch(count));
    }
    Ok(())
}

/// Encode one character into the TLV 6-bit charset.
fn encode_char(c: char) -> Result<u8, TlvError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'A'..='Z' => Ok(c as u8 - b'A' + 10),
        ' ' => Ok(36),
        '.' => Ok(37),
        ',' => Ok(38),
        '-' => Ok(39),
        '/' => Ok(40),
        ':' => Ok(41),
        '=' => Ok(42),
        _ => Err(TlvError::StrCharInvalid(c)),
    }
}

/// Decode one 6-bit code back into a character. Codes `43..=63` are
/// reserved and decode to `?` rather than failing (wire data was already
/// validated when it was encoded).
fn decode_char(code: u8) -> char {
    match code {
        0..=9 => (b'0' + code) as char,
        10..=35 => (b'A' + (code - 10)) as char,
        36 => ' ',
        37 => '.',
        38 => ',',
        39 => '-',
        40 => '/',
        41 => ':',
        42 => '=',
        _ => '?',
    }
}

/// Fixed-capacity chain of up to [`MAX_TLV_ENTRIES`] entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlvTable {
    pub entries: [Option<TlvEntry>; MAX_TLV_ENTRIES],
    pub len: usize,
}

impl TlvTable {
    pub fn push(&mut self, entry: TlvEntry) -> Result<(), TlvError> {
        if self.len >= MAX_TLV_ENTRIES {
            return Err(TlvError::Full);
        }
        self.entries[self.len] = Some(entry);
        self.len += 1;
        Ok(())
    }

    pub fn as_slice(&self) -> &[Option<TlvEntry>] {
        &self.entries[..self.len]
    }

    pub fn encode(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        for (i, slot) in self.as_slice().iter().enumerate() {
            let entry = slot.as_ref().expect("TlvTable entries are contiguous");
            let more = i + 1 < self.len;
            w.put_bit(entry.is_string())?;
            w.put(entry.type_code as u32, 6)?;
            w.put_bit(more)?;
            w.put(entry.unit_count() as u32, 8)?;
            match &entry.payload {
                TlvPayload::Bytes(b) => w.put_slice(b.as_slice())?,
                TlvPayload::Str(s) => {
                    for c in s.as_str().chars() {
                        let code = encode_char(c).unwrap_or(0);
                        w.put(code as u32, 6)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn decode(r: &mut BitReader) -> Result<Self, CodecError> {
        let mut table = Self::default();
        loop {
            let is_string = r.get_bit("tlv.format")?;
            let type_code = r.get(6, "tlv.type")? as u8;
            let more = r.get_bit("tlv.more")?;
            let length = r.get(8, "tlv.length")? as usize;
            let entry = if is_string {
                let mut buf = [0u8; MAX_TLV_UNITS];
                for slot in buf.iter_mut().take(length) {
                    let code = r.get(6, "tlv.char")? as u8;
                    *slot = decode_char(code) as u8;
                }
                TlvEntry {
                    type_code,
                    payload: TlvPayload::Str(TlvString::from_str(
                        core::str::from_utf8(&buf[..length]).unwrap_or(""),
                    )),
                }
            } else {
                let slice = r.get_slice(length)?;
                TlvEntry {
                    type_code,
                    payload: TlvPayload::Bytes(TlvBytes::from_slice(slice)),
                }
            };
            if table.len >= MAX_TLV_ENTRIES {
                return Err(CodecError::Tlv(TlvError::Full));
            }
            table.entries[table.len] = Some(entry);
            table.len += 1;
            if !more {
                break;
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_entry_round_trips() {
        let mut table = TlvTable::default();
        table.push(TlvEntry::version("FW=1.2 HW=A1").unwrap()).unwrap();
        let mut buf = [0u8; 64];
        {
            let mut w = BitWriter::new(&mut buf);
            table.encode(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = TlvTable::decode(&mut r).unwrap();
        assert_eq!(back.len, 1);
        let TlvPayload::Str(s) = back.entries[0].unwrap().payload else {
            panic!("expected string payload")
        };
        assert_eq!(s.as_str(), "FW=1.2 HW=A1");
    }

    #[test]
    fn bytes_entry_round_trips() {
        let mut table = TlvTable::default();
        table.push(TlvEntry::health(&[1, 2, 3, 4]).unwrap()).unwrap();
        let mut buf = [0u8; 32];
        {
            let mut w = BitWriter::new(&mut buf);
            table.encode(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = TlvTable::decode(&mut r).unwrap();
        let TlvPayload::Bytes(b) = back.entries[0].unwrap().payload else {
            panic!("expected bytes payload")
        };
        assert_eq!(b.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn multiple_entries_chain_via_the_more_bit() {
        let mut table = TlvTable::default();
        table.push(TlvEntry::status("OK").unwrap()).unwrap();
        table.push(TlvEntry::userdata(&[9]).unwrap()).unwrap();
        let mut buf = [0u8; 32];
        {
            let mut w = BitWriter::new(&mut buf);
            table.encode(&mut w).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = TlvTable::decode(&mut r).unwrap();
        assert_eq!(back.len, 2);
    }

    #[test]
    fn version_requires_even_kv_token_count() {
        assert!(matches!(
            TlvEntry::version("FW=1.2 HW"),
            Err(TlvError::KvCountMismatch(_))
        ));
    }

    #[test]
    fn a_ninth_entry_is_rejected() {
        let mut table = TlvTable::default();
        for _ in 0..MAX_TLV_ENTRIES {
            table.push(TlvEntry::userdata(&[0]).unwrap()).unwrap();
        }
        assert!(matches!(
            table.push(TlvEntry::userdata(&[0]).unwrap()),
            Err(TlvError::Full)
        ));
    }

    #[test]
    fn charset_rejects_characters_outside_the_six_bit_table() {
        assert!(matches!(
            TlvEntry::status("lower"),
            Err(TlvError::StrCharInvalid('l'))
        ));
    }
}
