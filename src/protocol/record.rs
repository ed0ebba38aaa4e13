//! The decoded form of one packet: header, the populated fields in
//! variant slot order, and any TLV entries.
use crate::core::{FieldId, FieldValue, PacketHeader, MAX_SLOTS};
use crate::infra::codec::tlv::TlvTable;

#[derive(Debug, Clone, Copy)]
pub struct DecodedRecord {
    pub header: PacketHeader,
    pub fields: [Option<FieldValue>; MAX_SLOTS],
    pub field_count: usize,
    pub tlv: TlvTable,
}

impl DecodedRecord {
    /// The value for `id`, if this packet's variant carries it and it was present.
    pub fn get(&self, id: FieldId) -> Option<&FieldValue> {
        self.fields.iter().flatten().find(|v| v.id() == id)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().flatten()
    }
}
