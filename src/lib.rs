//! `lorawire` library: a compact, self-describing telemetry codec for
//! battery-powered sensor nodes on LoRa/sub-GHz LPWAN links. The crate is
//! organised the same way the wire format itself is layered: `infra::codec`
//! is the bit-level machinery (reader/writer, quantisers, the field
//! registry, presence chain, TLV block, image compressors), and `protocol`
//! is the packet-shaped API built on top of it (variant maps, the encoder/
//! decoder pair, and the `json`/`human` presentation layers).
//!
//! This crate owns only the wire format. It does not own a radio driver,
//! a gateway, or a dedup layer — those are collaborators:
//! - A **radio driver** hands `Encoder::end`'s output to the air and feeds
//!   received frames to [`protocol::decoder::decode`] or [`protocol::decoder::peek`].
//! - A **gateway** typically calls [`protocol::decoder::peek`] first to read
//!   `station`/`sequence` for deduplication before paying for a full decode.
#![cfg_attr(not(feature = "std"), no_std)]
/// Core data types shared by every layer: field-type identifiers, the
/// decoded field-value union, the packet header, and small fixed-capacity
/// containers.
pub mod core;
/// Error taxonomy, namespaced by the phase that can raise it.
pub mod error;
/// Bit-level codec machinery: reader/writer, quantisers, field registry,
/// presence chain, TLV block, image field.
pub mod infra;
/// Packet-shaped API: variant maps, encoder/decoder, JSON and human
/// presentation layers.
pub mod protocol;
