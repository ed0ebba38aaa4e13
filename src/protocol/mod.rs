//! High-level packet protocol: variant maps, the decoded record shape, and
//! the encoder/decoder pair built on top of `infra::codec`. `json` and
//! `human` are presentation layers over the same [`record::DecodedRecord`].
#[cfg(feature = "decoder")]
pub mod decoder;
#[cfg(feature = "encoder")]
pub mod encoder;
#[cfg(any(feature = "dump", feature = "print"))]
pub mod human;
#[cfg(all(feature = "json", feature = "encoder", feature = "decoder"))]
pub mod json;
pub mod record;
pub mod variant_map;
