//! Variant maps: which field-type occupies which presence
//! slot for a given 4-bit `variant` header value. Variant 15 is reserved and
//! has no table. A build selecting the `variant-set-compact` feature swaps
//! in [`COMPACT_VARIANTS`], a denser assignment for deployments that only
//! ever populate a handful of the representative field set.
use crate::core::FieldId;
use crate::error::HeaderError;

/// One populated slot: the field-type it carries and its JSON label (the
/// variant's own slot label, not the canonical field-type name).
#[derive(Debug, Clone, Copy)]
pub struct VariantEntry {
    pub field: FieldId,
    pub label: &'static str,
}

/// The slot table for one variant value: `None` marks an unassigned slot.
pub type VariantTable = &'static [Option<VariantEntry>];

/// Everything `lookup` resolves a variant value to: its display name, how
/// many presence bytes its own slot count needs, and the slot table itself.
#[derive(Debug, Clone, Copy)]
pub struct VariantDescriptor {
    pub name: &'static str,
    pub num_pres_bytes: usize,
    pub slots: VariantTable,
}

fn entry(field: FieldId, label: &'static str) -> Option<VariantEntry> {
    Some(VariantEntry { field, label })
}

/// Presence bytes needed to address `slot_count` slots: 6 in byte 0, 7 per
/// extension byte after that. Mirrors `PresenceChain::bytes_needed`'s own
/// highest-set-slot formula, but over a slot count known at table-build time
/// rather than a runtime bitmap.
const fn pres_bytes_for(slot_count: usize) -> usize {
    if slot_count == 0 {
        1
    } else {
        let highest = slot_count - 1;
        if highest < 6 {
            1
        } else {
            1 + (highest - 6) / 7 + 1
        }
    }
}

macro_rules! variant_table {
    ($($field:expr => $label:literal),* $(,)?) => {
        &[$(entry($field, $label)),*]
    };
}

macro_rules! variant_descriptor {
    ($name:literal, $slots:expr) => {
        VariantDescriptor {
            name: $name,
            num_pres_bytes: pres_bytes_for($slots.len()),
            slots: $slots,
        }
    };
}

const VARIANT_0_WEATHER_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Environment => "environment",
    FieldId::Wind => "wind",
    FieldId::Rain => "rain",
    FieldId::Solar => "solar",
    FieldId::Clouds => "clouds",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
    FieldId::Flags => "flags",
];
/// Variant 0: a generic weather station.
const VARIANT_0_WEATHER: VariantDescriptor = variant_descriptor!("weather", VARIANT_0_WEATHER_SLOTS);

#[cfg(feature = "field-air-quality")]
const VARIANT_1_AIR_QUALITY_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Temperature => "temperature",
    FieldId::Humidity => "humidity",
    FieldId::AirQualityIndex => "aqi",
    FieldId::AirQualityPm => "pm",
    FieldId::AirQualityGas => "gas",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
];
#[cfg(not(feature = "field-air-quality"))]
const VARIANT_1_AIR_QUALITY_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Temperature => "temperature",
    FieldId::Humidity => "humidity",
    FieldId::AirQualityIndex => "aqi",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
];
/// Variant 1: air-quality monitoring node.
const VARIANT_1_AIR_QUALITY: VariantDescriptor =
    variant_descriptor!("air_quality", VARIANT_1_AIR_QUALITY_SLOTS);

const VARIANT_2_RADIATION_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Temperature => "temperature",
    FieldId::Radiation => "radiation",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
    FieldId::Flags => "flags",
];
/// Variant 2: radiation / environmental dosimetry node.
const VARIANT_2_RADIATION: VariantDescriptor = variant_descriptor!("radiation", VARIANT_2_RADIATION_SLOTS);

const VARIANT_3_DEPTH_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Depth => "depth",
    FieldId::Temperature => "temperature",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
];
/// Variant 3: water level / depth sensor node.
const VARIANT_3_DEPTH: VariantDescriptor = variant_descriptor!("depth", VARIANT_3_DEPTH_SLOTS);

#[cfg(feature = "field-image")]
const VARIANT_4_IMAGE_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Temperature => "temperature",
    FieldId::Image => "image",
    FieldId::Position => "position",
    FieldId::DateTime => "datetime",
];
/// Variant 4: imaging node (trail camera, snow-depth camera, ...).
#[cfg(feature = "field-image")]
const VARIANT_4_IMAGE: VariantDescriptor = variant_descriptor!("image", VARIANT_4_IMAGE_SLOTS);

/// Default variant-map set: 15 assignable variants (0..=14), variant 15 reserved.
#[cfg(feature = "field-image")]
pub const DEFAULT_VARIANTS: [Option<VariantDescriptor>; 15] = [
    Some(VARIANT_0_WEATHER),
    Some(VARIANT_1_AIR_QUALITY),
    Some(VARIANT_2_RADIATION),
    Some(VARIANT_3_DEPTH),
    Some(VARIANT_4_IMAGE),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

#[cfg(not(feature = "field-image"))]
pub const DEFAULT_VARIANTS: [Option<VariantDescriptor>; 15] = [
    Some(VARIANT_0_WEATHER),
    Some(VARIANT_1_AIR_QUALITY),
    Some(VARIANT_2_RADIATION),
    Some(VARIANT_3_DEPTH),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// A denser layout for the `variant-set-compact` feature: every variant
/// carries only battery/link/datetime plus one headline field, halving the
/// number of distinct tables a constrained deployment needs to reason about.
#[cfg(feature = "variant-set-compact")]
const COMPACT_VARIANT_0_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::Environment => "environment",
    FieldId::DateTime => "datetime",
];
#[cfg(feature = "variant-set-compact")]
const COMPACT_VARIANT_0: VariantDescriptor =
    variant_descriptor!("compact_weather", COMPACT_VARIANT_0_SLOTS);

#[cfg(feature = "variant-set-compact")]
const COMPACT_VARIANT_1_SLOTS: VariantTable = variant_table![
    FieldId::Battery => "battery",
    FieldId::Link => "link",
    FieldId::AirQualityIndex => "aqi",
    FieldId::DateTime => "datetime",
];
#[cfg(feature = "variant-set-compact")]
const COMPACT_VARIANT_1: VariantDescriptor =
    variant_descriptor!("compact_air_quality", COMPACT_VARIANT_1_SLOTS);

#[cfg(feature = "variant-set-compact")]
pub const COMPACT_VARIANTS: [Option<VariantDescriptor>; 15] = [
    Some(COMPACT_VARIANT_0),
    Some(COMPACT_VARIANT_1),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

#[cfg(feature = "variant-set-compact")]
pub fn active_variants() -> &'static [Option<VariantDescriptor>; 15] {
    &COMPACT_VARIANTS
}

#[cfg(not(feature = "variant-set-compact"))]
pub fn active_variants() -> &'static [Option<VariantDescriptor>; 15] {
    &DEFAULT_VARIANTS
}

/// Resolve `variant` (0..=15) to its descriptor, or an error for the
/// reserved value 15 or a value the active set has no table for.
pub fn lookup(variant: u8) -> Result<VariantDescriptor, HeaderError> {
    if variant == 15 {
        return Err(HeaderError::VariantReserved);
    }
    active_variants()
        .get(variant as usize)
        .and_then(|t| *t)
        .ok_or(HeaderError::VariantUnknown(variant))
}

/// The slot index of `field` within `table`, if the variant carries it.
pub fn slot_of(table: VariantTable, field: FieldId) -> Option<usize> {
    table.iter().position(|e| matches!(e, Some(entry) if entry.field == field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_15_is_always_reserved() {
        assert!(matches!(lookup(15), Err(HeaderError::VariantReserved)));
    }

    #[test]
    fn variant_0_resolves_to_the_weather_table() {
        let descriptor = lookup(0).unwrap();
        assert_eq!(descriptor.name, "weather");
        assert!(slot_of(descriptor.slots, FieldId::Wind).is_some());
    }

    #[test]
    fn variant_0_declares_enough_presence_bytes_for_its_own_slots() {
        let descriptor = lookup(0).unwrap();
        // 10 slots need a byte past the first 6-slot byte.
        assert_eq!(descriptor.num_pres_bytes, 2);
    }

    #[test]
    fn an_unassigned_variant_is_unknown() {
        assert!(matches!(lookup(9), Err(HeaderError::VariantUnknown(9))));
    }
}
