//! Static, indexable field-type table: one row per [`FieldId`], each
//! carrying a width function and its encode/decode routine. Dispatch is a
//! linear scan over a `const` array rather than a `match` on `FieldId` so
//! that adding a field-type only means adding a row.
mod fields;

use crate::core::{FieldId, FieldValue};
use crate::error::CodecError;
use crate::infra::codec::bits::{BitReader, BitWriter};

pub type EncodeFn = fn(&mut BitWriter, &FieldValue) -> Result<(), CodecError>;
pub type DecodeFn = fn(&mut BitReader) -> Result<FieldValue, CodecError>;
pub type WidthFn = fn(&FieldValue) -> u16;

/// One row of the field registry: identity, wire-width rule, and codec.
pub struct FieldDescriptor {
    pub id: FieldId,
    pub width: WidthFn,
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

fn fixed(bits: u16) -> WidthFn {
    // `WidthFn` has no captures, so every fixed-width row needs its own
    // zero-capture fn. A small macro would save typing but the table below
    // is short enough to write out rather than add a proc step.
    match bits {
        6 => |_| 6,
        9 => |_| 9,
        8 => |_| 8,
        7 => |_| 7,
        24 => |_| 24,
        22 => |_| 22,
        12 => |_| 12,
        14 => |_| 14,
        4 => |_| 4,
        30 => |_| 30,
        10 => |_| 10,
        48 => |_| 48,
        _ => |_| 0,
    }
}

#[cfg(feature = "field-air-quality")]
fn width_air_quality_pm(v: &FieldValue) -> u16 {
    let FieldValue::AirQualityPm(slots) = v else { return 4 };
    4 + 8 * slots.iter().filter(|s| s.is_some()).count() as u16
}

#[cfg(feature = "field-air-quality")]
fn width_air_quality_gas(v: &FieldValue) -> u16 {
    let FieldValue::AirQualityGas {
        voc,
        nox,
        co2,
        co,
        hcho,
        o3,
    } = v
    else {
        return 8;
    };
    let mut bits = 8u16;
    if voc.is_some() {
        bits += 7;
    }
    if nox.is_some() {
        bits += 7;
    }
    if co2.is_some() {
        bits += 10;
    }
    if co.is_some() {
        bits += 10;
    }
    if hcho.is_some() {
        bits += 10;
    }
    if o3.is_some() {
        bits += 10;
    }
    bits
}

#[cfg(feature = "field-image")]
fn width_image(v: &FieldValue) -> u16 {
    let FieldValue::Image(image) = v else {
        return crate::infra::codec::image::CONTROL_HEADER_BITS;
    };
    image.wire_width()
}

/// The full set of field rows compiled into this build, in [`FieldId::ALL`] order.
pub const REGISTRY: &[FieldDescriptor] = &[
    FieldDescriptor {
        id: FieldId::Battery,
        width: fixed(6),
        encode: fields::encode_battery,
        decode: fields::decode_battery,
    },
    FieldDescriptor {
        id: FieldId::Link,
        width: fixed(6),
        encode: fields::encode_link,
        decode: fields::decode_link,
    },
    FieldDescriptor {
        id: FieldId::Temperature,
        width: fixed(9),
        encode: fields::encode_temperature,
        decode: fields::decode_temperature,
    },
    FieldDescriptor {
        id: FieldId::Pressure,
        width: fixed(8),
        encode: fields::encode_pressure,
        decode: fields::decode_pressure,
    },
    FieldDescriptor {
        id: FieldId::Humidity,
        width: fixed(7),
        encode: fields::encode_humidity,
        decode: fields::decode_humidity,
    },
    FieldDescriptor {
        id: FieldId::Environment,
        width: fixed(24),
        encode: fields::encode_environment,
        decode: fields::decode_environment,
    },
    FieldDescriptor {
        id: FieldId::Wind,
        width: fixed(22),
        encode: fields::encode_wind,
        decode: fields::decode_wind,
    },
    FieldDescriptor {
        id: FieldId::Rain,
        width: fixed(12),
        encode: fields::encode_rain,
        decode: fields::decode_rain,
    },
    FieldDescriptor {
        id: FieldId::Solar,
        width: fixed(14),
        encode: fields::encode_solar,
        decode: fields::decode_solar,
    },
    FieldDescriptor {
        id: FieldId::Clouds,
        width: fixed(4),
        encode: fields::encode_clouds,
        decode: fields::decode_clouds,
    },
    FieldDescriptor {
        id: FieldId::AirQualityIndex,
        width: fixed(9),
        encode: fields::encode_air_quality_index,
        decode: fields::decode_air_quality_index,
    },
    #[cfg(feature = "field-air-quality")]
    FieldDescriptor {
        id: FieldId::AirQualityPm,
        width: width_air_quality_pm,
        encode: fields::encode_air_quality_pm,
        decode: fields::decode_air_quality_pm,
    },
    #[cfg(feature = "field-air-quality")]
    FieldDescriptor {
        id: FieldId::AirQualityGas,
        width: width_air_quality_gas,
        encode: fields::encode_air_quality_gas,
        decode: fields::decode_air_quality_gas,
    },
    FieldDescriptor {
        id: FieldId::Radiation,
        width: fixed(30),
        encode: fields::encode_radiation,
        decode: fields::decode_radiation,
    },
    FieldDescriptor {
        id: FieldId::Depth,
        width: fixed(10),
        encode: fields::encode_depth,
        decode: fields::decode_depth,
    },
    FieldDescriptor {
        id: FieldId::Position,
        width: fixed(48),
        encode: fields::encode_position,
        decode: fields::decode_position,
    },
    FieldDescriptor {
        id: FieldId::DateTime,
        width: fixed(24),
        encode: fields::encode_datetime,
        decode: fields::decode_datetime,
    },
    FieldDescriptor {
        id: FieldId::Flags,
        width: fixed(8),
        encode: fields::encode_flags,
        decode: fields::decode_flags,
    },
    #[cfg(feature = "field-image")]
    FieldDescriptor {
        id: FieldId::Image,
        width: width_image,
        encode: fields::encode_image,
        decode: fields::decode_image,
    },
];

/// Look up a field's descriptor by id. `None` only if a caller constructs a
/// `FieldId` the active feature set didn't compile a row for, which the
/// public API never allows.
pub fn descriptor(id: FieldId) -> Option<&'static FieldDescriptor> {
    REGISTRY.iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_a_row_per_compiled_field_id() {
        for id in FieldId::ALL {
            assert!(descriptor(*id).is_some(), "missing descriptor for {id:?}");
        }
    }

    #[test]
    fn fixed_width_rows_report_the_spec_bit_count() {
        assert_eq!((descriptor(FieldId::Battery).unwrap().width)(&FieldValue::Battery {
            level_pct: 0,
            charging: false
        }), 6);
        assert_eq!(
            (descriptor(FieldId::Position).unwrap().width)(&FieldValue::Position { lat: Default::default(), lon: Default::default() }),
            48
        );
    }

    #[test]
    fn battery_round_trips_through_its_registry_row() {
        let d = descriptor(FieldId::Battery).unwrap();
        let mut buf = [0u8; 1];
        let value = FieldValue::Battery {
            level_pct: 75,
            charging: true,
        };
        {
            let mut w = BitWriter::new(&mut buf);
            (d.encode)(&mut w, &value).unwrap();
        }
        let mut r = BitReader::new(&buf);
        let back = (d.decode)(&mut r).unwrap();
        let FieldValue::Battery { level_pct, charging } = back else {
            panic!("wrong variant")
        };
        assert!((level_pct as i32 - 75).abs() <= 2);
        assert!(charging);
    }
}
