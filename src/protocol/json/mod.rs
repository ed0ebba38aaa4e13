//! JSON projection: decode a packet to a `serde_json::Value` keyed by the
//! active variant's own slot labels (not [`FieldId::canonical_name`]), and
//! the inverse — parse that JSON back into bytes that are bit-for-bit
//! identical to the packet it was decoded from. Gated behind `json`, which
//! implies `std`.
use base64::Engine;
use serde_json::{json, Map, Value};

use crate::core::{FieldValue, GeoReal, Real, MAX_PACKET_BYTES};
use crate::error::{CodecError, JsonError};
#[cfg(feature = "field-image")]
use crate::infra::codec::image::{Compression, ImageField, ImagePayload, PixelFormat, SizeTier};
use crate::infra::codec::tlv::{TlvEntry, TlvPayload, TlvTable};
use crate::protocol::decoder;
use crate::protocol::encoder::Encoder;
use crate::protocol::record::DecodedRecord;
use crate::protocol::variant_map;

const BASE64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::STANDARD;

/// Decode `bytes` and project the result straight to JSON.
pub fn decode_to_json(bytes: &[u8]) -> Result<Value, CodecError> {
    let record = decoder::decode(bytes)?;
    record_to_json(&record)
}

/// Project an already-decoded record to JSON, keyed by variant slot labels.
pub fn record_to_json(record: &DecodedRecord) -> Result<Value, CodecError> {
    let table = variant_map::lookup(record.header.variant)?;
    let mut obj = Map::new();
    obj.insert("variant".into(), json!(record.header.variant));
    obj.insert("variant_name".into(), json!(table.name));
    obj.insert("station".into(), json!(record.header.station));
    obj.insert("sequence".into(), json!(record.header.sequence));
    let mut fields = Map::new();
    for (slot_idx, slot) in table.slots.iter().enumerate() {
        let (Some(entry), Some(value)) = (slot, &record.fields[slot_idx]) else {
            continue;
        };
        fields.insert(entry.label.into(), field_value_to_json(value));
    }
    obj.insert("fields".into(), Value::Object(fields));
    if record.tlv.len > 0 {
        obj.insert("tlv".into(), tlv_table_to_json(&record.tlv));
    }
    Ok(Value::Object(obj))
}

/// Parse a JSON object produced by [`decode_to_json`] back into wire bytes,
/// byte-exact with the packet it was decoded from.
pub fn encode_from_json(value: &Value) -> Result<std::vec::Vec<u8>, CodecError> {
    let obj = value.as_object().ok_or(JsonError::Parse)?;
    let variant = field_u64(obj, "variant")? as u8;
    let station = field_u64(obj, "station")? as u16;
    let sequence = field_u64(obj, "sequence")? as u16;

    let table = variant_map::lookup(variant)?;
    let mut enc = Encoder::new();
    enc.begin(variant, station, sequence)?;

    let fields = obj.get("fields").and_then(Value::as_object);
    for slot in table.slots.iter().flatten() {
        if let Some(json_value) = fields.and_then(|f| f.get(slot.label)) {
            enc.encode_field(json_value_to_field(slot.field, json_value)?)?;
        }
    }
    if let Some(Value::Array(entries)) = obj.get("tlv") {
        for entry_json in entries {
            enc.encode_tlv(json_to_tlv_entry(entry_json)?)?;
        }
    }

    let mut buf = [0u8; MAX_PACKET_BYTES];
    let len = enc.end(&mut buf)?;
    Ok(buf[..len].to_vec())
}

fn field_u64(obj: &Map<String, Value>, key: &'static str) -> Result<u64, JsonError> {
    obj.get(key)
        .and_then(Value::as_u64)
        .ok_or(JsonError::MissingField(key))
}

fn field_value_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Battery { level_pct, charging } => json!({"level_pct": level_pct, "charging": charging}),
        FieldValue::Link { rssi_dbm, snr_db } => json!({"rssi_dbm": rssi_dbm, "snr_db": real(*snr_db)}),
        FieldValue::Temperature(t) => json!(real(*t)),
        FieldValue::Pressure(p) => json!(p),
        FieldValue::Humidity(h) => json!(h),
        FieldValue::Environment { temperature, pressure, humidity } => {
            json!({"temperature": real(*temperature), "pressure": pressure, "humidity": humidity})
        }
        FieldValue::Wind { speed_ms, dir_deg, gust_ms } => {
            json!({"speed_ms": real(*speed_ms), "dir_deg": dir_deg, "gust_ms": real(*gust_ms)})
        }
        FieldValue::Rain { rate_mmh, size_mm } => json!({"rate_mmh": rate_mmh, "size_mm": real(*size_mm)}),
        FieldValue::Solar { irradiance_wm2, uv_index } => {
            json!({"irradiance_wm2": irradiance_wm2, "uv_index": uv_index})
        }
        FieldValue::Clouds(okta) => json!(okta),
        FieldValue::AirQualityIndex(aqi) => json!(aqi),
        #[cfg(feature = "field-air-quality")]
        FieldValue::AirQualityPm(slots) => {
            let labels = ["pm1_0", "pm2_5", "pm4_0", "pm10"];
            let mut obj = Map::new();
            for (label, v) in labels.iter().zip(slots.iter()) {
                if let Some(v) = v {
                    obj.insert((*label).into(), json!(real(*v)));
                }
            }
            Value::Object(obj)
        }
        #[cfg(feature = "field-air-quality")]
        FieldValue::AirQualityGas { voc, nox, co2, co, hcho, o3 } => {
            let mut obj = Map::new();
            if let Some(v) = voc {
                obj.insert("voc".into(), json!(real(*v)));
            }
            if let Some(v) = nox {
                obj.insert("nox".into(), json!(real(*v)));
            }
            if let Some(v) = co2 {
                obj.insert("co2".into(), json!(v));
            }
            if let Some(v) = co {
                obj.insert("co".into(), json!(v));
            }
            if let Some(v) = hcho {
                obj.insert("hcho".into(), json!(real(*v)));
            }
            if let Some(v) = o3 {
                obj.insert("o3".into(), json!(v));
            }
            Value::Object(obj)
        }
        FieldValue::Radiation { cpm, dose_uszh } => json!({"cpm": cpm, "dose_uszh": real(*dose_uszh)}),
        FieldValue::Depth(cm) => json!(cm),
        FieldValue::Position { lat, lon } => json!({"lat": geo(*lat), "lon": geo(*lon)}),
        FieldValue::DateTime(secs) => json!(secs),
        FieldValue::Flags(bits) => json!(bits),
        #[cfg(feature = "field-image")]
        FieldValue::Image(image) => json!({
            "pixel_format": image.pixel_format as u8,
            "size_tier": image.size_tier as u8,
            "compression": image.compression as u8,
            "flags": image.flags,
            "data": BASE64.encode(image.payload.as_slice()),
        }),
    }
}

fn json_value_to_field(id: crate::core::FieldId, v: &Value) -> Result<FieldValue, CodecError> {
    use crate::core::FieldId;
    let num = |key: &'static str, obj: &Map<String, Value>| -> Result<f64, CodecError> {
        obj.get(key).and_then(Value::as_f64).ok_or(JsonError::MissingField(key).into())
    };
    let obj_of = |v: &Value| -> Result<&Map<String, Value>, CodecError> {
        v.as_object().ok_or(JsonError::TypeMismatch("object").into())
    };
    Ok(match id {
        FieldId::Battery => {
            let o = obj_of(v)?;
            FieldValue::Battery {
                level_pct: num("level_pct", o)? as u8,
                charging: o.get("charging").and_then(Value::as_bool).ok_or(JsonError::MissingField("charging"))?,
            }
        }
        FieldId::Link => {
            let o = obj_of(v)?;
            FieldValue::Link {
                rssi_dbm: num("rssi_dbm", o)? as i16,
                snr_db: real_from(num("snr_db", o)?),
            }
        }
        FieldId::Temperature => FieldValue::Temperature(real_from(v.as_f64().ok_or(JsonError::TypeMismatch("temperature"))?)),
        FieldId::Pressure => FieldValue::Pressure(v.as_u64().ok_or(JsonError::TypeMismatch("pressure"))? as u16),
        FieldId::Humidity => FieldValue::Humidity(v.as_u64().ok_or(JsonError::TypeMismatch("humidity"))? as u8),
        FieldId::Environment => {
            let o = obj_of(v)?;
            FieldValue::Environment {
                temperature: real_from(num("temperature", o)?),
                pressure: num("pressure", o)? as u16,
                humidity: num("humidity", o)? as u8,
            }
        }
        FieldId::Wind => {
            let o = obj_of(v)?;
            FieldValue::Wind {
                speed_ms: real_from(num("speed_ms", o)?),
                dir_deg: num("dir_deg", o)? as u16,
                gust_ms: real_from(num("gust_ms", o)?),
            }
        }
        FieldId::Rain => {
            let o = obj_of(v)?;
            FieldValue::Rain {
                rate_mmh: num("rate_mmh", o)? as u8,
                size_mm: real_from(num("size_mm", o)?),
            }
        }
        FieldId::Solar => {
            let o = obj_of(v)?;
            FieldValue::Solar {
                irradiance_wm2: num("irradiance_wm2", o)? as u16,
                uv_index: num("uv_index", o)? as u8,
            }
        }
        FieldId::Clouds => FieldValue::Clouds(v.as_u64().ok_or(JsonError::TypeMismatch("clouds"))? as u8),
        FieldId::AirQualityIndex => FieldValue::AirQualityIndex(v.as_u64().ok_or(JsonError::TypeMismatch("aqi"))? as u16),
        #[cfg(feature = "field-air-quality")]
        FieldId::AirQualityPm => {
            let o = obj_of(v)?;
            let get = |k: &'static str| o.get(k).and_then(Value::as_f64).map(real_from);
            FieldValue::AirQualityPm([
                get("pm1_0"),
                get("pm2_5"),
                get("pm4_0"),
                get("pm10"),
            ])
        }
        #[cfg(feature = "field-air-quality")]
        FieldId::AirQualityGas => {
            let o = obj_of(v)?;
            FieldValue::AirQualityGas {
                voc: o.get("voc").and_then(Value::as_f64).map(real_from),
                nox: o.get("nox").and_then(Value::as_f64).map(real_from),
                co2: o.get("co2").and_then(Value::as_u64).map(|x| x as u16),
                co: o.get("co").and_then(Value::as_u64).map(|x| x as u16),
                hcho: o.get("hcho").and_then(Value::as_f64).map(real_from),
                o3: o.get("o3").and_then(Value::as_u64).map(|x| x as u16),
            }
        }
        FieldId::Radiation => {
            let o = obj_of(v)?;
            FieldValue::Radiation {
                cpm: num("cpm", o)? as u16,
                dose_uszh: real_from(num("dose_uszh", o)?),
            }
        }
        FieldId::Depth => FieldValue::Depth(v.as_u64().ok_or(JsonError::TypeMismatch("depth"))? as u16),
        FieldId::Position => {
            let o = obj_of(v)?;
            FieldValue::Position {
                lat: geo_from(num("lat", o)?),
                lon: geo_from(num("lon", o)?),
            }
        }
        FieldId::DateTime => FieldValue::DateTime(v.as_u64().ok_or(JsonError::TypeMismatch("datetime"))? as u32),
        FieldId::Flags => FieldValue::Flags(v.as_u64().ok_or(JsonError::TypeMismatch("flags"))? as u8),
        #[cfg(feature = "field-image")]
        FieldId::Image => {
            let o = obj_of(v)?;
            let data = o.get("data").and_then(Value::as_str).ok_or(JsonError::MissingField("data"))?;
            let bytes = BASE64.decode(data).map_err(|_| JsonError::TypeMismatch("data"))?;
            FieldValue::Image(ImageField {
                pixel_format: pixel_format_from(num("pixel_format", o)? as u8)?,
                size_tier: size_tier_from(num("size_tier", o)? as u8)?,
                compression: compression_from(num("compression", o)? as u8)?,
                flags: num("flags", o)? as u8,
                payload: ImagePayload::from_slice(&bytes).map_err(CodecError::Image)?,
            })
        }
    })
}

#[cfg(feature = "field-image")]
fn pixel_format_from(code: u8) -> Result<PixelFormat, CodecError> {
    use crate::error::ImageError;
    Ok(match code {
        0 => PixelFormat::Mono1,
        1 => PixelFormat::Gray4,
        2 => PixelFormat::Grey16,
        _ => return Err(ImageError::PixelFormatHigh.into()),
    })
}
#[cfg(feature = "field-image")]
fn size_tier_from(code: u8) -> Result<SizeTier, CodecError> {
    use crate::error::ImageError;
    Ok(match code {
        0 => SizeTier::Px24x18,
        1 => SizeTier::Px48x32,
        2 => SizeTier::Px64x48,
        _ => return Err(ImageError::SizeTierHigh.into()),
    })
}
#[cfg(feature = "field-image")]
fn compression_from(code: u8) -> Result<Compression, CodecError> {
    use crate::error::ImageError;
    Ok(match code {
        0 => Compression::None,
        1 => Compression::Rle,
        2 => Compression::Window,
        _ => return Err(ImageError::CompressionHigh.into()),
    })
}

fn tlv_table_to_json(table: &TlvTable) -> Value {
    let mut out = std::vec::Vec::new();
    for entry in table.as_slice().iter().flatten() {
        out.push(match &entry.payload {
            TlvPayload::Str(s) => json!({"type": entry.type_code, "format": "str", "value": s.as_str()}),
            TlvPayload::Bytes(b) => {
                json!({"type": entry.type_code, "format": "raw", "value": encode_hex(b.as_slice())})
            }
        });
    }
    Value::Array(out)
}

fn json_to_tlv_entry(v: &Value) -> Result<TlvEntry, CodecError> {
    let obj = v.as_object().ok_or(JsonError::Parse)?;
    let type_code = obj.get("type").and_then(Value::as_u64).ok_or(JsonError::MissingField("type"))? as u8;
    let format = obj.get("format").and_then(Value::as_str).ok_or(JsonError::MissingField("format"))?;
    let value = obj.get("value").and_then(Value::as_str).ok_or(JsonError::MissingField("value"))?;
    match format {
        "str" => Ok(TlvEntry::string(type_code, value)?),
        "raw" => {
            let bytes = decode_hex(value).ok_or(JsonError::TypeMismatch("value"))?;
            Ok(TlvEntry::bytes(type_code, &bytes)?)
        }
        _ => Err(JsonError::TypeMismatch("format").into()),
    }
}

fn encode_hex(bytes: &[u8]) -> std::string::String {
    use std::fmt::Write;
    let mut s = std::string::String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{b:02x}").expect("writing to a String cannot fail");
    }
    s
}

fn decode_hex(s: &str) -> Option<std::vec::Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

fn real(v: Real) -> f64 {
    crate::core::real_to_f64(v)
}

fn real_from(v: f64) -> Real {
    crate::core::real_from_f64(v)
}

fn geo(v: GeoReal) -> f64 {
    crate::core::geo_to_f64(v)
}

fn geo_from(v: f64) -> GeoReal {
    crate::core::geo_from_f64(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue as FV;

    #[test]
    fn decode_then_reencode_is_byte_exact() {
        let mut enc = Encoder::new();
        enc.begin(0, 10, 99).unwrap();
        enc.encode_field(FV::Clouds(5)).unwrap();
        enc.encode_field(FV::Battery { level_pct: 40, charging: false }).unwrap();
        enc.encode_tlv(TlvEntry::status("OK").unwrap()).unwrap();
        let mut buf = [0u8; 32];
        let len = enc.end(&mut buf).unwrap();
        let original = &buf[..len];

        let json = decode_to_json(original).unwrap();
        let reencoded = encode_from_json(&json).unwrap();
        assert_eq!(original, reencoded.as_slice());
    }
}
