//! Labelled field-by-field rendering of a decoded record, one line per
//! populated field plus a trailing TLV summary.
use super::ScratchWriter;
use crate::core::FieldValue;
use crate::infra::codec::tlv::TlvPayload;
use crate::protocol::record::DecodedRecord;
use crate::protocol::variant_map;
use core::fmt::Write;

/// Render `record` into `out`. Returns the number of bytes written, or
/// `Err(())` if `out` was too small. Each field is labelled with its
/// variant slot label (e.g. `"aqi"`), not its canonical field-type name.
pub fn print(record: &DecodedRecord, out: &mut [u8]) -> Result<usize, ()> {
    let mut w = ScratchWriter::new(out);
    writeln!(
        w,
        "variant={} station={} sequence={}",
        record.header.variant, record.header.station, record.header.sequence
    )
    .map_err(|_| ())?;
    let table = variant_map::lookup(record.header.variant).ok();
    for (slot_idx, value) in record.fields.iter().enumerate() {
        let Some(value) = value else { continue };
        let label = table
            .and_then(|t| t.slots.get(slot_idx).copied().flatten())
            .map(|entry| entry.label)
            .unwrap_or_else(|| value.id().canonical_name());
        writeln!(w, "{}: {}", label, FormatValue(value)).map_err(|_| ())?;
    }
    for entry in record.tlv.as_slice().iter().flatten() {
        match &entry.payload {
            TlvPayload::Str(s) => writeln!(w, "tlv[{}]: {}", entry.type_code, s.as_str()),
            TlvPayload::Bytes(b) => writeln!(w, "tlv[{}]: {} bytes", entry.type_code, b.len),
        }
        .map_err(|_| ())?;
    }
    Ok(w.len())
}

struct FormatValue<'a>(&'a FieldValue);

impl core::fmt::Display for FormatValue<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            FieldValue::Battery { level_pct, charging } => {
                write!(f, "{level_pct}% charging={charging}")
            }
            FieldValue::Link { rssi_dbm, snr_db } => write!(f, "{rssi_dbm} dBm, {snr_db} dB SNR"),
            FieldValue::Temperature(t) => write!(f, "{t} C"),
            FieldValue::Pressure(p) => write!(f, "{p} hPa"),
            FieldValue::Humidity(h) => write!(f, "{h}%"),
            FieldValue::Environment {
                temperature,
                pressure,
                humidity,
            } => write!(f, "{temperature} C, {pressure} hPa, {humidity}%"),
            FieldValue::Wind {
                speed_ms,
                dir_deg,
                gust_ms,
            } => write!(f, "{speed_ms} m/s @ {dir_deg} deg, gust {gust_ms} m/s"),
            FieldValue::Rain { rate_mmh, size_mm } => write!(f, "{rate_mmh} mm/h, drop {size_mm} mm"),
            FieldValue::Solar {
                irradiance_wm2,
                uv_index,
            } => write!(f, "{irradiance_wm2} W/m^2, UV {uv_index}"),
            FieldValue::Clouds(okta) => write!(f, "{okta} okta"),
            FieldValue::AirQualityIndex(aqi) => write!(f, "AQI {aqi}"),
            #[cfg(feature = "field-air-quality")]
            FieldValue::AirQualityPm(slots) => {
                write!(f, "pm1.0/2.5/4.0/10=")?;
                for (i, s) in slots.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    match s {
                        Some(v) => write!(f, "{v}")?,
                        None => write!(f, "-")?,
                    }
                }
                Ok(())
            }
            #[cfg(feature = "field-air-quality")]
            FieldValue::AirQualityGas { voc, nox, co2, co, hcho, o3 } => {
                write!(f, "voc={voc:?} nox={nox:?} co2={co2:?} co={co:?} hcho={hcho:?} o3={o3:?}")
            }
            FieldValue::Radiation { cpm, dose_uszh } => write!(f, "{cpm} cpm, {dose_uszh} uSv/h"),
            FieldValue::Depth(cm) => write!(f, "{cm} cm"),
            FieldValue::Position { lat, lon } => write!(f, "{lat}, {lon}"),
            FieldValue::DateTime(secs) => write!(f, "+{secs}s"),
            FieldValue::Flags(bits) => write!(f, "0b{bits:08b}"),
            #[cfg(feature = "field-image")]
            FieldValue::Image(image) => write!(
                f,
                "{:?}/{:?}/{:?}, {} bytes, invert={} fragment={}",
                image.pixel_format,
                image.size_tier,
                image.compression,
                image.payload.len,
                image.invert(),
                image.fragment(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder;
    use crate::protocol::encoder::Encoder;

    #[test]
    fn print_renders_the_header_and_populated_fields() {
        let mut enc = Encoder::new();
        enc.begin(0, 1, 2).unwrap();
        enc.encode_field(FieldValue::Clouds(4)).unwrap();
        let mut buf = [0u8; 32];
        let len = enc.end(&mut buf).unwrap();
        let record = decoder::decode(&buf[..len]).unwrap();

        let mut out = [0u8; 256];
        let out_len = print(&record, &mut out).unwrap();
        let text = core::str::from_utf8(&out[..out_len]).unwrap();
        assert!(text.contains("station=1"));
        assert!(text.contains("clouds:"));
    }
}
