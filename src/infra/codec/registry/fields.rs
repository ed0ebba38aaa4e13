//! Per-field-type encode/decode routines. Each function pair quantises one
//! field using the primitives in [`crate::infra::codec::quantiser`].
//! Registered into [`super::REGISTRY`].
use crate::core::{real_from_f64, real_to_f64, FieldId, FieldValue};
use crate::error::{CodecError, FieldError};
use crate::infra::codec::bits::{BitReader, BitWriter};
use crate::infra::codec::quantiser::{Affine, Step};

#[cfg(feature = "field-air-quality")]
use crate::core::GasSlot;
#[cfg(feature = "field-air-quality")]
use crate::core::PmSlot;

type EncodeResult = Result<(), CodecError>;
type DecodeResult = Result<FieldValue, CodecError>;

fn out_of_range(field: FieldId, low: f64, high: f64) -> CodecError {
    CodecError::Field(FieldError::OutOfRange { field, low, high })
}

//================================================================ battery
const BATTERY_LEVEL: Step = Step {
    low: 0.0,
    high: 100.0,
    step: 100.0 / 31.0,
};

pub fn encode_battery(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Battery { level_pct, charging } = v else {
        unreachable!()
    };
    let code = BATTERY_LEVEL
        .encode(*level_pct as f64)
        .map_err(|_| out_of_range(FieldId::Battery, 0.0, 100.0))?;
    w.put(code, 5)?;
    w.put_bit(*charging)?;
    Ok(())
}

pub fn decode_battery(r: &mut BitReader) -> DecodeResult {
    let code = r.get(5, "battery.level")?;
    let charging = r.get_bit("battery.charging")?;
    Ok(FieldValue::Battery {
        level_pct: BATTERY_LEVEL.decode(code).round() as u8,
        charging,
    })
}

//================================================================ link
const LINK_RSSI: Step = Step {
    low: -120.0,
    high: -60.0,
    step: 4.0,
};
const LINK_SNR: Step = Step {
    low: -20.0,
    high: 10.0,
    step: 10.0,
};

pub fn encode_link(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Link { rssi_dbm, snr_db } = v else {
        unreachable!()
    };
    let rssi_code = LINK_RSSI
        .encode(*rssi_dbm as f64)
        .map_err(|_| out_of_range(FieldId::Link, -120.0, -60.0))?;
    let snr_code = LINK_SNR
        .encode(real_to_f64(*snr_db))
        .map_err(|_| out_of_range(FieldId::Link, -20.0, 10.0))?;
    w.put(rssi_code, 4)?;
    w.put(snr_code, 2)?;
    Ok(())
}

pub fn decode_link(r: &mut BitReader) -> DecodeResult {
    let rssi_code = r.get(4, "link.rssi")?;
    let snr_code = r.get(2, "link.snr")?;
    Ok(FieldValue::Link {
        rssi_dbm: LINK_RSSI.decode(rssi_code).round() as i16,
        snr_db: real_from_f64(LINK_SNR.decode(snr_code)),
    })
}

//================================================================ temperature
const TEMPERATURE: Step = Step {
    low: -40.0,
    high: 80.0,
    step: 0.25,
};

pub fn encode_temperature(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Temperature(t) = v else { unreachable!() };
    let code = TEMPERATURE
        .encode(real_to_f64(*t))
        .map_err(|_| out_of_range(FieldId::Temperature, -40.0, 80.0))?;
    w.put(code, 9)?;
    Ok(())
}

pub fn decode_temperature(r: &mut BitReader) -> DecodeResult {
    let code = r.get(9, "temperature")?;
    Ok(FieldValue::Temperature(real_from_f64(TEMPERATURE.decode(code))))
}

//================================================================ pressure
const PRESSURE: Step = Step {
    low: 850.0,
    high: 1105.0,
    step: 1.0,
};

pub fn encode_pressure(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Pressure(p) = v else { unreachable!() };
    let code = PRESSURE
        .encode(*p as f64)
        .map_err(|_| out_of_range(FieldId::Pressure, 850.0, 1105.0))?;
    w.put(code, 8)?;
    Ok(())
}

pub fn decode_pressure(r: &mut BitReader) -> DecodeResult {
    let code = r.get(8, "pressure")?;
    Ok(FieldValue::Pressure(PRESSURE.decode(code).round() as u16))
}

//================================================================ humidity
const HUMIDITY: Step = Step {
    low: 0.0,
    high: 100.0,
    step: 1.0,
};

pub fn encode_humidity(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Humidity(h) = v else { unreachable!() };
    let code = HUMIDITY
        .encode(*h as f64)
        .map_err(|_| out_of_range(FieldId::Humidity, 0.0, 100.0))?;
    w.put(code, 7)?;
    Ok(())
}

pub fn decode_humidity(r: &mut BitReader) -> DecodeResult {
    let code = r.get(7, "humidity")?;
    Ok(FieldValue::Humidity(HUMIDITY.decode(code).round() as u8))
}

//================================================================ environment (bundle)
pub fn encode_environment(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Environment {
        temperature,
        pressure,
        humidity,
    } = v
    else {
        unreachable!()
    };
    encode_temperature(w, &FieldValue::Temperature(*temperature))?;
    encode_pressure(w, &FieldValue::Pressure(*pressure))?;
    encode_humidity(w, &FieldValue::Humidity(*humidity))
}

pub fn decode_environment(r: &mut BitReader) -> DecodeResult {
    let FieldValue::Temperature(temperature) = decode_temperature(r)? else {
        unreachable!()
    };
    let FieldValue::Pressure(pressure) = decode_pressure(r)? else {
        unreachable!()
    };
    let FieldValue::Humidity(humidity) = decode_humidity(r)? else {
        unreachable!()
    };
    Ok(FieldValue::Environment {
        temperature,
        pressure,
        humidity,
    })
}

//================================================================ wind (bundle)
const WIND_SPEED: Step = Step {
    low: 0.0,
    high: 63.5,
    step: 0.5,
};
const WIND_DIR: Affine = Affine {
    low: 0.0,
    high: 359.0,
    width: 8,
};
const WIND_GUST: Step = WIND_SPEED;

pub fn encode_wind(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Wind {
        speed_ms,
        dir_deg,
        gust_ms,
    } = v
    else {
        unreachable!()
    };
    let speed_code = WIND_SPEED
        .encode(real_to_f64(*speed_ms))
        .map_err(|_| out_of_range(FieldId::Wind, 0.0, 63.5))?;
    let dir_code = WIND_DIR
        .encode(*dir_deg as f64)
        .map_err(|_| out_of_range(FieldId::Wind, 0.0, 359.0))?;
    let gust_code = WIND_GUST
        .encode(real_to_f64(*gust_ms))
        .map_err(|_| out_of_range(FieldId::Wind, 0.0, 63.5))?;
    w.put(speed_code, 7)?;
    w.put(dir_code, 8)?;
    w.put(gust_code, 7)?;
    Ok(())
}

pub fn decode_wind(r: &mut BitReader) -> DecodeResult {
    let speed_code = r.get(7, "wind.speed")?;
    let dir_code = r.get(8, "wind.dir")?;
    let gust_code = r.get(7, "wind.gust")?;
    Ok(FieldValue::Wind {
        speed_ms: real_from_f64(WIND_SPEED.decode(speed_code)),
        dir_deg: WIND_DIR.decode(dir_code).round() as u16,
        gust_ms: real_from_f64(WIND_GUST.decode(gust_code)),
    })
}

//================================================================ rain (bundle)
const RAIN_RATE: Step = Step {
    low: 0.0,
    high: 255.0,
    step: 1.0,
};
const RAIN_SIZE: Step = Step {
    low: 0.0,
    high: 60.0,
    step: 4.0,
};

pub fn encode_rain(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Rain { rate_mmh, size_mm } = v else {
        unreachable!()
    };
    let rate_code = RAIN_RATE
        .encode(*rate_mmh as f64)
        .map_err(|_| out_of_range(FieldId::Rain, 0.0, 255.0))?;
    let size_code = RAIN_SIZE
        .encode(real_to_f64(*size_mm))
        .map_err(|_| out_of_range(FieldId::Rain, 0.0, 60.0))?;
    w.put(rate_code, 8)?;
    w.put(size_code, 4)?;
    Ok(())
}

pub fn decode_rain(r: &mut BitReader) -> DecodeResult {
    let rate_code = r.get(8, "rain.rate")?;
    let size_code = r.get(4, "rain.size")?;
    Ok(FieldValue::Rain {
        rate_mmh: RAIN_RATE.decode(rate_code).round() as u8,
        size_mm: real_from_f64(RAIN_SIZE.decode(size_code)),
    })
}

//================================================================ solar (bundle)
const SOLAR_IRRADIANCE: Step = Step {
    low: 0.0,
    high: 1023.0,
    step: 1.0,
};
const SOLAR_UV: Step = Step {
    low: 0.0,
    high: 15.0,
    step: 1.0,
};

pub fn encode_solar(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Solar {
        irradiance_wm2,
        uv_index,
    } = v
    else {
        unreachable!()
    };
    let irr_code = SOLAR_IRRADIANCE
        .encode(*irradiance_wm2 as f64)
        .map_err(|_| out_of_range(FieldId::Solar, 0.0, 1023.0))?;
    let uv_code = SOLAR_UV
        .encode(*uv_index as f64)
        .map_err(|_| out_of_range(FieldId::Solar, 0.0, 15.0))?;
    w.put(irr_code, 10)?;
    w.put(uv_code, 4)?;
    Ok(())
}

pub fn decode_solar(r: &mut BitReader) -> DecodeResult {
    let irr_code = r.get(10, "solar.irradiance")?;
    let uv_code = r.get(4, "solar.uv")?;
    Ok(FieldValue::Solar {
        irradiance_wm2: SOLAR_IRRADIANCE.decode(irr_code).round() as u16,
        uv_index: SOLAR_UV.decode(uv_code).round() as u8,
    })
}

//================================================================ clouds
const CLOUDS: Step = Step {
    low: 0.0,
    high: 8.0,
    step: 1.0,
};

pub fn encode_clouds(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Clouds(okta) = v else { unreachable!() };
    let code = CLOUDS
        .encode(*okta as f64)
        .map_err(|_| out_of_range(FieldId::Clouds, 0.0, 8.0))?;
    w.put(code, 4)?;
    Ok(())
}

pub fn decode_clouds(r: &mut BitReader) -> DecodeResult {
    let code = r.get(4, "clouds")?;
    Ok(FieldValue::Clouds(CLOUDS.decode(code).round() as u8))
}

//================================================================ air_quality_index
const AQI: Step = Step {
    low: 0.0,
    high: 500.0,
    step: 1.0,
};

pub fn encode_air_quality_index(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::AirQualityIndex(aqi) = v else {
        unreachable!()
    };
    let code = AQI
        .encode(*aqi as f64)
        .map_err(|_| out_of_range(FieldId::AirQualityIndex, 0.0, 500.0))?;
    w.put(code, 9)?;
    Ok(())
}

pub fn decode_air_quality_index(r: &mut BitReader) -> DecodeResult {
    let code = r.get(9, "air_quality_index")?;
    Ok(FieldValue::AirQualityIndex(AQI.decode(code).round() as u16))
}

//================================================================ air_quality_pm (sub-bitmap)
#[cfg(feature = "field-air-quality")]
const PM_VALUE: Step = Step {
    low: 0.0,
    high: 1275.0,
    step: 5.0,
};

#[cfg(feature = "field-air-quality")]
pub fn encode_air_quality_pm(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::AirQualityPm(slots) = v else {
        unreachable!()
    };
    if slots.iter().all(Option::is_none) {
        return Err(CodecError::Field(FieldError::EmptyBitmap(FieldId::AirQualityPm)));
    }
    for slot in PmSlot::ALL {
        w.put_bit(slots[slot as usize].is_some())?;
    }
    for slot in PmSlot::ALL {
        if let Some(value) = slots[slot as usize] {
            let code = PM_VALUE
                .encode(real_to_f64(value))
                .map_err(|_| out_of_range(FieldId::AirQualityPm, 0.0, 1275.0))?;
            w.put(code, 8)?;
        }
    }
    Ok(())
}

#[cfg(feature = "field-air-quality")]
pub fn decode_air_quality_pm(r: &mut BitReader) -> DecodeResult {
    let mut present = [false; 4];
    for slot in PmSlot::ALL {
        present[slot as usize] = r.get_bit("air_quality_pm.mask")?;
    }
    let mut values: [Option<crate::core::Real>; 4] = [None; 4];
    for slot in PmSlot::ALL {
        if present[slot as usize] {
            let code = r.get(8, "air_quality_pm.value")?;
            values[slot as usize] = Some(real_from_f64(PM_VALUE.decode(code)));
        }
    }
    Ok(FieldValue::AirQualityPm(values))
}

//================================================================ air_quality_gas (sub-bitmap, per-slot widths)
#[cfg(feature = "field-air-quality")]
const GAS_VOC: Step = Step { low: 0.0, high: 508.0, step: 4.0 };
#[cfg(feature = "field-air-quality")]
const GAS_NOX: Step = GAS_VOC;
#[cfg(feature = "field-air-quality")]
const GAS_CO2: Step = Step { low: 0.0, high: 51150.0, step: 50.0 };
#[cfg(feature = "field-air-quality")]
const GAS_CO: Step = Step { low: 0.0, high: 1023.0, step: 1.0 };
#[cfg(feature = "field-air-quality")]
const GAS_HCHO: Step = Step { low: 0.0, high: 5115.0, step: 5.0 };
#[cfg(feature = "field-air-quality")]
const GAS_O3: Step = Step { low: 0.0, high: 1023.0, step: 1.0 };
/// Bit width of every gas sub-slot, including the two trailing reserved ones.
#[cfg(feature = "field-air-quality")]
const GAS_SLOT_WIDTHS: [u8; 8] = [7, 7, 10, 10, 10, 10, 10, 10];

#[cfg(feature = "field-air-quality")]
pub fn encode_air_quality_gas(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::AirQualityGas {
        voc,
        nox,
        co2,
        co,
        hcho,
        o3,
    } = v
    else {
        unreachable!()
    };
    let present = [
        voc.is_some(),
        nox.is_some(),
        co2.is_some(),
        co.is_some(),
        hcho.is_some(),
        o3.is_some(),
        false,
        false,
    ];
    if present.iter().all(|p| !*p) {
        return Err(CodecError::Field(FieldError::EmptyBitmap(FieldId::AirQualityGas)));
    }
    for p in present {
        w.put_bit(p)?;
    }
    let bad = || out_of_range(FieldId::AirQualityGas, 0.0, 51150.0);
    if let Some(x) = voc {
        w.put(GAS_VOC.encode(real_to_f64(*x)).map_err(|_| bad())?, 7)?;
    }
    if let Some(x) = nox {
        w.put(GAS_NOX.encode(real_to_f64(*x)).map_err(|_| bad())?, 7)?;
    }
    if let Some(x) = co2 {
        w.put(GAS_CO2.encode(*x as f64).map_err(|_| bad())?, 10)?;
    }
    if let Some(x) = co {
        w.put(GAS_CO.encode(*x as f64).map_err(|_| bad())?, 10)?;
    }
    if let Some(x) = hcho {
        w.put(GAS_HCHO.encode(real_to_f64(*x)).map_err(|_| bad())?, 10)?;
    }
    if let Some(x) = o3 {
        w.put(GAS_O3.encode(*x as f64).map_err(|_| bad())?, 10)?;
    }
    Ok(())
}

#[cfg(feature = "field-air-quality")]
pub fn decode_air_quality_gas(r: &mut BitReader) -> DecodeResult {
    use GasSlot::*;
    let mut present = [false; 8];
    for p in present.iter_mut() {
        *p = r.get_bit("air_quality_gas.mask")?;
    }
    let mut voc = None;
    let mut nox = None;
    let mut co2 = None;
    let mut co = None;
    let mut hcho = None;
    let mut o3 = None;
    for slot_idx in 0..8u8 {
        if !present[slot_idx as usize] {
            continue;
        }
        let width = GAS_SLOT_WIDTHS[slot_idx as usize];
        let code = r.get(width, "air_quality_gas.value")?;
        match slot_idx {
            x if x == Voc as u8 => voc = Some(real_from_f64(GAS_VOC.decode(code))),
            x if x == Nox as u8 => nox = Some(real_from_f64(GAS_NOX.decode(code))),
            x if x == Co2 as u8 => co2 = Some(GAS_CO2.decode(code).round() as u16),
            x if x == Co as u8 => co = Some(GAS_CO.decode(code).round() as u16),
            x if x == Hcho as u8 => hcho = Some(real_from_f64(GAS_HCHO.decode(code))),
            x if x == O3 as u8 => o3 = Some(GAS_O3.decode(code).round() as u16),
            _ => {} // reserved slot 6/7: width already consumed via `get`, value discarded
        }
    }
    Ok(FieldValue::AirQualityGas {
        voc,
        nox,
        co2,
        co,
        hcho,
        o3,
    })
}

//================================================================ radiation (bundle, + 2 reserved bits)
const RADIATION_CPM: Step = Step {
    low: 0.0,
    high: 16383.0,
    step: 1.0,
};
const RADIATION_DOSE: Step = Step {
    low: 0.0,
    high: 163.83,
    step: 0.01,
};

pub fn encode_radiation(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Radiation { cpm, dose_uszh } = v else {
        unreachable!()
    };
    let cpm_code = RADIATION_CPM
        .encode(*cpm as f64)
        .map_err(|_| out_of_range(FieldId::Radiation, 0.0, 16383.0))?;
    let dose_code = RADIATION_DOSE
        .encode(real_to_f64(*dose_uszh))
        .map_err(|_| out_of_range(FieldId::Radiation, 0.0, 163.83))?;
    w.put(cpm_code, 14)?;
    w.put(dose_code, 14)?;
    w.advance(2)?;
    Ok(())
}

pub fn decode_radiation(r: &mut BitReader) -> DecodeResult {
    let cpm_code = r.get(14, "radiation.cpm")?;
    let dose_code = r.get(14, "radiation.dose")?;
    r.advance(2)?;
    Ok(FieldValue::Radiation {
        cpm: RADIATION_CPM.decode(cpm_code).round() as u16,
        dose_uszh: real_from_f64(RADIATION_DOSE.decode(dose_code)),
    })
}

//================================================================ depth
const DEPTH: Step = Step {
    low: 0.0,
    high: 1023.0,
    step: 1.0,
};

pub fn encode_depth(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Depth(cm) = v else { unreachable!() };
    let code = DEPTH
        .encode(*cm as f64)
        .map_err(|_| out_of_range(FieldId::Depth, 0.0, 1023.0))?;
    w.put(code, 10)?;
    Ok(())
}

pub fn decode_depth(r: &mut BitReader) -> DecodeResult {
    let code = r.get(10, "depth")?;
    Ok(FieldValue::Depth(DEPTH.decode(code).round() as u16))
}

//================================================================ position
/// 24-bit affine code per axis, denominator `2^24 - 1`. Must match on
/// encode and decode exactly, or the JSON round-trip loses precision.
const POSITION_LAT: Affine = Affine {
    low: -90.0,
    high: 90.0,
    width: 24,
};
const POSITION_LON: Affine = Affine {
    low: -180.0,
    high: 180.0,
    width: 24,
};

pub fn encode_position(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Position { lat, lon } = v else {
        unreachable!()
    };
    let lat_f = crate::core::geo_to_f64(*lat);
    let lon_f = crate::core::geo_to_f64(*lon);
    let lat_code = POSITION_LAT
        .encode(lat_f)
        .map_err(|_| out_of_range(FieldId::Position, -90.0, 90.0))?;
    let lon_code = POSITION_LON
        .encode(lon_f)
        .map_err(|_| out_of_range(FieldId::Position, -180.0, 180.0))?;
    w.put(lat_code, 24)?;
    w.put(lon_code, 24)?;
    Ok(())
}

pub fn decode_position(r: &mut BitReader) -> DecodeResult {
    let lat_code = r.get(24, "position.lat")?;
    let lon_code = r.get(24, "position.lon")?;
    Ok(FieldValue::Position {
        lat: crate::core::geo_from_f64(POSITION_LAT.decode(lat_code)),
        lon: crate::core::geo_from_f64(POSITION_LON.decode(lon_code)),
    })
}

//================================================================ datetime
/// Seconds from year start, quantised to a 5 s step across the full 24-bit code space.
const DATETIME: Step = Step {
    low: 0.0,
    high: ((1u32 << 24) - 1) as f64 * 5.0,
    step: 5.0,
};

pub fn encode_datetime(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::DateTime(secs) = v else { unreachable!() };
    let code = DATETIME
        .encode(*secs as f64)
        .map_err(|_| out_of_range(FieldId::DateTime, DATETIME.low, DATETIME.high))?;
    w.put(code, 24)?;
    Ok(())
}

pub fn decode_datetime(r: &mut BitReader) -> DecodeResult {
    let code = r.get(24, "datetime")?;
    Ok(FieldValue::DateTime(DATETIME.decode(code).round() as u32))
}

//================================================================ flags
pub fn encode_flags(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Flags(bits) = v else { unreachable!() };
    w.put(*bits as u32, 8)?;
    Ok(())
}

pub fn decode_flags(r: &mut BitReader) -> DecodeResult {
    let code = r.get(8, "flags")?;
    Ok(FieldValue::Flags(code as u8))
}

//================================================================ image
#[cfg(feature = "field-image")]
pub fn encode_image(w: &mut BitWriter, v: &FieldValue) -> EncodeResult {
    let FieldValue::Image(image) = v else { unreachable!() };
    image.encode(w)
}

#[cfg(feature = "field-image")]
pub fn decode_image(r: &mut BitReader) -> DecodeResult {
    Ok(FieldValue::Image(crate::infra::codec::image::ImageField::decode(r)?))
}
