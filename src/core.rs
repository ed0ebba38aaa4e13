//! Defines the "data contract" shared by every codec module: the field-type
//! identifier space, the tagged-union of decoded field values, the packet
//! header triple, and the small fixed-capacity containers the rest of the
//! crate builds on. Nothing in here touches a bit buffer; `infra::codec`
//! consumes these types to parse or build binary payloads.
#![allow(dead_code)]

/// Maximum wire size of one packet.
pub const MAX_PACKET_BYTES: usize = 255;
/// Maximum number of TLV entries carried by one packet.
pub const MAX_TLV_ENTRIES: usize = 8;
/// Maximum payload length of a single TLV entry, in bytes (raw) or
/// 6-bit-character units (string).
pub const MAX_TLV_UNITS: usize = 255;
/// Maximum image payload length (the `length:8` control field caps at 254).
pub const MAX_IMAGE_BYTES: usize = 254;
/// Presence chain byte cap (implementation caps chain length at 4 bytes).
pub const MAX_PRESENCE_BYTES: usize = 4;
/// Total addressable slots given `MAX_PRESENCE_BYTES` (6 + 7·(N-1)).
pub const MAX_SLOTS: usize = 6 + 7 * (MAX_PRESENCE_BYTES - 1);

/// Real-valued field representation. `f32` by default; replaced by a
/// scaled `i32` under the `integer-only` feature.
#[cfg(not(feature = "integer-only"))]
pub type Real = f32;
#[cfg(feature = "integer-only")]
pub type Real = i32;

/// Scale applied to `Real` under `integer-only` (value × 100).
#[cfg(feature = "integer-only")]
pub const REAL_SCALE: f64 = 100.0;

/// Convert an engineering-unit `f64` into the wire-facing `Real` type.
#[inline]
pub fn real_from_f64(v: f64) -> Real {
    #[cfg(not(feature = "integer-only"))]
    {
        v as Real
    }
    #[cfg(feature = "integer-only")]
    {
        (v * REAL_SCALE).round() as Real
    }
}

/// Convert a wire-facing `Real` back into an engineering-unit `f64`.
#[inline]
pub fn real_to_f64(v: Real) -> f64 {
    #[cfg(not(feature = "integer-only"))]
    {
        v as f64
    }
    #[cfg(feature = "integer-only")]
    {
        v as f64 / REAL_SCALE
    }
}

/// Geographic coordinate representation (`position` field). `f64` by
/// default; scaled `i32` (× 1e7) under `integer-only`.
#[cfg(not(feature = "integer-only"))]
pub type GeoReal = f64;
#[cfg(feature = "integer-only")]
pub type GeoReal = i32;

#[cfg(feature = "integer-only")]
pub const GEO_SCALE: f64 = 1.0e7;

#[inline]
pub fn geo_from_f64(v: f64) -> GeoReal {
    #[cfg(not(feature = "integer-only"))]
    {
        v
    }
    #[cfg(feature = "integer-only")]
    {
        (v * GEO_SCALE).round() as GeoReal
    }
}

#[inline]
pub fn geo_to_f64(v: GeoReal) -> f64 {
    #[cfg(not(feature = "integer-only"))]
    {
        v
    }
    #[cfg(feature = "integer-only")]
    {
        v as f64 / GEO_SCALE
    }
}

/// Identifies a field-type across the registry, variant map, presence mask
/// and decoded record. Numeric value doubles as the bit index in the
/// 32-bit "fields present" mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FieldId {
    Battery = 0,
    Link = 1,
    Temperature = 2,
    Pressure = 3,
    Humidity = 4,
    Environment = 5,
    Wind = 6,
    Rain = 7,
    Solar = 8,
    Clouds = 9,
    AirQualityIndex = 10,
    #[cfg(feature = "field-air-quality")]
    AirQualityPm = 11,
    #[cfg(feature = "field-air-quality")]
    AirQualityGas = 12,
    Radiation = 13,
    Depth = 14,
    Position = 15,
    DateTime = 16,
    Flags = 17,
    #[cfg(feature = "field-image")]
    Image = 18,
}

/// Number of distinct field-type ids (keep in sync with [`FieldId`]).
pub const FIELD_ID_COUNT: usize = 19;

impl FieldId {
    /// All field ids compiled into this build, in ascending numeric order.
    pub const ALL: &'static [FieldId] = &[
        FieldId::Battery,
        FieldId::Link,
        FieldId::Temperature,
        FieldId::Pressure,
        FieldId::Humidity,
        FieldId::Environment,
        FieldId::Wind,
        FieldId::Rain,
        FieldId::Solar,
        FieldId::Clouds,
        FieldId::AirQualityIndex,
        #[cfg(feature = "field-air-quality")]
        FieldId::AirQualityPm,
        #[cfg(feature = "field-air-quality")]
        FieldId::AirQualityGas,
        FieldId::Radiation,
        FieldId::Depth,
        FieldId::Position,
        FieldId::DateTime,
        FieldId::Flags,
        #[cfg(feature = "field-image")]
        FieldId::Image,
    ];

    /// Bit index of this field-type in the 32-bit presence mask.
    #[inline]
    pub const fn bit(self) -> u32 {
        self as u8 as u32
    }

    /// Canonical lowercase identifier (used by dump/print, never by JSON,
    /// which uses the variant's own label per slot).
    pub const fn canonical_name(self) -> &'static str {
        match self {
            FieldId::Battery => "battery",
            FieldId::Link => "link",
            FieldId::Temperature => "temperature",
            FieldId::Pressure => "pressure",
            FieldId::Humidity => "humidity",
            FieldId::Environment => "environment",
            FieldId::Wind => "wind",
            FieldId::Rain => "rain",
            FieldId::Solar => "solar",
            FieldId::Clouds => "clouds",
            FieldId::AirQualityIndex => "air_quality_index",
            #[cfg(feature = "field-air-quality")]
            FieldId::AirQualityPm => "air_quality_pm",
            #[cfg(feature = "field-air-quality")]
            FieldId::AirQualityGas => "air_quality_gas",
            FieldId::Radiation => "radiation",
            FieldId::Depth => "depth",
            FieldId::Position => "position",
            FieldId::DateTime => "datetime",
            FieldId::Flags => "flags",
            #[cfg(feature = "field-image")]
            FieldId::Image => "image",
        }
    }
}

/// 32-bit bitmap over [`FieldId`] values: which field-types are present in
/// a packet being built or already decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldsPresent(pub u32);

impl FieldsPresent {
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn contains(self, id: FieldId) -> bool {
        (self.0 >> id.bit()) & 1 != 0
    }

    #[inline]
    pub fn set(&mut self, id: FieldId) {
        self.0 |= 1 << id.bit();
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Air-quality PM sub-slot identity (mask bit order within `air_quality_pm`).
#[cfg(feature = "field-air-quality")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PmSlot {
    Pm1_0 = 0,
    Pm2_5 = 1,
    Pm4_0 = 2,
    Pm10 = 3,
}

#[cfg(feature = "field-air-quality")]
impl PmSlot {
    pub const ALL: [PmSlot; 4] = [PmSlot::Pm1_0, PmSlot::Pm2_5, PmSlot::Pm4_0, PmSlot::Pm10];
}

/// Gas-sensor sub-slot identity (mask bit order within `air_quality_gas`).
/// Two trailing slots are reserved and always decode as absent.
#[cfg(feature = "field-air-quality")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GasSlot {
    Voc = 0,
    Nox = 1,
    Co2 = 2,
    Co = 3,
    Hcho = 4,
    O3 = 5,
}

/// Tagged union of every field-type's decoded/pre-encode value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldValue {
    Battery { level_pct: u8, charging: bool },
    Link { rssi_dbm: i16, snr_db: Real },
    Temperature(Real),
    Pressure(u16),
    Humidity(u8),
    Environment {
        temperature: Real,
        pressure: u16,
        humidity: u8,
    },
    Wind {
        speed_ms: Real,
        dir_deg: u16,
        gust_ms: Real,
    },
    Rain {
        rate_mmh: u8,
        size_mm: Real,
    },
    Solar {
        irradiance_wm2: u16,
        uv_index: u8,
    },
    Clouds(u8),
    AirQualityIndex(u16),
    #[cfg(feature = "field-air-quality")]
    AirQualityPm([Option<Real>; 4]),
    #[cfg(feature = "field-air-quality")]
    AirQualityGas {
        voc: Option<Real>,
        nox: Option<Real>,
        co2: Option<u16>,
        co: Option<u16>,
        hcho: Option<Real>,
        o3: Option<u16>,
    },
    Radiation {
        cpm: u16,
        dose_uszh: Real,
    },
    Depth(u16),
    Position {
        lat: GeoReal,
        lon: GeoReal,
    },
    /// Seconds elapsed since the start of the current year, quantised to a 5 s step.
    DateTime(u32),
    Flags(u8),
    #[cfg(feature = "field-image")]
    Image(crate::infra::codec::image::ImageField),
}

impl FieldValue {
    /// The [`FieldId`] this value belongs to.
    pub const fn id(&self) -> FieldId {
        match self {
            FieldValue::Battery { .. } => FieldId::Battery,
            FieldValue::Link { .. } => FieldId::Link,
            FieldValue::Temperature(_) => FieldId::Temperature,
            FieldValue::Pressure(_) => FieldId::Pressure,
            FieldValue::Humidity(_) => FieldId::Humidity,
            FieldValue::Environment { .. } => FieldId::Environment,
            FieldValue::Wind { .. } => FieldId::Wind,
            FieldValue::Rain { .. } => FieldId::Rain,
            FieldValue::Solar { .. } => FieldId::Solar,
            FieldValue::Clouds(_) => FieldId::Clouds,
            FieldValue::AirQualityIndex(_) => FieldId::AirQualityIndex,
            #[cfg(feature = "field-air-quality")]
            FieldValue::AirQualityPm(_) => FieldId::AirQualityPm,
            #[cfg(feature = "field-air-quality")]
            FieldValue::AirQualityGas { .. } => FieldId::AirQualityGas,
            FieldValue::Radiation { .. } => FieldId::Radiation,
            FieldValue::Depth(_) => FieldId::Depth,
            FieldValue::Position { .. } => FieldId::Position,
            FieldValue::DateTime(_) => FieldId::DateTime,
            FieldValue::Flags(_) => FieldId::Flags,
            #[cfg(feature = "field-image")]
            FieldValue::Image(_) => FieldId::Image,
        }
    }
}

/// The fixed 32-bit packet header: `variant:4 | station:12 | sequence:16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketHeader {
    pub variant: u8,
    pub station: u16,
    pub sequence: u16,
}

/// Fixed-capacity byte buffer for one TLV entry's raw payload (≤255 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvBytes {
    pub len: usize,
    pub data: [u8; MAX_TLV_UNITS],
}

impl Default for TlvBytes {
    fn default() -> Self {
        Self {
            len: 0,
            data: [0; MAX_TLV_UNITS],
        }
    }
}

impl TlvBytes {
    pub fn from_slice(slice: &[u8]) -> Self {
        let mut out = Self::default();
        let n = slice.len().min(MAX_TLV_UNITS);
        out.data[..n].copy_from_slice(&slice[..n]);
        out.len = n;
        out
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

/// Fixed-capacity, null-terminated character buffer for one TLV string
/// entry, so callers can treat them as C-like strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvString {
    pub len: usize,
    pub data: [u8; MAX_TLV_UNITS + 1],
}

impl Default for TlvString {
    fn default() -> Self {
        Self {
            len: 0,
            data: [0; MAX_TLV_UNITS + 1],
        }
    }
}

impl TlvString {
    pub fn from_str(s: &str) -> Self {
        let mut out = Self::default();
        let bytes = s.as_bytes();
        let n = bytes.len().min(MAX_TLV_UNITS);
        out.data[..n].copy_from_slice(&bytes[..n]);
        out.data[n] = 0;
        out.len = n;
        out
    }

    /// The string content, excluding the trailing NUL.
    #[inline]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.data[..self.len]).unwrap_or("")
    }
}
