//! Fixed precision coordinates and their conversion to and from the point
//! representation stored in the geography column (well-known binary).

use std::{fmt, str::FromStr};

use geo_types::{Geometry, Point};
use geozero::{error::GeozeroError, wkb::Wkb, ToGeo};
use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, NumberValidation, Schema, SchemaObject},
    JsonSchema,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of fractional digits kept for latitudes and longitudes.
pub const DECIMAL_PLACES: u32 = 7;

const SCALE: i64 = 10_i64.pow(DECIMAL_PLACES);

#[derive(Debug, thiserror::Error)]
pub enum GeoCodecError {
    #[error("coordinate is not a finite number")]
    NotFinite,
    #[error("coordinate {0} has more than {places} decimal places", places = DECIMAL_PLACES)]
    TooPrecise(String),
    #[error("could not parse coordinate {0:?}")]
    Malformed(String),
    #[error("{what} {value} is out of range [-{bound}, {bound}]")]
    OutOfRange {
        what: &'static str,
        value: Degrees,
        bound: i64,
    },
    #[error("expected a point, found a {0}")]
    NotAPoint(&'static str),
    #[error("could not encode point as wkb: {0}")]
    Encode(String),
    #[error("could not decode wkb: {0}")]
    Decode(#[from] GeozeroError),
}

/// An angle in degrees with exactly `DECIMAL_PLACES` fractional digits.
///
/// Stored as a scaled integer, so equality is exact and values survive a trip
/// through `f64` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Degrees(i64);

impl Degrees {
    pub const fn from_scaled(scaled: i64) -> Self {
        Self(scaled)
    }

    pub const fn scaled(self) -> i64 {
        self.0
    }

    /// Rounds `value` to the nearest representable coordinate.
    pub fn from_f64(value: f64) -> Result<Self, GeoCodecError> {
        if !value.is_finite() {
            return Err(GeoCodecError::NotFinite);
        }
        let scaled = (value * SCALE as f64).round();
        if scaled.abs() >= i64::MAX as f64 {
            return Err(GeoCodecError::Malformed(value.to_string()));
        }
        Ok(Self(scaled as i64))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / scale,
            magnitude % scale,
            width = DECIMAL_PLACES as usize
        )
    }
}

impl FromStr for Degrees {
    type Err = GeoCodecError;

    /// Parses a plain decimal number without going through floating point.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GeoCodecError::Malformed(s.to_owned());
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        if fraction.len() > DECIMAL_PLACES as usize {
            return Err(GeoCodecError::TooPrecise(s.to_owned()));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| malformed())?
        };
        let fraction: i64 = format!("{:0<width$}", fraction, width = DECIMAL_PLACES as usize)
            .parse()
            .map_err(|_| malformed())?;
        let scaled = whole
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or_else(malformed)?;
        Ok(Self(if negative { -scaled } else { scaled }))
    }
}

impl Serialize for Degrees {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Degrees {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept both JSON numbers and decimal strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum NumberOrString {
            Number(f64),
            String(String),
        }

        match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(value) => Degrees::from_f64(value),
            NumberOrString::String(value) => value.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Degrees {
    fn schema_name() -> String {
        "Degrees".to_owned()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        f64::json_schema(gen)
    }
}

macro_rules! bounded_degrees {
    ($name:ident, $what:literal, $bound:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Degrees", into = "Degrees")]
        pub struct $name(Degrees);

        impl $name {
            pub const BOUND: i64 = $bound;

            pub fn new(degrees: Degrees) -> Result<Self, GeoCodecError> {
                if degrees.scaled().abs() > Self::BOUND * SCALE {
                    return Err(GeoCodecError::OutOfRange {
                        what: $what,
                        value: degrees,
                        bound: Self::BOUND,
                    });
                }
                Ok(Self(degrees))
            }

            /// For constants; fails to compile when the value is out of range.
            pub const fn from_scaled(scaled: i64) -> Self {
                assert!(scaled.abs() <= Self::BOUND * SCALE, "coordinate out of range");
                Self(Degrees::from_scaled(scaled))
            }

            pub fn degrees(self) -> Degrees {
                self.0
            }

            pub fn to_f64(self) -> f64 {
                self.0.to_f64()
            }
        }

        impl TryFrom<Degrees> for $name {
            type Error = GeoCodecError;

            fn try_from(degrees: Degrees) -> Result<Self, Self::Error> {
                Self::new(degrees)
            }
        }

        impl From<$name> for Degrees {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = GeoCodecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.parse()?)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_owned()
            }

            fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
                SchemaObject {
                    instance_type: Some(InstanceType::Number.into()),
                    number: Some(Box::new(NumberValidation {
                        minimum: Some(-($bound as f64)),
                        maximum: Some($bound as f64),
                        ..Default::default()
                    })),
                    ..Default::default()
                }
                .into()
            }
        }
    };
}

bounded_degrees!(Latitude, "latitude", 90);
bounded_degrees!(Longitude, "longitude", 180);

/// Encodes a coordinate pair as a well-known binary point (x = longitude,
/// y = latitude).
pub fn encode(latitude: Latitude, longitude: Longitude) -> Result<Vec<u8>, GeoCodecError> {
    let point = Geometry::Point(Point::new(longitude.to_f64(), latitude.to_f64()));
    let mut bytes = vec![];
    let write_options = wkb::writer::WriteOptions {
        endianness: wkb::Endianness::LittleEndian,
    };
    wkb::writer::write_geometry(&mut bytes, &point, &write_options)
        .map_err(|why| GeoCodecError::Encode(why.to_string()))?;
    Ok(bytes)
}

/// Decodes a well-known binary point back into the coordinate pair it was
/// encoded from. Anything but a single point is rejected.
pub fn decode(bytes: &[u8]) -> Result<(Latitude, Longitude), GeoCodecError> {
    match Wkb(bytes.to_vec()).to_geo()? {
        Geometry::Point(point) => Ok((
            Latitude::new(Degrees::from_f64(point.y())?)?,
            Longitude::new(Degrees::from_f64(point.x())?)?,
        )),
        other => Err(GeoCodecError::NotAPoint(geometry_name(&other))),
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "point",
        Geometry::Line(_) => "line",
        Geometry::LineString(_) => "line string",
        Geometry::Polygon(_) => "polygon",
        Geometry::MultiPoint(_) => "multi point",
        Geometry::MultiLineString(_) => "multi line string",
        Geometry::MultiPolygon(_) => "multi polygon",
        Geometry::GeometryCollection(_) => "geometry collection",
        Geometry::Rect(_) => "rectangle",
        Geometry::Triangle(_) => "triangle",
    }
}

#[cfg(test)]
mod tests {
    use geo_types::{coord, LineString};

    use super::*;

    fn lat(s: &str) -> Latitude {
        s.parse().unwrap()
    }

    fn lon(s: &str) -> Longitude {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_trip_keeps_every_digit() {
        let cases = [
            ("54.3232927", "10.1227652"),
            ("-89.9999999", "179.9999999"),
            ("90", "-180"),
            ("0.0000001", "-0.0000001"),
            ("0", "0"),
            ("-33.8688197", "151.2092955"),
        ];
        for (latitude, longitude) in cases {
            let bytes = encode(lat(latitude), lon(longitude)).unwrap();
            let (decoded_lat, decoded_lon) = decode(&bytes).unwrap();
            assert_eq!(decoded_lat, lat(latitude));
            assert_eq!(decoded_lon, lon(longitude));
        }
    }

    #[test]
    fn test_longitude_is_x() {
        let bytes = encode(lat("10"), lon("20")).unwrap();
        let point = match Wkb(bytes).to_geo().unwrap() {
            Geometry::Point(point) => point,
            _ => panic!("expected a point"),
        };
        assert_eq!(point.x(), 20.0);
        assert_eq!(point.y(), 10.0);
    }

    #[test]
    fn test_decode_rejects_other_geometries() {
        let line = Geometry::LineString(LineString::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        ]));
        let mut bytes = vec![];
        wkb::writer::write_geometry(
            &mut bytes,
            &line,
            &wkb::writer::WriteOptions {
                endianness: wkb::Endianness::LittleEndian,
            },
        )
        .unwrap();
        assert!(matches!(decode(&bytes), Err(GeoCodecError::NotAPoint(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(&[0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("89.1234567".parse::<Degrees>().unwrap().scaled(), 891_234_567);
        assert_eq!("-0.5".parse::<Degrees>().unwrap().scaled(), -5_000_000);
        assert_eq!("12".parse::<Degrees>().unwrap().scaled(), 120_000_000);
        assert_eq!(".25".parse::<Degrees>().unwrap().scaled(), 2_500_000);
        assert!(matches!(
            "1.12345678".parse::<Degrees>(),
            Err(GeoCodecError::TooPrecise(_))
        ));
        assert!("1.2.3".parse::<Degrees>().is_err());
        assert!("abc".parse::<Degrees>().is_err());
        assert!("-".parse::<Degrees>().is_err());
    }

    #[test]
    fn test_too_precise_names_the_limit() {
        let why = "1.12345678".parse::<Degrees>().unwrap_err();
        assert_eq!(
            why.to_string(),
            "coordinate 1.12345678 has more than 7 decimal places"
        );
    }

    #[test]
    fn test_display_uses_fixed_precision() {
        assert_eq!(lat("-0.5").to_string(), "-0.5000000");
        assert_eq!(lon("179.1234567").to_string(), "179.1234567");
    }

    #[test]
    fn test_bounds() {
        assert!("90.0000001".parse::<Latitude>().is_err());
        assert!("-90".parse::<Latitude>().is_ok());
        assert!("180.0000001".parse::<Longitude>().is_err());
        assert!("-180".parse::<Longitude>().is_ok());
    }

    #[test]
    fn test_json_accepts_numbers_and_strings() {
        let from_number: Latitude = serde_json::from_str("12.3456789").unwrap();
        let from_string: Latitude = serde_json::from_str("\"12.3456789\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "12.3456789");
        assert!(serde_json::from_str::<Latitude>("91").is_err());
    }
}
