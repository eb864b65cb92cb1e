use std::f64::consts::PI;

use crate::data_types::route::Coordinate;

/// Encoded polylines exchanged with the route service use five decimal digits.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const POLYLINE_PRECISION: u32 = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed polyline: {0}")]
    MalformedPolyline(String),

    #[error("Coordinate cannot be encoded: {0}")]
    InvalidCoordinate(String),
}

pub struct GeoUtils;

impl GeoUtils {
    /// Decodes an encoded polyline into its ordered coordinates.
    ///
    /// A failure here only means there is no path to draw; the route's stops and
    /// metadata stay usable.
    pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, CodecError> {
        GeoUtils::validate_encoding(encoded)?;

        let line_string = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
            .map_err(|e| CodecError::MalformedPolyline(e.to_string()))?;

        Ok(line_string.coords().map(|c| Coordinate::from(*c)).collect())
    }

    pub fn encode(path: &[Coordinate]) -> Result<String, CodecError> {
        if let Some(bad) = path.iter().find(|c| !c.is_valid()) {
            return Err(CodecError::InvalidCoordinate(format!(
                "({}, {}) is out of range",
                bad.latitude, bad.longitude
            )));
        }

        polyline::encode_coordinates(
            path.iter().map(|c| geo_types::Coord::<f64>::from(*c)),
            POLYLINE_PRECISION,
        )
        .map_err(|e| CodecError::InvalidCoordinate(e.to_string()))
    }

    // Every character must be in the printable range the algorithm emits, the last chunk
    // must be terminated and values come in (lat, lng) pairs.
    fn validate_encoding(encoded: &str) -> Result<(), CodecError> {
        let mut values = 0;
        let mut open_chunk = false;

        for (pos, byte) in encoded.bytes().enumerate() {
            if !(63..=126).contains(&byte) {
                return Err(CodecError::MalformedPolyline(format!(
                    "invalid character {:?} at offset {}",
                    byte as char, pos
                )));
            }

            if (byte - 63) & 0x20 == 0 {
                values += 1;
                open_chunk = false;
            } else {
                open_chunk = true;
            }
        }

        if open_chunk {
            return Err(CodecError::MalformedPolyline(
                "input ends in the middle of a value".to_string(),
            ));
        }

        if values % 2 != 0 {
            return Err(CodecError::MalformedPolyline(format!(
                "{} values cannot form coordinate pairs",
                values
            )));
        }

        Ok(())
    }

    /// Great-circle distance in kilometers (haversine, exact zero for identical points).
    pub fn distance(p1: Coordinate, p2: Coordinate) -> f64 {
        let phi1 = GeoUtils::deg2rad(p1.latitude);
        let phi2 = GeoUtils::deg2rad(p2.latitude);
        let half_dphi = GeoUtils::deg2rad(p2.latitude - p1.latitude) / 2.0;
        let half_dlambda = GeoUtils::deg2rad(p2.longitude - p1.longitude) / 2.0;

        let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);

        // Rounding can push antipodal points just above 1.0
        2.0 * h.clamp(0.0, 1.0).sqrt().asin() * EARTH_RADIUS_KM
    }

    pub fn path_length(path: &[Coordinate]) -> f64 {
        path.windows(2)
            .map(|leg| GeoUtils::distance(leg[0], leg[1]))
            .sum()
    }

    pub fn deg2rad(deg: f64) -> f64 {
        deg * PI / 180.0
    }

    pub fn rad2deg(rad: f64) -> f64 {
        rad * 180.0 / PI
    }

    /// South-west and north-east corners of the path, or `None` for an empty path.
    pub fn get_bounding_box(path: &[Coordinate]) -> Option<(Coordinate, Coordinate)> {
        let first = path.first()?;

        let mut min = *first;
        let mut max = *first;

        path.iter().for_each(|coord| {
            min.latitude = coord.latitude.min(min.latitude);
            min.longitude = coord.longitude.min(min.longitude);

            max.latitude = coord.latitude.max(max.latitude);
            max.longitude = coord.longitude.max(max.longitude);
        });

        Some((min, max))
    }

    pub fn get_center_of_bbox(south_west: Coordinate, north_east: Coordinate) -> Coordinate {
        Coordinate::new(
            (south_west.latitude + north_east.latitude) / 2.,
            (south_west.longitude + north_east.longitude) / 2.,
        )
    }
}
