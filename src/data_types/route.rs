use serde_derive::{Deserialize, Serialize};

use super::common::{Identifiable, RouteId, StopId};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

// geo-types (and the polyline crate) use x = longitude, y = latitude
impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo_types::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Coordinate::new(c.y, c.x)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(skip)]
    pub id: StopId,

    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub is_selected: bool,

    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub duration_days: u32,
    pub season: String,
    pub distance_km: f64,
    pub encoded_polyline: String,

    #[serde(default)]
    pub stops: Vec<Stop>,

    #[serde(default)]
    pub is_draft: bool,
}

impl Identifiable for Route {
    fn route_id(&self) -> RouteId {
        self.id
    }
}
