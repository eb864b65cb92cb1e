use crate::{
    data_types::{
        common::RouteId,
        route::{Coordinate, Route},
    },
    route_service::RouteService,
    util::geo::{CodecError, GeoUtils},
};

use super::{selection::ItineraryEntry, EditorError};

/// Read-only view of a persisted route, shown after saving or cancelling.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePreview {
    route: Route,
    path: Vec<Coordinate>,
    geometry_error: Option<CodecError>,
}

impl RoutePreview {
    pub async fn fetch(service: &dyn RouteService, id: RouteId) -> Result<Self, EditorError> {
        let route = service
            .get_route(id)
            .await
            .map_err(EditorError::LoadFailed)?;

        Ok(RoutePreview::from_route(route))
    }

    pub fn from_route(mut route: Route) -> Self {
        route.assign_stop_ids();

        let (path, geometry_error) = match GeoUtils::decode(&route.encoded_polyline) {
            Ok(path) => (path, None),
            Err(e) => (Vec::new(), Some(e)),
        };

        Self {
            route,
            path,
            geometry_error,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    pub fn geometry_error(&self) -> Option<&CodecError> {
        self.geometry_error.as_ref()
    }

    pub fn itinerary(&self) -> Vec<ItineraryEntry<'_>> {
        self.route.itinerary()
    }

    /// Map framing: the path's bounding box, or the active stops' when there is no path.
    pub fn bounds(&self) -> Option<(Coordinate, Coordinate)> {
        if !self.path.is_empty() {
            return GeoUtils::get_bounding_box(&self.path);
        }

        let stops: Vec<Coordinate> = self
            .route
            .active_stops()
            .iter()
            .map(|stop| stop.coordinate)
            .collect();
        GeoUtils::get_bounding_box(&stops)
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.bounds()
            .map(|(south_west, north_east)| GeoUtils::get_center_of_bbox(south_west, north_east))
    }
}
