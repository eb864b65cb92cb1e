use crate::{
    data_types::{
        common::RouteId,
        route::{Coordinate, Route},
    },
    logln,
    util::geo::{CodecError, GeoUtils},
};

use super::snapshot::{RouteSnapshot, SnapshotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Saved,
    Cancelled,
    Deleted,
    /// The user navigated away; late responses are dropped.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Recalculating,
    Saving,
    Cancelling,
    Deleting,
    Terminated(Termination),
}

impl Phase {
    /// A network call is in flight; the matching actions should be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::Loading
                | Phase::Recalculating
                | Phase::Saving
                | Phase::Cancelling
                | Phase::Deleting
        )
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Phase::Terminated(_))
    }
}

/// Where the caller should go after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Preview(RouteId),
    RouteList,
}

/// The route being edited together with its rollback snapshot and drawable path.
#[derive(Debug)]
pub struct EditSession {
    current: Route,
    snapshot: SnapshotStore,
    decoded_path: Vec<Coordinate>,
    geometry_error: Option<CodecError>,
    geometry_dirty: bool,
}

impl EditSession {
    const CC: &'static str = "EditSession";

    pub fn start(mut route: Route) -> Self {
        route.assign_stop_ids();

        let mut snapshot = SnapshotStore::default();
        snapshot.capture(&route);

        let mut session = Self {
            current: route,
            snapshot,
            decoded_path: Vec::new(),
            geometry_error: None,
            geometry_dirty: false,
        };
        session.decode_geometry();

        session
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    pub fn snapshot(&self) -> Option<&RouteSnapshot> {
        self.snapshot.snapshot()
    }

    /// Path to draw. Empty when the polyline could not be decoded.
    pub fn decoded_path(&self) -> &[Coordinate] {
        &self.decoded_path
    }

    pub fn geometry_error(&self) -> Option<&CodecError> {
        self.geometry_error.as_ref()
    }

    /// True when the stop selection changed after the geometry was last computed, so
    /// the path and distance on screen describe a different itinerary.
    pub fn is_geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    pub(crate) fn current_mut(&mut self) -> &mut Route {
        &mut self.current
    }

    pub(crate) fn mark_geometry_dirty(&mut self) {
        self.geometry_dirty = true;
    }

    pub(crate) fn apply_geometry(&mut self, encoded_polyline: String, distance_km: f64) {
        self.current.encoded_polyline = encoded_polyline;
        self.current.distance_km = distance_km;
        self.geometry_dirty = false;
        self.decode_geometry();
    }

    /// Swaps the snapshot back in. Returns false when there was nothing to restore.
    pub(crate) fn revert_to_snapshot(&mut self) -> bool {
        match self.snapshot.restore() {
            Some(route) => {
                self.current = route;
                self.geometry_dirty = false;
                self.decode_geometry();
                true
            }
            None => false,
        }
    }

    fn decode_geometry(&mut self) {
        match GeoUtils::decode(&self.current.encoded_polyline) {
            Ok(path) => {
                self.decoded_path = path;
                self.geometry_error = None;
            }
            Err(e) => {
                logln!("Route {}: no path to draw, {}", self.current.id, e);
                self.decoded_path.clear();
                self.geometry_error = Some(e);
            }
        }
    }
}
