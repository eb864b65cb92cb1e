use crate::data_types::{
    common::StopId,
    route::{Route, Stop},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Stop index {index} is out of range, the route has {len} stops")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No stop {0:?} on this route")]
    UnknownStop(StopId),
}

/// An active stop with its position in the itinerary, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItineraryEntry<'a> {
    pub number: usize,
    pub stop: &'a Stop,
}

impl Route {
    /// Gives every stop an id matching its current position. Called once per load so
    /// that later operations don't depend on list positions.
    pub fn assign_stop_ids(&mut self) {
        self.stops
            .iter_mut()
            .enumerate()
            .for_each(|(ordinal, stop)| stop.id = StopId(ordinal as u32));
    }

    pub fn stop_index(&self, id: StopId) -> Option<usize> {
        self.stops.iter().position(|stop| stop.id == id)
    }

    /// Sets the selection flag of the stop at `index`. Returns whether anything changed.
    pub fn toggle(&mut self, index: usize, selected: bool) -> Result<bool, SelectionError> {
        let len = self.stops.len();
        let stop = self
            .stops
            .get_mut(index)
            .ok_or(SelectionError::IndexOutOfRange { index, len })?;

        let changed = stop.is_selected != selected;
        stop.is_selected = selected;

        Ok(changed)
    }

    pub fn toggle_stop(&mut self, id: StopId, selected: bool) -> Result<bool, SelectionError> {
        let index = self
            .stop_index(id)
            .ok_or(SelectionError::UnknownStop(id))?;

        self.toggle(index, selected)
    }

    /// Stops on the itinerary, in route order.
    pub fn active_stops(&self) -> Vec<&Stop> {
        self.stops.iter().filter(|stop| stop.is_selected).collect()
    }

    /// Candidate alternatives, in route order.
    pub fn backup_stops(&self) -> Vec<&Stop> {
        self.stops.iter().filter(|stop| !stop.is_selected).collect()
    }

    pub fn itinerary(&self) -> Vec<ItineraryEntry<'_>> {
        self.active_stops()
            .into_iter()
            .enumerate()
            .map(|(position, stop)| ItineraryEntry {
                number: position + 1,
                stop,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::route::Coordinate;

    fn route_with_stops(count: usize) -> Route {
        let mut route = Route {
            id: 5,
            name: "Coast".to_string(),
            stops: (0..count)
                .map(|i| Stop {
                    name: format!("Stop {}", i),
                    address: format!("{} Harbour Road", i),
                    coordinate: Coordinate::new(43.0 + i as f64 * 0.1, 5.0),
                    is_selected: true,
                    rating: 4.0,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        route.assign_stop_ids();
        route
    }

    fn names(stops: &[&Stop]) -> Vec<String> {
        stops.iter().map(|stop| stop.name.clone()).collect()
    }

    #[test]
    fn deselecting_one_stop_renumbers_the_itinerary() {
        let mut route = route_with_stops(5);

        assert!(route.toggle(2, false).unwrap());

        assert_eq!(route.active_stops().len(), 4);
        assert_eq!(names(&route.backup_stops()), vec!["Stop 2"]);

        let itinerary = route.itinerary();
        let numbering: Vec<(usize, &str)> = itinerary
            .iter()
            .map(|entry| (entry.number, entry.stop.name.as_str()))
            .collect();
        assert_eq!(
            numbering,
            vec![(1, "Stop 0"), (2, "Stop 1"), (3, "Stop 3"), (4, "Stop 4")]
        );
    }

    #[test]
    fn toggling_keeps_order_and_geometry() {
        let mut route = route_with_stops(4);
        route.encoded_polyline = "_p~iF~ps|U".to_string();
        let before: Vec<String> = route.stops.iter().map(|s| s.name.clone()).collect();

        route.toggle(1, false).unwrap();
        route.toggle(3, false).unwrap();
        route.toggle(1, true).unwrap();

        let after: Vec<String> = route.stops.iter().map(|s| s.name.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(route.encoded_polyline, "_p~iF~ps|U");
        assert_eq!(names(&route.backup_stops()), vec!["Stop 3"]);
    }

    #[test]
    fn setting_the_same_value_reports_no_change() {
        let mut route = route_with_stops(2);
        assert!(!route.toggle(0, true).unwrap());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut route = route_with_stops(3);
        assert_eq!(
            route.toggle(3, false),
            Err(SelectionError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(route.active_stops().len(), 3);
    }

    #[test]
    fn stop_ids_survive_reordering() {
        let mut route = route_with_stops(4);
        route.stops.reverse();

        route.toggle_stop(StopId(1), false).unwrap();

        assert_eq!(names(&route.backup_stops()), vec!["Stop 1"]);
        assert_eq!(
            route.toggle_stop(StopId(9), false),
            Err(SelectionError::UnknownStop(StopId(9)))
        );
    }

    #[test]
    fn views_always_partition_the_stops() {
        let mut route = route_with_stops(7);
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;

        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let index = (seed >> 33) as usize % route.stops.len();
            let selected = (seed >> 13) & 1 == 1;
            route.toggle(index, selected).unwrap();

            let active = route.active_stops();
            let backup = route.backup_stops();
            assert_eq!(active.len() + backup.len(), route.stops.len());

            for stop in &route.stops {
                let in_active = active.iter().filter(|s| s.id == stop.id).count();
                let in_backup = backup.iter().filter(|s| s.id == stop.id).count();
                assert_eq!(in_active + in_backup, 1);
            }
        }
    }
}
