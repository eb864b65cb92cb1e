use crate::data_types::route::Route;

/// Immutable deep copy of a route as it was last loaded from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSnapshot {
    route: Route,
}

impl RouteSnapshot {
    pub fn capture(route: &Route) -> Self {
        Self {
            route: route.clone(),
        }
    }

    /// Fresh copy of the captured route; editing it never reaches the snapshot.
    pub fn restore(&self) -> Route {
        self.route.clone()
    }

    pub fn route(&self) -> &Route {
        &self.route
    }
}

/// Holds at most one snapshot per edit session.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Option<RouteSnapshot>,
}

impl SnapshotStore {
    pub fn capture(&mut self, route: &Route) -> &RouteSnapshot {
        self.snapshot.insert(RouteSnapshot::capture(route))
    }

    pub fn restore(&self) -> Option<Route> {
        self.snapshot.as_ref().map(RouteSnapshot::restore)
    }

    pub fn snapshot(&self) -> Option<&RouteSnapshot> {
        self.snapshot.as_ref()
    }
}
