#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt};
use itinerary_drafts::{
    data_types::{
        api::{GenerateRequest, RecalculationResult},
        common::{RouteId, StopId},
        route::{Coordinate, Route, Stop},
    },
    route_service::{RouteService, ServiceError},
    util::geo::GeoUtils,
};
use tokio::sync::Notify;

pub const ROUTE_ID: RouteId = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Put,
    Recalculate,
    Delete,
    Generate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started(Op),
    Finished(Op),
}

/// In-memory route service recording every call, with injectable failures and latches
/// that keep a call in flight until released.
#[derive(Default)]
pub struct FakeRouteService {
    routes: Mutex<HashMap<RouteId, Route>>,
    events: Mutex<Vec<Event>>,
    put_payloads: Mutex<Vec<serde_json::Value>>,
    failures: Mutex<HashMap<Op, Vec<ServiceError>>>,
    holds: Mutex<HashMap<Op, Arc<Notify>>>,
    recalculation: Mutex<RecalculationResult>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

impl FakeRouteService {
    pub fn with_route(route: Route) -> Arc<Self> {
        let service = FakeRouteService::default();
        locked(&service.routes).insert(route.id, route);
        Arc::new(service)
    }

    /// Serves `route` under `id`, whatever id its body carries.
    pub fn with_route_at(id: RouteId, route: Route) -> Arc<Self> {
        let service = FakeRouteService::default();
        locked(&service.routes).insert(id, route);
        Arc::new(service)
    }

    pub fn stored(&self, id: RouteId) -> Option<Route> {
        locked(&self.routes).get(&id).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        locked(&self.events).clone()
    }

    pub fn started(&self, op: Op) -> bool {
        self.events().contains(&Event::Started(op))
    }

    pub fn count(&self, op: Op) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == Event::Started(op))
            .count()
    }

    pub fn put_payloads(&self) -> Vec<serde_json::Value> {
        locked(&self.put_payloads).clone()
    }

    pub fn fail_next(&self, op: Op, error: ServiceError) {
        locked(&self.failures).entry(op).or_default().push(error);
    }

    pub fn set_recalculation(&self, encoded_polyline: &str, distance_km: f64) {
        *locked(&self.recalculation) = RecalculationResult {
            encoded_polyline: encoded_polyline.to_string(),
            distance_km,
        };
    }

    /// The next `op` waits until the returned latch is notified.
    pub fn hold(&self, op: Op) -> Arc<Notify> {
        let latch = Arc::new(Notify::new());
        locked(&self.holds).insert(op, latch.clone());
        latch
    }

    async fn enter(&self, op: Op) -> Result<(), ServiceError> {
        locked(&self.events).push(Event::Started(op));

        // give other futures on the same task a chance to interleave
        tokio::task::yield_now().await;

        let latch = locked(&self.holds).remove(&op);
        if let Some(latch) = latch {
            latch.notified().await;
        }

        let failure = locked(&self.failures)
            .get_mut(&op)
            .and_then(|queue| (!queue.is_empty()).then(|| queue.remove(0)));

        locked(&self.events).push(Event::Finished(op));

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl RouteService for FakeRouteService {
    fn get_route(&self, id: RouteId) -> BoxFuture<'_, Result<Route, ServiceError>> {
        async move {
            self.enter(Op::Get).await?;
            self.stored(id).ok_or(ServiceError::NotFound(id))
        }
        .boxed()
    }

    fn put_route(&self, route: Route) -> BoxFuture<'_, Result<(), ServiceError>> {
        async move {
            self.enter(Op::Put).await?;

            locked(&self.put_payloads).push(serde_json::to_value(&route)?);

            // stop ids never leave the client
            let mut persisted = route;
            persisted
                .stops
                .iter_mut()
                .for_each(|stop| stop.id = StopId::default());
            locked(&self.routes).insert(persisted.id, persisted);
            Ok(())
        }
        .boxed()
    }

    fn recalculate(&self, id: RouteId) -> BoxFuture<'_, Result<RecalculationResult, ServiceError>> {
        async move {
            self.enter(Op::Recalculate).await?;
            if self.stored(id).is_none() {
                return Err(ServiceError::NotFound(id));
            }

            Ok(locked(&self.recalculation).clone())
        }
        .boxed()
    }

    fn delete_route(&self, id: RouteId) -> BoxFuture<'_, Result<(), ServiceError>> {
        async move {
            self.enter(Op::Delete).await?;
            locked(&self.routes)
                .remove(&id)
                .map(|_| ())
                .ok_or(ServiceError::NotFound(id))
        }
        .boxed()
    }

    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<RouteId, ServiceError>> {
        async move {
            self.enter(Op::Generate).await?;

            let mut routes = locked(&self.routes);
            let id = routes.keys().max().copied().unwrap_or(0) + 1;
            let mut route = sample_route(id, 3);
            route.name = format!("{} to {}", request.from, request.to);
            routes.insert(id, route);

            Ok(id)
        }
        .boxed()
    }
}

/// A draft with `stops` selected stops heading east, and a polyline through all of them.
pub fn sample_route(id: RouteId, stops: usize) -> Route {
    let stops: Vec<Stop> = (0..stops)
        .map(|i| Stop {
            name: format!("Stop {}", i),
            address: format!("{} Via Roma", i + 1),
            coordinate: Coordinate::new(45.0, 7.0 + i as f64 * 0.5),
            is_selected: true,
            rating: 4.0,
            ..Default::default()
        })
        .collect();

    let path: Vec<Coordinate> = stops.iter().map(|stop| stop.coordinate).collect();

    Route {
        id,
        name: "Alpine loop".to_string(),
        duration_days: 5,
        season: "summer".to_string(),
        distance_km: GeoUtils::path_length(&path),
        encoded_polyline: GeoUtils::encode(&path).unwrap(),
        stops,
        is_draft: true,
    }
}
