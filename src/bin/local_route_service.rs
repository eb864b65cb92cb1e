//! In-memory stand-in for the route generation and storage service, for working on the
//! editor without the real backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use itinerary_drafts::{
    data_types::{
        api::{ErrorBody, GeneratedRoute, RecalculationResult},
        common::RouteId,
        route::{Coordinate, Route, Stop},
    },
    logln, logvbln,
    util::geo::GeoUtils,
};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Request, Response, State};

#[macro_use]
extern crate rocket;

type ApiError = (Status, Json<ErrorBody>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: Status, message: String) -> ApiError {
    (status, Json(ErrorBody { message }))
}

fn not_found(id: RouteId) -> ApiError {
    api_error(Status::NotFound, format!("Route {} does not exist", id))
}

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-Origin-Resource-Sharing Fairing",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, PUT, DELETE, OPTIONS, GET",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[derive(Default)]
struct RouteStore {
    routes: Mutex<HashMap<RouteId, Route>>,
    last_id: Mutex<RouteId>,
}

impl RouteStore {
    const CC: &'static str = "LocalRouteService";

    fn routes(&self) -> MutexGuard<'_, HashMap<RouteId, Route>> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, id: RouteId) -> Option<Route> {
        self.routes().get(&id).cloned()
    }

    fn replace(&self, id: RouteId, mut route: Route) -> bool {
        let mut routes = self.routes();

        match routes.get_mut(&id) {
            Some(stored) => {
                route.id = id;
                logvbln!(
                    "Route {} stored with {} active stops",
                    id,
                    route.active_stops().len()
                );
                *stored = route;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: RouteId) -> bool {
        let removed = self.routes().remove(&id).is_some();
        if removed {
            logln!("Route {} deleted", id);
        }

        removed
    }

    // Straight legs between the active stops, in stop order.
    fn recalculate(&self, id: RouteId) -> Option<Result<RecalculationResult, String>> {
        let route = self.get(id)?;
        let path: Vec<Coordinate> = route
            .active_stops()
            .iter()
            .map(|stop| stop.coordinate)
            .collect();

        Some(
            GeoUtils::encode(&path)
                .map(|encoded_polyline| RecalculationResult {
                    encoded_polyline,
                    distance_km: GeoUtils::path_length(&path),
                })
                .map_err(|e| e.to_string()),
        )
    }

    fn generate(&self, from: Coordinate, to: Coordinate, interval_km: u32) -> RouteId {
        let total_km = GeoUtils::distance(from, to);
        let legs = ((total_km / interval_km as f64).floor() as usize).max(1);

        // Every other intermediate candidate starts out as a backup
        let stops: Vec<Stop> = (0..=legs)
            .map(|i| {
                let t = i as f64 / legs as f64;
                let coordinate = Coordinate::new(
                    from.latitude + (to.latitude - from.latitude) * t,
                    from.longitude + (to.longitude - from.longitude) * t,
                );

                Stop {
                    name: format!("Stop {}", i + 1),
                    address: format!("{:.5}, {:.5}", coordinate.latitude, coordinate.longitude),
                    coordinate,
                    is_selected: i == legs || i % 2 == 0,
                    rating: 3.0 + (i % 5) as f64 * 0.5,
                    ..Default::default()
                }
            })
            .collect();

        let id = {
            let mut last_id = self.last_id.lock().unwrap_or_else(PoisonError::into_inner);
            *last_id += 1;
            *last_id
        };

        let mut route = Route {
            id,
            name: format!("Draft route {}", id),
            duration_days: 1,
            season: String::new(),
            stops,
            is_draft: true,
            ..Default::default()
        };

        let active: Vec<Coordinate> = route.active_stops().iter().map(|s| s.coordinate).collect();
        route.encoded_polyline = GeoUtils::encode(&active).unwrap_or_default();
        route.distance_km = GeoUtils::path_length(&active);

        logln!(
            "Generated route {}: {:.1} km, {} candidate stops",
            id,
            total_km,
            route.stops.len()
        );
        self.routes().insert(id, route);

        id
    }
}

fn parse_place(place: &str) -> Option<Coordinate> {
    let (lat, lng) = place.split_once(',')?;
    let coordinate = Coordinate::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?);

    coordinate.is_valid().then_some(coordinate)
}

#[options("/<_..>")]
fn all_options() {
    /* Intentionally left empty */
}

#[get("/route/<id>")]
fn get_route(id: RouteId, store: &State<RouteStore>) -> ApiResult<Route> {
    store.get(id).map(Json).ok_or_else(|| not_found(id))
}

#[put("/route/<id>", data = "<route>")]
fn put_route(id: RouteId, route: Json<Route>, store: &State<RouteStore>) -> Result<Status, ApiError> {
    if store.replace(id, route.into_inner()) {
        Ok(Status::Ok)
    } else {
        Err(not_found(id))
    }
}

#[post("/route/<id>/recalculate")]
fn recalculate(id: RouteId, store: &State<RouteStore>) -> ApiResult<RecalculationResult> {
    match store.recalculate(id) {
        Some(Ok(result)) => Ok(Json(result)),
        Some(Err(message)) => Err(api_error(Status::UnprocessableEntity, message)),
        None => Err(not_found(id)),
    }
}

#[delete("/route/<id>")]
fn delete_route(id: RouteId, store: &State<RouteStore>) -> Result<Status, ApiError> {
    if store.remove(id) {
        Ok(Status::Ok)
    } else {
        Err(not_found(id))
    }
}

#[post("/route/generate?<from>&<to>&<interval>")]
fn generate(
    from: &str,
    to: &str,
    interval: u32,
    store: &State<RouteStore>,
) -> ApiResult<GeneratedRoute> {
    let (Some(from), Some(to)) = (parse_place(from), parse_place(to)) else {
        return Err(api_error(
            Status::BadRequest,
            "from and to must be \"lat,lon\" pairs".to_string(),
        ));
    };

    if interval == 0 {
        return Err(api_error(
            Status::BadRequest,
            "interval must be at least 1 km".to_string(),
        ));
    }

    Ok(Json(GeneratedRoute {
        route_id: store.generate(from, to, interval),
    }))
}

#[launch]
fn rocket() -> _ {
    rocket::build()
        .manage(RouteStore::default())
        .attach(Cors)
        .mount(
            "/",
            routes![
                get_route,
                put_route,
                recalculate,
                delete_route,
                generate,
                all_options
            ],
        )
}
