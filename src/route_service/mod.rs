use futures_util::future::BoxFuture;

use crate::data_types::{
    api::{GenerateRequest, RecalculationResult},
    common::RouteId,
    route::Route,
};

pub mod api;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Could not reach the route service: {0}")]
    Transport(String),

    /// `message` is the server's own text, shown to the user as is.
    #[error("{message}")]
    Status { code: u32, message: String },

    #[error("Route {0} was not found")]
    NotFound(RouteId),

    #[error("Unexpected response from the route service: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Json(e.to_string())
    }
}

/// The remote route generation and storage service.
///
/// Every method is one network round trip. Implementations must not retry on their own:
/// the editor decides what a failure means for the session.
pub trait RouteService: Send + Sync {
    /// `GET /route/{id}`
    fn get_route(&self, id: RouteId) -> BoxFuture<'_, Result<Route, ServiceError>>;

    /// `PUT /route/{id}` with the full route as body.
    fn put_route(&self, route: Route) -> BoxFuture<'_, Result<(), ServiceError>>;

    /// `POST /route/{id}/recalculate`, recomputed from the persisted stop selection.
    fn recalculate(&self, id: RouteId) -> BoxFuture<'_, Result<RecalculationResult, ServiceError>>;

    /// `DELETE /route/{id}`
    fn delete_route(&self, id: RouteId) -> BoxFuture<'_, Result<(), ServiceError>>;

    /// `POST /route/generate?from&to&interval`, creates a new draft with its candidate stops.
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<RouteId, ServiceError>>;
}
