use std::sync::Arc;

use data_types::{api::GenerateRequest, common::RouteId};
use editor::{
    controller::{self, RouteDraftController},
    preview::RoutePreview,
    session::Navigation,
    Confirmation, EditorError,
};
use route_service::{api::RouteApi, RouteService, ServiceError};
use util::config::{ConfigError, ServiceConfig};

pub mod data_types;
pub mod editor;
pub mod route_service;
pub mod util;

/// Entry point for the trip back-office: opens route editors and previews against the
/// configured route service.
pub struct App {
    config: ServiceConfig,
    service: Arc<dyn RouteService>,
}

impl App {
    const CC: &'static str = "App";

    pub fn new(config: ServiceConfig) -> Self {
        let service = Arc::new(RouteApi::new(&config));
        App::with_service(config, service)
    }

    /// Uses `route_service.toml` from the working directory.
    pub fn from_current_dir() -> Result<Self, ConfigError> {
        Ok(App::new(ServiceConfig::from_current_dir()?))
    }

    pub fn with_service(config: ServiceConfig, service: Arc<dyn RouteService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// A controller for `route_id`, still to be loaded.
    pub fn route_editor(&self, route_id: RouteId) -> RouteDraftController {
        RouteDraftController::new(self.service.clone(), route_id, self.config.editor.clone())
    }

    /// Opens and loads an editor. The controller is returned even when loading failed so
    /// that the caller can show the error and retry.
    pub async fn open_route_editor(&self, route_id: RouteId) -> RouteDraftController {
        let editor = self.route_editor(route_id);

        if let Err(e) = editor.load().await {
            logln!("Editor for route {} did not open: {}", route_id, e);
        }

        editor
    }

    pub async fn preview_route(&self, route_id: RouteId) -> Result<RoutePreview, EditorError> {
        RoutePreview::fetch(self.service.as_ref(), route_id).await
    }

    /// Asks the route service for a new draft between two places, with candidate stops
    /// roughly every `interval_km`.
    pub async fn generate_route(
        &self,
        from: &str,
        to: &str,
        interval_km: u32,
    ) -> Result<RouteId, ServiceError> {
        logln!("Generating route {} -> {} every {} km", from, to, interval_km);

        self.service
            .generate(GenerateRequest {
                from: from.to_string(),
                to: to.to_string(),
                interval_km,
            })
            .await
    }

    pub async fn delete_route(
        &self,
        route_id: RouteId,
        confirmation: &dyn Confirmation,
    ) -> Result<Navigation, EditorError> {
        controller::delete_route(self.service.as_ref(), route_id, confirmation).await
    }
}
