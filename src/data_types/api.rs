use serde_derive::{Deserialize, Serialize};

use super::common::RouteId;

/// Body of `POST /route/{id}/recalculate`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationResult {
    pub encoded_polyline: String,
    pub distance_km: f64,
}

/// Body of `POST /route/generate`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRoute {
    pub route_id: RouteId,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub from: String,
    pub to: String,
    pub interval_km: u32,
}
