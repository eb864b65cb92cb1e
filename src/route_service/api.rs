use std::fmt::Display;

use curl::easy::{Easy, List};
use futures_util::future::{BoxFuture, FutureExt};

use crate::{
    data_types::{
        api::{ErrorBody, GenerateRequest, GeneratedRoute, RecalculationResult},
        common::{Identifiable, RouteId},
        route::Route,
    },
    logln, logvbln,
    util::config::ServiceConfig,
};

use super::{RouteService, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };

        write!(f, "{}", name)
    }
}

struct Request {
    method: Method,
    url: String,
    bearer: Option<String>,
    body: Option<Vec<u8>>,
    route_id: Option<RouteId>,
}

impl From<curl::Error> for ServiceError {
    fn from(e: curl::Error) -> Self {
        ServiceError::Transport(e.to_string())
    }
}

/// HTTP client for the route service, built on blocking curl transfers that run on
/// tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct RouteApi {
    base_url: String,
    access_token: Option<String>,
}

impl RouteApi {
    const CC: &'static str = "RouteApi";

    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn route_url(&self, id: RouteId) -> String {
        format!("{}route/{}", self.base_url, id)
    }

    fn request(&self, method: Method, url: String) -> Request {
        Request {
            method,
            url,
            bearer: self.access_token.clone(),
            body: None,
            route_id: None,
        }
    }

    fn perform(request: &Request) -> Result<(u32, Vec<u8>), curl::Error> {
        let mut handle = Easy::new();
        let mut list = List::new();

        list.append("Accept: application/json")?;
        if let Some(bearer) = &request.bearer {
            list.append(&format!("Authorization: Bearer {}", bearer))?;
        }

        match request.method {
            Method::Get => handle.get(true)?,
            Method::Post => handle.post(true)?,
            Method::Put => handle.custom_request("PUT")?,
            Method::Delete => handle.custom_request("DELETE")?,
        }

        if let Some(body) = &request.body {
            list.append("Content-Type: application/json")?;
            handle.post_fields_copy(body)?;
        } else if request.method == Method::Post {
            handle.post_field_size(0)?;
        }

        handle.http_headers(list)?;
        handle.url(&request.url)?;

        let mut buffer_response = Vec::new();
        {
            let mut transfer = handle.transfer();

            transfer.write_function(|data| {
                buffer_response.extend_from_slice(data);
                Ok(data.len())
            })?;

            transfer.perform()?;
        }

        Ok((handle.response_code()?, buffer_response))
    }

    fn verify_if_error(
        code: u32,
        body: Vec<u8>,
        route_id: Option<RouteId>,
    ) -> Result<Vec<u8>, ServiceError> {
        if code < 400 {
            return Ok(body);
        }

        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|error_body| error_body.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());

        match (code, route_id) {
            (404, Some(id)) if message.is_empty() => Err(ServiceError::NotFound(id)),
            _ if message.is_empty() => Err(ServiceError::Status {
                code,
                message: format!("The route service answered with HTTP {}", code),
            }),
            _ => Err(ServiceError::Status { code, message }),
        }
    }

    async fn execute(&self, request: Request) -> Result<Vec<u8>, ServiceError> {
        logvbln!("{} {}", request.method, request.url);

        let method = request.method;
        let url = request.url.clone();
        let route_id = request.route_id;

        let (code, body) = tokio::task::spawn_blocking(move || RouteApi::perform(&request))
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))??;

        let result = RouteApi::verify_if_error(code, body, route_id);
        if let Err(e) = &result {
            logln!("{} {} failed: {}", method, url, e);
        }

        result
    }
}

impl RouteService for RouteApi {
    fn get_route(&self, id: RouteId) -> BoxFuture<'_, Result<Route, ServiceError>> {
        async move {
            let mut request = self.request(Method::Get, self.route_url(id));
            request.route_id = Some(id);

            let body = self.execute(request).await?;
            Ok(serde_json::from_slice(&body)?)
        }
        .boxed()
    }

    fn put_route(&self, route: Route) -> BoxFuture<'_, Result<(), ServiceError>> {
        async move {
            let id = route.route_id();
            let mut request = self.request(Method::Put, self.route_url(id));
            request.route_id = Some(id);
            request.body = Some(serde_json::to_vec(&route)?);

            self.execute(request).await.map(|_| ())
        }
        .boxed()
    }

    fn recalculate(&self, id: RouteId) -> BoxFuture<'_, Result<RecalculationResult, ServiceError>> {
        async move {
            let mut request =
                self.request(Method::Post, format!("{}/recalculate", self.route_url(id)));
            request.route_id = Some(id);

            let body = self.execute(request).await?;
            Ok(serde_json::from_slice(&body)?)
        }
        .boxed()
    }

    fn delete_route(&self, id: RouteId) -> BoxFuture<'_, Result<(), ServiceError>> {
        async move {
            let mut request = self.request(Method::Delete, self.route_url(id));
            request.route_id = Some(id);

            self.execute(request).await.map(|_| ())
        }
        .boxed()
    }

    fn generate(&self, generate: GenerateRequest) -> BoxFuture<'_, Result<RouteId, ServiceError>> {
        async move {
            let url = {
                let mut encoder = Easy::new();
                format!(
                    "{}route/generate?from={}&to={}&interval={}",
                    self.base_url,
                    encoder.url_encode(generate.from.as_bytes()),
                    encoder.url_encode(generate.to.as_bytes()),
                    generate.interval_km
                )
            };

            let body = self.execute(self.request(Method::Post, url)).await?;
            let generated: GeneratedRoute = serde_json::from_slice(&body)?;

            logln!("Generated draft route {}", generated.route_id);
            Ok(generated.route_id)
        }
        .boxed()
    }
}
