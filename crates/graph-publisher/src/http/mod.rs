mod basic_ext;
mod json_ext;
mod payload;

use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use reqwest_middleware::RequestBuilder;

pub use payload::ApiPayload;

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt;
    pub(crate) use super::json_ext::RequestBuilderJsonExt;
}

pub type Client = reqwest_middleware::ClientWithMiddleware;

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
);

/// Creates an HTTP client shared by all the API clients of this crate.
/// It never retries requests.
pub fn create_client() -> Result<Client> {
    let client = reqwest::Client::builder()
        .build()
        .fatal_ctx(|| "Failed to build the HTTP client")?;

    let client = reqwest_middleware::ClientBuilder::new(client)
        .with(ObservingMiddleware)
        .with_init(|request_builder: RequestBuilder| {
            // XXX: reddit responds with 429 to requests without a custom user agent
            request_builder.header(reqwest::header::USER_AGENT, USER_AGENT)
        })
        .build();

    Ok(client)
}

struct ObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for ObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut task_local_extensions::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        // Don't put the whole URL into the span, the query may contain access tokens
        let span = info_span!(
            "request",
            version = ?request.version(),
            method = %request.method(),
            host = request.url().host_str().unwrap_or("{unknown}"),
            path = request.url().path(),
        );

        observe_request(request, extensions, next)
            .instrument(span)
            .await
    }
}

async fn observe_request(
    request: reqwest::Request,
    extensions: &mut task_local_extensions::Extensions,
    next: reqwest_middleware::Next<'_>,
) -> reqwest_middleware::Result<reqwest::Response> {
    let method = request.method().to_string();
    let host = request.url().host_str().unwrap_or("{unknown}").to_owned();

    let (result, duration) = next.run(request, extensions).with_duration().await;

    let status = match &result {
        Ok(response) => response.status().as_u16().to_string(),
        Err(_) => "{fatal}".to_owned(),
    };

    metrics::histogram!(
        "http_request_duration_seconds",
        duration,
        "method" => method,
        "host" => host,
        "status" => status
    );

    let duration = tracing_duration(duration);

    let response = match &result {
        Ok(response) => response,
        Err(err) => {
            error!(duration, err = tracing_err(err), "Network request failed");
            return result;
        }
    };

    let status = response.status();

    if status.is_success() {
        info!(duration, %status, "Network request succeeded");
    } else {
        warn!(duration, %status, "Network request failed (error status)");
    }

    result
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest::Error },

    #[error("HTTP request has failed (HTTP status code: {status}):\n{body}")]
    BadResponseStatusCode {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Received an unexpected response JSON object")]
    UnexpectedResponseJsonShape { source: serde_json::Error },
}
