//! Request helpers shared by the clients.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Send `request`, turning any non-2xx response into [`Error::Status`].
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        tracing::debug!(url = %response.url(), %status, "Request failed");
        return Err(Error::from_status(status));
    }
    Ok(response)
}

/// Read the body of `response` and decode it as `T`. Shape errors surface as
/// [`Error::Json`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response, what: &'static str) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| Error::Json { what, source })
}
