use super::*;

use gloo_net::http::Request;
use web_sys::RequestCredentials;

/// `fetch` transport for the activation client.
pub(super) struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn post_json(&self, request: JsonRequest) -> Result<JsonReply, TransportError> {
        let mut builder = Request::post(&request.url).header("content-type", "application/json");
        if let Some(token) = request.bearer.as_deref() {
            builder = builder.header("authorization", &format!("Bearer {token}"));
        }
        if request.with_credentials {
            builder = builder.credentials(RequestCredentials::Include);
        }

        let response = builder
            .body(request.body)
            .map_err(|error| TransportError::Request(error.to_string()))?
            .send()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError::Body(error.to_string()))?;
        debug!(status, url = %request.url, "admin api replied");
        Ok(JsonReply { status, body })
    }
}
