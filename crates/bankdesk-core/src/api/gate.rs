//! The authenticated request gate.
//!
//! Every call to a protected endpoint goes through [`RequestGate`], which reads
//! the access token from the credential store at send time and attaches it as
//! a bearer header. The gate only reports failures. It never retries, never
//! refreshes, never redirects, and never writes to the store.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::{CredentialStore, Session};

use super::ApiError;

#[derive(Clone)]
pub struct RequestGate {
    client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl RequestGate {
    /// Create a gate sharing `client`'s connection pool
    pub fn new(client: Client, base_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the current access token. Without one the request goes out bare
    /// and the backend is left to reject it.
    fn authorize(&self, request: RequestBuilder, path: &str) -> RequestBuilder {
        match Session::current(self.store.as_ref()) {
            Session::Authenticated(token) => request.bearer_auth(token.as_str()),
            Session::Unauthenticated => {
                debug!(path = path, "No access token stored, sending without Authorization");
                request
            }
        }
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = self.authorize(request, path).send().await?;
        debug!(path = path, status = %response.status(), "Protected call completed");
        check_response(response).await
    }

    /// GET a protected endpoint and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path)), path).await?;
        read_json(response, path).await
    }

    /// POST a JSON body to a protected endpoint and decode the JSON reply
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.client.post(self.url(path)).json(body);
        let response = self.send(request, path).await?;
        read_json(response, path).await
    }

    /// GET a protected endpoint whose body carries nothing the client needs
    pub async fn get_unit(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.client.get(self.url(path)), path).await?;
        Ok(())
    }
}

/// Turn a non-success status into an error carrying the (truncated) body.
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    path: &str,
) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
    })
}
