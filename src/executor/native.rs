//! Native HTTP client using reqwest.
//!
//! Only available with the `native` feature.

use crate::executor::client::{HttpCall, HttpClient};
use crate::executor::config::ExecutionConfig;
use crate::executor::error::RequestError;
use crate::models::{HttpMethod, HttpResponse};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    default_headers: HashMap<String, String>,
}

impl ReqwestClient {
    /// Builds a client from the given execution settings.
    pub fn new(config: &ExecutionConfig) -> Result<Self, RequestError> {
        let redirect_policy = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects as usize)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .redirect(redirect_policy)
            .danger_accept_invalid_certs(!config.validate_ssl)
            .build()
            .map_err(|e| RequestError::BuildError(e.to_string()))?;

        Ok(Self {
            client,
            default_headers: config.default_headers.clone(),
        })
    }

    /// Builds a client from the global configuration.
    pub fn from_global_config() -> Result<Self, RequestError> {
        Self::new(&ExecutionConfig::from_global_config())
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn call(&self, call: &HttpCall) -> Result<HttpResponse, RequestError> {
        let url = url::Url::parse(&call.url)?;
        let mut req_builder = self.client.request(to_reqwest_method(call.method), url);

        for (name, value) in &self.default_headers {
            if call.header(name).is_none() {
                req_builder = req_builder.header(name, value);
            }
        }

        for (name, value) in &call.headers {
            req_builder = req_builder.header(name, value);
        }

        if let Some(body) = &call.body {
            req_builder = req_builder.body(body.clone());
        }

        debug!("{} {}", call.method, call.url);
        let response = req_builder.send().await?;

        let status_code = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.as_str().to_string(), value_str.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status_code,
            status_text,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::PATCH => reqwest::Method::PATCH,
    }
}
