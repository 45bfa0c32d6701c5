//! `reqwest` transports.

use crate::backend::Backend;
use crate::effect::{Async, Blocking};
use crate::request::Part;
use crate::{Body, HttpClientConfig, HttpClientError, Request, Response, Result};
use futures::future::{BoxFuture, FutureExt};
use std::time::Duration;
use tracing::trace;

/// Async transport over `reqwest::Client`.
///
/// Sends one request per call and never follows redirects.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestBackend {
    /// Build a transport from the client configuration.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    async fn execute(
        client: reqwest::Client,
        request: Request,
        timeout: Duration,
    ) -> Result<Response> {
        let mut builder = client
            .request(request.method().clone(), request.uri().clone())
            .headers(request.headers().clone())
            .timeout(timeout);

        builder = match request.body() {
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes.clone()),
            Body::Stream(source) => builder.body(reqwest::Body::wrap_stream(source.open())),
            Body::Multipart(parts) => builder.multipart(async_form(parts)?),
        };

        let response = builder.send().await.map_err(|e| map_error(e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(|e| map_error(e, timeout))?;

        trace!(status = %status, bytes = body.len(), "reqwest exchange complete");
        Ok(Response::new(status, headers, body, url))
    }
}

impl Backend<Async> for ReqwestBackend {
    fn send(&self, request: Request) -> BoxFuture<'static, Result<Response>> {
        let client = self.client.clone();
        let timeout = request.options().timeout.unwrap_or(self.timeout);
        Self::execute(client, request, timeout).boxed()
    }
}

fn async_form(parts: &[Part]) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        let mut field = reqwest::multipart::Part::bytes(part.data.to_vec());
        if let Some(file_name) = &part.file_name {
            field = field.file_name(file_name.clone());
        }
        if let Some(content_type) = &part.content_type {
            field = field.mime_str(content_type)?;
        }
        form = form.part(part.name.clone(), field);
    }
    Ok(form)
}

/// Blocking transport over `reqwest::blocking::Client`.
///
/// Like the blocking reqwest client itself, it must not be built or used on
/// an async runtime thread.
#[derive(Debug, Clone)]
pub struct BlockingReqwestBackend {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl BlockingReqwestBackend {
    /// Build a transport from the client configuration.
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.client
    }
}

impl Backend<Blocking> for BlockingReqwestBackend {
    fn send(&self, request: Request) -> Result<Response> {
        let timeout = request.options().timeout.unwrap_or(self.timeout);
        let mut builder = self
            .client
            .request(request.method().clone(), request.uri().clone())
            .headers(request.headers().clone())
            .timeout(timeout);

        builder = match request.body() {
            Body::Empty => builder,
            Body::Bytes(bytes) => builder.body(bytes.to_vec()),
            Body::Stream(source) => {
                let mut buffered = Vec::new();
                for chunk in futures::executor::block_on_stream(source.open()) {
                    buffered.extend_from_slice(&chunk?);
                }
                builder.body(buffered)
            }
            Body::Multipart(parts) => builder.multipart(blocking_form(parts)?),
        };

        let response = builder.send().map_err(|e| map_error(e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().map_err(|e| map_error(e, timeout))?;

        trace!(status = %status, bytes = body.len(), "reqwest exchange complete");
        Ok(Response::new(status, headers, body, url))
    }
}

fn blocking_form(parts: &[Part]) -> Result<reqwest::blocking::multipart::Form> {
    let mut form = reqwest::blocking::multipart::Form::new();
    for part in parts {
        let mut field = reqwest::blocking::multipart::Part::bytes(part.data.to_vec());
        if let Some(file_name) = &part.file_name {
            field = field.file_name(file_name.clone());
        }
        if let Some(content_type) = &part.content_type {
            field = field.mime_str(content_type)?;
        }
        form = form.part(part.name.clone(), field);
    }
    Ok(form)
}

fn map_error(error: reqwest::Error, timeout: Duration) -> HttpClientError {
    if error.is_timeout() {
        HttpClientError::Timeout(timeout)
    } else if error.is_connect() {
        HttpClientError::Connection(error.to_string())
    } else {
        HttpClientError::Http(error)
    }
}
