use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::models::{Endpoint, FormPart, UpstreamForm, UpstreamResponse};

pub const CONNECT_ERROR_DETAIL: &str = "Error connecting to backend API";

/// Client for the external service that does the actual chat and
/// summarization work. It moves bytes and never interprets payloads.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Posts `form` to `endpoint`, forwarding the browser's cookie header.
    ///
    /// Never fails: transport errors come back as a 500 envelope of
    /// `{ detail, error }`.
    pub async fn forward(
        &self,
        endpoint: Endpoint,
        form: &UpstreamForm,
        cookie: Option<&str>,
    ) -> UpstreamResponse {
        match self.send(endpoint, form, cookie).await {
            Ok(response) => response,
            Err(e) => {
                error!("Upstream call to {} failed: {e}", self.url(endpoint));
                UpstreamResponse {
                    status: 500,
                    body: json!({ "detail": CONNECT_ERROR_DETAIL, "error": e.to_string() }),
                    is_json: false,
                    cookies: Vec::new(),
                }
            }
        }
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        form: &UpstreamForm,
        cookie: Option<&str>,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let mut request = self.http.post(self.url(endpoint)).multipart(to_multipart(form)?);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        debug!("Upstream {} responded with status {status}", endpoint.path());

        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let body = if is_json {
            let data = response.json::<Value>().await?;
            debug!("Upstream response data: {data}");
            data
        } else {
            let text = response.text().await?;
            debug!("Upstream non-JSON response: {text}");
            json!({ "detail": text })
        };

        Ok(UpstreamResponse {
            status,
            body,
            is_json,
            cookies,
        })
    }
}

fn to_multipart(form: &UpstreamForm) -> Result<Form, reqwest::Error> {
    let mut multipart = Form::new();
    for part in form.parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name.clone(), value.clone()),
            FormPart::File { name, file } => {
                let mut body = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(content_type) = &file.content_type {
                    body = body.mime_str(content_type)?;
                }
                multipart.part(name.clone(), body)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests;
