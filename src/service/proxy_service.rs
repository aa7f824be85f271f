use bareminimum_shared::normalize;
use serde_json::json;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{Endpoint, ProxyReply, UpstreamForm, UpstreamResponse};
use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct ProxyService {
    upstream: UpstreamClient,
}

impl ProxyService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Forwards a validated form upstream and normalizes a successful JSON
    /// answer into the canonical shape for the endpoint.
    ///
    /// Error statuses and non-JSON bodies pass through untouched. A 2xx JSON
    /// body that cannot be classified becomes a 502 carrying the original
    /// payload.
    pub async fn dispatch(
        &self,
        endpoint: Endpoint,
        form: UpstreamForm,
        cookie: Option<&str>,
    ) -> ProxyReply {
        let request_id = Uuid::new_v4();
        let span = info_span!("proxy", %request_id, endpoint = endpoint.path());

        async move {
            for field in form.describe() {
                debug!("form field {field}");
            }

            let UpstreamResponse {
                status,
                body,
                is_json,
                cookies,
            } = self.upstream.forward(endpoint, &form, cookie).await;
            info!("upstream status {status}");

            let route = match endpoint.route() {
                Some(route) if is_json && (200..300).contains(&status) => route,
                _ => return ProxyReply { status, body, cookies },
            };

            match normalize(&body, route) {
                Ok(normalized) => match serde_json::to_value(&normalized) {
                    Ok(canonical) => ProxyReply {
                        status,
                        body: canonical,
                        cookies,
                    },
                    Err(e) => {
                        error!("Failed to serialize normalized payload: {e}");
                        ProxyReply {
                            status: 500,
                            body: json!({ "detail": format!("Failed to serialize response: {e}") }),
                            cookies,
                        }
                    }
                },
                Err(e) => {
                    warn!("Unusable upstream payload ({e}): {body}");
                    ProxyReply {
                        status: 502,
                        body: json!({ "detail": e.to_string(), "payload": body }),
                        cookies,
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
