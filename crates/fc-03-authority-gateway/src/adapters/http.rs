//! HTTP adapter for the authority's web service.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use shared_types::GatewayFault;
use tracing::debug;

use crate::error::GatewayResult;
use crate::ports::inbound::AuthorityApi;
use crate::wire::{
    AnnulmentRequest, DocumentResponse, FaultEnvelope, InvoiceEnvelope, InvoiceQuery,
    InvoiceStatusReport, IssueCodeRequest, IssuedCode, SubmissionOutcome,
};

/// HTTP gateway configuration.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL of the authority's service.
    pub base_url: String,
    /// Per-request timeout. The authority is a third party with
    /// unpredictable latency; a request never waits past this.
    pub request_timeout: Duration,
}

/// Gateway over HTTPS with JSON bodies.
pub struct HttpAuthorityGateway {
    client: Client,
    config: HttpGatewayConfig,
}

impl HttpAuthorityGateway {
    pub fn new(config: HttpGatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayFault::ServiceUnavailable {
                reason: format!("client build: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "Dispatching authority request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let http_status = response.status();
        if http_status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayFault::ProtocolFault {
                    fault_code: None,
                    message: format!("unparseable response body: {e}"),
                });
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error_body(http_status.as_u16(), &body))
    }
}

/// Transport failures are `ServiceUnavailable`; a body that arrived but
/// would not decode is the authority speaking garbage, a `ProtocolFault`.
fn map_transport_error(error: reqwest::Error) -> GatewayFault {
    if error.is_decode() {
        GatewayFault::ProtocolFault {
            fault_code: None,
            message: error.to_string(),
        }
    } else {
        GatewayFault::ServiceUnavailable {
            reason: error.to_string(),
        }
    }
}

/// Classify a non-2xx response: 5xx means the authority itself is down,
/// 4xx carries an application fault envelope.
fn classify_error_body(http_status: u16, body: &str) -> GatewayFault {
    if http_status >= 500 {
        return GatewayFault::ServiceUnavailable {
            reason: format!("authority returned HTTP {http_status}"),
        };
    }

    match serde_json::from_str::<FaultEnvelope>(body) {
        Ok(fault) if !fault.message.is_empty() || fault.fault_code.is_some() => {
            GatewayFault::ProtocolFault {
                fault_code: fault.fault_code,
                message: fault.message,
            }
        }
        _ => GatewayFault::ProtocolFault {
            fault_code: None,
            message: format!("HTTP {http_status}: {body}"),
        },
    }
}

fn into_outcome(response: DocumentResponse) -> GatewayResult<SubmissionOutcome> {
    let status = crate::wire::AuthorityStatus::from_code(response.status_code)?;
    Ok(SubmissionOutcome {
        status,
        reception_code: response.reception_code,
        rejection_reasons: response.rejection_reasons,
    })
}

fn into_report(response: DocumentResponse) -> GatewayResult<InvoiceStatusReport> {
    let status = crate::wire::AuthorityStatus::from_code(response.status_code)?;
    Ok(InvoiceStatusReport {
        status,
        reception_code: response.reception_code,
        rejection_reasons: response.rejection_reasons,
    })
}

#[async_trait::async_trait]
impl AuthorityApi for HttpAuthorityGateway {
    async fn issue_code(&self, request: IssueCodeRequest) -> GatewayResult<IssuedCode> {
        self.post("codes/issuance", &request).await
    }

    async fn submit_invoice(&self, envelope: InvoiceEnvelope) -> GatewayResult<SubmissionOutcome> {
        let response: DocumentResponse = self.post("documents/reception", &envelope).await?;
        into_outcome(response)
    }

    async fn query_invoice(&self, query: InvoiceQuery) -> GatewayResult<InvoiceStatusReport> {
        let response: DocumentResponse = self.post("documents/query", &query).await?;
        into_report(response)
    }

    async fn annul_invoice(&self, request: AnnulmentRequest) -> GatewayResult<InvoiceStatusReport> {
        let response: DocumentResponse = self.post("documents/annulment", &request).await?;
        into_report(response)
    }
}
