// CyberQ HTTP client
//
// Wraps `reqwest::Client` with the controller's fixed endpoint set: two XML
// documents for reads and three settings pages that accept form POSTs.
// Every call is bounded as a whole by the transport timeout, so a poll that
// needs two documents still finishes inside it. Retries and scheduling
// belong to the coordinator.

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::payload::{RawPayload, form_values};
use crate::transport::{DeviceTransport, TransportConfig};

const STATUS_XML: &str = "status.xml";
const CONFIG_XML: &str = "config.xml";

/// Settings page a writable field is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Index,
    Control,
    System,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Self::Index => "index.htm",
            Self::Control => "control.htm",
            Self::System => "system.htm",
        }
    }
}

/// A single-field write, already encoded for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub page: Page,
    /// Form key, e.g. `COOK_SET`.
    pub key: String,
    /// Form value as submitted, e.g. `225`.
    pub value: String,
    /// What the device should echo back for `key` in the returned page.
    /// Setpoints echo in tenths of a degree, so this can differ from `value`.
    pub expected_echo: Option<String>,
}

impl WriteRequest {
    pub fn new(page: Page, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            page,
            key: key.into(),
            expected_echo: Some(value.clone()),
            value,
        }
    }

    pub fn with_expected_echo(mut self, echo: Option<String>) -> Self {
        self.expected_echo = echo;
        self
    }
}

/// HTTP client for one CyberQ WiFi controller.
#[derive(Debug, Clone)]
pub struct CyberqClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    timeout_ms: u64,
}

impl CyberqClient {
    /// Create a client for `http://{host}:{port}/`.
    pub fn new(host: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}:{port}/"))?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and explicit base URL.
    pub fn with_client(http: reqwest::Client, base_url: Url, transport: &TransportConfig) -> Self {
        Self {
            http,
            base_url,
            timeout: transport.timeout,
            timeout_ms: transport.timeout_ms(),
        }
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_text(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e, url.as_str(), self.timeout_ms))?;

        self.read_body(resp, &url).await
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e, url.as_str(), self.timeout_ms))?;

        self.read_body(resp, &url).await
    }

    async fn read_documents(&self) -> Result<RawPayload, Error> {
        let config = self.get_text(CONFIG_XML).await?;
        let mut payload = RawPayload::from_xml(&config)?;

        let status = self.get_text(STATUS_XML).await?;
        payload.merge_xml(&status)?;
        Ok(payload)
    }

    async fn read_body(&self, resp: reqwest::Response, url: &Url) -> Result<String, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text()
            .await
            .map_err(|e| Error::from_reqwest(&e, url.as_str(), self.timeout_ms))
    }
}

impl DeviceTransport for CyberqClient {
    /// Read `config.xml` then `status.xml`; status values win on collision.
    /// Both reads share one timeout.
    async fn fetch(&self) -> Result<RawPayload, Error> {
        let payload = tokio::time::timeout(self.timeout, self.read_documents())
            .await
            .map_err(|_| Error::TimedOut {
                url: self.base_url.to_string(),
                timeout_ms: self.timeout_ms,
            })??;

        debug!(fields = payload.len(), "fetched device state");
        Ok(payload)
    }

    async fn write(&self, request: &WriteRequest) -> Result<(), Error> {
        debug!(
            page = request.page.path(),
            key = %request.key,
            value = %request.value,
            "writing field"
        );

        let body = self
            .post_form(request.page.path(), &[(request.key.as_str(), request.value.as_str())])
            .await?;

        let Some(expected) = request.expected_echo.as_deref() else {
            return Ok(());
        };

        let echoed = form_values(&body);
        match echoed.get(&request.key) {
            Some(actual) if !echo_matches(expected, actual) => {
                warn!(key = %request.key, expected, actual = %actual, "device did not accept write");
                Err(Error::Rejected {
                    key: request.key.clone(),
                    requested: request.value.clone(),
                    echoed: actual.clone(),
                })
            }
            Some(_) => Ok(()),
            None => {
                debug!(key = %request.key, "no echo for written field");
                Ok(())
            }
        }
    }
}

/// Compare an echoed form value with the expected one.
///
/// Numbers are compared by value since the firmware is free to pad them.
fn echo_matches(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.trim(), actual.trim());
    if expected == actual {
        return true;
    }
    match (expected.parse::<f64>(), actual.parse::<f64>()) {
        (Ok(e), Ok(a)) => (e - a).abs() < f64::EPSILON,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn echo_compares_numbers_by_value() {
        assert!(echo_matches("15", "15"));
        assert!(echo_matches("15", "015"));
        assert!(echo_matches("2250", " 2250 "));
        assert!(!echo_matches("15", "10"));
        assert!(!echo_matches("Brisket", "Pork"));
    }

    #[test]
    fn page_paths() {
        assert_eq!(Page::Index.path(), "index.htm");
        assert_eq!(Page::Control.path(), "control.htm");
        assert_eq!(Page::System.path(), "system.htm");
    }

    #[test]
    fn base_url_includes_port() {
        let client = CyberqClient::new("192.168.1.50", 8080, &TransportConfig::default()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://192.168.1.50:8080/");
        assert_eq!(
            client.url(STATUS_XML).unwrap().as_str(),
            "http://192.168.1.50:8080/status.xml"
        );
    }
}
