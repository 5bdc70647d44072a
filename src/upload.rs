//! HTTP upload of the encoded payload.

use anyhow::{Context as _, Result};

use crate::options::Options;
use crate::report::Report;

pub const DEFAULT_URL: &str = "https://coveralls.io/api/v1/jobs";

/// What came back from the endpoint. Any HTTP status is a completed upload;
/// only a transport failure is an error. Non-200 bodies are kept so callers
/// can inspect the service's diagnostics.
#[derive(Debug)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

impl UploadResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The transport context for one run: owns the HTTP agent (connection pool,
/// TLS state) and the endpoint URL. Dropping the client tears the stack
/// down on every exit path.
pub struct Client {
    agent: ureq::Agent,
    url: String,
}

impl Client {
    pub fn new(options: &Options) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("covpost/", env!("CARGO_PKG_VERSION")))
            .build();
        let url = options
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        Self { agent, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the report as a multipart body with a single `json` field.
    ///
    /// No retries: a failed upload is reported once and the run ends.
    pub fn upload(&self, report: &Report) -> Result<UploadResponse> {
        let json = report.to_json().context("Failed to encode payload")?;
        let (content_type, body) = encode_multipart(&json);

        match self
            .agent
            .post(&self.url)
            .set("Content-Type", &content_type)
            .send_bytes(&body)
        {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .context("Failed to read response body")?;
                Ok(UploadResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Ok(UploadResponse { status, body })
            }
            Err(e) => Err(e).context("Failed to reach the coverage endpoint"),
        }
    }
}

/// Encode the payload as multipart/form-data with one field named `json`.
/// Returns the Content-Type header value and the body bytes.
fn encode_multipart(json: &str) -> (String, Vec<u8>) {
    let boundary = pick_boundary(json);

    let mut body = Vec::with_capacity(json.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"json\"\r\n");
    body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
    body.extend_from_slice(json.as_bytes());
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (
        format!("multipart/form-data; boundary={}", boundary),
        body,
    )
}

/// The boundary must not occur anywhere in the payload text.
fn pick_boundary(payload: &str) -> String {
    let mut boundary = String::from("covpost-form-boundary");
    while payload.contains(&boundary) {
        boundary.push('x');
    }
    boundary
}
