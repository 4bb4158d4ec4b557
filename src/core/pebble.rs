//! Minimal Pebble client over its Unix socket.
//!
//! Only the endpoints the file bridge needs: `GET /v1/system-info` for the
//! connectivity check and `/v1/files` for reading and writing files.

use crate::core::container::{PushOptions, WorkloadFiles};
use crate::core::error::{CharmError, PebbleError};
use bytes::Bytes;
use futures::executor::block_on;
use multer::Multipart;
use reqwest::blocking::{Client, Response, multipart};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Requests go to the socket; the host only fills the request line.
const BASE_URL: &str = "http://localhost";

#[derive(Debug, Clone)]
pub struct PebbleClient {
    socket_path: PathBuf,
    timeout: Duration,
    http: OnceLock<Client>,
}

/// A response read to the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    fn read(resp: Response) -> Result<Self, PebbleError> {
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().map_err(transport)?.to_vec();
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "status-code", default)]
    status_code: Option<u16>,
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct FileResult {
    path: String,
    #[serde(default)]
    error: Option<ErrorResult>,
}

#[derive(Debug, Deserialize)]
struct ErrorResult {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub body: Vec<u8>,
}

impl PebbleClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
            http: OnceLock::new(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    fn http(&self) -> Result<&Client, PebbleError> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .unix_socket(self.socket_path.clone())
            .timeout(self.timeout)
            .no_proxy()
            .build()
            .map_err(transport)?;
        Ok(self.http.get_or_init(|| client))
    }

    pub fn system_info(&self) -> Result<Value, PebbleError> {
        let resp = self
            .http()?
            .get(endpoint("/v1/system-info")?)
            .send()
            .map_err(transport)?;
        let envelope = expect_sync(&Reply::read(resp)?)?;
        Ok(envelope.result)
    }

    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, PebbleError> {
        let resp = self
            .http()?
            .get(read_url(path)?)
            .header(ACCEPT, "multipart/form-data")
            .send()
            .map_err(transport)?;
        let reply = Reply::read(resp)?;
        if !reply.is_success() {
            return Err(api_error(&reply));
        }

        let content_type = reply.content_type.clone().unwrap_or_default();
        let Ok(boundary) = multer::parse_boundary(&content_type) else {
            // Pebble answers with a plain JSON envelope when it fails early.
            expect_sync(&reply)?;
            return Err(PebbleError::Protocol(format!(
                "expected multipart response, got '{}'",
                content_type
            )));
        };

        let parts = parse_multipart(reply.body, &boundary)?;
        let response = parts
            .iter()
            .find(|p| p.name == "response")
            .ok_or_else(|| PebbleError::Protocol("multipart response part missing".to_string()))?;
        let envelope: Envelope = serde_json::from_slice(&response.body)
            .map_err(|e| PebbleError::Protocol(format!("invalid response part: {}", e)))?;
        check_file_results(&envelope.result)?;

        parts
            .into_iter()
            .find(|p| p.name == "files" && p.filename.as_deref() == Some(path))
            .map(|p| p.body)
            .ok_or_else(|| PebbleError::Protocol(format!("no content returned for {}", path)))
    }

    pub fn write_file(
        &self,
        path: &str,
        content: &[u8],
        options: &PushOptions,
    ) -> Result<(), PebbleError> {
        let request = multipart::Part::text(write_request(path, options).to_string())
            .mime_str("application/json")
            .map_err(|e| PebbleError::Protocol(e.to_string()))?;
        let file = multipart::Part::bytes(content.to_vec())
            .file_name(path.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| PebbleError::Protocol(e.to_string()))?;
        let form = multipart::Form::new()
            .part("request", request)
            .part("files", file);

        let resp = self
            .http()?
            .post(endpoint("/v1/files")?)
            .multipart(form)
            .send()
            .map_err(transport)?;
        let envelope = expect_sync(&Reply::read(resp)?)?;
        check_file_results(&envelope.result)
    }
}

impl WorkloadFiles for PebbleClient {
    fn can_connect(&self) -> bool {
        match self.system_info() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("cannot connect to {}: {}", self.socket_path.display(), e);
                false
            }
        }
    }

    fn push(&self, path: &str, content: &[u8], options: &PushOptions) -> Result<(), CharmError> {
        Ok(self.write_file(path, content, options)?)
    }

    fn pull(&self, path: &str) -> Result<Vec<u8>, CharmError> {
        Ok(self.read_file(path)?)
    }
}

fn transport(e: reqwest::Error) -> PebbleError {
    PebbleError::Connection(io::Error::other(e))
}

fn endpoint(path: &str) -> Result<Url, PebbleError> {
    Url::parse(BASE_URL)
        .and_then(|base| base.join(path))
        .map_err(|e| PebbleError::Protocol(format!("bad endpoint {}: {}", path, e)))
}

pub(crate) fn read_url(path: &str) -> Result<Url, PebbleError> {
    let mut url = endpoint("/v1/files")?;
    url.query_pairs_mut()
        .append_pair("action", "read")
        .append_pair("path", path);
    Ok(url)
}

pub(crate) fn write_request(path: &str, options: &PushOptions) -> Value {
    let mut file = json!({ "path": path, "make-dirs": options.make_dirs });
    if let Some(perm) = options.permissions {
        file["permissions"] = Value::String(format!("{:03o}", perm));
    }
    json!({ "action": "write", "files": [file] })
}

fn expect_sync(reply: &Reply) -> Result<Envelope, PebbleError> {
    if !reply.is_success() {
        return Err(api_error(reply));
    }
    let envelope: Envelope = serde_json::from_slice(&reply.body)
        .map_err(|e| PebbleError::Protocol(format!("invalid JSON response: {}", e)))?;
    if envelope.kind == "error" {
        return Err(envelope_error(
            envelope.status_code.unwrap_or(reply.status),
            &envelope.result,
        ));
    }
    Ok(envelope)
}

fn api_error(reply: &Reply) -> PebbleError {
    match serde_json::from_slice::<Envelope>(&reply.body) {
        Ok(envelope) => envelope_error(reply.status, &envelope.result),
        Err(_) => PebbleError::Api {
            status_code: reply.status,
            kind: String::new(),
            message: String::from_utf8_lossy(&reply.body).trim().to_string(),
        },
    }
}

fn envelope_error(status_code: u16, result: &Value) -> PebbleError {
    let field = |name: &str| {
        result
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    PebbleError::Api {
        status_code,
        kind: field("kind"),
        message: field("message"),
    }
}

fn check_file_results(result: &Value) -> Result<(), PebbleError> {
    let results: Vec<FileResult> = serde_json::from_value(result.clone())
        .map_err(|e| PebbleError::Protocol(format!("invalid file results: {}", e)))?;
    for r in results {
        if let Some(err) = r.error {
            return Err(PebbleError::Path {
                path: r.path,
                kind: err.kind,
                message: err.message,
            });
        }
    }
    Ok(())
}

fn malformed(e: multer::Error) -> PebbleError {
    PebbleError::Protocol(format!("malformed multipart response: {}", e))
}

pub(crate) fn parse_multipart(body: Vec<u8>, boundary: &str) -> Result<Vec<Part>, PebbleError> {
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(Bytes::from(body)) });
    let mut multipart = Multipart::new(stream, boundary);
    block_on(async move {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field.file_name().map(str::to_string);
            let body = field.bytes().await.map_err(malformed)?.to_vec();
            parts.push(Part {
                name,
                filename,
                body,
            });
        }
        Ok::<_, PebbleError>(parts)
    })
}
