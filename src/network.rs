//! Thin facade over HTTP GET and FTP LIST/RETR.
//!
//! Cache-oblivious: callers wrap their own adapter function with the cache
//! decorator (`crate::cache`); this module never touches the cache. Every
//! request carries a version-identification header, mirroring
//! `original_source/tests/unit/test_user_agent.py`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use suppaftp::AsyncFtpStream;

pub const USER_AGENT: &str = concat!("meteostat-rs/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client build");
        Self { client }
    }

    /// HTTP GET. Transport errors propagate to the caller (the adapter
    /// decides retry vs skip); a non-2xx response is returned as a normal
    /// `HttpResponse` so the adapter can distinguish "empty body" from
    /// "error status".
    ///
    /// Network calls time out after `DEFAULT_TIMEOUT`; on timeout this
    /// returns `Ok(None)` rather than an error, so one slow provider never
    /// blocks the others from contributing.
    pub async fn get(&self, url: &str) -> reqwest::Result<Option<HttpResponse>> {
        match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await?;
                Ok(Some(HttpResponse { status, body }))
            }
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn get_bytes(&self, url: &str) -> reqwest::Result<Option<(StatusCode, Vec<u8>)>> {
        match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let bytes = resp.bytes().await?;
                Ok(Some((status, bytes.to_vec())))
            }
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Fetch a single file from an anonymous FTP server (used by the DWD bulk
/// archive provider). Returns `None` on any transport/protocol failure —
/// the adapter treats that the same as "no data for this path".
pub async fn ftp_retr(host: &str, path: &str) -> Option<Vec<u8>> {
    let mut stream = AsyncFtpStream::connect((host, 21)).await.ok()?;
    stream.login("anonymous", "anonymous@").await.ok()?;
    let mut cursor = stream.retr_as_buffer(path).await.ok()?;
    use std::io::Read;
    let mut buf = Vec::new();
    cursor.read_to_end(&mut buf).ok()?;
    let _ = stream.quit().await;
    Some(buf)
}

/// List directory entries on an anonymous FTP server (used to discover
/// which yearly archives exist for a station).
pub async fn ftp_list(host: &str, dir: &str) -> Option<Vec<String>> {
    let mut stream = AsyncFtpStream::connect((host, 21)).await.ok()?;
    stream.login("anonymous", "anonymous@").await.ok()?;
    let entries = stream.list(Some(dir)).await.ok()?;
    let _ = stream.quit().await;
    Some(entries)
}
