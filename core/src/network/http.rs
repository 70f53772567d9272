use std::net::Ipv4Addr;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, SERVER};
use seekr_common::analysis::HttpInfo;
use seekr_common::error::HttpError;

/// Sends one plaintext `GET /` and records the status line and the
/// `Server` and `Content-Type` headers.
pub async fn probe_http(ip: Ipv4Addr, port: u16, probe_timeout: Duration) -> Result<HttpInfo, HttpError> {
    let client = reqwest::Client::builder()
        .timeout(probe_timeout)
        .no_proxy()
        .build()
        .map_err(|e| HttpError::new(format!("cannot build HTTP client: {e}")))?;

    let url = format!("http://{ip}:{port}/");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| HttpError::new(describe(&url, &e)))?;

    Ok(HttpInfo {
        status_code: response.status().as_u16(),
        server_header: header_value(response.headers(), SERVER),
        content_type: header_value(response.headers(), CONTENT_TYPE),
    })
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn describe(url: &str, e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("GET {url} timed out")
    } else if e.is_connect() {
        format!("GET {url} could not connect")
    } else {
        format!("GET {url} failed: {e}")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
