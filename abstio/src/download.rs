use std::time::Duration;

use anyhow::{Context, Result};

use abstutil::prettyprint_usize;

/// POSTs `body` to `url` as `text/plain` and returns the response body. Non-2xx responses are
/// errors. The whole exchange, including reading the body, must finish within `timeout`. This must
/// be called with a tokio runtime somewhere.
pub async fn post_text<I: AsRef<str>>(url: I, body: String, timeout: Duration) -> Result<Vec<u8>> {
    let url = url.as_ref();
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;
    let mut resp = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body(body)
        .send()
        .await
        .with_context(|| format!("sending request to {}", url))?;
    resp.error_for_status_ref()
        .with_context(|| format!("downloading {}", url))?;

    let total_size = resp.content_length().map(|x| x as usize);
    let mut bytes = Vec::new();
    while let Some(chunk) = resp
        .chunk()
        .await
        .with_context(|| format!("reading response from {}", url))?
    {
        bytes.extend_from_slice(&chunk);
        if let Some(n) = total_size {
            debug!(
                "{:.2}% ({} / {} bytes)",
                (bytes.len() as f64) / (n as f64) * 100.0,
                prettyprint_usize(bytes.len()),
                prettyprint_usize(n)
            );
        }
    }
    info!("Got {} bytes from {}", prettyprint_usize(bytes.len()), url);
    Ok(bytes)
}
