use anyhow::{Context, Result};
use reqwest::Client;
use tokio::time::Duration;
use tracing::debug;

use super::ProbeOutcome;

/// HEAD request against `addr`. Any response counts, whatever its status.
pub async fn probe_http(
    addr: &str,
    tls: bool,
    verify: bool,
    deadline: Option<Duration>,
) -> Result<ProbeOutcome> {
    let url = format!("{}://{}", if tls { "https" } else { "http" }, addr);

    let mut builder = Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(!verify);
    if let Some(limit) = deadline {
        builder = builder.timeout(limit);
    }
    let client = builder.build().context("failed to create request")?;

    let req = client
        .head(&url)
        .build()
        .context("failed to create request")?;
    debug!("HEAD {}", req.url());

    let resp = client.execute(req).await.context("connection failed")?;
    // hyper only records the phrase when it differs from the canonical one
    let reason = match resp.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => resp.status().canonical_reason().unwrap_or_default().to_string(),
    };
    let outcome = ProbeOutcome::Response {
        version: resp.version(),
        status: resp.status(),
        reason,
    };
    drop(resp);
    Ok(outcome)
}
