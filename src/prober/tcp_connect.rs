use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tokio::time::Duration;
use tracing::debug;

use super::ProbeOutcome;
use crate::util::within;

pub async fn probe_tcp(addr: &str, deadline: Option<Duration>) -> Result<ProbeOutcome> {
    let conn = within(deadline, TcpStream::connect(addr))
        .await
        .with_context(|| format!("dial tcp {}", addr))
        .context("connection failed")?;
    debug!("connected {:?} -> {:?}", conn.local_addr(), conn.peer_addr());
    drop(conn);
    Ok(ProbeOutcome::Connected)
}
