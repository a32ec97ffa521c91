use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::Duration;
use tracing::debug;

use super::ProbeOutcome;
use crate::util::{resolve_addrs, unspecified_for, within};

/// UDP has no handshake: this only proves the name resolves and a local
/// socket can be associated with the peer. Nothing is sent.
pub async fn probe_udp(addr: &str, deadline: Option<Duration>) -> Result<ProbeOutcome> {
    let local = within(deadline, associate(addr))
        .await
        .with_context(|| format!("dial udp {}", addr))
        .context("connection failed")?;
    debug!("udp socket bound to {}", local);
    Ok(ProbeOutcome::SocketCreated { local })
}

async fn associate(addr: &str) -> std::io::Result<SocketAddr> {
    let peers = resolve_addrs(addr).await?;
    debug!("{} resolved to {:?}", addr, peers);

    let mut last_err = None;
    for peer in peers {
        let attempt = async {
            let socket = UdpSocket::bind(unspecified_for(&peer)).await?;
            socket.connect(peer).await?;
            socket.local_addr()
        };
        match attempt.await {
            Ok(local) => return Ok(local),
            Err(e) => {
                debug!("udp associate with {} failed: {}", peer, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| std::io::Error::other("no usable address")))
}
