// Helpers shared by the probers: address joining, resolution, deadlines.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Result, anyhow};

/// Join host and port the way a dialer expects them. IPv6 literals get brackets.
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        return format!("[{}]:{}", host, port);
    }
    format!("{}:{}", host, port)
}

/// Await `fut`, giving up once `limit` has passed. `None` waits forever.
pub async fn within<F, T>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(anyhow!("i/o timeout")),
        },
        None => Ok(fut.await?),
    }
}

pub async fn resolve_addrs(addr: &str) -> std::io::Result<Vec<SocketAddr>> {
    // Literal addresses skip the resolver
    if let Ok(sock) = addr.parse::<SocketAddr>() {
        return Ok(vec![sock]);
    }

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(addr).await?.collect();
    if addrs.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no addresses found for {}", addr),
        ));
    }
    Ok(addrs)
}

/// Wildcard local address in the same family as `peer`.
pub fn unspecified_for(peer: &SocketAddr) -> SocketAddr {
    let ip: IpAddr = match peer {
        SocketAddr::V4(_) => IpAddr::from([0u8; 4]),
        SocketAddr::V6(_) => IpAddr::from([0u16; 8]),
    };
    SocketAddr::new(ip, 0)
}
