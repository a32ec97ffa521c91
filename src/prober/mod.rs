use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ProbeConfig;

pub mod http;
pub mod tcp_connect;
pub mod udp;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnType {
    Tcp,
    Udp,
    Http,
    Https,
}

impl ConnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnType::Tcp => "tcp",
            ConnType::Udp => "udp",
            ConnType::Http => "http",
            ConnType::Https => "https",
        }
    }
}

impl fmt::Display for ConnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownConnType;

impl FromStr for ConnType {
    type Err = UnknownConnType;

    // Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(ConnType::Tcp),
            "udp" => Ok(ConnType::Udp),
            "http" => Ok(ConnType::Http),
            "https" => Ok(ConnType::Https),
            _ => Err(UnknownConnType),
        }
    }
}

/// What a successful probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected,
    SocketCreated { local: SocketAddr },
    Response {
        version: reqwest::Version,
        status: reqwest::StatusCode,
        /// Reason phrase as sent by the server.
        reason: String,
    },
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Connected => write!(f, "connection successful"),
            ProbeOutcome::SocketCreated { .. } => write!(f, "socket creation successful"),
            ProbeOutcome::Response {
                version,
                status,
                reason,
            } => {
                write!(f, "connection successful: {:?} {}", version, status.as_str())?;
                if !reason.is_empty() {
                    write!(f, " {}", reason)?;
                }
                Ok(())
            }
        }
    }
}

/// Run the single probe selected by `config.conn_type`.
pub async fn run(config: &ProbeConfig) -> Result<ProbeOutcome> {
    let addr = config.address();
    let deadline = config.deadline();
    debug!("probe deadline: {:?}", deadline);

    let start = Instant::now();
    let outcome = match config.conn_type {
        ConnType::Tcp => tcp_connect::probe_tcp(&addr, deadline).await?,
        ConnType::Udp => udp::probe_udp(&addr, deadline).await?,
        ConnType::Http => http::probe_http(&addr, false, config.https_verify, deadline).await?,
        ConnType::Https => http::probe_http(&addr, true, config.https_verify, deadline).await?,
    };

    info!(
        "{} probe {} success in {:?}",
        config.conn_type,
        addr,
        start.elapsed()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn parses_known_types_only() {
        assert_eq!("tcp".parse::<ConnType>(), Ok(ConnType::Tcp));
        assert_eq!("https".parse::<ConnType>(), Ok(ConnType::Https));
        assert!("ftp".parse::<ConnType>().is_err());
        assert!("TCP".parse::<ConnType>().is_err());
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(ProbeOutcome::Connected.to_string(), "connection successful");
        let resp = ProbeOutcome::Response {
            version: reqwest::Version::HTTP_11,
            status: reqwest::StatusCode::NOT_FOUND,
            reason: "Not Found".into(),
        };
        assert_eq!(resp.to_string(), "connection successful: HTTP/1.1 404 Not Found");

        let bare = ProbeOutcome::Response {
            version: reqwest::Version::HTTP_11,
            status: reqwest::StatusCode::from_u16(599).unwrap(),
            reason: String::new(),
        };
        assert_eq!(bare.to_string(), "connection successful: HTTP/1.1 599");
    }

    #[tokio::test]
    async fn dispatches_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ProbeConfig {
            dest_host: "127.0.0.1".into(),
            dest_port: port.to_string(),
            ..ProbeConfig::default()
        };
        assert_eq!(run(&config).await.unwrap(), ProbeOutcome::Connected);
    }

    #[tokio::test]
    async fn dispatches_udp() {
        let config = ProbeConfig {
            conn_type: ConnType::Udp,
            dest_host: "127.0.0.1".into(),
            dest_port: "9".into(),
            ..ProbeConfig::default()
        };
        let outcome = run(&config).await.unwrap();
        assert_eq!(outcome.to_string(), "socket creation successful");
    }

    fn https_config(port: u16, verify: Option<&str>) -> ProbeConfig {
        let port = port.to_string();
        ProbeConfig::from_lookup(|key| match key {
            "CONN_TYPE" => Some("https".to_string()),
            "DEST_HOST" => Some("127.0.0.1".to_string()),
            "DEST_PORT" => Some(port.clone()),
            "HTTPS_VERIFY" => verify.map(str::to_string),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn https_verifies_by_default() {
        let addr = http::tests::serve_self_signed();
        let config = https_config(addr.port(), None);
        assert_eq!(config.conn_type, ConnType::Https);
        assert!(config.https_verify);

        let err = run(&config).await.unwrap_err();
        assert!(format!("{:#}", err).starts_with("connection failed"));
    }

    #[tokio::test]
    async fn https_skips_verification_when_disabled() {
        let addr = http::tests::serve_self_signed();
        let config = ProbeConfig {
            https_verify: false,
            ..https_config(addr.port(), None)
        };
        let outcome = run(&config).await.unwrap();
        assert_eq!(outcome.to_string(), "connection successful: HTTP/1.1 200 OK");

        let addr = http::tests::serve_self_signed();
        let config = https_config(addr.port(), Some("false"));
        assert!(run(&config).await.is_ok());
    }
}
