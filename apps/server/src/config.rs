use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("FLEXILE_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid FLEXILE_LISTEN_ADDR")?;
        let db_path =
            std::env::var("FLEXILE_DB_PATH").unwrap_or_else(|_| "./db/flexile.db".into());
        let cors_allow = std::env::var("FLEXILE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout =
            parse_request_timeout(std::env::var("FLEXILE_REQUEST_TIMEOUT_MS").ok().as_deref())?;
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout,
        })
    }
}

fn parse_request_timeout(value: Option<&str>) -> anyhow::Result<Duration> {
    let timeout_ms: u64 = value
        .unwrap_or("30000")
        .trim()
        .parse()
        .context("Invalid FLEXILE_REQUEST_TIMEOUT_MS")?;
    Ok(Duration::from_millis(timeout_ms))
}
