//! Environment configuration

use anyhow::{bail, Context, Result};
use kapp_watch::{DecodeErrorPolicy, Framing, WatchConfig};
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_KINDS: &str = "Node";

/// Settings for one resource-watch process
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub kinds: Vec<String>,
    pub namespace: Option<String>,
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("KAPP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = var("KAPP_TOKEN");
        let namespace = var("WATCH_NAMESPACE");

        let kinds: Vec<String> = var("WATCH_KINDS")
            .unwrap_or_else(|| DEFAULT_KINDS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if kinds.is_empty() {
            bail!("WATCH_KINDS must name at least one resource kind");
        }

        let mut watch = WatchConfig::default();
        if let Some(ms) = var("WATCH_RETRY_DELAY_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| format!("WATCH_RETRY_DELAY_MS is not a number: {ms}"))?;
            watch = watch.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(framing) = var("WATCH_FRAMING") {
            let framing: Framing = framing.parse().map_err(anyhow::Error::msg)?;
            watch = watch.with_framing(framing);
        }
        if let Some(policy) = var("WATCH_ON_DECODE_ERROR") {
            let policy: DecodeErrorPolicy = policy.parse().map_err(anyhow::Error::msg)?;
            watch = watch.with_decode_error_policy(policy);
        }
        if let Some(bytes) = var("WATCH_MAX_OBJECT_BYTES") {
            let bytes: usize = bytes
                .trim()
                .parse()
                .with_context(|| format!("WATCH_MAX_OBJECT_BYTES is not a number: {bytes}"))?;
            if bytes == 0 {
                bail!("WATCH_MAX_OBJECT_BYTES must be positive");
            }
            watch = watch.with_max_object_bytes(bytes);
        }

        Ok(Self {
            api_url,
            token,
            kinds,
            namespace,
            watch,
        })
    }
}
