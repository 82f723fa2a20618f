use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::TrackerConfig;
use crate::snapshot::NetworkRecord;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("IP API error: {0}")]
    Status(u16),
    #[error("IP API rejected the request: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug)]
pub enum Outcome<T, E> {
    Fresh(T),
    Degraded { fallback: T, cause: E },
}

impl<T, E> Outcome<T, E> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Fresh(value) => value,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }
}

#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn fetch_network_info(&self) -> Outcome<NetworkRecord, LookupError>;
}

#[derive(Debug, Default, Deserialize)]
struct IpApiConnection {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IpApiResponse {
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    org: Option<String>,
    postal: Option<String>,
    timezone: Option<String>,
    connection: Option<IpApiConnection>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpEchoResponse {
    ip: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `AS15169 Google LLC` yields `Google LLC`; a single token is kept as is.
pub fn isp_from_org(org: Option<&str>) -> Option<String> {
    let org = org.map(str::trim).filter(|o| !o.is_empty())?;
    let parts: Vec<&str> = org.split_whitespace().collect();
    if parts.len() > 1 {
        Some(parts[1..].join(" "))
    } else {
        Some(org.to_string())
    }
}

pub fn map_response(data: IpApiResponse) -> NetworkRecord {
    let organization = present(data.org);
    NetworkRecord {
        ip: present(data.ip),
        country: present(data.country_name),
        region: present(data.region),
        city: present(data.city),
        latitude: data.latitude,
        longitude: data.longitude,
        isp: isp_from_org(organization.as_deref()),
        organization,
        connection_type: present(data.connection.and_then(|c| c.kind)),
        postal_code: present(data.postal),
        timezone: present(data.timezone),
    }
}

pub struct IpApiClient {
    http: reqwest::Client,
    geo_endpoint: String,
    ip_echo_endpoint: String,
}

impl IpApiClient {
    pub fn new(
        geo_endpoint: impl Into<String>,
        ip_echo_endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default http client");
            reqwest::Client::new()
        });
        Self::with_client(http, geo_endpoint, ip_echo_endpoint)
    }

    pub fn with_client(
        http: reqwest::Client,
        geo_endpoint: impl Into<String>,
        ip_echo_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            geo_endpoint: geo_endpoint.into(),
            ip_echo_endpoint: ip_echo_endpoint.into(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            config.geo_endpoint.clone(),
            config.ip_echo_endpoint.clone(),
            config.request_timeout,
        )
    }

    async fn request_geo(&self) -> Result<NetworkRecord, LookupError> {
        let response = self
            .http
            .get(&self.geo_endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Decode(err.to_string()))?;

        if data.error {
            return Err(LookupError::Rejected(
                data.reason.unwrap_or_else(|| "unspecified".to_string()),
            ));
        }

        Ok(map_response(data))
    }

    async fn request_ip(&self) -> Result<Option<String>, LookupError> {
        let response = self
            .http
            .get(&self.ip_echo_endpoint)
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: IpEchoResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Decode(err.to_string()))?;
        Ok(present(body.ip))
    }

    pub async fn fetch_ip_only(&self) -> Option<String> {
        match self.request_ip().await {
            Ok(ip) => ip,
            Err(err) => {
                warn!(error = %err, "failed to fetch ip");
                None
            }
        }
    }
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn fetch_network_info(&self) -> Outcome<NetworkRecord, LookupError> {
        match self.request_geo().await {
            Ok(record) => {
                info!(ip = record.ip.as_deref().unwrap_or("n/a"), "network info fetched");
                Outcome::Fresh(record)
            }
            Err(cause) => {
                warn!(error = %cause, "failed to fetch network info");
                Outcome::Degraded {
                    fallback: NetworkRecord::empty(),
                    cause,
                }
            }
        }
    }
}
