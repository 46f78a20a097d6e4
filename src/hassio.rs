/*
 *  hassio.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Home Assistant supervisor client
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::Handle;

use crate::deutils::{value_as_bool, value_as_string};
use crate::error::RenderFailure;
use crate::metrics::HostIdentity;

pub const SUPERVISOR_URL: &str = "http://supervisor";
pub const TOKEN_ENV: &str = "SUPERVISOR_TOKEN";

#[derive(Debug, Error)]
pub enum HassioError {
    #[error("SUPERVISOR_TOKEN is not set")]
    MissingToken,

    #[error("supervisor token is not a valid header value")]
    InvalidToken,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("supervisor answered '{0}'")]
    Failed(String),

    #[error("supervisor response missing '{0}'")]
    MissingField(&'static str),
}

/// Version plus whether an update is waiting; shown with a trailing `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub update_available: bool,
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)?;
        if self.update_available {
            write!(f, "*")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HassioClient {
    base_url: String,
    client: Client,
}

impl HassioClient {
    pub fn new(token: &str) -> Result<Self, HassioError> {
        const VERSION: &str = concat!("StatScreen ", env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let bearer = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| HassioError::InvalidToken)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(VERSION));
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(1500))
            .timeout(Duration::from_secs(3))
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url: SUPERVISOR_URL.to_string(), client })
    }

    /// Client authenticated with the add-on's `SUPERVISOR_TOKEN`.
    pub fn from_env() -> Result<Self, HassioError> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| HassioError::MissingToken)?;
        if token.trim().is_empty() {
            return Err(HassioError::MissingToken);
        }
        Self::new(token.trim())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// GET `<base>/<path>` and return its `data` object.
    pub async fn get_info(&self, path: &str) -> Result<Value, HassioError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("supervisor GET {}", url);

        let response = self.client.get(&url).send().await?;
        response.error_for_status_ref()?;
        let body: Value = response.json().await?;
        unwrap_data(body)
    }

    pub async fn hostname(&self) -> Result<String, HassioError> {
        parse_hostname(&self.get_info("host/info").await?)
    }

    pub async fn ipv4(&self) -> Result<String, HassioError> {
        parse_ipv4(&self.get_info("network/info").await?)
    }

    pub async fn os_version(&self) -> Result<VersionInfo, HassioError> {
        parse_version(&self.get_info("os/info").await?)
    }

    pub async fn core_version(&self) -> Result<VersionInfo, HassioError> {
        parse_version(&self.get_info("core/info").await?)
    }

    /// True when the supervisor answers `host/info`.
    pub async fn reachable(&self) -> bool {
        match self.get_info("host/info").await {
            Ok(_) => true,
            Err(e) => {
                info!("Home Assistant supervisor unavailable: {}", e);
                false
            }
        }
    }
}

fn unwrap_data(mut body: Value) -> Result<Value, HassioError> {
    if let Some(result) = body.get("result").and_then(value_as_string) {
        if result != "ok" {
            let message = body.get("message").and_then(value_as_string).unwrap_or(result);
            return Err(HassioError::Failed(message));
        }
    }
    match body.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(HassioError::MissingField("data")),
    }
}

/// Upper-cased, as the panel shows it.
pub fn parse_hostname(data: &Value) -> Result<String, HassioError> {
    data.get("hostname")
        .and_then(value_as_string)
        .map(|h| h.to_uppercase())
        .ok_or(HassioError::MissingField("hostname"))
}

/// First address of the first interface, prefix length dropped.
pub fn parse_ipv4(data: &Value) -> Result<String, HassioError> {
    data.pointer("/interfaces/0/ipv4/address/0")
        .and_then(value_as_string)
        .and_then(|a| a.split('/').next().map(str::to_string))
        .filter(|a| !a.is_empty())
        .ok_or(HassioError::MissingField("interfaces[0].ipv4.address"))
}

pub fn parse_version(data: &Value) -> Result<VersionInfo, HassioError> {
    let version = data
        .get("version")
        .and_then(value_as_string)
        .ok_or(HassioError::MissingField("version"))?;
    let update_available = data.get("update_available").and_then(value_as_bool).unwrap_or(false);
    Ok(VersionInfo { version, update_available })
}

/// Supervisor-backed host identity for blocking callers.
#[derive(Debug, Clone)]
pub struct SupervisorHost {
    client: HassioClient,
    runtime: Handle,
}

impl SupervisorHost {
    pub fn new(client: HassioClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    pub fn client(&self) -> &HassioClient {
        &self.client
    }

    /// Run a supervisor call to completion. Must not be called from inside
    /// the async runtime itself.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }
}

impl HostIdentity for SupervisorHost {
    fn hostname(&self) -> Result<String, RenderFailure> {
        Ok(self.block_on(self.client.hostname())?)
    }

    fn ipv4(&self) -> Result<String, RenderFailure> {
        Ok(self.block_on(self.client.ipv4())?)
    }
}

/// Blocking capability check for the screen registry: a token must be
/// present and the supervisor must answer.
pub fn supervisor_check(runtime: Handle) -> impl Fn() -> bool + Send + Sync + 'static {
    move || match HassioClient::from_env() {
        Ok(client) => runtime.block_on(client.reachable()),
        Err(e) => {
            warn!("Home Assistant supervisor not configured: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data() {
        let data = unwrap_data(json!({"result": "ok", "data": {"hostname": "ha"}})).unwrap();
        assert_eq!(data, json!({"hostname": "ha"}));

        let err = unwrap_data(json!({"result": "error", "message": "Unauthorized"})).unwrap_err();
        assert_eq!(err.to_string(), "supervisor answered 'Unauthorized'");

        assert!(matches!(unwrap_data(json!({"result": "ok"})), Err(HassioError::MissingField("data"))));
    }

    #[test]
    fn test_parse_hostname() {
        assert_eq!(parse_hostname(&json!({"hostname": "homeassistant"})).unwrap(), "HOMEASSISTANT");
        assert!(parse_hostname(&json!({})).is_err());
    }

    #[test]
    fn test_parse_ipv4() {
        let data = json!({
            "interfaces": [
                {"interface": "eth0", "ipv4": {"address": ["192.168.1.20/24"], "gateway": "192.168.1.1"}},
                {"interface": "wlan0", "ipv4": {"address": ["10.0.0.5/8"]}}
            ]
        });
        assert_eq!(parse_ipv4(&data).unwrap(), "192.168.1.20");
        assert!(parse_ipv4(&json!({"interfaces": []})).is_err());
        assert!(parse_ipv4(&json!({"interfaces": [{"ipv4": {"address": []}}]})).is_err());
    }

    #[test]
    fn test_version_marks_updates() {
        let v = parse_version(&json!({"version": "10.5", "update_available": true})).unwrap();
        assert_eq!(v.to_string(), "10.5*");
        let v = parse_version(&json!({"version": "2024.6.1", "update_available": false})).unwrap();
        assert_eq!(v.to_string(), "2024.6.1");
        let v = parse_version(&json!({"version": "1.0"})).unwrap();
        assert!(!v.update_available);
        assert!(parse_version(&json!({"update_available": true})).is_err());
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = HassioClient::new("token").unwrap().with_base_url("http://localhost:8123/");
        assert_eq!(client.base_url, "http://localhost:8123");
    }

    #[test]
    fn test_invalid_token() {
        assert!(matches!(HassioClient::new("bad\ntoken"), Err(HassioError::InvalidToken)));
    }
}
