use std::net::SocketAddr;
use std::str::FromStr;

use fan_control::{ZoneScheme, ZoneTable};

use crate::{Error, Result};

const DEFAULT_CLIENT_ID: &str = "presk";
const DEFAULT_HTTP_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub mqtt_address: String,
    pub mqtt_user: String,
    pub mqtt_pass: String,
    pub mqtt_client_id: String,
    pub http_address: SocketAddr,
    pub zones: ZoneTable,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `ZONE_TABLE` takes precedence over `ZONE_SCHEME`.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(Error::MissingVar(name));

        let http_address = lookup("HTTP_ADDRESS")
            .as_deref()
            .unwrap_or(DEFAULT_HTTP_ADDRESS)
            .parse::<SocketAddr>()?;

        let zones = match (lookup("ZONE_TABLE"), lookup("ZONE_SCHEME")) {
            (Some(table), _) => serde_json::from_str(&table)
                .map_err(|err| Error::InvalidVar("ZONE_TABLE", err.to_string()))?,
            (None, Some(scheme)) => ZoneScheme::from_str(&scheme)
                .map_err(|err| Error::InvalidVar("ZONE_SCHEME", err.to_string()))?
                .table(),
            (None, None) => ZoneScheme::default().table(),
        };

        Ok(Config {
            mqtt_address: required("MQTT_ADDRESS")?,
            mqtt_user: required("MQTT_USER")?,
            mqtt_pass: required("MQTT_PASS")?,
            mqtt_client_id: lookup("MQTT_CLIENT_ID")
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            http_address,
            zones,
        })
    }
}
