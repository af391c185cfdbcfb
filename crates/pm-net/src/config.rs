//! JSON-backed server configuration, loaded once at startup.
//!
//! Grounded on `oroboros_networking::server::ServerConfig`'s "load once,
//! pass by value" shape; the source format is swapped from the teacher's
//! `toml` to the `serde_json` the spec names, keeping the same
//! serde-derive struct pattern.

use std::io::Read;
use std::net::IpAddr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Raw JSON shape, matching the field names the spec document names
/// verbatim (`PascalCase`, not Rust's usual `snake_case`).
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(rename = "ServerIP")]
    server_ip: String,
    #[serde(rename = "TcpPort")]
    tcp_port: u16,
    #[serde(rename = "WebSocketPort")]
    web_socket_port: u16,
    #[serde(rename = "OneClientPerIP")]
    one_client_per_ip: bool,
    #[serde(rename = "GameFPS")]
    game_fps: i32,
    #[serde(rename = "TrustedClientIPs")]
    trusted_client_ips: Vec<String>,
    #[serde(rename = "NumActiveGhosts")]
    num_active_ghosts: i32,
}

/// Validated server configuration.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    /// Address to bind both listeners to.
    pub server_ip: String,
    /// Port for the read-only mirror socket.
    pub tcp_port: u16,
    /// Port for the bidirectional client control socket (post-upgrade).
    pub web_socket_port: u16,
    /// Whether a reconnect from an already-connected IP closes the prior
    /// session before admitting the new one.
    pub one_client_per_ip: bool,
    /// Tick rate, in Hz.
    pub game_fps: u32,
    /// IPs allowed to submit command frames.
    pub trusted_client_ips: Vec<IpAddr>,
    /// How many of the four ghosts are active (0..=4).
    pub num_active_ghosts: usize,
}

impl ServerSettings {
    /// Loads and validates settings from any `Read` source (a file, a
    /// test fixture, stdin piped from a wrapper script).
    pub fn load(mut reader: impl Read) -> Result<Self, ConfigError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let raw: RawSettings = serde_json::from_str(&text)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        if raw.server_ip.is_empty() {
            return Err(ConfigError::InvalidField("ServerIP must not be empty".into()));
        }
        if raw.tcp_port == 0 {
            return Err(ConfigError::InvalidField("TcpPort must be nonzero".into()));
        }
        if raw.web_socket_port == 0 {
            return Err(ConfigError::InvalidField("WebSocketPort must be nonzero".into()));
        }
        if raw.game_fps <= 0 {
            return Err(ConfigError::InvalidField("GameFPS must be positive".into()));
        }
        if !(0..=4).contains(&raw.num_active_ghosts) {
            return Err(ConfigError::InvalidField(
                "NumActiveGhosts must be between 0 and 4".into(),
            ));
        }

        let trusted_client_ips = raw
            .trusted_client_ips
            .iter()
            .map(|s| s.parse::<IpAddr>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            server_ip: raw.server_ip,
            tcp_port: raw.tcp_port,
            web_socket_port: raw.web_socket_port,
            one_client_per_ip: raw.one_client_per_ip,
            game_fps: raw.game_fps.unsigned_abs(),
            trusted_client_ips,
            num_active_ghosts: raw.num_active_ghosts.unsigned_abs() as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        r#"{
            "ServerIP": "0.0.0.0",
            "TcpPort": 9000,
            "WebSocketPort": 9001,
            "OneClientPerIP": true,
            "GameFPS": 24,
            "TrustedClientIPs": ["127.0.0.1", "10.0.0.5"],
            "NumActiveGhosts": 4
        }"#
    }

    #[test]
    fn loads_a_well_formed_document() {
        let settings = ServerSettings::load(sample().as_bytes()).expect("should load");
        assert_eq!(settings.tcp_port, 9000);
        assert_eq!(settings.web_socket_port, 9001);
        assert!(settings.one_client_per_ip);
        assert_eq!(settings.game_fps, 24);
        assert_eq!(settings.num_active_ghosts, 4);
        assert_eq!(settings.trusted_client_ips.len(), 2);
    }

    #[test]
    fn rejects_a_zero_tcp_port() {
        let bad = sample().replace("9000", "0");
        assert!(ServerSettings::load(bad.as_bytes()).is_err());
    }

    #[test]
    fn rejects_an_out_of_range_ghost_count() {
        let bad = sample().replace("\"NumActiveGhosts\": 4", "\"NumActiveGhosts\": 5");
        assert!(ServerSettings::load(bad.as_bytes()).is_err());
    }

    #[test]
    fn rejects_an_unparseable_trusted_ip() {
        let bad = sample().replace("127.0.0.1", "not-an-ip");
        assert!(ServerSettings::load(bad.as_bytes()).is_err());
    }
}
