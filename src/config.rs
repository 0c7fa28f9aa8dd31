use anyhow::Result;
use serde::Deserialize;
use std::net::IpAddr;

use crate::filter::set::DEFAULT_MAX_DENIED_ADDRESSES;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Deny entries, each `A.B.C.D` or `A.B.C.D/N`. Malformed entries are skipped.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Stop applying entries once this many addresses are denied.
    #[serde(default = "default_max_denied_addresses")]
    pub max_denied_addresses: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            deny: Vec::new(),
            max_denied_addresses: default_max_denied_addresses(),
        }
    }
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 8080 }
fn default_max_denied_addresses() -> u64 { DEFAULT_MAX_DENIED_ADDRESSES }

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.api.bind.parse::<IpAddr>().is_err() {
        anyhow::bail!(
            "CONFIG ERROR: api.bind must be an IP address (current: {:?})",
            cfg.api.bind
        );
    }

    if cfg.filter.max_denied_addresses == 0 {
        anyhow::bail!("CONFIG ERROR: filter.max_denied_addresses must be greater than 0");
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

/// Load configuration from `config.{toml,yaml,json}` and `IP_FILTER__*`
/// environment variables. `IP_FILTER__FILTER__DENY` takes a comma-separated list.
pub fn load() -> Result<Config> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("IP_FILTER")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("filter.deny")
                .try_parsing(true),
        )
        .set_default("api.bind", "0.0.0.0")?
        .set_default("api.port", 8080)?
        .set_default("filter.deny", Vec::<String>::new())?
        .set_default("filter.max_denied_addresses", DEFAULT_MAX_DENIED_ADDRESSES)?
        .build()?
        .try_deserialize()?;

    validate(&cfg)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(bind: &str, max_denied_addresses: u64) -> Config {
        Config {
            api: ApiConfig { port: 8080, bind: bind.to_string() },
            filter: FilterConfig { deny: vec![], max_denied_addresses },
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&config("0.0.0.0", DEFAULT_MAX_DENIED_ADDRESSES)).is_ok());
        assert!(validate(&config("::", 1)).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bind() {
        assert!(validate(&config("localhost", DEFAULT_MAX_DENIED_ADDRESSES)).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        assert!(validate(&config("127.0.0.1", 0)).is_err());
    }

    #[test]
    fn test_filter_defaults() {
        let filter: FilterConfig = serde_json::from_str("{}").unwrap();
        assert!(filter.deny.is_empty());
        assert_eq!(filter.max_denied_addresses, 30_000_000);

        let filter: FilterConfig =
            serde_json::from_str(r#"{"deny": ["10.0.0.0/8", "1.1.1.1"]}"#).unwrap();
        assert_eq!(filter.deny, ["10.0.0.0/8", "1.1.1.1"]);
    }
}
