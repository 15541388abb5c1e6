use anyhow::{bail, Context, Result};
use region_detection::RegionConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8080,http://127.0.0.1:8080,http://localhost:8081,http://127.0.0.1:8081,http://localhost:9090,http://127.0.0.1:9090";

/// Service settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    /// Defaults for requests that do not set their own tolerances
    pub region_config: RegionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            region_config: RegionConfig::default(),
        }
    }
}

fn split_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_threshold(name: &str, value: Option<String>, default: f64) -> Result<f64> {
    let Some(raw) = value else {
        return Ok(default);
    };
    let parsed: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a number, got {:?}", name, raw))?;
    if !parsed.is_finite() || parsed < 0.0 {
        bail!("{} must be a non-negative finite number, got {}", name, parsed);
    }
    Ok(parsed)
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `ALLOWED_ORIGINS`, `REGION_EDGE_TOLERANCE` and `REGION_MIN_AREA`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|list| split_origins(&list))
            .unwrap_or(defaults.allowed_origins);

        let region_config = RegionConfig {
            edge_tolerance: parse_threshold(
                "REGION_EDGE_TOLERANCE",
                lookup("REGION_EDGE_TOLERANCE"),
                defaults.region_config.edge_tolerance,
            )?,
            min_region_area: parse_threshold(
                "REGION_MIN_AREA",
                lookup("REGION_MIN_AREA"),
                defaults.region_config.min_region_area,
            )?,
        };

        Ok(Self {
            bind_addr,
            allowed_origins,
            region_config,
        })
    }
}
