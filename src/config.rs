//! Service configuration
//!
//! Loaded from a TOML file; every section and field has a default, so a
//! partial file (or none at all) is valid.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [upstream]
//! predictor = "vep"
//! rate_limit_per_second = 15
//!
//! [cache]
//! ttl_seconds = 86400
//! capacity = 10000
//!
//! [reference]
//! default_assembly = "GRCh38"
//! data_path = "/data/hnf1b/reference.json"
//! rsid_path = "/data/hnf1b/dbsnp.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::reference::GenomeBuild;

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    pub reference: ReferenceConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    pub host: String,
    /// Port to listen on (default: 3000)
    pub port: u16,
    /// Maximum request size (default: "1MB")
    pub max_request_size: String,
    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

/// Which consequence predictor answers annotation requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// Ensembl VEP REST
    #[default]
    Vep,
    /// Canned offline predictor
    Mock,
}

/// Upstream consequence predictor configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub predictor: PredictorKind,
    /// Base URL for GRCh38 (default: "https://rest.ensembl.org")
    pub grch38_url: String,
    /// Base URL for GRCh37 (default: "https://grch37.rest.ensembl.org")
    pub grch37_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Client-side pacing (default: 15)
    pub rate_limit_per_second: u32,
    pub connection_pool: Option<ConnectionPoolConfig>,
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

/// HTTP connection pool configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectionPoolConfig {
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: Option<usize>,
    /// Connection idle timeout in seconds (default: 30)
    pub idle_timeout_seconds: Option<u64>,
    /// TCP keep-alive in seconds (default: 90)
    pub keep_alive_seconds: Option<u64>,
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CircuitBreakerConfig {
    /// Failure threshold before opening circuit (default: 5)
    pub failure_threshold: Option<u32>,
    /// Recovery timeout in seconds (default: 60)
    pub recovery_timeout_seconds: Option<u64>,
    /// Success threshold for closing circuit (default: 3)
    pub success_threshold: Option<u32>,
}

/// Annotation cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds (default: 86400)
    pub ttl_seconds: u64,
    /// Maximum number of entries (default: 10000)
    pub capacity: usize,
}

/// Reference data configuration
///
/// Without `data_path`/`rsid_path` the built-in demo fixtures are used.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Assembly used when a request does not name one
    pub default_assembly: GenomeBuild,
    /// JSON file with transcripts and sequence windows
    pub data_path: Option<PathBuf>,
    /// JSON file with dbSNP records
    pub rsid_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_request_size: "1MB".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            predictor: PredictorKind::default(),
            grch38_url: "https://rest.ensembl.org".to_string(),
            grch37_url: "https://grch37.rest.ensembl.org".to_string(),
            timeout_seconds: 30,
            rate_limit_per_second: 15,
            connection_pool: Some(ConnectionPoolConfig::default()),
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: Some(10),
            idle_timeout_seconds: Some(30),
            keep_alive_seconds: Some(90),
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: Some(5),
            recovery_timeout_seconds: Some(60),
            success_threshold: Some(3),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 86_400,
            capacity: 10_000,
        }
    }
}

impl UpstreamConfig {
    /// Base URL for an assembly
    pub fn base_url(&self, build: GenomeBuild) -> &str {
        match build {
            GenomeBuild::GRCh37 => &self.grch37_url,
            GenomeBuild::GRCh38 => &self.grch38_url,
        }
    }

    /// Minimum spacing between upstream requests
    pub fn min_interval(&self) -> Option<Duration> {
        if self.rate_limit_per_second == 0 {
            None
        } else {
            Some(Duration::from_secs(1) / self.rate_limit_per_second)
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl ServiceConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, VariantError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VariantError::Config {
            msg: format!("{}: {}", path.display(), e),
        })
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), VariantError> {
        let content = toml::to_string_pretty(self).map_err(|e| VariantError::Config {
            msg: format!("cannot serialize configuration: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), VariantError> {
        let fail = |msg: String| Err(VariantError::Config { msg });

        if self.server.port == 0 {
            return fail("server port must be greater than 0".to_string());
        }
        if self.server.request_timeout_seconds == 0 {
            return fail("server request timeout must be greater than 0".to_string());
        }
        if self.upstream.timeout_seconds == 0 {
            return fail("upstream timeout must be greater than 0".to_string());
        }
        if self.upstream.predictor == PredictorKind::Vep {
            for url in [&self.upstream.grch37_url, &self.upstream.grch38_url] {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return fail(format!("upstream URL '{}' must be http(s)", url));
                }
            }
        }
        if self.cache.capacity == 0 {
            return fail("cache capacity must be greater than 0".to_string());
        }
        for path in [&self.reference.data_path, &self.reference.rsid_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return fail(format!("reference file does not exist: {}", path.display()));
            }
        }
        Ok(())
    }
}
