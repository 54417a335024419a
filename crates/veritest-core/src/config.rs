//! Global application configuration. Load from TOML or env.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Gateway and core configuration, loaded once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown in startup logs.
    pub app_name: String,
    /// Bind address for the gateway.
    pub host: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Directory containing one `.robot` definition file per suite.
    pub suites_dir: String,
    /// Directory containing one artifact subdirectory per suite name.
    pub results_dir: String,
    /// Command used to invoke the external test-execution engine.
    pub engine_command: String,
    /// Upper bound on a single suite execution, enforced at the gateway.
    pub execution_timeout_secs: u64,
    /// Origins allowed by the CORS layer.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence:
    /// env `VERITEST_CONFIG` path > `config/gateway.toml` > defaults,
    /// with `VERITEST__*` environment variables overriding either.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("VERITEST_CONFIG").unwrap_or_else(|_| "config/gateway".to_string());
        Self::load_from(Path::new(&config_path))
    }

    fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("app_name", "Veritest Gateway")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000_i64)?
            .set_default("suites_dir", "suites")?
            .set_default("results_dir", "results")?
            .set_default("engine_command", "robot")?
            .set_default("execution_timeout_secs", 120_i64)?
            .set_default(
                "cors_origins",
                vec![
                    "http://localhost:8501".to_string(),
                    "http://127.0.0.1:8501".to_string(),
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ],
            )?;

        let builder = if path.exists() || path.with_extension("toml").exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("VERITEST").separator("__"))
            .build()?;

        built.try_deserialize()
    }

    pub fn suites_path(&self) -> PathBuf {
        PathBuf::from(&self.suites_dir)
    }

    pub fn results_path(&self) -> PathBuf {
        PathBuf::from(&self.results_dir)
    }

    pub fn execution_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.execution_timeout_secs)
    }
}
