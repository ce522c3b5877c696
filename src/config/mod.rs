use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    /// Pseudo-fund that carries the whole-account balance.
    #[serde(default = "default_total")]
    pub total: FundEntry,

    #[serde(default = "default_funds")]
    pub funds: Vec<FundEntry>,
}

/// Where pages are read from and derived files are written to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,

    #[serde(default = "default_page_suffix")]
    pub page_suffix: String,
}

/// One row of the fund table: display name as rendered on the page plus
/// the investment parameters that are not on the page.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FundEntry {
    pub name: String,
    pub id: i64,
    pub invested: f64,
    pub allocated: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_pages_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("data/detailsByDate.csv")
}
fn default_snapshot_file() -> PathBuf {
    PathBuf::from("data/groupByFund.json")
}
fn default_page_suffix() -> String {
    "html".to_string()
}

fn entry(name: &str, id: i64, invested: f64, allocated: &str) -> FundEntry {
    FundEntry {
        name: name.to_string(),
        id,
        invested,
        allocated: allocated.to_string(),
    }
}

fn default_total() -> FundEntry {
    entry("JacksonFunds", -999, 60_000.0, "100%")
}

fn default_funds() -> Vec<FundEntry> {
    vec![
        entry("JNL/Mellon Energy Sector", 190, 9_000.0, "15%"),
        entry("JNL/BlackRock® Global Natural Resources", 66, 9_000.0, "15%"),
        entry("JNL/Mellon Utilities Sector", 635, 6_000.0, "10%"),
        entry("JNL/Newton Equity Income", 606, 6_000.0, "10%"),
        entry("JNL/Invesco Diversified Dividend", 365, 9_000.0, "15%"),
        entry("JNL/Mellon Consumer Staples Sector", 368, 6_000.0, "10%"),
        entry("JNL/DFA U.S. Core Equity", 115, 6_000.0, "10%"),
        entry("JNL/Mellon Nasdaq® 100 Index", 222, 9_000.0, "15%"),
    ]
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("FUND_TRACKER").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        cfg.try_deserialize()
            .context("Configuration is malformed")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            log_file: default_log_file(),
            snapshot_file: default_snapshot_file(),
            page_suffix: default_page_suffix(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            total: default_total(),
            funds: default_funds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_the_fund_table() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.funds.len(), 8);
        assert_eq!(cfg.total.id, -999);
        assert!(cfg.funds.iter().all(|f| f.invested > 0.0));
        assert_eq!(cfg.paths.page_suffix, "html");
    }

    #[test]
    fn test_toml_overrides_paths_and_funds() {
        let toml = r#"
            [paths]
            pages_dir = "captures"

            [[funds]]
            name = "Test Fund"
            id = 7
            invested = 1000.0
            allocated = "50%"
        "#;
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.paths.pages_dir, PathBuf::from("captures"));
        assert_eq!(cfg.paths.log_file, default_log_file());
        assert_eq!(cfg.funds, vec![entry("Test Fund", 7, 1000.0, "50%")]);
        assert_eq!(cfg.total, default_total());
    }

    #[test]
    fn test_malformed_fund_entry_is_rejected() {
        let toml = r#"
            [[funds]]
            name = "Test Fund"
            id = 7
            invested = "abc"
            allocated = "50%"
        "#;
        let res = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        assert!(res.is_err());
    }

    #[test]
    fn test_unparseable_toml_fails_to_build() {
        let res = config::Config::builder()
            .add_source(config::File::from_str("[[funds]\nname = ", config::FileFormat::Toml))
            .build();
        assert!(res.is_err());
    }
}
