//! Configuration management for the Route Billing Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::report::{LayoutOptions, Letterhead, DEFAULT_ROWS_PER_PAGE};
use shared::summary::{LocalCalendar, SummaryError, DEFAULT_DATE_FORMAT};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Summary and export settings
    pub report: ReportConfig,

    /// Firm details printed on every exported page
    pub firm: FirmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which record store backs the server
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,

    /// PostgreSQL connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// UTC offset of the business's local calendar, e.g. `+05:30`
    pub utc_offset: String,

    /// strftime format of a summary day
    pub date_format: String,

    /// Table rows per exported page
    pub rows_per_page: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FirmConfig {
    pub name: String,
    pub address: String,
    pub gstin: String,
    pub pan: String,
    pub contact: String,
    pub bank: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("report.utc_offset", "+05:30")?
            .set_default("report.date_format", DEFAULT_DATE_FORMAT)?
            .set_default("report.rows_per_page", DEFAULT_ROWS_PER_PAGE as i64)?
            .set_default("firm.name", "JAISWAL SALES")?
            .set_default(
                "firm.address",
                "APMC Market, Near Bus Stop, At. Po. Tejgadh, Ta. Dist. Chhotaudepur, Gujarat",
            )?
            .set_default("firm.gstin", "24AAMFJ3444P1ZW")?
            .set_default("firm.pan", "AAMFJ3444P")?
            .set_default("firm.contact", "8401772172")?
            .set_default(
                "firm.bank",
                "State Bank Of India Tejgadh, A/C No: 36107439043, IFSC: SBIN0003845",
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RB_ prefix)
            .add_source(
                Environment::with_prefix("RB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and local runs without a database
    pub fn in_memory() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            report: ReportConfig {
                utc_offset: "+00:00".to_string(),
                date_format: DEFAULT_DATE_FORMAT.to_string(),
                rows_per_page: DEFAULT_ROWS_PER_PAGE,
            },
            firm: FirmConfig {
                name: "JAISWAL SALES".to_string(),
                address: "Tejgadh, Gujarat".to_string(),
                gstin: "24AAMFJ3444P1ZW".to_string(),
                pan: "AAMFJ3444P".to_string(),
                contact: "8401772172".to_string(),
                bank: "State Bank Of India Tejgadh".to_string(),
            },
        }
    }

    /// Local calendar summaries are grouped in
    pub fn calendar(&self) -> Result<LocalCalendar, SummaryError> {
        LocalCalendar::from_offset_str(&self.report.utc_offset, &self.report.date_format)
    }

    pub fn letterhead(&self) -> Letterhead {
        Letterhead {
            name: self.firm.name.clone(),
            address: self.firm.address.clone(),
            gstin: self.firm.gstin.clone(),
            pan: self.firm.pan.clone(),
            contact: self.firm.contact.clone(),
            bank: self.firm.bank.clone(),
        }
    }

    pub fn layout(&self) -> LayoutOptions {
        LayoutOptions {
            rows_per_page: self.report.rows_per_page.max(1),
        }
    }

    /// Warnings for firm details that would print malformed on bills
    pub fn firm_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Err(e) = shared::validate_gstin(&self.firm.gstin) {
            warnings.push(format!("firm.gstin: {}", e));
        }
        if let Err(e) = shared::validate_pan(&self.firm.pan) {
            warnings.push(format!("firm.pan: {}", e));
        }
        if let Err(e) = shared::validate_indian_phone(&self.firm.contact) {
            warnings.push(format!("firm.contact: {}", e));
        }
        warnings
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config_is_usable() {
        let config = Config::in_memory();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert!(config.calendar().is_ok());
        assert!(config.firm_warnings().is_empty());
        assert_eq!(config.letterhead().tax_line(), "GSTIN: 24AAMFJ3444P1ZW | PAN: AAMFJ3444P");
    }

    #[test]
    fn test_layout_never_zero_rows() {
        let mut config = Config::in_memory();
        config.report.rows_per_page = 0;
        assert_eq!(config.layout().rows_per_page, 1);
    }

    #[test]
    fn test_bad_offset_is_reported() {
        let mut config = Config::in_memory();
        config.report.utc_offset = "India".to_string();
        assert!(config.calendar().is_err());
    }

    #[test]
    fn test_bad_date_format_is_reported() {
        let mut config = Config::in_memory();
        config.report.date_format = "%Q".to_string();
        assert_eq!(
            config.calendar(),
            Err(SummaryError::InvalidDateFormat("%Q".to_string()))
        );

        config.report.date_format = "%d-%m-%Y".to_string();
        assert!(config.calendar().is_ok());
    }
}
