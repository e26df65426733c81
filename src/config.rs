use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Optional JSON config file looked up in the working directory.
pub const CONFIG_FILE: &str = "painel-vendas.json";

pub const DEFAULT_DATA_PATH: &str = "vendas.xlsx";
pub const DEFAULT_SHEET: &str = "Vendas";

// ---------------------------------------------------------------------------
// SalesSchema – the six required column headers
// ---------------------------------------------------------------------------

/// Column headers the loader looks for. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesSchema {
    pub city: String,
    pub title: String,
    pub payment_status: String,
    pub total_price: String,
    pub units_sold: String,
    pub date: String,
}

impl Default for SalesSchema {
    fn default() -> Self {
        Self {
            city: "Cidade do comprador".to_string(),
            title: "Título".to_string(),
            payment_status: "Estado do pagamento".to_string(),
            total_price: "Preço total".to_string(),
            units_sold: "Unidades vendidas".to_string(),
            date: "Data".to_string(),
        }
    }
}

impl SalesSchema {
    /// All required headers, in the order they are validated.
    pub fn columns(&self) -> [&str; 6] {
        [
            self.city.as_str(),
            self.title.as_str(),
            self.payment_status.as_str(),
            self.total_price.as_str(),
            self.units_sold.as_str(),
            self.date.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet opened at start-up, when it exists.
    pub data_path: PathBuf,
    /// Worksheet read from workbook sources (ignored for csv/json/parquet).
    pub sheet_name: String,
    pub schema: SalesSchema,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            sheet_name: DEFAULT_SHEET.to_string(),
            schema: SalesSchema::default(),
        }
    }
}

impl DashboardConfig {
    /// Read the config file at `path`, falling back to defaults.
    ///
    /// A missing file is the normal case and is not reported. A file that
    /// cannot be read or parsed is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Invalid configuration in {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.sheet_name, "Vendas");
        assert_eq!(config.schema.title, "Título");
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{ "sheet_name": "Sales", "schema": { "city": "City" } }"#,
        )
        .unwrap();

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.sheet_name, "Sales");
        assert_eq!(config.schema.city, "City");
        assert_eq!(config.schema.date, "Data");
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }

    #[test]
    fn schema_lists_every_column() {
        let schema = SalesSchema::default();
        assert_eq!(
            schema.columns(),
            [
                "Cidade do comprador",
                "Título",
                "Estado do pagamento",
                "Preço total",
                "Unidades vendidas",
                "Data"
            ]
        );
    }
}
