pub mod cli;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "entregas-etl")]
#[command(about = "Ingests a delivery spreadsheet (CSV/XLSX) and computes delivery indicators")]
pub struct CliConfig {
    /// Path to the delivery spreadsheet (.csv or .xlsx)
    #[arg(long)]
    pub input_file: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Column to aggregate status counts from, when the upload has one
    #[arg(long)]
    pub status_column: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn status_column(&self) -> Option<&str> {
        self.status_column.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_path("input_file", &self.input_file)?;
        validation::validate_upload_extension("input_file", &self.input_file)?;
        validation::validate_non_empty_path("output_path", &self.output_path)?;
        if let Some(column) = &self.status_column {
            validation::validate_non_empty_string("status_column", column)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn config(input_file: &str) -> CliConfig {
        CliConfig {
            input_file: input_file.to_string(),
            output_path: "./output".to_string(),
            status_column: None,
            verbose: false,
            monitor: false,
        }
    }

    #[test]
    fn accepts_recognized_uploads() {
        assert!(config("entregas.csv").validate().is_ok());
        assert!(config("planilhas/entregas.xlsx").validate().is_ok());
    }

    #[test]
    fn rejects_unsupported_uploads_at_startup() {
        assert!(config("entregas.xls").validate().is_err());
        assert!(config("entregas.CSV").validate().is_err());
        assert!(config("").validate().is_err());
    }

    #[test]
    fn rejects_blank_status_column() {
        let mut cfg = config("entregas.csv");
        cfg.status_column = Some("   ".to_string());
        assert!(cfg.validate().is_err());
    }
}
