pub mod config;
pub mod core;
pub mod domain;
pub mod indicators;
pub mod ingest;
pub mod utils;

#[cfg(feature = "cli")]
pub use self::config::CliConfig;
pub use self::config::cli::LocalStorage;

pub use self::core::{etl::EtlEngine, pipeline::UploadPipeline};
pub use self::domain::model::{Cell, Column, RawUpload, Table, TransformOutput};
pub use self::utils::error::{EtlError, Result};
