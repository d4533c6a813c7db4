use std::io::Write;
use std::path::Path;

use zip::write::{SimpleFileOptions, ZipWriter};

use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{RawUpload, Table, TransformOutput};
use crate::indicators;
use crate::ingest;
use crate::utils::error::Result;

/// Name of the report zip written into the output directory.
pub const REPORT_FILE: &str = "indicadores_entregas.zip";
/// Zip entry holding the normalized table.
pub const NORMALIZED_CSV_ENTRY: &str = "dados_normalizados.csv";
/// Zip entry holding the indicator report.
pub const INDICATORS_ENTRY: &str = "indicadores.json";

/// The one pipeline of this tool: read the upload through [`Storage`],
/// parse and normalize it, derive the indicators, write the report bundle.
pub struct UploadPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> UploadPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for UploadPipeline<S, C> {
    async fn extract(&self) -> Result<Table> {
        let path = self.config.input_file();
        tracing::debug!("Reading upload from: {}", path);
        let bytes = self.storage.read_file(path).await?;

        // The parser dispatches on the filename, not the full path.
        let filename = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string();

        ingest::parse(&RawUpload::new(filename, bytes))
    }

    async fn transform(&self, table: Table) -> Result<TransformOutput> {
        let table = ingest::normalize(table)?;
        let total_valor_nf = ingest::total(&table);
        let indicators = indicators::build_report(&table, self.config.status_column());
        let csv_output = table.to_csv()?;

        tracing::debug!(
            "Indicators: {} rows, {} on time, {} late",
            indicators.rows,
            indicators.sla.on_time,
            indicators.sla.late
        );

        Ok(TransformOutput {
            table,
            csv_output,
            indicators,
            total_valor_nf,
        })
    }

    async fn load(&self, output: TransformOutput) -> Result<String> {
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file(NORMALIZED_CSV_ENTRY, SimpleFileOptions::default())?;
            zip.write_all(output.csv_output.as_bytes())?;

            zip.start_file(INDICATORS_ENTRY, SimpleFileOptions::default())?;
            let json = serde_json::to_string_pretty(&output.indicators)?;
            zip.write_all(json.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        let output_path = Path::new(self.config.output_path())
            .join(REPORT_FILE)
            .to_string_lossy()
            .to_string();

        tracing::debug!(
            "Writing report zip ({} bytes) to: {}",
            zip_data.len(),
            output_path
        );
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Cell;
    use crate::ingest::schema;
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_file: String,
        output_path: String,
        status_column: Option<String>,
    }

    impl MockConfig {
        fn new(input_file: &str) -> Self {
            Self {
                input_file: input_file.to_string(),
                output_path: "relatorios".to_string(),
                status_column: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
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

    const DELIVERY_CSV: &str = "\
DATA DO ACIONAMENTO,DATA REAL DA COLETA,DATA PROGRAMADA DA ENTREGA,DATA REAL DE ENTREGA,DATA REPROGRAMAÇÃO,DATA DE ENTREGA DA REVERSA,STATUS DE ENTREGA,VALOR NF
2024-01-01,2024-01-02,2024-01-05,2024-01-04,,2024-01-06,CONCLUÍDO,100.50
2024-01-02,2024-01-03,2024-01-05,2024-01-07,2024-01-06,,EXTRAVIO,
";

    #[tokio::test]
    async fn test_extract_parses_csv_from_storage() {
        let storage = MockStorage::new();
        storage
            .put_file("uploads/entregas.csv", DELIVERY_CSV.as_bytes())
            .await;

        let config = MockConfig::new("uploads/entregas.csv");
        let pipeline = UploadPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 8);
        assert_eq!(
            table.column(schema::VALOR_NF).unwrap().cells,
            vec![Cell::Number(100.5), Cell::Missing]
        );
    }

    #[tokio::test]
    async fn test_extract_rejects_unsupported_extension() {
        let storage = MockStorage::new();
        storage.put_file("uploads/entregas.ods", b"whatever").await;

        let config = MockConfig::new("uploads/entregas.ods");
        let pipeline = UploadPipeline::new(storage, config);

        let result = pipeline.extract().await;
        assert!(matches!(
            result,
            Err(EtlError::UnsupportedFormat { filename }) if filename == "entregas.ods"
        ));
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::new();
        let config = MockConfig::new("uploads/nao_existe.csv");
        let pipeline = UploadPipeline::new(storage, config);

        assert!(matches!(
            pipeline.extract().await,
            Err(EtlError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_normalizes_and_derives_indicators() {
        let storage = MockStorage::new();
        storage
            .put_file("uploads/entregas.csv", DELIVERY_CSV.as_bytes())
            .await;

        let config = MockConfig {
            status_column: Some("STATUS DE ENTREGA".to_string()),
            ..MockConfig::new("uploads/entregas.csv")
        };
        let pipeline = UploadPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();
        let output = pipeline.transform(table).await.unwrap();

        assert_eq!(output.total_valor_nf, 100.5);
        assert_eq!(
            output.table.column(schema::VALOR_NF).unwrap().cells,
            vec![Cell::Number(100.5), Cell::Number(0.0)]
        );

        assert_eq!(output.indicators.rows, 2);
        assert_eq!(output.indicators.sla.on_time, 1);
        assert_eq!(output.indicators.sla.late, 1);

        let statuses = output.indicators.status_counts.as_ref().unwrap();
        assert_eq!(statuses.len(), 2);

        assert!(output.csv_output.starts_with("DATA DO ACIONAMENTO"));
    }

    #[tokio::test]
    async fn test_transform_fails_on_missing_date_column() {
        let storage = MockStorage::new();
        storage
            .put_file("uploads/entregas.csv", b"DATA DO ACIONAMENTO,VALOR NF\n2024-01-01,5\n")
            .await;

        let config = MockConfig::new("uploads/entregas.csv");
        let pipeline = UploadPipeline::new(storage, config);

        let table = pipeline.extract().await.unwrap();
        assert!(matches!(
            pipeline.transform(table).await,
            Err(EtlError::MissingColumn { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_writes_report_zip() {
        let storage = MockStorage::new();
        storage
            .put_file("uploads/entregas.csv", DELIVERY_CSV.as_bytes())
            .await;

        let config = MockConfig::new("uploads/entregas.csv");
        let pipeline = UploadPipeline::new(storage.clone(), config);

        let table = pipeline.extract().await.unwrap();
        let output = pipeline.transform(table).await.unwrap();
        let expected_total = output.total_valor_nf;

        let output_path = pipeline.load(output).await.unwrap();
        assert!(output_path.ends_with(REPORT_FILE));

        let zip_data = storage.get_file(&output_path).await.unwrap();
        let cursor = std::io::Cursor::new(zip_data);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();
        assert_eq!(archive.len(), 2);

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![NORMALIZED_CSV_ENTRY.to_string(), INDICATORS_ENTRY.to_string()]
        );

        let mut json_content = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name(INDICATORS_ENTRY).unwrap(),
            &mut json_content,
        )
        .unwrap();
        let report: crate::indicators::IndicatorReport =
            serde_json::from_str(&json_content).unwrap();
        assert_eq!(report.total_valor_nf, expected_total);
    }
}
