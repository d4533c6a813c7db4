use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Sequential driver for a [`Pipeline`]: extract, transform, load, in that
/// order, aborting on the first error. No retry, no partial-completion
/// state.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        println!("Starting ETL process...");

        println!("Extracting data...");
        let table = self.pipeline.extract().await?;
        println!(
            "Parsed table: {} rows x {} columns",
            table.row_count(),
            table.column_count()
        );
        self.monitor.log_stats("extract");

        println!("Transforming data...");
        let output = self.pipeline.transform(table).await?;
        println!(
            "Valor total das notas fiscais (VALOR NF): R$ {:.2}",
            output.total_valor_nf
        );
        self.monitor.log_stats("transform");

        println!("Loading data...");
        let output_path = self.pipeline.load(output).await?;
        println!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
