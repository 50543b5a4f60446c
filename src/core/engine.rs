use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> BatchEngine<P> {
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
        tracing::info!("🚀 Starting depth classification run");

        tracing::info!("📥 Extracting catalog...");
        let table = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", table.rows.len());
        self.monitor.log_stats("extract");

        tracing::info!("🔄 Classifying depths...");
        let result = self.pipeline.transform(table).await?;
        tracing::info!(
            total = result.summary.total_rows,
            dropped = result.summary.dropped_rows,
            "Classified {} rows",
            result.summary.valid_rows
        );
        for (category, count) in result.summary.counts.iter() {
            tracing::info!("  {:<26} {}", category.label(), count);
        }
        self.monitor.log_stats("transform");

        tracing::info!("💾 Writing output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
