use clap::Parser;
use quake_depth::config::{BatchArgs, ClassifyArgs, Command, PredictArgs};
use quake_depth::core::export::export_results;
use quake_depth::core::predictor::ModelPrediction;
use quake_depth::domain::ports::ConfigProvider;
use quake_depth::utils::error::ErrorSeverity;
use quake_depth::utils::{logger, validation::Validate};
use quake_depth::{
    classify_batch, predict_depth_class, summarize, BatchEngine, CatalogPipeline, Classification,
    ClassificationResult, Cli, LocalStorage, ModelHandles, QuakeError, TomlConfig,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    let outcome = match cli.command {
        Command::Classify(args) => run_classify(args),
        Command::Batch(args) => run_batch(args).await,
        Command::Predict(args) => run_predict(args).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 依錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run_classify(args: ClassifyArgs) -> Result<(), QuakeError> {
    let batch = classify_batch(args.depths.iter().map(String::as_str));
    let counts = summarize(batch.valid_categories());

    if args.json {
        let rows: Vec<serde_json::Value> = args
            .depths
            .iter()
            .zip(&batch.classifications)
            .map(|(input, classification)| {
                serde_json::json!({
                    "input": input,
                    "category": classification.category().map(|c| c.name()),
                    "danger": classification.category().map(|c| c.danger().label()),
                })
            })
            .collect();
        let report = serde_json::json!({
            "results": rows,
            "dropped": batch.dropped,
            "counts": counts,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.csv {
        let (csv_output, dropped) = classify_csv(&args.depths, args.danger)?;
        print!("{}", csv_output);
        if dropped > 0 {
            tracing::warn!("⚠️ Dropped {} unparseable depth value(s)", dropped);
            eprintln!("⚠️ {} value(s) skipped", dropped);
        }
        return Ok(());
    }

    for input in &args.depths {
        match ClassificationResult::new(input.as_str()) {
            Some(result) => println!(
                "{:>10} km  {:<26} danger: {}",
                result.depth_km,
                result.category.label(),
                result.danger
            ),
            None => println!("{:>10}     {}", input, Classification::Invalid.label()),
        }
    }

    println!();
    for (category, count) in counts.iter() {
        println!("  {:<13} {}", category.name(), count);
    }
    if batch.dropped > 0 {
        println!("  {} value(s) skipped", batch.dropped);
    }
    Ok(())
}

/// 只輸出有效深度，並回傳被略過的筆數
fn classify_csv(depths: &[String], include_danger: bool) -> Result<(String, usize), QuakeError> {
    let results: Vec<ClassificationResult> = depths
        .iter()
        .filter_map(|d| ClassificationResult::new(d.as_str()))
        .collect();
    let dropped = depths.len() - results.len();
    Ok((export_results(&results, include_danger)?, dropped))
}

async fn run_batch(args: BatchArgs) -> Result<(), QuakeError> {
    if let Some(path) = args.config.clone() {
        tracing::info!("📁 Loading configuration from: {}", path);
        let mut config = TomlConfig::from_file(&path)?;
        args.apply_to(&mut config);
        let monitor = args.monitor || config.monitoring_enabled();
        execute_batch(config, monitor).await
    } else {
        let monitor = args.monitor;
        execute_batch(args, monitor).await
    }
}

async fn execute_batch<C>(config: C, monitor: bool) -> Result<(), QuakeError>
where
    C: ConfigProvider + Validate,
{
    config.validate()?;
    tracing::info!("✅ Configuration validated");
    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 相對路徑以目前工作目錄為準
    let storage = LocalStorage::new(".");
    let pipeline = CatalogPipeline::new(storage, config);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor);

    let output_path = engine.run().await?;
    println!("✅ Depth classification completed");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn run_predict(args: PredictArgs) -> Result<(), QuakeError> {
    let features = args.feature_vector()?;
    let models = args.models_config()?;

    let handles = ModelHandles::from_config(&models);
    let report = predict_depth_class(&handles, &features).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🔍 Model predictions");
    print_prediction(&report.tree);
    print_prediction(&report.sequence);
    Ok(())
}

fn print_prediction(prediction: &ModelPrediction) {
    println!("  {}", prediction.model);
    println!("    Depth class : {}", prediction.verdict.label());
    println!("    Danger      : {}", prediction.verdict.danger_label());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_csv_reports_dropped_values() {
        let depths: Vec<String> = ["10", "abc", "NaN", "350"]
            .into_iter()
            .map(String::from)
            .collect();

        let (csv_output, dropped) = classify_csv(&depths, false).unwrap();

        assert_eq!(dropped, 2);
        assert_eq!(csv_output, "depth_km,depth_category\n10,Shallow\n350,Deep\n");
    }
}
