use anyhow::Result;
use recharge_service::{
    config::{parse_recharge_month, AppConfig},
    metrics_export, observability, Site,
};

fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Install the metrics recorder if a textfile is configured
    if cfg.metrics.is_some() {
        metrics_export::init()?;
    }

    // Optional recharge month override: YYYY-MM or YYYY-MM-DD
    let month = std::env::args().nth(1).map(|s| parse_recharge_month(&s)).transpose()?;

    let result = Site::from_config(&cfg).recharge_tenants(month);

    if let Some(metrics_cfg) = &cfg.metrics {
        if let Err(e) = metrics_export::write_textfile(&metrics_cfg.textfile_path) {
            tracing::warn!(error = %e, "failed to write metrics textfile");
        }
    }

    let summary = result?;
    println!(
        "{}: {} charged rows, total gross {:.2} GBP, digest {}",
        summary.output_dir.display(),
        summary.charged_rows,
        summary.total_gross,
        summary.digest
    );
    Ok(())
}
