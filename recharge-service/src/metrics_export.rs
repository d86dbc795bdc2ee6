use std::{fs, path::Path};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::pipeline::PipelineError;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Calling this more than once is a no-op.
pub fn init() -> Result<(), PipelineError> {
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| PipelineError::Config(format!("failed to install Prometheus metrics recorder: {e}")))?;

    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

/// Write the current exposition text to `path` for a textfile collector.
pub fn write_textfile(path: &Path) -> Result<(), PipelineError> {
    let Some(handle) = PROM_HANDLE.get() else {
        tracing::warn!(path = %path.display(), "metrics recorder not initialized, skipping textfile");
        return Ok(());
    };

    fs::write(path, handle.render()).map_err(|e| PipelineError::Sink {
        artifact: "metrics",
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
