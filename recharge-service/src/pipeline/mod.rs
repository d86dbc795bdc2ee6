use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {}: {message}", .path.display())]
    Source { path: PathBuf, message: String },
    #[error("source error: {}, row {row}: {message}", .path.display())]
    Row {
        path: PathBuf,
        row: usize,
        message: String,
    },
    #[error("config error: {0}")]
    Config(String),
    #[error("sink error: {artifact} -> {}: {message}", .path.display())]
    Sink {
        artifact: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("{} ledger write(s) failed: {}", .0.len(), join_errors(.0))]
    Ledger(Vec<PipelineError>),
}

fn join_errors(errors: &[PipelineError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Produces a whole normalized table in one call.
pub trait Source<T> {
    fn load(&self) -> Result<Vec<T>, PipelineError>;
}

/// Pure table-to-table stage. Missing configuration degrades to defaults,
/// so stages have no failure path.
pub trait Transform<I, O> {
    fn apply(&self, input: Vec<I>) -> Vec<O>;
}

pub trait Sink<T> {
    fn write(&self, input: &T) -> Result<(), PipelineError>;
}
