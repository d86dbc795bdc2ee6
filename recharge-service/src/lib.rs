pub mod pipeline;
pub mod config;
pub mod sources;
pub mod sinks;
pub mod transform;
pub mod observability;
pub mod metrics_export;
pub mod site;
pub mod summary;

pub use pipeline::PipelineError;
pub use site::Site;
pub use summary::RunSummary;
