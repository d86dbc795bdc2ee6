#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("unknown utility code '{0}' (expected G, E or W)")]
    UtilityCode(String),
    #[error("invalid flow flag '{0}'")]
    FlowFlag(String),
    #[error("invalid date '{0}'")]
    Date(String),
}
