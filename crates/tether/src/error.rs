/// Errors raised at the configuration boundary.
///
/// The geometry pipeline itself never fails: missing entities, unknown curve styles and
/// unroutable obstacles all degrade to a safe default.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown dock position: {name}")]
    UnknownDock { name: String },
    #[error("unknown head shape: {name}")]
    UnknownHeadShape { name: String },
    #[error("invalid timing value: {value:?}")]
    InvalidTiming { value: String },
    #[error("invalid scene: {message}")]
    InvalidScene { message: String },
    #[error("connector JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
