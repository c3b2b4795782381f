/// Result type for scene-loading operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that prevent a scene from being loaded
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("scene contains no lights")]
    NoLights,

    #[error("invalid light #{id}: {reason}")]
    InvalidLight { id: usize, reason: &'static str },

    #[error("cannot build an alias table out of zero weights")]
    EmptyWeights,

    #[error("invalid weight #{index}: {weight}")]
    InvalidWeight { index: usize, weight: f32 },
}
