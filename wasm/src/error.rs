/// Errors surfaced by the cloth solver.
///
/// None of these are transient: every pass is a pure transform over in-memory
/// buffers, so a failure is either a bad configuration or a broken invariant.
#[derive(Debug, thiserror::Error)]
pub enum ClothError {
    #[error("invalid grid configuration: seg_x={seg_x}, seg_y={seg_y} (need >= 1 per axis and an addressable particle count)")]
    InvalidConfiguration { seg_x: u32, seg_y: u32 },

    #[error("step requested before the simulation was reset")]
    InvalidStateTransition,

    #[error("particle buffer holds {actual} records, grid expects {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}
