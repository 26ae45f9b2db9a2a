use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineSoundError {
    #[error("child index {index} out of range for {len} children")]
    ChildIndexOutOfRange { index: usize, len: usize },
    #[error("engine sound node already has the maximum of {max} children")]
    TooManyChildren { max: usize },
}

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse preset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to build engine sound graph: {0}")]
    Graph(#[from] EngineSoundError),
}
