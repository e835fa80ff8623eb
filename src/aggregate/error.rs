#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("no attribute selected")]
    EmptySelection,
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("at most two group keys are supported, got {0}")]
    TooManyGroupKeys(usize),
}
