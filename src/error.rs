use thiserror::Error;

use crate::core::AxisId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("axis `{axis}` has no side set")]
    MissingAxisSide { axis: String },

    #[error("can't remove listener from `{owner}`: it has been added more than once")]
    AmbiguousListenerRemoval { owner: String },

    #[error("unknown axis id {0:?}")]
    UnknownAxis(AxisId),

    #[error("unknown renderer `{0}`")]
    UnknownRenderer(String),

    #[error("canvas backend failure: {0}")]
    Backend(String),
}
