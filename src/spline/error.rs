//! Error types for spline evaluation, queries and builders.

use thiserror::Error;

/// Errors returned by [`Spline`](super::Spline) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    /// Control points or configuration changed since the last refresh.
    #[error("spline samples are stale, call refresh() before querying")]
    Stale,

    /// The spline has fewer than two control points, so nothing was sampled.
    #[error("spline has no sampled points")]
    Empty,

    /// A builder was asked to append to a spline without control points.
    #[error("cannot append a segment to a spline without control points")]
    NothingToAppend,

    /// A builder received a numeric input outside its valid range.
    #[error("invalid builder input `{name}`: {value}")]
    InvalidBuilderInput {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
}
