//! Two-tier error handling (§7): a pre-flight `RenderError` for conditions
//! that abort the whole render before any pixel is touched, versus
//! per-feature soft failures that are logged (via `tracing::warn!` at the
//! call site) and skip just that feature. `InvariantViolation`s — states
//! the type system should have made unreachable — panic rather than
//! return an error, matching the teacher's own `unreachable!`-on-corrupt-
//! state style.

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("map has zero width or height")]
    EmptyCanvas,

    #[error("layer {layer:?} references unknown style {style:?}")]
    UnknownStyle { layer: String, style: String },

    #[error("render was cancelled")]
    Cancelled,
}
