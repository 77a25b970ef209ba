use thiserror::Error;

/// Errors surfaced by the chart engine.
///
/// Malformed task input never errors: bad dates are normalized with the
/// `invalid` flag as the only signal, unresolved dependency ids are dropped
/// when building arrows, and a resize below one grid column is simply not
/// applied. The one fatal condition is a drawing surface that cannot host
/// the chart.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The renderer rejected the drawing surface at setup.
    #[error("render target is not usable: {0}")]
    RenderTarget(#[from] crate::render::TargetError),
}
