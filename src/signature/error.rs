use thiserror::Error;

use super::Kind;

/// Reason a value was rejected at wrap-time.
///
/// Every variant except [`ClassificationError::NotAFunction`] carries the rendered
/// signature of the offending value so the message alone identifies the handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    /// The value offered for wrapping is not callable.
    #[error("handler kind {kind} is not a func")]
    NotAFunction {
        /// Kind of the value that was offered
        kind: Kind,
    },
    /// Wrong number of parameters or outputs.
    #[error("unknown handler signature: {signature}")]
    UnknownSignature {
        /// Rendered signature, e.g. `fn(i32) -> Error`
        signature: String,
    },
    /// An output has the wrong type for its position.
    #[error("return parameter type mismatch: index {index}, got {got}, want {want} [{signature}]")]
    ReturnTypeMismatch {
        /// Zero-based output position
        index: usize,
        /// Short name of the type found
        got: String,
        /// Short name of the type required
        want: String,
        /// Rendered signature
        signature: String,
    },
    /// A parameter has the wrong type for its position.
    #[error("input parameter type mismatch: index {index}, got {got}, want {want} [{signature}]")]
    ParamTypeMismatch {
        /// Zero-based parameter position
        index: usize,
        /// Short name of the type found
        got: String,
        /// Short name of the type required
        want: String,
        /// Rendered signature
        signature: String,
    },
}
