//! # Signature Module
//!
//! The signature module decides, once per handler, which of the eight accepted
//! handler shapes a value has. It works on reflection metadata ([`Candidate`]) rather
//! than on the value itself, so the same check covers typed [`Callable`]s and values
//! that are not callable at all.
//!
//! ## Accepted Shapes
//!
//! Inputs are either nothing or `(&mut dyn HeaderProvider, &Request)`. Outputs are one
//! of:
//!
//! - `Option<T>`
//! - `Result<Option<T>, anyhow::Error>` (positionally: body, error)
//! - `(StatusCode, Option<T>)`
//! - `(StatusCode, Result<Option<T>, anyhow::Error>)` (status, body, error)
//!
//! Every input/output combination is valid, giving the eight [`Shape`] variants.
//!
//! ## Diagnostics
//!
//! Rejections render the full signature with short type names:
//!
//! ```rust
//! use autojson::signature::{classify, Candidate, Signature};
//!
//! let candidate = Candidate::Func(Signature::new().returns::<String>().returns::<String>());
//! let err = classify(&candidate).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "return parameter type mismatch: index 0, got String, want StatusCode [fn() -> (String, String)]"
//! );
//! ```
//!
//! Return outputs are checked before parameters, and index 0 before later indices.
//!
//! [`Callable`]: crate::handler::Callable

mod core;
mod error;

pub use self::core::*;
pub use error::ClassificationError;
