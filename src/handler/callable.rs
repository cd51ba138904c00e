use std::collections::HashMap;
use std::fmt;

use http::StatusCode;

use crate::header::HeaderProvider;
use crate::signature::{Candidate, Kind, Shape, Signature};
use crate::Request;

/// Output of a handler that can fail: the success body or the error to convert.
pub type HandlerResult<T> = Result<Option<T>, anyhow::Error>;

type BodyFn<T> = dyn Fn() -> Option<T> + Send + Sync;
type BodyOrErrorFn<T> = dyn Fn() -> HandlerResult<T> + Send + Sync;
type StatusBodyFn<T> = dyn Fn() -> (StatusCode, Option<T>) + Send + Sync;
type StatusBodyOrErrorFn<T> = dyn Fn() -> (StatusCode, HandlerResult<T>) + Send + Sync;
type ContextBodyFn<T> = dyn Fn(&mut dyn HeaderProvider, &Request) -> Option<T> + Send + Sync;
type ContextBodyOrErrorFn<T> =
    dyn Fn(&mut dyn HeaderProvider, &Request) -> HandlerResult<T> + Send + Sync;
type ContextStatusBodyFn<T> =
    dyn Fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Option<T>) + Send + Sync;
type ContextStatusBodyOrErrorFn<T> =
    dyn Fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, HandlerResult<T>) + Send + Sync;

/// A handler function in one of the eight accepted shapes.
///
/// Each variant stores the function behind its concrete signature, so invoking it
/// never needs runtime type inspection. Build one with the constructor named after
/// the shape:
///
/// ```rust
/// use autojson::Callable;
/// use http::StatusCode;
///
/// let teapot = Callable::status_body(|| (StatusCode::IM_A_TEAPOT, Some("short and stout")));
/// let echo = Callable::context_body(|_headers, req| Some(req.uri().path().to_string()));
/// # let _ = (teapot, echo);
/// ```
pub enum Callable<T> {
    Body(Box<BodyFn<T>>),
    BodyOrError(Box<BodyOrErrorFn<T>>),
    StatusBody(Box<StatusBodyFn<T>>),
    StatusBodyOrError(Box<StatusBodyOrErrorFn<T>>),
    ContextBody(Box<ContextBodyFn<T>>),
    ContextBodyOrError(Box<ContextBodyOrErrorFn<T>>),
    ContextStatusBody(Box<ContextStatusBodyFn<T>>),
    ContextStatusBodyOrError(Box<ContextStatusBodyOrErrorFn<T>>),
}

impl<T: 'static> Callable<T> {
    /// `fn() -> Option<T>`
    pub fn body<F>(f: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Callable::Body(Box::new(f))
    }

    /// `fn() -> Result<Option<T>, anyhow::Error>`
    pub fn body_or_error<F>(f: F) -> Self
    where
        F: Fn() -> HandlerResult<T> + Send + Sync + 'static,
    {
        Callable::BodyOrError(Box::new(f))
    }

    /// `fn() -> (StatusCode, Option<T>)`
    pub fn status_body<F>(f: F) -> Self
    where
        F: Fn() -> (StatusCode, Option<T>) + Send + Sync + 'static,
    {
        Callable::StatusBody(Box::new(f))
    }

    /// `fn() -> (StatusCode, Result<Option<T>, anyhow::Error>)`
    pub fn status_body_or_error<F>(f: F) -> Self
    where
        F: Fn() -> (StatusCode, HandlerResult<T>) + Send + Sync + 'static,
    {
        Callable::StatusBodyOrError(Box::new(f))
    }

    /// `fn(&mut dyn HeaderProvider, &Request) -> Option<T>`
    pub fn context_body<F>(f: F) -> Self
    where
        F: Fn(&mut dyn HeaderProvider, &Request) -> Option<T> + Send + Sync + 'static,
    {
        Callable::ContextBody(Box::new(f))
    }

    /// `fn(&mut dyn HeaderProvider, &Request) -> Result<Option<T>, anyhow::Error>`
    pub fn context_body_or_error<F>(f: F) -> Self
    where
        F: Fn(&mut dyn HeaderProvider, &Request) -> HandlerResult<T> + Send + Sync + 'static,
    {
        Callable::ContextBodyOrError(Box::new(f))
    }

    /// `fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Option<T>)`
    pub fn context_status_body<F>(f: F) -> Self
    where
        F: Fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Option<T>)
            + Send
            + Sync
            + 'static,
    {
        Callable::ContextStatusBody(Box::new(f))
    }

    /// `fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Result<Option<T>, anyhow::Error>)`
    pub fn context_status_body_or_error<F>(f: F) -> Self
    where
        F: Fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, HandlerResult<T>)
            + Send
            + Sync
            + 'static,
    {
        Callable::ContextStatusBodyOrError(Box::new(f))
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Callable::Body(_) => Shape::Body,
            Callable::BodyOrError(_) => Shape::BodyOrError,
            Callable::StatusBody(_) => Shape::StatusBody,
            Callable::StatusBodyOrError(_) => Shape::StatusBodyOrError,
            Callable::ContextBody(_) => Shape::ContextBody,
            Callable::ContextBodyOrError(_) => Shape::ContextBodyOrError,
            Callable::ContextStatusBody(_) => Shape::ContextStatusBody,
            Callable::ContextStatusBodyOrError(_) => Shape::ContextStatusBodyOrError,
        }
    }

    /// Positional signature of the stored function.
    #[must_use]
    pub fn signature(&self) -> Signature {
        let shape = self.shape();
        let mut signature = Signature::new();
        if shape.takes_context() {
            signature = signature
                .param::<&'static mut dyn HeaderProvider>()
                .param::<&'static Request>();
        }
        if shape.has_status_code() {
            signature = signature.returns::<StatusCode>();
        }
        signature = signature.returns::<Option<T>>();
        if shape.has_error() {
            signature = signature.returns::<anyhow::Error>();
        }
        signature
    }
}

impl<T: 'static> fmt::Debug for Callable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("shape", &self.shape())
            .field("signature", &self.signature().to_string())
            .finish()
    }
}

/// A value that can be offered to [`JsonHandler::new`](crate::JsonHandler::new).
///
/// [`Callable`] is the only implementor that yields a function. The implementations
/// for plain values exist so that wrapping one fails with a precise "not a func"
/// diagnostic instead of being unrepresentable.
pub trait IntoCallable<T> {
    /// Reflection metadata used for classification.
    fn candidate(&self) -> Candidate;

    /// The function to invoke, if this value is one.
    fn into_callable(self) -> Option<Callable<T>>;
}

impl<T: 'static> IntoCallable<T> for Callable<T> {
    fn candidate(&self) -> Candidate {
        Candidate::Func(self.signature())
    }

    fn into_callable(self) -> Option<Callable<T>> {
        Some(self)
    }
}

macro_rules! not_callable {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl<T> IntoCallable<T> for $ty {
                fn candidate(&self) -> Candidate {
                    Candidate::Value($kind)
                }

                fn into_callable(self) -> Option<Callable<T>> {
                    None
                }
            }
        )*
    };
}

not_callable!(
    bool => Kind::Bool,
    i8 => Kind::Int,
    i16 => Kind::Int,
    i32 => Kind::Int,
    i64 => Kind::Int,
    isize => Kind::Int,
    u8 => Kind::Uint,
    u16 => Kind::Uint,
    u32 => Kind::Uint,
    u64 => Kind::Uint,
    usize => Kind::Uint,
    f32 => Kind::Float,
    f64 => Kind::Float,
    char => Kind::Char,
    String => Kind::String,
    () => Kind::Unit,
);

impl<'a, T> IntoCallable<T> for &'a str {
    fn candidate(&self) -> Candidate {
        Candidate::Value(Kind::Str)
    }

    fn into_callable(self) -> Option<Callable<T>> {
        None
    }
}

impl<T, U> IntoCallable<T> for Vec<U> {
    fn candidate(&self) -> Candidate {
        Candidate::Value(Kind::Slice)
    }

    fn into_callable(self) -> Option<Callable<T>> {
        None
    }
}

impl<T, K, V, S> IntoCallable<T> for HashMap<K, V, S> {
    fn candidate(&self) -> Candidate {
        Candidate::Value(Kind::Map)
    }

    fn into_callable(self) -> Option<Callable<T>> {
        None
    }
}
