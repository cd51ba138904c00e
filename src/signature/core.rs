use std::any::{type_name, TypeId};
use std::fmt;

use http::StatusCode;
use smallvec::SmallVec;

use super::ClassificationError;
use crate::header::HeaderProvider;
use crate::Request;

/// Reflection metadata for a single type.
///
/// Identity is the [`TypeId`]; the short name (module paths stripped) is what
/// diagnostics print.
#[derive(Debug, Clone)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    short: String,
}

impl TypeRef {
    /// Describe `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        let name = type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            name,
            short: short_type_name(name),
        }
    }

    /// Whether this describes `T`.
    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name as reported by [`std::any::type_name`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name with every module path removed, e.g. `Option<String>`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short)
    }
}

/// Strip `path::to::` prefixes from every path inside a type name.
///
/// `&mut dyn autojson::header::HeaderProvider` becomes `&mut dyn HeaderProvider` and
/// `core::option::Option<alloc::string::String>` becomes `Option<String>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
        } else if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push(c);
            segment_start = out.len();
        }
    }
    out
}

/// Kind of a value offered for wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    Char,
    Str,
    String,
    Slice,
    Map,
    Unit,
    Func,
}

impl Kind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::Str => "str",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Unit => "unit",
            Kind::Func => "func",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional parameter and output types of a callable.
///
/// Outputs are flattened: `(StatusCode, Result<Option<T>, Error>)` is described as the
/// three outputs `StatusCode`, `Option<T>`, `Error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: SmallVec<[TypeRef; 2]>,
    results: SmallVec<[TypeRef; 3]>,
}

impl Signature {
    /// An empty `fn()` signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter of type `T`.
    #[must_use]
    pub fn param<T: ?Sized + 'static>(mut self) -> Self {
        self.params.push(TypeRef::of::<T>());
        self
    }

    /// Append an output of type `T`.
    #[must_use]
    pub fn returns<T: ?Sized + 'static>(mut self) -> Self {
        self.results.push(TypeRef::of::<T>());
        self
    }

    #[must_use]
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    #[must_use]
    pub fn results(&self) -> &[TypeRef] {
        &self.results
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        write_list(f, &self.params)?;
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] => write!(f, " -> {single}"),
            many => {
                f.write_str(" -> (")?;
                write_list(f, many)?;
                f.write_str(")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TypeRef]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

/// Reflection metadata of a value offered for wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A callable with the given signature
    Func(Signature),
    /// Anything else
    Value(Kind),
}

impl Candidate {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Candidate::Func(_) => Kind::Func,
            Candidate::Value(kind) => *kind,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Func(signature) => signature.fmt(f),
            Candidate::Value(kind) => kind.fmt(f),
        }
    }
}

/// Classification result: which of the eight accepted forms a handler has.
///
/// Every `(takes_context, has_status_code, has_error)` combination maps to exactly one
/// variant, see [`Shape::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `fn() -> Option<T>`
    Body,
    /// `fn() -> Result<Option<T>, Error>`
    BodyOrError,
    /// `fn() -> (StatusCode, Option<T>)`
    StatusBody,
    /// `fn() -> (StatusCode, Result<Option<T>, Error>)`
    StatusBodyOrError,
    /// `fn(&mut dyn HeaderProvider, &Request) -> Option<T>`
    ContextBody,
    /// `fn(&mut dyn HeaderProvider, &Request) -> Result<Option<T>, Error>`
    ContextBodyOrError,
    /// `fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Option<T>)`
    ContextStatusBody,
    /// `fn(&mut dyn HeaderProvider, &Request) -> (StatusCode, Result<Option<T>, Error>)`
    ContextStatusBodyOrError,
}

impl Shape {
    #[must_use]
    pub fn from_flags(takes_context: bool, has_status_code: bool, has_error: bool) -> Self {
        match (takes_context, has_status_code, has_error) {
            (false, false, false) => Shape::Body,
            (false, false, true) => Shape::BodyOrError,
            (false, true, false) => Shape::StatusBody,
            (false, true, true) => Shape::StatusBodyOrError,
            (true, false, false) => Shape::ContextBody,
            (true, false, true) => Shape::ContextBodyOrError,
            (true, true, false) => Shape::ContextStatusBody,
            (true, true, true) => Shape::ContextStatusBodyOrError,
        }
    }

    /// Whether the handler receives the header provider and the request.
    #[must_use]
    pub fn takes_context(self) -> bool {
        matches!(
            self,
            Shape::ContextBody
                | Shape::ContextBodyOrError
                | Shape::ContextStatusBody
                | Shape::ContextStatusBodyOrError
        )
    }

    /// Whether the first output is the response status.
    #[must_use]
    pub fn has_status_code(self) -> bool {
        matches!(
            self,
            Shape::StatusBody
                | Shape::StatusBodyOrError
                | Shape::ContextStatusBody
                | Shape::ContextStatusBodyOrError
        )
    }

    /// Whether the last output is an error.
    #[must_use]
    pub fn has_error(self) -> bool {
        matches!(
            self,
            Shape::BodyOrError
                | Shape::StatusBodyOrError
                | Shape::ContextBodyOrError
                | Shape::ContextStatusBodyOrError
        )
    }
}

/// Designated status-code output type.
#[must_use]
pub fn status_type() -> TypeRef {
    TypeRef::of::<StatusCode>()
}

/// Designated error output type.
#[must_use]
pub fn error_type() -> TypeRef {
    TypeRef::of::<anyhow::Error>()
}

/// Designated first parameter type: the header-access capability.
#[must_use]
pub fn header_type() -> TypeRef {
    TypeRef::of::<&'static mut dyn HeaderProvider>()
}

/// Designated second parameter type: the request.
#[must_use]
pub fn request_type() -> TypeRef {
    TypeRef::of::<&'static Request>()
}

/// Classify a candidate into one of the eight accepted shapes.
///
/// Outputs are validated before parameters. Within each group the lower index is
/// reported first.
///
/// # Errors
///
/// Returns a [`ClassificationError`] describing the first mismatch found.
pub fn classify(candidate: &Candidate) -> Result<Shape, ClassificationError> {
    let signature = match candidate {
        Candidate::Func(signature) => signature,
        Candidate::Value(kind) => return Err(ClassificationError::NotAFunction { kind: *kind }),
    };

    let status = status_type();
    let error = error_type();
    let (has_status_code, has_error) = match signature.results() {
        [_] => (false, false),
        [first, second] => {
            if *second == error {
                (false, true)
            } else if *first == status {
                (true, false)
            } else {
                return Err(return_mismatch(signature, 0, first, &status));
            }
        }
        [first, _, third] => {
            if *third != error {
                return Err(return_mismatch(signature, 2, third, &error));
            }
            if *first != status {
                return Err(return_mismatch(signature, 0, first, &status));
            }
            (true, true)
        }
        _ => return Err(unknown(signature)),
    };

    let takes_context = match signature.params() {
        [] => false,
        [first, second] => {
            let header = header_type();
            if *first != header {
                return Err(param_mismatch(signature, 0, first, &header));
            }
            let request = request_type();
            if *second != request {
                return Err(param_mismatch(signature, 1, second, &request));
            }
            true
        }
        _ => return Err(unknown(signature)),
    };

    Ok(Shape::from_flags(takes_context, has_status_code, has_error))
}

fn unknown(signature: &Signature) -> ClassificationError {
    ClassificationError::UnknownSignature {
        signature: signature.to_string(),
    }
}

fn return_mismatch(
    signature: &Signature,
    index: usize,
    got: &TypeRef,
    want: &TypeRef,
) -> ClassificationError {
    ClassificationError::ReturnTypeMismatch {
        index,
        got: got.to_string(),
        want: want.to_string(),
        signature: signature.to_string(),
    }
}

fn param_mismatch(
    signature: &Signature,
    index: usize,
    got: &TypeRef,
    want: &TypeRef,
) -> ClassificationError {
    ClassificationError::ParamTypeMismatch {
        index,
        got: got.to_string(),
        want: want.to_string(),
        signature: signature.to_string(),
    }
}
