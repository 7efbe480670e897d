use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = ColtypeError> = std::result::Result<T, E>;

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed grammar: missing brackets, wrong nested-field arity,
    /// conflicting nullability modifiers.
    InvalidTypeDefinition,
    /// A leaf type name that isn't in the registry.
    UnknownDataType,
    /// Anything else (io in the cli, harness failures).
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTypeDefinition => write!(f, "Invalid type definition"),
            Self::UnknownDataType => write!(f, "Unknown data type"),
            Self::Other => write!(f, "Error"),
        }
    }
}

#[derive(Debug)]
pub struct ColtypeError {
    inner: Box<ColtypeErrorInner>,
}

#[derive(Debug)]
struct ColtypeErrorInner {
    kind: ErrorKind,
    msg: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ColtypeError {
    pub fn new(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Other, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        ColtypeError {
            inner: Box::new(ColtypeErrorInner {
                kind,
                msg: msg.into(),
                source: None,
            }),
        }
    }

    pub fn with_source(
        msg: impl Into<Cow<'static, str>>,
        source: Box<dyn Error + Send + Sync>,
    ) -> Self {
        ColtypeError {
            inner: Box::new(ColtypeErrorInner {
                kind: ErrorKind::Other,
                msg: msg.into(),
                source: Some(source),
            }),
        }
    }

    /// Malformed type declaration.
    pub fn invalid_definition(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::InvalidTypeDefinition, msg)
    }

    /// Type name not found in the registry.
    pub fn unknown_type(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::UnknownDataType, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn get_msg(&self) -> &str {
        self.inner.msg.as_ref()
    }

    pub fn is_invalid_definition(&self) -> bool {
        self.inner.kind == ErrorKind::InvalidTypeDefinition
    }

    pub fn is_unknown_type(&self) -> bool {
        self.inner.kind == ErrorKind::UnknownDataType
    }
}

impl fmt::Display for ColtypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.inner.kind, self.inner.msg)?;
        if let Some(source) = &self.inner.source {
            write!(f, "\nError source: {source}")?;
        }
        Ok(())
    }
}

impl Error for ColtypeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<fmt::Error> for ColtypeError {
    fn from(value: fmt::Error) -> Self {
        ColtypeError::with_source("Format error", Box::new(value))
    }
}

impl From<std::io::Error> for ColtypeError {
    fn from(value: std::io::Error) -> Self {
        ColtypeError::with_source("IO error", Box::new(value))
    }
}

/// Attach a message to an external error, converting it into a
/// `ColtypeError`.
pub trait ResultExt<T, E> {
    fn context(self, msg: &'static str) -> Result<T>;

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Error + Send + Sync + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(ColtypeError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(ColtypeError::with_source(f(), Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, msg: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, msg: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(ColtypeError::new(msg)),
        }
    }
}
