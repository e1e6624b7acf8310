use thiserror::Error;

/// Result type alias using ReconcileError
pub type Result<T> = std::result::Result<T, ReconcileError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcErrorKind {
    // Input
    /// A rule path could not be parsed (empty segment, mismatched wildcards)
    InvalidPath,
    /// A consolidation or display expression is malformed
    PatternCompilation,
    /// A rules file is not valid TOML or carries unknown keys
    InvalidRules,

    // Normalization
    /// A caller-supplied `map` function returned an error
    MapFailed,

    // Integration/IO
    Io,
    Serialization,
}

impl RcErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            RcErrorKind::InvalidPath => "ERR_INVALID_PATH",
            RcErrorKind::PatternCompilation => "ERR_PATTERN_COMPILATION",
            RcErrorKind::InvalidRules => "ERR_INVALID_RULES",
            RcErrorKind::MapFailed => "ERR_MAP_FAILED",
            RcErrorKind::Io => "ERR_IO",
            RcErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus optional
/// context (operation, path, expression) for debugging.
#[derive(Debug, Clone)]
pub struct RcError {
    kind: RcErrorKind,
    op: Option<String>,
    path: Option<String>,
    expression: Option<String>,
    message: String,
    source: Option<Box<RcError>>,
}

impl RcError {
    /// Create a new error with the specified kind
    pub fn new(kind: RcErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            expression: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add pattern expression context
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: RcError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> RcErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&RcError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for RcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(expression) = &self.expression {
            write!(f, " (expression: {})", expression)?;
        }
        Ok(())
    }
}

impl std::error::Error for RcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for reconciliation operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// Wildcard expression could not be compiled
    #[error("Invalid pattern expression '{expression}': {reason}")]
    PatternCompilation { expression: String, reason: String },

    /// Rule path could not be parsed
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A `map` rule's function failed
    #[error("Map function failed at '{path}': {message}")]
    MapFailed { path: String, message: String },

    /// Rules file is malformed
    #[error("Invalid rules: {reason}")]
    InvalidRules { reason: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<ReconcileError> for RcError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::PatternCompilation { expression, reason } => {
                RcError::new(RcErrorKind::PatternCompilation)
                    .with_op("compile_pattern")
                    .with_expression(expression)
                    .with_message(reason)
            }

            ReconcileError::InvalidPath { path, reason } => RcError::new(RcErrorKind::InvalidPath)
                .with_path(path)
                .with_message(reason),

            ReconcileError::MapFailed { path, message } => RcError::new(RcErrorKind::MapFailed)
                .with_op("normalize_before")
                .with_path(path)
                .with_message(message),

            ReconcileError::InvalidRules { reason } => {
                RcError::new(RcErrorKind::InvalidRules).with_message(reason)
            }

            ReconcileError::Io { path, message } => RcError::new(RcErrorKind::Io)
                .with_path(path)
                .with_message(message),

            ReconcileError::Serialization { message } => {
                RcError::new(RcErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ReconcileError {
    fn from(err: serde_json::Error) -> Self {
        ReconcileError::Serialization {
            message: err.to_string(),
        }
    }
}
