//! Structured schema diagnostics and the valid/invalid build result

use serde::Serialize;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Stable numeric diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u32)]
pub enum ModelBuilderErrorCode {
    UnknownError = 6000,
    InvalidSchemaEncountered = 6001,
    NoPrimaryKeyDefined = 6002,
    MissingEntity = 6004,
    UnsupportedType = 6005,
    FacetValueOutOfRange = 6006,
    ParameterDirectionNotValid = 6007,
    AssociationMissingKeyColumn = 6008,
    InvalidKeyTypeFound = 6011,
    CannotCreateEntityWithoutPrimaryKey = 6013,
    CoercingNullablePrimaryKeyPropertyToNonNullable = 6029,
    ExcludedColumnWasAKeyColumn = 6031,
    UnsupportedDbRelationship = 6035,
    UnsupportedForeignKeyPattern = 6036,
    SharedForeignKey = 6038,
    MissingTvfReturnTable = 6046,
    TableValuedFunctionsNotSupported = 6047,
}

impl ModelBuilderErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// One diagnostic produced while building a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdmSchemaError {
    pub message: String,
    pub code: ModelBuilderErrorCode,
    pub severity: Severity,
    /// Name of the store object the diagnostic originates from
    pub source: Option<String>,
}

impl EdmSchemaError {
    pub fn new(
        code: ModelBuilderErrorCode,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code,
            severity,
            source: None,
        }
    }

    pub fn warning(code: ModelBuilderErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn error(code: ModelBuilderErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn error_code(&self) -> u32 {
        self.code.code()
    }
}

impl std::fmt::Display for EdmSchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.error_code(), self.message)
    }
}

/// An object produced by a builder, either usable or kept only for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Built<T> {
    /// Usable object; warnings describe any degradation
    Valid {
        item: T,
        warnings: Vec<EdmSchemaError>,
    },
    /// Object that must not be wired into the model; kept so its errors stay visible
    Invalid {
        item: T,
        errors: Vec<EdmSchemaError>,
    },
}

impl<T> Built<T> {
    pub fn valid(item: T, warnings: Vec<EdmSchemaError>) -> Self {
        Built::Valid { item, warnings }
    }

    pub fn invalid(item: T, errors: Vec<EdmSchemaError>) -> Self {
        Built::Invalid { item, errors }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Built::Valid { .. })
    }

    pub fn item(&self) -> &T {
        match self {
            Built::Valid { item, .. } | Built::Invalid { item, .. } => item,
        }
    }

    pub fn into_item(self) -> T {
        match self {
            Built::Valid { item, .. } | Built::Invalid { item, .. } => item,
        }
    }

    /// The object, only when it is valid
    pub fn as_valid(&self) -> Option<&T> {
        match self {
            Built::Valid { item, .. } => Some(item),
            Built::Invalid { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &[EdmSchemaError] {
        match self {
            Built::Valid { warnings, .. } => warnings,
            Built::Invalid { errors, .. } => errors,
        }
    }

    /// Whether any attached diagnostic carries `code`
    pub fn has_code(&self, code: ModelBuilderErrorCode) -> bool {
        self.diagnostics().iter().any(|e| e.code == code)
    }
}
