//! Error types for budget and credential operations.
//!
//! Only [`Error::ConflictingLimitSpecification`] is raised locally. Everything
//! the provider returns is wrapped unchanged in [`RemoteApiError`], with a
//! coarse classification so callers can branch on not-found / already-exists
//! without string matching.

/// Error from a budget or credential operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Only one of 'BudgetLimit' or 'AutoAdjustData' can be provided")]
    ConflictingLimitSpecification,

    #[error(transparent)]
    Remote(#[from] RemoteApiError),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl Error {
    /// The remote error, if this failure came from the provider.
    pub fn remote(&self) -> Option<&RemoteApiError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.remote().map_or(false, |e| e.kind == RemoteErrorKind::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        self.remote()
            .map_or(false, |e| e.kind == RemoteErrorKind::AlreadyExists)
    }

    pub fn is_access_denied(&self) -> bool {
        self.remote()
            .map_or(false, |e| e.kind == RemoteErrorKind::AccessDenied)
    }
}

/// Error returned by the provider API, passed through verbatim.
#[derive(Debug, Clone)]
pub struct RemoteApiError {
    /// Coarse classification of `code`
    pub kind: RemoteErrorKind,
    /// Provider error code (e.g. `NotFoundException`)
    pub code: String,
    /// Provider error message
    pub message: String,
    /// HTTP status code, if the error came over HTTP
    pub status_code: Option<u16>,
}

impl RemoteApiError {
    /// Build an error from a provider error code, classifying it.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: classify_error_code(&code),
            code,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

impl std::fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(
                f,
                "{} (HTTP {}): {}: {}",
                self.kind, code, self.code, self.message
            ),
            None => write!(f, "{}: {}: {}", self.kind, self.code, self.message),
        }
    }
}

impl std::error::Error for RemoteApiError {}

/// Classification of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The named budget or resource does not exist
    NotFound,
    /// A budget with the same name already exists
    AlreadyExists,
    /// Caller lacks permission (including assume-role refusals)
    AccessDenied,
    /// The account or role identifier is not valid
    InvalidAccount,
    /// Request rate exceeded
    Throttling,
    /// Field-level validation rejected by the provider
    Validation,
    /// Anything else
    Other,
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteErrorKind::NotFound => write!(f, "Not found"),
            RemoteErrorKind::AlreadyExists => write!(f, "Already exists"),
            RemoteErrorKind::AccessDenied => write!(f, "Access denied"),
            RemoteErrorKind::InvalidAccount => write!(f, "Invalid account"),
            RemoteErrorKind::Throttling => write!(f, "Throttled"),
            RemoteErrorKind::Validation => write!(f, "Validation error"),
            RemoteErrorKind::Other => write!(f, "Remote error"),
        }
    }
}

/// Classify a provider error code.
///
/// Codes may arrive namespaced (`com.amazonaws.budgets#NotFoundException`)
/// or with a trailing `:<uri>` from the `x-amzn-ErrorType` header; both are
/// stripped before matching.
pub fn classify_error_code(code: &str) -> RemoteErrorKind {
    let code = code.rsplit('#').next().unwrap_or(code);
    let code = code.split(':').next().unwrap_or(code);
    match code {
        "NotFoundException" | "NoSuchEntity" => RemoteErrorKind::NotFound,
        "DuplicateRecordException" => RemoteErrorKind::AlreadyExists,
        "AccessDeniedException" | "AccessDenied" | "ExpiredTokenException"
        | "InvalidClientTokenId" | "SignatureDoesNotMatch" => RemoteErrorKind::AccessDenied,
        "InvalidIdentityToken" | "RegionDisabledException" => RemoteErrorKind::InvalidAccount,
        "ThrottlingException" | "Throttling" => RemoteErrorKind::Throttling,
        "InvalidParameterException" | "ValidationError" | "ValidationException"
        | "MalformedPolicyDocument" | "CreationLimitExceededException" => {
            RemoteErrorKind::Validation
        }
        _ => RemoteErrorKind::Other,
    }
}
