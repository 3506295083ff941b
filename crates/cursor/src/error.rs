//! Engine status codes and the errors this crate reports.

use crate::config::ConfigError;
use core::fmt;
use std::ffi::NulError;

/// A status code reported by the native engine.
///
/// Zero is success and is never wrapped in an `ErrorCode`. Negative codes
/// in the engine's reserved range are engine specific; positive codes are
/// POSIX `errno` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// Conflict between concurrent operations.
    pub const ROLLBACK: Self = Self(-31800);
    /// Attempt to insert an existing key.
    pub const DUPLICATE_KEY: Self = Self(-31801);
    /// Non-specific engine error.
    pub const ERROR: Self = Self(-31802);
    /// Item not found.
    pub const NOT_FOUND: Self = Self(-31803);
    /// The engine must be shut down and restarted.
    pub const PANIC: Self = Self(-31804);
    /// Internal restart signal, never returned to callers of a healthy engine.
    pub const RESTART: Self = Self(-31805);
    /// Recovery must be run before the database can be used.
    pub const RUN_RECOVERY: Self = Self(-31806);
    /// Invalid argument, including use of an unpositioned or closed cursor.
    pub const EINVAL: Self = Self(22);
    /// Resource busy.
    pub const EBUSY: Self = Self(16);
    /// Out of memory.
    pub const ENOMEM: Self = Self(12);
    /// No such table.
    pub const ENOENT: Self = Self(2);

    /// Wrap a raw code.
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw numeric code.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// True for the out-of-data signal.
    pub const fn is_not_found(self) -> bool {
        self.0 == Self::NOT_FOUND.0
    }

    /// Human readable description of the code.
    pub const fn description(self) -> &'static str {
        match self.0 {
            -31800 => "conflict between concurrent operations",
            -31801 => "attempt to insert an existing key",
            -31802 => "non-specific engine error",
            -31803 => "item not found",
            -31804 => "engine panic: fatal error, restart required",
            -31805 => "restart the operation (internal)",
            -31806 => "recovery must be run to continue",
            22 => "invalid argument",
            16 => "resource busy",
            12 => "out of memory",
            2 => "no such file or directory",
            _ => "unknown error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

impl std::error::Error for ErrorCode {}

/// Error type for bounded cursor operations.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// A native cursor call failed with something other than "not found".
    #[error("{op} failed: {code}")]
    Engine {
        /// Code returned by the engine.
        code: ErrorCode,
        /// Name of the failing native call, e.g. `cursor.search_near`.
        op: &'static str,
    },

    /// The table uses a key or value encoding this layer does not handle.
    #[error(
        "unsupported schema for {uri}: key_format={key_format:?}, value_format={value_format:?}"
    )]
    SchemaMismatch {
        /// Table the cursor was opened on.
        uri: String,
        /// Key format from the table's schema descriptor.
        key_format: String,
        /// Value format from the table's schema descriptor.
        value_format: String,
    },

    /// A value operation was invoked on a key-only table.
    #[error("{op} needs a value, but the table stores keys only")]
    KeyOnly {
        /// The offending operation.
        op: &'static str,
    },

    /// A key-only operation was invoked on a table that stores values.
    #[error("{op} is only valid on key-only tables")]
    ValueRequired {
        /// The offending operation.
        op: &'static str,
    },

    /// A string key contained an interior NUL byte.
    #[error("string keys cannot contain NUL bytes")]
    InteriorNul(#[from] NulError),

    /// A configuration string could not be parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CursorError {
    /// Create an engine error for the native call `op`.
    pub const fn engine(code: ErrorCode, op: &'static str) -> Self {
        Self::Engine { code, op }
    }

    /// The engine code, if this error came from a native call.
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True if an insert failed because the key already exists.
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::Engine { code: ErrorCode::DUPLICATE_KEY, .. })
    }
}

/// Result type for bounded cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Conversions from native status to this layer's error contract.
pub(crate) trait NativeResultExt<T> {
    /// Every failure is fatal.
    fn or_engine(self, op: &'static str) -> CursorResult<T>;

    /// "Not found" becomes `None`, every other failure is fatal.
    fn found(self, op: &'static str) -> CursorResult<Option<T>>;
}

impl<T> NativeResultExt<T> for Result<T, ErrorCode> {
    fn or_engine(self, op: &'static str) -> CursorResult<T> {
        self.map_err(|code| CursorError::engine(code, op))
    }

    fn found(self, op: &'static str) -> CursorResult<Option<T>> {
        match self {
            Ok(t) => Ok(Some(t)),
            Err(code) if code.is_not_found() => Ok(None),
            Err(code) => Err(CursorError::engine(code, op)),
        }
    }
}
