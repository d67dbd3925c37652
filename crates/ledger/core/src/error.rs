//! Common error infrastructure for ledger-core.
//!
//! This module provides shared types and traits used across all error types in ledger-core.
//! Domain-specific errors (e.g., `ConsumptionError`, `FormulaError`) are defined in their
//! respective modules alongside the operations that raise them.
//!
//! # Classification
//!
//! - **Recoverable**: The resource exists but cannot cover the cost right now
//! - **Validation**: The request or its configuration references something invalid
//! - **Internal**: Unexpected state inconsistencies that require investigation

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry after the resource is restored or with a different choice.
    ///
    /// Examples: no spell slots left at a level, not enough arrows
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: consumption target references a missing item, malformed formula
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: patch key the state model does not understand
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all ledger-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait LedgerError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Notification sinks key their message templates off this code, so it must be stable.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
