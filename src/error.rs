// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for schema construction and query compilation.
//!
//! Schema errors are raised once, at startup, while documents and indexes are
//! declared. Compile errors are raised per request and are always the
//! caller's fault: nothing here is transient and nothing is retried.

use thiserror::Error;

use crate::schema::FieldType;

/// Failure while declaring a [`Document`](crate::schema::Document).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate field '{field}' in document '{document}'")]
    DuplicateField { document: String, field: String },
    #[error("field '{field}' overlaps a sub-document of document '{document}'")]
    FieldOverlapsSubDocument { document: String, field: String },
    #[error("sub-document '{sub_document}' overlaps a field of document '{document}'")]
    SubDocumentOverlapsField {
        document: String,
        sub_document: String,
    },
    #[error("duplicate sub-document '{sub_document}' in document '{document}'")]
    DuplicateSubDocument {
        document: String,
        sub_document: String,
    },
}

/// Coarse classification of a [`CompileError`].
///
/// The request layer maps every kind to a client error; the distinction is
/// kept for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Filter/sort node with the wrong number of populated variants.
    MalformedAst,
    /// Field name not declared by any document of the index.
    UnknownField,
    /// Separator, comparator, literal or direction could not be parsed.
    MalformedExpression,
    /// Operation has no semantics for the field's type.
    UnsupportedType,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MalformedAst => "malformed_ast",
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::MalformedExpression => "malformed_expression",
            ErrorKind::UnsupportedType => "unsupported_type",
        }
    }
}

/// Failure while compiling a filter, sort or search request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("filter must be exactly one of base/and/or")]
    InvalidFilterShape,
    #[error("empty conjunction: 'and' must list at least one filter")]
    EmptyConjunction,
    #[error("empty disjunction: 'or' must list at least one filter")]
    EmptyDisjunction,
    #[error("filter nesting exceeds the maximum depth of {max}")]
    FilterTooDeep { max: usize },
    #[error("filter must have a field and value separated by ':': {0}")]
    MissingFieldSeparator(String),
    #[error("sort must have a field and direction separated by ':': {0}")]
    MissingDirectionSeparator(String),
    #[error("cannot find indexed field: {0}")]
    FieldNotFound(String),
    #[error("incorrectly formatted range query: {0}")]
    InvalidRangeQuery(String),
    #[error("invalid number '{literal}': {reason}")]
    InvalidNumber { literal: String, reason: String },
    #[error("invalid date '{literal}': expected YYYY-MM-DDTHH:MM:SS.sssZ")]
    InvalidDate { literal: String },
    #[error("unrecognized sort suffix: {0}")]
    UnrecognizedSortSuffix(String),
    #[error("cannot handle filter on field of type {0}")]
    UnsupportedFieldType(FieldType),
    #[error("cannot sort on field '{field}' of type {field_type}")]
    UnsortableFieldType { field: String, field_type: FieldType },
}

impl CompileError {
    /// Which part of the request was at fault.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::InvalidFilterShape
            | CompileError::EmptyConjunction
            | CompileError::EmptyDisjunction
            | CompileError::FilterTooDeep { .. } => ErrorKind::MalformedAst,
            CompileError::FieldNotFound(_) => ErrorKind::UnknownField,
            CompileError::MissingFieldSeparator(_)
            | CompileError::MissingDirectionSeparator(_)
            | CompileError::InvalidRangeQuery(_)
            | CompileError::InvalidNumber { .. }
            | CompileError::InvalidDate { .. }
            | CompileError::UnrecognizedSortSuffix(_) => ErrorKind::MalformedExpression,
            CompileError::UnsupportedFieldType(_) | CompileError::UnsortableFieldType { .. } => {
                ErrorKind::UnsupportedType
            }
        }
    }

    /// Every compile error is caused by the request; none is worth retrying.
    pub fn is_client_error(&self) -> bool {
        true
    }
}
