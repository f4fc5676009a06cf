// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Errors surfaced by mapping operations.
//!
//! Every error is returned synchronously to the [`Mapper`](crate::Mapper)
//! caller; nothing is logged or swallowed inside the crate. A missing document
//! key during deserialization is deliberately *not* an error (see
//! [`Mapper::to_object`](crate::Mapper::to_object)).
use crate::value::{ValueKind, timestamp::TimestampError};
use std::{error, fmt};

/// Error returned when converting between native values and document values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapperError {
    /// A document value's kind is incompatible with the target native type.
    UnexpectedKind {
        /// The document kind(s) the target type accepts.
        expected: &'static str,
        /// The kind that was actually found.
        found: ValueKind,
    },
    /// A numeric document value does not fit in the target native type.
    OutOfRange {
        /// Name of the target native type.
        target: &'static str,
        /// The offending value.
        value: i128,
    },
    /// No member of the target enumeration carries this ordinal.
    UnknownOrdinal {
        /// Name of the target enumeration type.
        target: &'static str,
        /// The ordinal with no corresponding member.
        ordinal: i32,
    },
    /// A string form could not be re-parsed into its native type.
    Malformed {
        /// Name of the target native type.
        target: &'static str,
        /// The input that failed to parse.
        input: String,
    },
    /// A datetime is outside the representable range.
    Timestamp(TimestampError),
    /// The native type has no applicable conversion path.
    ///
    /// Most unsupported-type situations are compile errors in this crate (a
    /// type without [`ToValue`](crate::ToValue)/[`FromValue`](crate::FromValue)
    /// cannot be declared to a descriptor at all). This variant covers the
    /// cases that only exist at runtime: a registered converter producing a
    /// value of the wrong type, and the `MinValue`/`MaxValue` sentinels
    /// reaching a native target.
    UnsupportedType {
        /// Name of the native type involved.
        type_name: &'static str,
    },
}

impl fmt::Display for MapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperError::UnexpectedKind { expected, found } => {
                write!(f, "expected a {expected} value, found {found}")
            }
            MapperError::OutOfRange { target, value } => {
                write!(f, "value {value} does not fit in {target}")
            }
            MapperError::UnknownOrdinal { target, ordinal } => {
                write!(f, "{target} has no member with ordinal {ordinal}")
            }
            MapperError::Malformed { target, input } => {
                write!(f, "failed to parse {input:?} as {target}")
            }
            MapperError::Timestamp(e) => e.fmt(f),
            MapperError::UnsupportedType { type_name } => {
                write!(f, "no conversion path for {type_name}")
            }
        }
    }
}

impl error::Error for MapperError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            MapperError::Timestamp(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TimestampError> for MapperError {
    fn from(e: TimestampError) -> Self {
        MapperError::Timestamp(e)
    }
}
