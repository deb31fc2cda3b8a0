/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The error taxonomy of the crate.
//!
//! Every fallible operation returns [`Result`]. Each [`Error`] variant maps
//! to a stable numeric code through [`Error::code`], and each code maps back
//! to a stable English description through [`strerror`]. The strings are
//! meant for logs, not for localization.

use thiserror::Error;

/// A specialized result type for graph and bit-stream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// All the ways reading a BV graph can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// An allocation was refused by the system.
    #[error("allocation failed, probably out of memory")]
    OutOfMemory,
    /// An underlying I/O operation failed.
    #[error("io error, probably a file was not found or was truncated: {0}")]
    Io(#[from] std::io::Error),
    /// The call tried to perform an operation the loaded graph does not
    /// support, or the object it was invoked on has been invalidated.
    #[error("the call tried to perform an unsupported operation")]
    Unsupported,
    /// The basename exceeds the maximum length a path can hold.
    #[error("filename too long to store")]
    FilenameTooLong,
    /// A caller-provided buffer, or a statically sized internal structure,
    /// cannot hold the data it was asked to hold.
    #[error("one of the provided buffers was too small")]
    BufferTooSmall,
    /// The `.properties` file is missing, malformed, or lacks a required key.
    #[error("the property file is not a valid property file format: {0}")]
    PropertyFile(String),
    /// The `version` property is present but not 0.
    #[error("the file version {0} is not supported")]
    UnsupportedVersion(u64),
    /// The `compressionflags` property contains an unknown term.
    #[error("the property file contained an unknown compression flag {0:?}")]
    PropertyFileCompressionFlag(String),
    /// A node identifier at or beyond the number of nodes.
    #[error("vertex {node} is out of range (the graph has {nodes} nodes)")]
    VertexOutOfRange {
        /// The offending node identifier.
        node: usize,
        /// The number of nodes in the graph.
        nodes: usize,
    },
    /// A random-access operation was attempted on a graph loaded without
    /// offsets.
    #[error("offsets are required")]
    RequiresOffsets,
    /// A code selection the decoder cannot dispatch.
    #[error("coding unsupported: {0}")]
    UnsupportedCoding(String),
    /// The preallocated spill of an Elias–Fano select structure is too small
    /// and variable-length reallocation was disabled.
    #[error("pre-allocated memory too small for the spill structure")]
    SpillTooSmall,
    /// A batch insertion into an Elias–Fano list was not non-decreasing.
    #[error("the array is not non-decreasing in batch mode")]
    BatchNonDecreasing,
    /// The bit stream contradicts the graph descriptor.
    #[error("corrupt graph: {0}")]
    CorruptGraph(&'static str),
}

impl Error {
    /// Returns the stable numeric code of this error.
    ///
    /// Codes below zero denote call failures, codes in the tens denote
    /// load-path failures, codes in the thirties usage failures, and codes
    /// in the forties Elias–Fano list failures.
    pub fn code(&self) -> i32 {
        match self {
            Error::OutOfMemory => -1,
            Error::Io(_) => -2,
            Error::Unsupported => -3,
            Error::FilenameTooLong => 11,
            Error::BufferTooSmall => 12,
            Error::PropertyFile(_) => 21,
            Error::UnsupportedVersion(_) => 22,
            Error::PropertyFileCompressionFlag(_) => 23,
            Error::VertexOutOfRange { .. } => 31,
            Error::RequiresOffsets => 32,
            Error::UnsupportedCoding(_) => 33,
            Error::CorruptGraph(_) => 34,
            Error::SpillTooSmall => 41,
            Error::BatchNonDecreasing => 42,
        }
    }
}

/// Returns the stable English string associated with an error code.
///
/// Code 0 denotes success. Unknown codes yield `"unknown error"`.
pub fn strerror(code: i32) -> &'static str {
    match code {
        0 => "the call succeeded",
        -1 => "allocation failed, probably out of memory",
        -2 => "io error, probably a file was not found",
        -3 => "the call tried to perform an unsupported operation",
        11 => "filename too long to store",
        12 => "one of the provided buffers was too small",
        21 => "the property file is not a valid property file format",
        22 => "the file version is not supported",
        23 => "the property file contained an unknown compression flag",
        31 => "vertex is out of range",
        32 => "offsets are required",
        33 => "coding unsupported",
        34 => "the graph stream is corrupt",
        41 => "pre-allocated memory too small for the spill structure",
        42 => "the array is not non-decreasing in batch mode",
        _ => "unknown error",
    }
}
