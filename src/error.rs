// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `yeebar` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! value validation, transport and session communication, JSON parsing, and
//! device-reported command errors.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when talking to
/// a light bar.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during transport or session communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while encoding or decoding a message.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error reported by or about the device itself.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power token was provided (only `on`/`off` are recognized).
    #[error("invalid power token: {0}")]
    InvalidPowerToken(String),

    /// A hue value is outside the valid range (0-359).
    #[error("hue value {0} is out of range [0, 359]")]
    InvalidHue(u16),

    /// A saturation value is outside the valid range (0-100).
    #[error("saturation value {0} is out of range [0, 100]")]
    InvalidSaturation(u8),

    /// A brightness value is outside the valid range (1-100).
    #[error("brightness value {0} is out of range [1, 100]")]
    InvalidBrightness(u8),

    /// A packed RGB value is outside the valid range (1-16777215).
    #[error("rgb value {0} is out of range [1, 16777215]")]
    InvalidRgb(u32),

    /// A method name outside the closed command set.
    #[error("unknown command method: {0}")]
    UnknownMethod(String),

    /// A property name outside the closed property set.
    #[error("unknown property name: {0}")]
    UnknownProperty(String),
}

/// Errors related to transport and session communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Socket-level I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The address is not a valid IP literal.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The connection did not come up within the allowed ceiling.
    #[error("connection timed out after {0} ms")]
    ConnectionTimeout(u64),

    /// No matching response arrived within the deadline.
    #[error("command timed out after {0} ms")]
    CommandTimeout(u64),

    /// Attempted to send while the session is down.
    #[error("device is not connected")]
    NotConnected,

    /// Internal event channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to encoding protocol messages.
///
/// Malformed inbound traffic never surfaces here: unrecognized payloads are
/// dropped silently at the codec boundary. This covers outbound encode
/// failures only.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to the device itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device reported a model this library does not support.
    #[error("unsupported device model: {model:?}")]
    UnsupportedModel {
        /// The model identifier the device reported.
        model: String,
    },

    /// The device answered a command with an error object.
    #[error("command failed ({code}): {message}")]
    CommandFailed {
        /// Device-reported error code.
        code: i64,
        /// Device-reported error message.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1700,
            max: 6500,
            actual: 9000,
        };
        assert_eq!(err.to_string(), "value 9000 is out of range [1700, 6500]");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidHue(400);
        let err: Error = value_err.into();
        assert!(matches!(err, Error::Value(ValueError::InvalidHue(400))));
    }

    #[test]
    fn command_failed_display() {
        let err = DeviceError::CommandFailed {
            code: -5000,
            message: "general error".to_string(),
        };
        assert_eq!(err.to_string(), "command failed (-5000): general error");
    }

    #[test]
    fn unsupported_model_display() {
        let err = DeviceError::UnsupportedModel {
            model: "mono5".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported device model: \"mono5\"");
    }

    #[test]
    fn timeout_display() {
        let err = ProtocolError::CommandTimeout(5000);
        assert_eq!(err.to_string(), "command timed out after 5000 ms");
    }
}
