// Copyright 2026 strata contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the error types surfaced by the device abstractions.
//!
//! These errors cover *resource* faults only: environment-dependent failures
//! reported by a graphics backend (allocation failure, lost device, invalid
//! handle). Misuse of the geometry storage API itself is a programmer error
//! and is reported by panicking, not through this type.

use std::fmt;

/// An error related to the creation or use of a GPU resource (buffers, fences).
#[derive(Debug)]
pub enum ResourceError {
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds (e.g., in a buffer).
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_display() {
        assert_eq!(
            format!("{}", ResourceError::InvalidHandle),
            "Invalid resource handle or ID."
        );
        assert_eq!(
            format!("{}", ResourceError::BackendError("device lost".to_string())),
            "Backend-specific resource error: device lost"
        );
    }

    #[test]
    fn resource_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ResourceError::OutOfBounds);
        assert_eq!(format!("{err}"), "Resource access out of bounds.");
    }
}
