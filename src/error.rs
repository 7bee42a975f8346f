// Copyright 2025 the kanki authors
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

use std::fmt::Display;
use std::fmt::Formatter;

pub type Fallible<T> = Result<T, ErrorReport>;

/// The error type for everything in the crate. Persistence failures keep
/// their own variant so callers can tell a broken database apart from a
/// broken invocation; the scheduling core never interprets them.
#[derive(Debug)]
pub enum ErrorReport {
    Storage(rusqlite::Error),
    Io(std::io::Error),
    Other(String),
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Shorthand to return an `Other` error.
pub fn fail<T>(message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorReport::Storage(e) => write!(f, "storage error: {e}"),
            ErrorReport::Io(e) => write!(f, "i/o error: {e}"),
            ErrorReport::Other(msg) => write!(f, "error: {msg}"),
        }
    }
}

impl std::error::Error for ErrorReport {}

impl From<rusqlite::Error> for ErrorReport {
    fn from(e: rusqlite::Error) -> Self {
        ErrorReport::Storage(e)
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(e: std::io::Error) -> Self {
        ErrorReport::Io(e)
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(e: serde_json::Error) -> Self {
        ErrorReport::Other(e.to_string())
    }
}

#[cfg(test)]
impl From<reqwest::Error> for ErrorReport {
    fn from(e: reqwest::Error) -> Self {
        ErrorReport::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ErrorReport::new("deck does not exist.");
        assert_eq!(err.to_string(), "error: deck does not exist.");
    }

    #[test]
    fn test_storage_errors_are_distinct() {
        let err: ErrorReport = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, ErrorReport::Storage(_)));
    }
}
