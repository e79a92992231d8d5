//! Error types for autoshot
//!
//! This module provides the error type hierarchy using `thiserror`
//! for proper error handling across all components.

use thiserror::Error;

/// The main error type for autoshot operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser lifecycle errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Capture errors (screenshot, output files)
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Probe script errors
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// No page registered for the given tab handle
    #[error("Unknown tab: {0}")]
    UnknownTab(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),

    /// Timeout waiting for browser
    #[error("Browser operation timed out after {0}ms")]
    Timeout(u64),
}

/// Capture errors (screenshots and their output files)
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// Writing the captured image to disk failed
    #[error("Failed to write capture output: {0}")]
    WriteFailed(String),
}

/// Probe script errors
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Script injection into the target page failed
    #[error("Script injection failed: {0}")]
    InjectionFailed(String),

    /// The probe returned a value that could not be decoded
    #[error("Malformed probe report: {0}")]
    MalformedReport(String),
}

/// Result type alias for autoshot operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Browser(BrowserError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_capture_error() {
        let err = CaptureError::ScreenshotFailed("tab detached".to_string());
        assert!(err.to_string().contains("Screenshot capture failed"));
    }

    #[test]
    fn test_probe_error() {
        let err = ProbeError::InjectionFailed("context destroyed".to_string());
        assert!(err.to_string().contains("Script injection failed"));
    }

    #[test]
    fn test_unknown_tab() {
        let err = BrowserError::UnknownTab(7);
        assert_eq!(err.to_string(), "Unknown tab: 7");
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
