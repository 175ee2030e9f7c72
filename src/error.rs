//! Error types and handling for `TripSage`

use thiserror::Error;

use crate::models::Category;

/// Main error type for the `TripSage` application
#[derive(Error, Debug)]
pub enum TripSageError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// An agent dispatch failed (model call, rate limit, malformed response)
    #[error("Dispatch error{}: {message}", category.map(|c| format!(" ({})", c.id())).unwrap_or_default())]
    Dispatch {
        category: Option<Category>,
        message: String,
    },

    /// A data-fetch wrapper failed
    #[error("Tool error ({tool}): {message}")]
    Tool { tool: String, message: String },

    /// Markdown could not be rendered as formatted content
    #[error("Render error: {message}")]
    Render { message: String },

    /// Aggregation was attempted without all five category reports
    #[error("Missing category reports: {}", missing.iter().map(|c| c.id()).collect::<Vec<_>>().join(", "))]
    IncompleteReports { missing: Vec<Category> },

    /// Transport-level HTTP errors
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TripSageError {
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source: reqwest_middleware::Error::Reqwest(source),
        }
    }
}

impl TripSageError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new dispatch error not yet tied to a category
    pub fn dispatch<S: Into<String>>(message: S) -> Self {
        Self::Dispatch {
            category: None,
            message: message.into(),
        }
    }

    /// Create a new tool error
    pub fn tool<T: Into<String>, S: Into<String>>(tool: T, message: S) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Attach the failing category to a dispatch error. Other variants are
    /// wrapped into a dispatch error for that category.
    #[must_use]
    pub fn for_category(self, category: Category) -> Self {
        match self {
            Self::Dispatch { message, .. } => Self::Dispatch {
                category: Some(category),
                message,
            },
            other => Self::Dispatch {
                category: Some(category),
                message: other.to_string(),
            },
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripSageError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripSageError::Validation { message } => format!("Invalid input: {message}"),
            TripSageError::Dispatch {
                category: Some(category),
                message,
            } => format!("Could not prepare {}: {message}", category.title_text()),
            TripSageError::Dispatch {
                category: None,
                message,
            } => format!("The planning agent failed: {message}"),
            TripSageError::Tool { tool, .. } => {
                format!("The {tool} lookup is unavailable right now.")
            }
            TripSageError::Render { .. } => {
                "This section could not be formatted and is shown as plain text.".to_string()
            }
            TripSageError::IncompleteReports { missing } => format!(
                "The full itinerary needs every section. Missing: {}.",
                missing
                    .iter()
                    .map(|c| c.title_text())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TripSageError::Http { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TripSageError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
