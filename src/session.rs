//! Per-session state for the upload page.
//!
//! A session holds the outcome of the last upload. It is never edited in
//! place: a new upload or a reset produces a fresh value that replaces the
//! old one wholesale, so concurrent sessions cannot interfere.

use crate::documenter::Documenter;
use crate::error::{Error, Result};
use crate::extract::Entry;
use serde::Serialize;

/// Message shown when nothing was uploaded
pub const NO_UPLOAD_MESSAGE: &str =
    "No file uploaded! Please upload a .py file to generate documentation.";

/// A file handed over by the upload boundary
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name; shown to the user, unused by the core
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self { filename, bytes }
    }

    /// Decode the uploaded bytes as source text
    pub fn source(&self) -> Result<String> {
        Ok(String::from_utf8(self.bytes.clone())?)
    }
}

/// Outcome of the last upload in one session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Session {
    #[default]
    Empty,
    Documented {
        filename: Option<String>,
        source: String,
        entries: Vec<Entry>,
        markdown: String,
    },
    Failed {
        message: String,
    },
}

impl Session {
    /// Document an upload. Failures become a `Failed` session carrying the
    /// error message rather than an error.
    pub fn from_upload(upload: Option<Upload>, documenter: &mut Documenter) -> Self {
        match Self::document(upload, documenter) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Upload could not be documented");
                let message = match e {
                    Error::EmptyInput => NO_UPLOAD_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                Session::Failed { message }
            }
        }
    }

    fn document(upload: Option<Upload>, documenter: &mut Documenter) -> Result<Self> {
        let upload = upload.ok_or(Error::EmptyInput)?;
        let source = upload.source()?;
        let entries = documenter.extract(&source)?;
        let markdown = documenter.render(&entries);

        Ok(Session::Documented {
            filename: upload.filename,
            source,
            entries,
            markdown,
        })
    }

    /// The state after pressing "Clear All"
    pub fn reset() -> Self {
        Session::Empty
    }

    pub fn markdown(&self) -> Option<&str> {
        match self {
            Session::Documented { markdown, .. } => Some(markdown),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Session::Empty)
    }
}
