use crate::span::Span;
use crate::version::JavaVersion;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HarnessError {
    /// The source is not valid for the selected Java version.
    #[error("parse failure (Java {version}): {msg}\n{unit}")]
    Parse {
        version: JavaVersion,
        msg: String,
        span: Span,
        unit: String,
    },

    /// Straight-line descent stopped before reaching the requested kind.
    #[error("no node of kind {kind} on a straight line in fragment:\n\t{fragment}")]
    NodeNotFound { kind: String, fragment: String },

    #[error("malformed test input: {msg}")]
    Malformed { msg: String },

    #[error("node mismatch at {path}: {msg}")]
    Mismatch { path: String, msg: String },

    #[error("config error: {msg}")]
    Config { msg: String, path: Option<PathBuf> },
}

impl HarnessError {
    pub fn parse(version: JavaVersion, msg: impl Into<String>, span: Span, source: &str) -> Self {
        Self::Parse {
            version,
            msg: msg.into(),
            span,
            unit: source.to_string(),
        }
    }

    pub fn node_not_found(kind: impl ToString, fragment: impl Into<String>) -> Self {
        Self::NodeNotFound {
            kind: kind.to_string(),
            fragment: fragment.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed { msg: msg.into() }
    }

    pub fn mismatch(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Mismatch {
            path: path.into(),
            msg: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            msg: msg.into(),
            path,
        }
    }

    /// The version named by a parse failure.
    pub fn version(&self) -> Option<JavaVersion> {
        match self {
            HarnessError::Parse { version, .. } => Some(*version),
            _ => None,
        }
    }
}

/// Render a HarnessError with ariadne for nice terminal output.
pub fn render_error(err: &HarnessError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        HarnessError::Parse {
            version,
            msg,
            span,
            unit,
        } => {
            let printed = Report::build(ReportKind::Error, (), span.start)
                .with_message(format!("parse error (Java {version})"))
                .with_label(Label::new(span.start..span.end).with_message(msg))
                .finish()
                .eprint(Source::from(unit.as_str()));
            if printed.is_err() {
                eprintln!("error: {err}");
            }
        }
        HarnessError::NodeNotFound { .. } => {
            eprintln!("error[locate]: {err}");
        }
        HarnessError::Malformed { msg } => {
            eprintln!("error[input]: {msg}");
        }
        HarnessError::Mismatch { path, msg } => {
            eprintln!("error[match]: {msg}");
            eprintln!("  --> {path}");
        }
        HarnessError::Config { msg, path } => {
            eprintln!("error[config]: {msg}");
            if let Some(path) = path {
                eprintln!("  --> {}", path.display());
            }
        }
    }
}
