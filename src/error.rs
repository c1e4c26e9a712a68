use std::fmt;

#[derive(Debug)]
pub enum AnalyzerError {
    UsageError(String),
    FileNotFound(String),
    ParseError(String),
    EmptyInput(String),
    IoError(String),
    GraphError(String),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::UsageError(msg) => write!(f, "Usage error: {}", msg),
            AnalyzerError::FileNotFound(path) => write!(f, "no such file: {}", path),
            AnalyzerError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AnalyzerError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            AnalyzerError::IoError(msg) => write!(f, "IO error: {}", msg),
            AnalyzerError::GraphError(msg) => write!(f, "Graph error: {}", msg),
        }
    }
}

impl std::error::Error for AnalyzerError {}

impl From<std::io::Error> for AnalyzerError {
    fn from(err: std::io::Error) -> Self {
        AnalyzerError::IoError(err.to_string())
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(err: csv::Error) -> Self {
        AnalyzerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::GraphError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
