use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing required column '{column}' (found: {found})")]
    SchemaError { column: String, found: String },

    #[error("Input table is empty: {message}")]
    EmptyInputError { message: String },

    #[error("Cannot decode input as {encoding}: {message}")]
    DecodeError { encoding: String, message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FleetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FleetError::CsvError(_)
            | FleetError::SchemaError { .. }
            | FleetError::EmptyInputError { .. }
            | FleetError::DecodeError { .. } => ErrorCategory::Input,
            FleetError::ConfigValidationError { .. }
            | FleetError::InvalidConfigValueError { .. }
            | FleetError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FleetError::IoError(_) | FleetError::ZipError(_) => ErrorCategory::Storage,
            FleetError::SerializationError(_) => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            // 檔案系統問題多半是暫時性的，可重試
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Processing => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FleetError::SchemaError { column, .. } => format!(
                "Add a '{}' column to the input header or map it under [columns] in the config",
                column
            ),
            FleetError::EmptyInputError { .. } => {
                "Check that the input file has a header row and at least one delivery".to_string()
            }
            FleetError::DecodeError { .. } => {
                "Pass the file's real encoding with --encoding (e.g. windows-1252)".to_string()
            }
            FleetError::CsvError(_) => {
                "Check the field delimiter (--delimiter) and quoting of the input file".to_string()
            }
            FleetError::ConfigValidationError { field, .. }
            | FleetError::InvalidConfigValueError { field, .. }
            | FleetError::MissingConfigError { field } => {
                format!("Fix the '{}' setting and run again", field)
            }
            FleetError::IoError(_) | FleetError::ZipError(_) => {
                "Check that the paths exist and are writable".to_string()
            }
            FleetError::SerializationError(_) => {
                "Run again with --verbose and report the log output".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The delivery table could not be read: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Storage => format!("Could not read or write files: {}", self),
            ErrorCategory::Processing => format!("Processing failed: {}", self),
        }
    }

    /// 對應 CLI 的結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl From<toml::de::Error> for FleetError {
    fn from(e: toml::de::Error) -> Self {
        FleetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, FleetError>;
