use thiserror::Error;

/// Problems with the uploaded ledger file. Reported to the user verbatim, so
/// each variant says enough to fix the file.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Missing required column(s): {}. Expected a header row with Date, Description, Category, Amount", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Line {line}: amount {value:?} is not a number")]
    InvalidAmount { line: usize, value: String },

    #[error("Line {line}: date {value:?} is not a recognised calendar date")]
    InvalidDate { line: usize, value: String },

    #[error("Line {line}: category is empty")]
    EmptyCategory { line: usize },

    #[error("Unsupported file type: {0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set. Export it or add it to a .env file to enable AI advice")]
    MissingCredential(&'static str),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Failures of a single advisory call. Each one affects only the panel that
/// issued the call.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("The advisory service rejected the API key (HTTP {0})")]
    Auth(u16),

    #[error("Rate limited by the advisory service{}", retry_hint(*retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Advisory service returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Could not reach the advisory service: {0}")]
    Transport(String),

    #[error("Malformed response from the advisory service: {0}")]
    MalformedResponse(String),
}

fn retry_hint(retry_after: Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(", try again in {secs}s"),
        None => String::new(),
    }
}

/// Form input rejected before any advisory call is issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Please enter a goal greater than 0.")]
    NonPositiveGoal,

    #[error("Target date {0} is already in the past.")]
    TargetDateInPast(chrono::NaiveDate),

    #[error("Please enter an age greater than 0.")]
    NonPositiveAge,

    #[error("Age must be at most {max}.")]
    AgeOutOfRange { max: u32 },

    #[error("{field}: {value:?} is not valid")]
    Unparsable { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum BuddyError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Advisory(#[from] AdvisoryError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("No ledger loaded. Open a CSV file first")]
    NoLedgerLoaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BuddyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_every_column() {
        let e = LedgerError::MissingColumns {
            missing: vec!["Category".into(), "Amount".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("Category, Amount"));
    }

    #[test]
    fn test_rate_limit_message() {
        let with = AdvisoryError::RateLimited { retry_after: Some(12) };
        assert!(with.to_string().ends_with("try again in 12s"));
        let without = AdvisoryError::RateLimited { retry_after: None };
        assert_eq!(without.to_string(), "Rate limited by the advisory service");
    }

    #[test]
    fn test_buddy_error_is_transparent() {
        let e: BuddyError = FormError::NonPositiveAge.into();
        assert_eq!(e.to_string(), "Please enter an age greater than 0.");
    }
}
