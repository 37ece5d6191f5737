use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Failures scoped to a single load or update attempt. None of these are
/// fatal to the application; prior rendered state is always kept.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("regeneration request failed: {0}")]
    Regeneration(String),

    #[error("cannot fetch dataset: {0}")]
    Fetch(String),

    /// A load finished after a newer one was issued. Never shown to the user.
    #[error("stale response ignored (generation {issued}, current {current})")]
    StaleResponse { issued: u64, current: u64 },

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot read workbook: {0}")]
    Excel(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ChartError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ChartError::MalformedDataset(reason.into())
    }

    /// Whether this failure should be reported to the user at all.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ChartError::StaleResponse { .. })
    }

    /// An HTTP failure while downloading a dataset.
    pub fn fetch(err: ureq::Error) -> Self {
        ChartError::Fetch(describe(err))
    }
}

fn describe(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("server returned {code} {}", response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}

/// Calls to the regeneration server.
impl From<ureq::Error> for ChartError {
    fn from(err: ureq::Error) -> Self {
        ChartError::Regeneration(describe(err))
    }
}
