use std::fmt;

/// Pipeline stage of one `find_duplicates` request.
///
/// Stages advance strictly forward; a failure at any stage surfaces that
/// stage's error and the request yields no partial result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Encoded,
    Queried,
    Scored,
    Returned,
    Failed,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Encoded => "encoded",
            Self::Queried => "queried",
            Self::Scored => "scored",
            Self::Returned => "returned",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
