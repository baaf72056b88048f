use thiserror::Error;

/// A field value that violates its grammar or a referential constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is not a positive integer")]
    NotAnInteger(String),
    #[error("{value} is out of range (must be between 1 and {max})")]
    OutOfRange { value: u64, max: u64 },
    #[error("the dates entered are invalid: '{0}'")]
    InvalidDates(String),
    #[error("collection '{0}' is not valid")]
    UnknownCollection(String),
    #[error("filter '{clause}' is malformed: {reason}")]
    MalformedFilter { clause: String, reason: String },
    #[error("filter for collection '{0}' was given but that collection is not selected")]
    UnselectedCollection(String),
    #[error("record IDs '{0}' are invalid (expected <collection>:<id>,...)")]
    InvalidRecordIds(String),
    #[error("order/item IDs '{0}' are invalid (expected orders:<id>,...|items:<id>,...)")]
    InvalidOrderItems(String),
    #[error("maximum '{0}' is invalid")]
    InvalidMaximum(String),
    #[error("'{0}' is not a valid priority (low, medium, high or urgent)")]
    InvalidPriority(String),
    #[error("'{0}' is not a valid process")]
    InvalidWorkflow(String),
    #[error("input feature is not a valid WKT: '{0}'")]
    InvalidWkt(String),
    #[error("input file {0} does not exist")]
    MissingAoiFile(String),
    #[error("input file {0} is not a GeoJSON, KML, GML or Shapefile")]
    UnsupportedAoiFile(String),
    #[error("the specified CSV file '{0}' does not exist")]
    MissingCsv(String),
    #[error("'{0}' is not a valid answer (yes or no)")]
    InvalidAnswer(String),
}

/// A filter referenced a field or collection the schema does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaLookupError {
    #[error("field '{field}' does not exist for collection '{collection}'")]
    UnknownField { collection: String, field: String },
    #[error("collection '{0}' does not exist in the catalog")]
    UnknownCollection(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Syntax(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaLookupError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no value specified for '{0}', which is required in silent mode")]
    MissingRequiredField(String),
    #[error(transparent)]
    SchemaLookup(#[from] SchemaLookupError),
    #[error("end of input reached while waiting for {0}")]
    InputTerminated(String),
    /// An input file that is not there; asking again will not help.
    #[error(transparent)]
    InputFile(ValidationError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<FilterError> for SessionError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Syntax(e) => SessionError::Validation(e),
            FilterError::Schema(e) => SessionError::SchemaLookup(e),
        }
    }
}

impl SessionError {
    /// Only validation failures can be retried, and only when the operator is there to retry.
    pub fn is_retryable(&self, silent: bool) -> bool {
        matches!(self, SessionError::Validation(_)) && !silent
    }
}

const SUPPORT_EMAIL: &str = "eodms-sgdot@nrcan-rncan.gc.ca";

/// The notice printed at the end of every run, with the error first when there is one.
pub fn support_message(err: Option<&str>) -> String {
    match err {
        Some(e) => format!(
            "\nERROR: {e}\n\nAn error has occurred while running the process. If you \
             require assistance, please contact the EODMS Support Team at {SUPPORT_EMAIL}"
        ),
        None => format!(
            "\nIf you have any questions or require support, please contact the EODMS \
             Support Team at {SUPPORT_EMAIL}"
        ),
    }
}
