use crate::error::ValidationError;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workflow {
    Full,
    OrderCsv,
    RecordId,
    DownloadAvailable,
    DownloadResults,
}

/// The outcome of reading a `--process` value, including the retired names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowChoice {
    Current(Workflow),
    /// `search_only`: now `full` with ordering suppressed.
    SearchOnly,
    /// `download_only`: renamed to `download_results`.
    DownloadOnly,
}

impl WorkflowChoice {
    pub fn workflow(&self) -> Workflow {
        match self {
            Self::Current(w) => *w,
            Self::SearchOnly => Workflow::Full,
            Self::DownloadOnly => Workflow::DownloadResults,
        }
    }
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::OrderCsv => "order_csv",
            Self::RecordId => "record_id",
            Self::DownloadAvailable => "download_available",
            Self::DownloadResults => "download_results",
        }
    }

    pub fn parse(name: &str) -> Result<WorkflowChoice, ValidationError> {
        let choice = match name.trim().to_ascii_lowercase().as_str() {
            "full" => WorkflowChoice::Current(Self::Full),
            "order_csv" => WorkflowChoice::Current(Self::OrderCsv),
            "record_id" => WorkflowChoice::Current(Self::RecordId),
            "download_available" => WorkflowChoice::Current(Self::DownloadAvailable),
            "download_results" => WorkflowChoice::Current(Self::DownloadResults),
            "search_only" => WorkflowChoice::SearchOnly,
            "download_only" => WorkflowChoice::DownloadOnly,
            _ => return Err(ValidationError::InvalidWorkflow(name.trim().to_string())),
        };
        Ok(choice)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Workflow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowInfo {
    pub workflow: Workflow,
    pub name: &'static str,
    pub description: &'static str,
}

/// Ordered menu of processes; the first entry is the default.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowTable {
    entries: &'static [WorkflowInfo],
}

const STANDARD: [WorkflowInfo; 5] = [
    WorkflowInfo {
        workflow: Workflow::Full,
        name: "Search, order and/or download",
        description: "Search, order and/or download images using an AOI and/or filters",
    },
    WorkflowInfo {
        workflow: Workflow::OrderCsv,
        name: "EODMS UI Ordering",
        description: "Order & download images using EODMS UI search results (CSV file)",
    },
    WorkflowInfo {
        workflow: Workflow::RecordId,
        name: "Record IDs",
        description: "Order and download a single or set of images using Record IDs",
    },
    WorkflowInfo {
        workflow: Workflow::DownloadAvailable,
        name: "Download Available Order Items",
        description: "Downloads order items with status AVAILABLE_FOR_DOWNLOAD",
    },
    WorkflowInfo {
        workflow: Workflow::DownloadResults,
        name: "Download EODMS-CLI Results",
        description: "Download existing orders using a CSV file from a previous \
                      order/download process (files found under \"results\" folder)",
    },
];

impl WorkflowTable {
    pub fn new(entries: &'static [WorkflowInfo]) -> Self {
        Self { entries }
    }

    pub fn standard() -> Self {
        Self::new(&STANDARD)
    }

    pub fn entries(&self) -> &'static [WorkflowInfo] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based, as shown in the menu.
    pub fn by_number(&self, n: usize) -> Option<&'static WorkflowInfo> {
        n.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn number_of(&self, workflow: Workflow) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.workflow == workflow)
            .map(|i| i + 1)
    }

    pub fn info(&self, workflow: Workflow) -> Option<&'static WorkflowInfo> {
        self.entries.iter().find(|e| e.workflow == workflow)
    }

    pub fn menu(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("  {}: ({}) {}", i + 1, e.workflow, e.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
