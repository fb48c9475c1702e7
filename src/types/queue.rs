use strum_macros::{Display, EnumIter};

#[derive(Display, Debug, Clone, PartialEq, Eq, EnumIter, Hash)]
pub enum QueueType {
    #[strum(serialize = "scan_request")]
    ScanRequest,
}

/// Per-queue consumption limits for the event workers.
#[derive(Debug, Clone)]
pub struct QueueControlConfig {
    /// Maximum number of messages a single worker instance processes concurrently.
    pub max_message_count: usize,
}

impl Default for QueueControlConfig {
    fn default() -> Self {
        Self { max_message_count: 10 }
    }
}
