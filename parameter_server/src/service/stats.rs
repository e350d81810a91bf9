use serde::Serialize;

/// Counters over every candidate the parameter server handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub received: u64,
    pub pre_filtered: u64,
    pub rejected: u64,
    pub accepted: u64,
}
