use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==================== CACHE ====================
/// Opaque upstream payload plus the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub last_fetched: DateTime<Utc>,
}

impl CacheEntry {
    pub fn fresh(data: serde_json::Value) -> Self {
        Self {
            data,
            last_fetched: Utc::now(),
        }
    }
}

/// Only `total_entries` is measured. The remaining fields are placeholders
/// kept for response compatibility: size and rates are always zero,
/// `last_cleared` is null and `chains` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_size: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub last_cleared: Option<DateTime<Utc>>,
    pub chains: BTreeMap<String, u64>,
}

impl CacheStats {
    pub fn with_entries(total_entries: u64) -> Self {
        Self {
            total_entries,
            total_size: 0,
            hit_rate: 0.0,
            miss_rate: 0.0,
            last_cleared: None,
            chains: BTreeMap::new(),
        }
    }
}
