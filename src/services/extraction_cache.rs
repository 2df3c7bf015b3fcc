use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use serde::Serialize;

use crate::domain::{normalize_domain, ExtractedCompany};

pub const EXTRACTION_TTL: Duration = Duration::from_secs(30 * 60);

struct CacheEntry {
    data: ExtractedCompany,
    stored_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub ttl_secs: u64,
}

/// Process-local memo of extraction results keyed by normalized domain.
///
/// Entries older than the TTL are treated as absent and dropped when read.
/// `prune` only bounds memory; lookups never depend on it having run.
pub struct ExtractionCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for ExtractionCache {
    fn default() -> Self {
        ExtractionCache::new(EXTRACTION_TTL)
    }
}

impl ExtractionCache {
    pub fn new(ttl: Duration) -> Self {
        ExtractionCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, website: &str) -> Option<ExtractedCompany> {
        self.get_at(website, Instant::now())
    }

    pub fn get_at(&self, website: &str, now: Instant) -> Option<ExtractedCompany> {
        let key = normalize_domain(website);
        let mut entries = self.lock();

        let expired = match entries.get(&key) {
            Some(entry) => now.saturating_duration_since(entry.stored_at) > self.ttl,
            None => return None,
        };

        match expired {
            true => {
                entries.remove(&key);
                log::debug!("Evicted expired extraction for {}", key);
                None
            }
            false => entries.get(&key).map(|entry| entry.data.clone()),
        }
    }

    pub fn set(&self, website: &str, data: ExtractedCompany) {
        self.set_at(website, data, Instant::now())
    }

    pub fn set_at(&self, website: &str, data: ExtractedCompany, now: Instant) {
        let key = normalize_domain(website);
        self.lock().insert(
            key,
            CacheEntry {
                data,
                stored_at: now,
            },
        );
    }

    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    pub fn prune_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= self.ttl);
        before - entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.lock().len(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}
