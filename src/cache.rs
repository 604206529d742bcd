use std::time::{Duration, Instant};

/// Single-slot memo whose value expires `ttl` after it was stored.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The stored value, if it is younger than the TTL at `now`
    pub fn get(&self, now: Instant) -> Option<&T> {
        match &self.entry {
            Some((stored_at, value)) if now.saturating_duration_since(*stored_at) < self.ttl => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn insert(&mut self, now: Instant, value: T) {
        self.entry = Some((now, value));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_expires_after_ttl() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(start), None);

        cache.insert(start, 7);
        assert_eq!(cache.get(start), Some(&7));
        assert_eq!(cache.get(start + Duration::from_secs(59)), Some(&7));
        assert_eq!(cache.get(start + Duration::from_secs(60)), None);
    }

    #[test]
    fn test_insert_replaces_and_restarts_ttl() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(start, "old");
        cache.insert(start + Duration::from_secs(8), "new");

        assert_eq!(cache.get(start + Duration::from_secs(15)), Some(&"new"));
    }

    #[test]
    fn test_invalidate_clears_value() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::from_secs(10));
        cache.insert(start, 1);
        cache.invalidate();
        assert_eq!(cache.get(start), None);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let start = Instant::now();
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert(start, 1);
        assert_eq!(cache.get(start), None);
        assert_eq!(cache.ttl(), Duration::ZERO);
    }
}
