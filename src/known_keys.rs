use std::collections::HashSet;

/// Keys already surfaced during the current scan session.
#[derive(Debug, Default)]
pub struct KnownKeys {
    keys: HashSet<String>,
}

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` and returns true the first time it is seen this session.
    pub fn try_admit(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_admit_is_rejected() {
        let mut keys = KnownKeys::new();
        assert_eq!((keys.try_admit("k"), keys.try_admit("k")), (true, false));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_clear_starts_new_session() {
        let mut keys = KnownKeys::new();
        keys.try_admit("a");
        keys.try_admit("b");
        keys.clear();
        assert!(keys.is_empty());
        assert!(!keys.contains("a"));
        assert!(keys.try_admit("a"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut keys = KnownKeys::new();
        assert!(keys.try_admit("aa:bb"));
        assert!(keys.try_admit("AA:BB"));
    }
}
