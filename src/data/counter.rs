use fnv::FnvBuildHasher;
use hashbrown::HashMap;

/// Pending counter totals awaiting a flush.
///
/// Entries are created on first update and zeroed, never removed, when flushed.
pub struct Counter {
    data: HashMap<String, i64, FnvBuildHasher>,
}

impl Counter {
    pub fn new() -> Counter {
        Counter {
            data: HashMap::<String, i64, FnvBuildHasher>::default(),
        }
    }

    /// Adds `amount` to the pending total for `key`, returning the new total.
    pub fn update(&mut self, key: &str, amount: i64) -> i64 {
        let entry = self.data.entry_ref(key).or_insert(0);
        *entry = entry.wrapping_add(amount);
        *entry
    }

    /// Reads and clears the pending total for `key`.
    pub fn take(&mut self, key: &str) -> i64 {
        match self.data.get_mut(key) {
            Some(entry) => std::mem::replace(entry, 0),
            None => 0,
        }
    }

    /// Adds `amount` to `key` and, if the new total reached `threshold`, clears it.
    ///
    /// Returns the entire cleared total when the threshold was reached.
    pub fn update_and_take(&mut self, key: &str, amount: i64, threshold: i64) -> Option<i64> {
        if self.update(key, amount) >= threshold {
            Some(self.take(key))
        } else {
            None
        }
    }

    /// Reads and clears every strictly positive total.
    pub fn drain_positive(&mut self) -> Vec<(String, i64)> {
        self.data
            .iter_mut()
            .filter(|(_, value)| **value > 0)
            .map(|(key, value)| (key.clone(), std::mem::replace(value, 0)))
            .collect()
    }

    pub fn value(&self, key: &str) -> i64 { *self.data.get(key).unwrap_or(&0) }

    /// Number of distinct keys ever updated.
    pub fn len(&self) -> usize { self.data.len() }
}
