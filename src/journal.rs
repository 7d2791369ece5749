// 9.4 journal.rs: undo logs for one engine call.
// stateful collaborators record the prior value of every entry they touch while
// a call is open, so a failed call restores only what it changed.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// State that can open a change set and later keep or discard it.
pub trait Transactional {
    /// Starts recording changes. Anything recorded earlier is dropped.
    fn begin(&mut self);

    /// Keeps every change since `begin`.
    fn commit(&mut self);

    /// Undoes every change since `begin`.
    fn rollback(&mut self);
}

/// Prior values of the map entries touched since `begin`. `None` marks an entry
/// that did not exist yet.
#[derive(Clone)]
pub struct Journal<K, V> {
    recording: bool,
    saved: HashMap<K, Option<V>>,
}

impl<K, V> Default for Journal<K, V> {
    fn default() -> Self {
        Self {
            recording: false,
            saved: HashMap::new(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Journal<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("recording", &self.recording)
            .field("touched", &self.saved.len())
            .finish()
    }
}

impl<K: Eq + Hash + Copy, V: Clone> Journal<K, V> {
    pub fn begin(&mut self) {
        self.recording = true;
        self.saved.clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Call before changing `map[key]`. Only the first touch per call is kept.
    pub fn touch(&mut self, map: &HashMap<K, V>, key: K) {
        if self.recording {
            self.saved.entry(key).or_insert_with(|| map.get(&key).cloned());
        }
    }

    pub fn commit(&mut self) {
        self.recording = false;
        self.saved.clear();
    }

    /// Puts every touched entry back. Returns the restored keys.
    pub fn rollback(&mut self, map: &mut HashMap<K, V>) -> Vec<K> {
        self.recording = false;
        let mut keys = Vec::with_capacity(self.saved.len());
        for (key, before) in self.saved.drain() {
            match before {
                Some(value) => {
                    map.insert(key, value);
                }
                None => {
                    map.remove(&key);
                }
            }
            keys.push(key);
        }
        keys
    }
}
