use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::bin::{Bin, BinId, Priority};
use crate::surface::{MapSurface, MarkerHandle};

/// A bin together with the marker that draws it.
#[derive(Debug, PartialEq)]
pub struct BinEntry {
    bin: Bin,
    marker: MarkerHandle,
}

impl BinEntry {
    pub fn bin(&self) -> &Bin {
        &self.bin
    }

    pub fn marker(&self) -> &MarkerHandle {
        &self.marker
    }
}

/// Immutable view of the store at one point in time.
///
/// Cloning is cheap. A snapshot never changes after it has been handed out;
/// observers compare [`BinSnapshot::version`] to detect updates.
#[derive(Debug, Clone, Default)]
pub struct BinSnapshot {
    entries: Arc<BTreeMap<BinId, Arc<BinEntry>>>,
    version: u64,
}

impl BinSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<BinEntry>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Entries ordered by bin id.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BinEntry>> {
        self.entries.values()
    }

    pub fn bins(&self) -> impl Iterator<Item = &Bin> {
        self.entries.values().map(|e| e.bin())
    }
}

/// Client-side cache of bins and their markers.
///
/// Every marker placed or removed on behalf of a bin goes through this type,
/// so each entry owns exactly one live marker. Mutations are copy-on-write:
/// the entry map is cloned when a snapshot of it is still alive.
#[derive(Debug, Default)]
pub struct BinRecordStore {
    current: BinSnapshot,
}

impl BinRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> BinSnapshot {
        self.current.clone()
    }

    pub fn version(&self) -> u64 {
        self.current.version
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<BinEntry>> {
        self.current.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.current.contains(id)
    }

    /// Replaces the whole store with `bins`, placing one marker per bin.
    ///
    /// Markers of the previous contents are removed first. When `bins`
    /// repeats an id the last occurrence wins.
    pub fn load<S: MapSurface>(&mut self, surface: &mut S, bins: Vec<Bin>) {
        for entry in self.current.iter() {
            surface.remove_marker(entry.marker());
        }

        let mut entries: BTreeMap<BinId, Arc<BinEntry>> = BTreeMap::new();
        for bin in bins {
            let marker = surface.place_marker(&bin);
            surface.bind_tooltip(&marker, &bin.tooltip());
            let id = bin.id.clone();
            if let Some(replaced) = entries.insert(id, Arc::new(BinEntry { bin, marker })) {
                debug!("duplicate bin {} in load, keeping last", replaced.bin.id);
                surface.remove_marker(replaced.marker());
            }
        }

        self.publish(entries);
    }

    /// Inserts or replaces the entry for `bin.id`.
    ///
    /// A replaced entry's marker is removed unless it is the same handle.
    pub fn upsert<S: MapSurface>(&mut self, surface: &mut S, bin: Bin, marker: MarkerHandle) {
        let id = bin.id.clone();
        let entry = Arc::new(BinEntry { bin, marker });
        let previous = self.mutate(|entries| entries.insert(id, entry));
        if let Some(previous) = previous {
            let current = self.current.get(previous.bin.id.as_str()).map(|e| e.marker());
            if current != Some(previous.marker()) {
                surface.remove_marker(previous.marker());
            }
        }
    }

    /// Places a marker for `bin` and inserts it. Returns the new handle.
    pub fn place<S: MapSurface>(&mut self, surface: &mut S, bin: Bin) -> MarkerHandle {
        let marker = surface.place_marker(&bin);
        surface.bind_tooltip(&marker, &bin.tooltip());
        self.upsert(surface, bin, marker.clone());
        marker
    }

    /// Removes the entry and its marker. Returns false if `id` was absent.
    pub fn remove<S: MapSurface>(&mut self, surface: &mut S, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(entry) = self.mutate(|entries| entries.remove(id)) {
            surface.remove_marker(entry.marker());
        }
        true
    }

    /// Sets a bin's priority and rebuilds its tooltip. Returns false if `id`
    /// was absent.
    pub fn set_priority<S: MapSurface>(&mut self, surface: &mut S, id: &str, priority: Priority) -> bool {
        let Some(existing) = self.get(id) else {
            return false;
        };

        let bin = existing.bin.with_priority(priority);
        let marker = existing.marker.clone();
        surface.restyle_marker(&marker, &bin);
        surface.update_tooltip(&marker, &bin.tooltip());

        let entry = Arc::new(BinEntry { bin, marker });
        self.mutate(|entries| entries.insert(id.to_string(), entry));
        true
    }

    /// Removes every marker and empties the store.
    pub fn clear<S: MapSurface>(&mut self, surface: &mut S) {
        self.load(surface, Vec::new());
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut BTreeMap<BinId, Arc<BinEntry>>) -> R) -> R {
        let mut entries = Arc::clone(&self.current.entries);
        let result = f(Arc::make_mut(&mut entries));
        self.current = BinSnapshot {
            entries,
            version: self.current.version + 1,
        };
        result
    }

    fn publish(&mut self, entries: BTreeMap<BinId, Arc<BinEntry>>) {
        self.current = BinSnapshot {
            entries: Arc::new(entries),
            version: self.current.version + 1,
        };
    }
}
