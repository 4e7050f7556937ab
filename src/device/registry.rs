//! In-memory device registry
//!
//! Devices are keyed by id. The map itself sits behind a `RwLock` so any
//! number of commands can look devices up at once; each record has its own
//! `Mutex` so two commands hitting the same device serialize, while writes to
//! different devices proceed independently.
//!
//! Lookups return owned snapshots sorted by id, which makes "first matching
//! device" deterministic for the resolver.

use ahash::AHashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::model::Device;

type Entry = Arc<Mutex<Device>>;

/// Thread-safe store of device records
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: RwLock<AHashMap<String, Entry>>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given devices
    pub fn with_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let registry = Self::new();
        for device in devices {
            registry.insert(device);
        }
        registry
    }

    /// Add or replace a device record
    pub fn insert(&self, device: Device) {
        let mut map = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(device.id.clone(), Arc::new(Mutex::new(device)));
    }

    pub fn len(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All devices
    pub fn all(&self) -> Vec<Device> {
        self.filter(|_| true)
    }

    /// Look up a single device by id (exact match)
    pub fn get(&self, id: &str) -> Option<Device> {
        let entry = self.entry(id)?;
        let device = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Some(device.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    pub fn find_by_type(&self, device_type: &str) -> Vec<Device> {
        self.filter(|d| d.is_type(device_type))
    }

    pub fn find_by_location(&self, location: &str) -> Vec<Device> {
        self.filter(|d| d.is_in(location))
    }

    pub fn find_by_type_and_location(&self, device_type: &str, location: &str) -> Vec<Device> {
        self.filter(|d| d.is_type(device_type) && d.is_in(location))
    }

    /// Devices of any of the given types in one room
    pub fn find_by_types_and_location(&self, types: &[&str], location: &str) -> Vec<Device> {
        self.filter(|d| d.is_in(location) && types.iter().any(|t| d.is_type(t)))
    }

    /// Mutate a device in place while holding its lock
    ///
    /// Returns `None` if no device has this id.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Device) -> R) -> Option<R> {
        let entry = self.entry(id)?;
        let mut device = entry.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut device))
    }

    fn entry(&self, id: &str) -> Option<Entry> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn filter(&self, predicate: impl Fn(&Device) -> bool) -> Vec<Device> {
        // Clone the entry handles first so the map lock is not held while
        // waiting on individual device locks.
        let entries: Vec<Entry> = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut matches: Vec<Device> = entries
            .iter()
            .map(|e| e.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .filter(|d| predicate(d))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::model::kind;
    use std::thread;

    fn sample() -> DeviceRegistry {
        DeviceRegistry::with_devices([
            Device::new("light_2", "Bedroom lamp", kind::LIGHT, "bedroom"),
            Device::new("light_1", "Ceiling light", kind::LIGHT, "living_room"),
            Device::new("tv_1", "TV", kind::TV, "living_room"),
            Device::new("ac_1", "AC", kind::AC, "bedroom"),
        ])
    }

    #[test]
    fn test_get_by_id() {
        let registry = sample();
        assert_eq!(registry.get("tv_1").unwrap().name, "TV");
        assert!(registry.get("tv_9").is_none());
    }

    #[test]
    fn test_results_sorted_by_id() {
        let registry = sample();
        let ids: Vec<_> = registry.find_by_type("light").into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["light_1", "light_2"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = sample();
        assert_eq!(registry.find_by_type_and_location("LIGHT", "Living_Room").len(), 1);
        assert_eq!(registry.find_by_location("BEDROOM").len(), 2);
    }

    #[test]
    fn test_find_by_types_and_location() {
        let registry = sample();
        let found = registry.find_by_types_and_location(&["light", "tv"], "living_room");
        let ids: Vec<_> = found.into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["light_1", "tv_1"]);
    }

    #[test]
    fn test_update_missing_device() {
        let registry = sample();
        assert!(registry.update("nope", |d| d.status = "on".into()).is_none());
    }

    #[test]
    fn test_concurrent_updates_same_device() {
        let registry = Arc::new(DeviceRegistry::with_devices([{
            let mut d = Device::new("tv_1", "TV", kind::TV, "living_room");
            d.volume = Some(0);
            d
        }]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        registry.update("tv_1", |d| {
                            d.volume = Some(d.volume.unwrap_or(0) + 1);
                        });
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.get("tv_1").unwrap().volume, Some(800));
    }
}
