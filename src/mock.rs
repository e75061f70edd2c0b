//! Instrumented in-memory `ObjectStore` used by the tests.

use crate::err::Error;
use crate::store::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn remote_failure(what: &str) -> Error {
    Error::AnyError {
        source: Box::new(io::Error::new(io::ErrorKind::Other, what.to_string())),
    }
}

/// In-memory store that records containers and objects, counts put calls,
/// gauges how many puts are in flight at once, and can be told to fail puts
/// for chosen keys or to hold each put for a while (so that puts actually
/// overlap under a concurrency limit).
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    containers: Mutex<HashMap<String, HashMap<String, Bytes>>>,
    rejected_keys: Mutex<HashSet<String>>,
    put_delay: Mutex<Option<Duration>>,
    puts: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every put for `key` with a remote error.
    pub fn reject_key(&self, key: &str) {
        self.inner
            .rejected_keys
            .lock()
            .unwrap()
            .insert(key.to_string());
    }

    /// Hold each put for `delay` before completing it.
    pub fn delay_puts(&self, delay: Duration) {
        *self.inner.put_delay.lock().unwrap() = Some(delay);
    }

    /// Total number of put calls received, failed ones included.
    pub fn put_count(&self) -> usize {
        self.inner.puts.load(Ordering::SeqCst)
    }

    /// Highest number of put calls that were in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.inner.containers.lock().unwrap().contains_key(name)
    }

    pub fn object_count(&self, container: &str) -> usize {
        self.inner
            .containers
            .lock()
            .unwrap()
            .get(container)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create_container(&self, name: &str) -> Result<(), Error> {
        self.inner
            .containers
            .lock()
            .unwrap()
            .insert(name.to_string(), HashMap::new());
        Ok(())
    }

    async fn put_object(&self, container: &str, key: &str, body: Bytes) -> Result<(), Error> {
        self.inner.puts.fetch_add(1, Ordering::SeqCst);
        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.inner.put_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.inner.rejected_keys.lock().unwrap().contains(key) {
            return Err(remote_failure("injected put failure"));
        }
        // Containers need not be created first; upload tests stand alone
        // from the lifecycle sequence.
        self.inner
            .containers
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(())
    }

    async fn list_objects(&self, container: &str) -> Result<Vec<String>, Error> {
        let containers = self.inner.containers.lock().unwrap();
        let objects = containers
            .get(container)
            .ok_or_else(|| remote_failure("no such container"))?;
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<(), Error> {
        let mut containers = self.inner.containers.lock().unwrap();
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| remote_failure("no such container"))?;
        objects.remove(key);
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<(), Error> {
        let mut containers = self.inner.containers.lock().unwrap();
        match containers.get(name) {
            None => return Err(remote_failure("no such container")),
            Some(objects) if !objects.is_empty() => {
                return Err(remote_failure("container not empty"))
            }
            Some(_) => {}
        }
        containers.remove(name);
        Ok(())
    }
}
