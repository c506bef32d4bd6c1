use std::path::PathBuf;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use thiserror::Error;

use super::{RecordSink, SinkFactory};
use crate::core::error::{DemuxError, Result};
use crate::record::RoutingKey;

/// A sink that failed to close. Collected rather than raised.
#[derive(Error, Debug)]
#[error("failed to close sink '{key}' ({path:?}): {error}")]
pub struct CloseError {
    pub key: RoutingKey,
    pub path: PathBuf,
    #[source]
    pub error: DemuxError,
}

/// Owns every open sink of a run, keyed by routing key.
///
/// Sinks are created lazily on first use and live until [`close_all`], which
/// also runs on drop so an early return or panic still releases every handle.
///
/// [`close_all`]: SinkRegistry::close_all
pub struct SinkRegistry<F: SinkFactory> {
    factory: F,
    sinks: FxHashMap<RoutingKey, F::Sink>,
    order: Vec<RoutingKey>,
    closed: bool,
}

impl<F: SinkFactory> SinkRegistry<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            sinks: FxHashMap::default(),
            order: Vec::new(),
            closed: false,
        }
    }

    /// Return the sink for `key`, opening it on first request.
    pub fn get_or_create(&mut self, key: &RoutingKey) -> Result<&mut F::Sink> {
        if self.closed {
            return Err(DemuxError::InvalidInput(format!(
                "sink registry already closed; cannot open '{}'",
                key
            )));
        }

        if !self.sinks.contains_key(key) {
            let sink = self
                .factory
                .create(key)
                .map_err(|err| DemuxError::SinkCreate {
                    key: key.to_string(),
                    path: self.factory.target_path(key),
                    source: Box::new(err),
                })?;
            debug!("Opened sink for '{}' -> {:?}", key, self.factory.target_path(key));
            self.sinks.insert(key.clone(), sink);
            self.order.push(key.clone());
        }

        self.sinks
            .get_mut(key)
            .ok_or_else(|| DemuxError::InvalidInput(format!("sink for '{}' vanished", key)))
    }

    /// Write `record` to the sink for `key`.
    pub fn write(&mut self, key: &RoutingKey, record: &F::Record) -> Result<()> {
        self.get_or_create(key)?.write(record)
    }

    /// Keys in the order their sinks were created.
    pub fn keys(&self) -> &[RoutingKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Close every open sink in creation order.
    ///
    /// Failures are logged and returned; the remaining sinks are still closed.
    /// Calling this again is a no-op.
    pub fn close_all(&mut self) -> Vec<CloseError> {
        let mut failures = Vec::new();
        if self.closed {
            return failures;
        }
        self.closed = true;

        for key in &self.order {
            if let Some(sink) = self.sinks.remove(key) {
                if let Err(error) = sink.close() {
                    let path = self.factory.target_path(key);
                    warn!("Error closing sink '{}' ({:?}): {}", key, path, error);
                    failures.push(CloseError {
                        key: key.clone(),
                        path,
                        error,
                    });
                }
            }
        }
        debug!("Closed {} sinks", self.order.len());
        failures
    }
}

impl<F: SinkFactory> Drop for SinkRegistry<F> {
    fn drop(&mut self) {
        if !self.closed {
            let failures = self.close_all();
            if !failures.is_empty() {
                warn!("{} sinks failed to close during cleanup", failures.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemFactory, MemRecord};

    #[test]
    fn get_or_create_is_idempotent() {
        let factory = MemFactory::default();
        let store = factory.store.clone();
        let mut registry = SinkRegistry::new(factory);
        let key = RoutingKey::new("AAA");

        registry.get_or_create(&key).unwrap();
        registry.get_or_create(&key).unwrap();
        registry.write(&key, &MemRecord::new("r1")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(store.borrow().order, vec![key.clone()]);
        assert_eq!(store.borrow().written[&key].len(), 1);
    }

    #[test]
    fn close_all_continues_past_failures() {
        let factory = MemFactory {
            fail_close: vec!["BBB".to_string()],
            ..Default::default()
        };
        let store = factory.store.clone();
        let mut registry = SinkRegistry::new(factory);
        for key in ["AAA", "BBB", "CCC"] {
            registry.get_or_create(&RoutingKey::new(key)).unwrap();
        }

        let failures = registry.close_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key.as_str(), "BBB");
        assert_eq!(store.borrow().closed.len(), 3);

        // second call does nothing and the registry refuses new sinks
        assert!(registry.close_all().is_empty());
        assert!(registry.get_or_create(&RoutingKey::new("DDD")).is_err());
    }

    #[test]
    fn drop_closes_open_sinks() {
        let factory = MemFactory::default();
        let store = factory.store.clone();
        {
            let mut registry = SinkRegistry::new(factory);
            registry.get_or_create(&RoutingKey::new("AAA")).unwrap();
            registry.get_or_create(&RoutingKey::undetermined()).unwrap();
        }
        assert_eq!(store.borrow().closed.len(), 2);
    }

    #[test]
    fn creation_failure_is_reported_with_key() {
        let factory = MemFactory {
            refuse: vec!["AAA".to_string()],
            ..Default::default()
        };
        let mut registry = SinkRegistry::new(factory);
        match registry.get_or_create(&RoutingKey::new("AAA")) {
            Err(DemuxError::SinkCreate { key, .. }) => assert_eq!(key, "AAA"),
            other => panic!("expected SinkCreate, got {:?}", other.map(|_| ())),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_thousands_of_keys() {
        let mut registry = SinkRegistry::new(MemFactory::default());
        for i in 0..5_000 {
            let key = RoutingKey::new(format!("BC{:05}", i));
            registry.write(&key, &MemRecord::new("r")).unwrap();
        }
        assert_eq!(registry.len(), 5_000);
        assert_eq!(registry.keys()[4_999].as_str(), "BC04999");
        assert!(registry.close_all().is_empty());
    }
}
