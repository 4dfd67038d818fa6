// ==========================================
// Asset Ledger - sequence generator
// ==========================================
// Assigns the next integer in a per-key monotonic counter. Same-key
// callers serialize on a per-key mutex with a bounded wait; distinct
// keys never block each other. The persisted increment additionally
// runs in an IMMEDIATE transaction (see SqliteSequenceRepository), so
// the uniqueness invariant survives a second writer process too.
// ==========================================

use crate::repository::error::RepositoryError;
use crate::repository::sequence_repo::SequenceRepository;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, TryLockError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// The composite of attributes scoping one independent counter,
/// e.g. ("asset_tag", [category, vendor, bank]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    scope: String,
    segments: Vec<String>,
}

impl CounterKey {
    pub fn new<S, I, T>(scope: S, segments: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            scope: scope.into(),
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Stable storage key: scope and segments joined with ':'.
    pub fn key_string(&self) -> String {
        let mut key = self.scope.clone();
        for segment in &self.segments {
            key.push(':');
            key.push_str(segment);
        }
        key
    }
}

/// Sequence generation errors.
#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("lock wait exceeded for counter key '{key}' after {waited_ms} ms; retry the operation")]
    LockTimeout { key: String, waited_ms: u64 },

    #[error("no parent check registered for counter scope '{0}' (wiring defect)")]
    UnregisteredScope(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type SequenceResult<T> = Result<T, SequenceError>;

/// An issued sequence value together with its formatted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub sequence: i64,
    pub code: String,
}

/// Zero-pad a sequence after a prefix. A sequence wider than `width`
/// widens the field; nothing is truncated.
pub fn zero_padded(prefix: &str, sequence: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, sequence, width = width)
}

// ==========================================
// SequenceGenerator
// ==========================================
pub struct SequenceGenerator<R: SequenceRepository> {
    repo: R,
    /// One mutex per counter key, created lazily on first request.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    lock_wait: Duration,
}

impl<R: SequenceRepository> SequenceGenerator<R> {
    pub fn new(repo: R, lock_wait: Duration) -> Self {
        Self {
            repo,
            locks: Mutex::new(HashMap::new()),
            lock_wait,
        }
    }

    /// Issue the next value for `key` and format it with the supplied
    /// pure function.
    ///
    /// Order of operations:
    /// 1. Parent reference entities are verified before any lock is
    ///    taken, so a bad key never leaves an orphaned counter.
    /// 2. The per-key mutex is acquired with a bounded wait; exceeding
    ///    it fails with `LockTimeout` and the caller retries the whole
    ///    operation.
    /// 3. read -> increment -> write inside the critical section.
    pub fn next_value<F>(&self, key: &CounterKey, format: F) -> SequenceResult<GeneratedCode>
    where
        F: FnOnce(i64) -> String,
    {
        if !self.repo.has_scope(key.scope()) {
            return Err(SequenceError::UnregisteredScope(key.scope().to_string()));
        }

        self.repo.verify_parents(key)?;

        let key_lock = self.key_lock(key);
        let guard = self.acquire(key, &key_lock)?;

        let sequence = self.repo.fetch_and_increment(key)?;
        drop(guard);

        debug!(key = %key.key_string(), sequence, "sequence issued");
        Ok(GeneratedCode {
            sequence,
            code: format(sequence),
        })
    }

    /// Last issued value for a key, if the counter exists. Diagnostic
    /// read; never takes the per-key lock.
    pub fn current_value(&self, key: &CounterKey) -> SequenceResult<Option<i64>> {
        Ok(self.repo.current_value(key)?)
    }

    fn key_lock(&self, key: &CounterKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks
            .entry(key.key_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn acquire<'a>(
        &self,
        key: &CounterKey,
        key_lock: &'a Mutex<()>,
    ) -> SequenceResult<std::sync::MutexGuard<'a, ()>> {
        let deadline = Instant::now() + self.lock_wait;
        loop {
            match key_lock.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        warn!(key = %key.key_string(), waited_ms = self.lock_wait.as_millis() as u64, "lock wait exceeded");
                        return Err(SequenceError::LockTimeout {
                            key: key.key_string(),
                            waited_ms: self.lock_wait.as_millis() as u64,
                        });
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                // A poisoned key lock only means another caller
                // panicked after its increment committed; the counter
                // itself is still consistent.
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::RepositoryResult;
    use std::thread;

    /// Stub store whose increment takes `hold` to complete, so the
    /// per-key lock stays held long enough to contend with.
    struct SlowRepo {
        hold: Duration,
        counters: Mutex<HashMap<String, i64>>,
    }

    impl SlowRepo {
        fn new(hold: Duration) -> Self {
            Self {
                hold,
                counters: Mutex::new(HashMap::new()),
            }
        }
    }

    impl SequenceRepository for SlowRepo {
        fn has_scope(&self, _scope: &str) -> bool {
            true
        }

        fn verify_parents(&self, _key: &CounterKey) -> RepositoryResult<()> {
            Ok(())
        }

        fn fetch_and_increment(&self, key: &CounterKey) -> RepositoryResult<i64> {
            thread::sleep(self.hold);
            let mut counters = self.counters.lock().unwrap();
            let value = counters.entry(key.key_string()).or_insert(0);
            *value += 1;
            Ok(*value)
        }

        fn current_value(&self, key: &CounterKey) -> RepositoryResult<Option<i64>> {
            Ok(self.counters.lock().unwrap().get(&key.key_string()).copied())
        }
    }

    #[test]
    fn test_lock_wait_exceeded_fails_with_timeout() {
        let generator = Arc::new(SequenceGenerator::new(
            SlowRepo::new(Duration::from_millis(300)),
            Duration::from_millis(20),
        ));

        let holder = {
            let generator = generator.clone();
            thread::spawn(move || {
                generator.next_value(&CounterKey::new("tag", ["A"]), |s| s.to_string())
            })
        };
        // let the holder take the per-key lock
        thread::sleep(Duration::from_millis(50));

        let err = generator
            .next_value(&CounterKey::new("tag", ["A"]), |s| s.to_string())
            .unwrap_err();
        assert!(matches!(err, SequenceError::LockTimeout { .. }));

        // a distinct key is never blocked by the held one
        let other = generator
            .next_value(&CounterKey::new("tag", ["B"]), |s| s.to_string())
            .unwrap();
        assert_eq!(other.sequence, 1);

        // the held allocation itself completes normally
        assert!(holder.join().unwrap().is_ok());

        // retrying after the lock is free succeeds, no value was lost
        let retried = generator
            .next_value(&CounterKey::new("tag", ["A"]), |s| s.to_string())
            .unwrap();
        assert_eq!(retried.sequence, 2);
    }

    #[test]
    fn test_key_string_joins_scope_and_segments() {
        let key = CounterKey::new("asset_tag", ["ATM", "V1", "SBI"]);
        assert_eq!(key.key_string(), "asset_tag:ATM:V1:SBI");
        assert_eq!(key.scope(), "asset_tag");
        assert_eq!(key.segments().len(), 3);
    }

    #[test]
    fn test_zero_padded() {
        assert_eq!(zero_padded("ATMV1SBI", 7, 4), "ATMV1SBI0007");
        assert_eq!(zero_padded("ATMV1SBI", 42, 4), "ATMV1SBI0042");
    }

    #[test]
    fn test_zero_padded_widens_on_overflow() {
        // width 4 exhausted: the field widens, nothing is truncated
        assert_eq!(zero_padded("ATMV1SBI", 10_000, 4), "ATMV1SBI10000");
    }
}
