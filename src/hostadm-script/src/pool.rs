//! Runtime pool.
//!
//! Runtimes are expensive to set up, so they are kept per configuration
//! identity and handed out exclusively. A checked-out runtime comes back
//! when its [`PooledContext`] is dropped, after its frame has been reset.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::Deref;

use hostadm_common::{ConfigId, HostConfig};

use crate::Result;
use crate::runtime::ScriptRuntime;

/// Pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Runtimes created because none was idle.
    pub created: usize,
    pub acquired: usize,
    pub released: usize,
}

impl PoolStats {
    /// Contexts currently checked out.
    pub fn in_use(&self) -> usize {
        self.acquired - self.released
    }
}

/// Idle runtimes keyed by configuration identity.
pub struct RuntimePool {
    version: String,
    idle: RefCell<HashMap<ConfigId, Vec<ScriptRuntime>>>,
    stats: Cell<PoolStats>,
}

impl RuntimePool {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            idle: RefCell::new(HashMap::new()),
            stats: Cell::new(PoolStats::default()),
        }
    }

    /// Check out a runtime for `config`, creating one if none is idle.
    pub fn acquire(&self, config: &HostConfig) -> Result<PooledContext<'_>> {
        let reused = self
            .idle
            .borrow_mut()
            .get_mut(&config.id())
            .and_then(Vec::pop);

        let runtime = match reused {
            Some(runtime) => runtime,
            None => {
                let runtime = ScriptRuntime::new(config, &self.version)?;
                self.update_stats(|stats| stats.created += 1);
                runtime
            }
        };

        self.update_stats(|stats| stats.acquired += 1);
        Ok(PooledContext {
            pool: self,
            runtime: Some(runtime),
        })
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.get()
    }

    /// Idle runtimes held for `id`.
    pub fn idle_count(&self, id: ConfigId) -> usize {
        self.idle.borrow().get(&id).map_or(0, Vec::len)
    }

    fn release(&self, runtime: ScriptRuntime) {
        runtime.reset_frame();
        self.idle
            .borrow_mut()
            .entry(runtime.config_id())
            .or_default()
            .push(runtime);
        self.update_stats(|stats| stats.released += 1);
    }

    fn update_stats(&self, f: impl FnOnce(&mut PoolStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// Exclusive handle on a pooled runtime.
pub struct PooledContext<'p> {
    pool: &'p RuntimePool,
    runtime: Option<ScriptRuntime>,
}

impl Deref for PooledContext<'_> {
    type Target = ScriptRuntime;

    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the runtime out.
        match &self.runtime {
            Some(runtime) => runtime,
            None => unreachable!("pooled runtime already released"),
        }
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            self.pool.release(runtime);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reuse_per_config() {
        let pool = RuntimePool::new("1.0.0");
        let config = HostConfig::default();

        {
            let ctx = pool.acquire(&config).unwrap();
            assert_eq!(ctx.config_id(), config.id());
            assert_eq!(pool.stats().in_use(), 1);
        }
        assert_eq!(pool.idle_count(config.id()), 1);

        let _ctx = pool.acquire(&config).unwrap();
        assert_eq!(
            pool.stats(),
            PoolStats {
                created: 1,
                acquired: 2,
                released: 1
            }
        );
        assert_eq!(pool.idle_count(config.id()), 0);
    }

    #[test]
    fn test_distinct_configs_do_not_share() {
        let pool = RuntimePool::new("1.0.0");
        let first = HostConfig::default();
        let second = HostConfig::default();

        drop(pool.acquire(&first).unwrap());
        drop(pool.acquire(&second).unwrap());

        assert_eq!(pool.stats().created, 2);
        assert_eq!(pool.idle_count(first.id()), 1);
        assert_eq!(pool.idle_count(second.id()), 1);
    }

    #[test]
    fn test_concurrent_checkouts_get_separate_runtimes() {
        let pool = RuntimePool::new("1.0.0");
        let config = HostConfig::default();

        let a = pool.acquire(&config).unwrap();
        let b = pool.acquire(&config).unwrap();
        a.lua().load("marker = 1").exec().unwrap();
        let marker: Option<i64> = b.lua().load("return marker").eval().unwrap();
        assert_eq!(marker, None);

        drop(a);
        drop(b);
        assert_eq!(pool.idle_count(config.id()), 2);
        assert_eq!(pool.stats().in_use(), 0);
    }
}
