//! Concurrent stress workload

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use keylru::{Cache, StatsSnapshot};
use tracing::{debug, info};

use crate::replay::Record;

/// Shape of a stress run
#[derive(Debug, Clone, Copy)]
pub struct StressPlan {
    pub threads: usize,
    pub ops: usize,
    pub keys: usize,
}

/// Result of a stress run that kept the cache consistent
#[derive(Debug)]
pub struct StressReport {
    pub elapsed: Duration,
    pub size: usize,
    pub stats: StatsSnapshot,
}

/// Run `plan` against `cache` and verify the cache afterwards
///
/// Each worker cycles through get, add, peek and size over its own slice of
/// the key space, removing every third key it touches.
pub fn run(cache: Arc<Cache<Record>>, plan: StressPlan) -> Result<StressReport> {
    let keys = plan.keys.max(1);
    let barrier = Arc::new(Barrier::new(plan.threads));
    let start = Instant::now();

    let handles: Vec<_> = (0..plan.threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..plan.ops {
                    let id = format!("key-{}", (i * 31 + t * 17) % keys);
                    if cache.get(&id).is_none() {
                        cache.add(Record::new(id.clone(), format!("t{}-{}", t, i)));
                    }
                    cache.peek_head();
                    cache.peek_tail();
                    cache.size();
                    if i % 3 == 0 {
                        cache.remove(&id);
                    }
                }
                debug!(worker = t, "stress worker finished");
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("stress worker panicked"))?;
    }
    let elapsed = start.elapsed();

    cache.check_invariants()?;

    let mut walked = 0;
    cache.for_each(|_, _| walked += 1);
    let size = cache.size();
    if walked != size {
        return Err(anyhow!("walked {} entries but size() is {}", walked, size));
    }

    info!(
        threads = plan.threads,
        ops = plan.ops,
        elapsed_ms = elapsed.as_millis() as u64,
        "stress run consistent"
    );

    Ok(StressReport {
        elapsed,
        size,
        stats: cache.stats().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_small_run() {
        let cache = Arc::new(Cache::new(8).unwrap());
        let plan = StressPlan {
            threads: 4,
            ops: 500,
            keys: 32,
        };

        let report = run(Arc::clone(&cache), plan).unwrap();
        assert!(report.size <= 8);
        assert_eq!(report.size, cache.size());
        assert_eq!(report.stats.hits + report.stats.misses, 4 * 500);
    }

    #[test]
    fn test_stress_single_key() {
        let cache = Arc::new(Cache::new(1).unwrap());
        let plan = StressPlan {
            threads: 3,
            ops: 200,
            keys: 1,
        };

        let report = run(cache, plan).unwrap();
        assert!(report.size <= 1);
    }
}
