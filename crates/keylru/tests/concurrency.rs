// ==============================================
// CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Many threads share one cache and interleave every operation. Afterwards
// index cardinality, list length and size() must still agree.

use std::sync::{Arc, Barrier};
use std::thread;

use keylru::{Cache, Keyed};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Item {
    id: String,
    writer: usize,
}

impl Keyed for Item {
    fn key(&self) -> &str {
        &self.id
    }
}

fn assert_consistent(cache: &Cache<Item>) {
    cache.check_invariants().unwrap();

    let mut walked = 0;
    cache.for_each(|_, index| {
        assert_eq!(index, walked);
        walked += 1;
    });
    assert_eq!(walked, cache.size());
    assert!(cache.size() <= cache.capacity());
}

#[test]
fn mixed_operations_keep_index_and_list_in_sync() {
    const THREADS: usize = 16;
    const OPS: usize = 5_000;
    const KEYS: usize = 64;

    let cache = Arc::new(Cache::new(32).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS {
                    let id = ((i * 31 + t * 17) % KEYS).to_string();
                    cache.get(&id);
                    cache.add(Item {
                        id: id.clone(),
                        writer: t,
                    });
                    cache.peek_head();
                    cache.peek_tail();
                    cache.size();
                    if i % 3 == 0 {
                        cache.remove(&id);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_consistent(&cache);
}

#[test]
fn concurrent_distinct_inserts_fill_to_capacity() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let cache = Arc::new(Cache::new(100).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    cache.add(Item {
                        id: format!("{}-{}", t, i),
                        writer: t,
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.size(), 100);
    assert_eq!(cache.stats().inserts(), (THREADS * PER_THREAD) as u64);
    assert_eq!(cache.stats().evictions(), (THREADS * PER_THREAD - 100) as u64);
    assert_consistent(&cache);
}

#[test]
fn concurrent_overwrites_never_duplicate_a_key() {
    const THREADS: usize = 8;

    let cache = Arc::new(Cache::new(4).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..1_000 {
                    cache.add(Item {
                        id: "shared".to_string(),
                        writer: t,
                    });
                    assert!(cache.get("shared").is_some());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.size(), 1);
    let last = cache.peek_head().unwrap();
    assert_eq!(last.id, "shared");
    assert!(last.writer < THREADS);
    assert_consistent(&cache);
}
