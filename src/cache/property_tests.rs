//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a simple recency model.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::cache::{Cache, CacheStore, Expiry};
use crate::codec::{JsonCodec, ValueCodec};
use crate::config::CacheConfig;

// == Test Configuration ==
const TEST_CAPACITY: usize = 8;

// == Strategies ==
/// Small key space so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-j]"
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: i64 },
    Get { key: String },
    Remove { key: String },
    Purge,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => Just(CacheOp::Purge),
    ]
}

/// Reference model: a vector ordered least to most recently used.
#[derive(Default)]
struct Model {
    order: Vec<(String, i64)>,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.order.iter().position(|(k, _)| k == key)
    }

    fn set(&mut self, key: String, value: i64, capacity: usize) {
        if let Some(pos) = self.position(&key) {
            self.order.remove(pos);
        } else if self.order.len() >= capacity {
            self.order.remove(0);
        }
        self.order.push((key, value));
    }

    fn get(&mut self, key: &str) -> Option<i64> {
        let pos = self.position(key)?;
        let entry = self.order.remove(pos);
        let value = entry.1;
        self.order.push(entry);
        Some(value)
    }

    fn remove(&mut self, key: &str) {
        if let Some(pos) = self.position(key) {
            self.order.remove(pos);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.order.iter().map(|(k, _)| k.clone()).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any operation sequence leaves the store in the same recency order as
    // the model, with the same values.
    #[test]
    fn prop_matches_recency_model(ops in prop::collection::vec(cache_op_strategy(), 1..120)) {
        let cache = Cache::new(CacheConfig::new(TEST_CAPACITY)).unwrap();
        let mut model = Model::default();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), &value).unwrap();
                    model.set(key, value, TEST_CAPACITY);
                }
                CacheOp::Get { key } => {
                    let actual = cache.get::<i64>(&key).ok();
                    prop_assert_eq!(actual, model.get(&key));
                }
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                    model.remove(&key);
                }
                CacheOp::Purge => {
                    cache.purge();
                    model.order.clear();
                }
            }
            prop_assert_eq!(cache.keys(), model.keys());
            prop_assert_eq!(cache.len(), model.order.len());
        }
    }

    // Inserting M distinct keys into capacity N leaves exactly min(M, N) keys,
    // the most recent ones in insertion order.
    #[test]
    fn prop_capacity_keeps_most_recent(capacity in 1usize..32, count in 1usize..100) {
        let mut store = CacheStore::new(capacity, Duration::ZERO);
        for i in 0..count {
            let encoded = JsonCodec.encode(&i).unwrap();
            store.set(i.to_string(), encoded, Expiry::Default);
            prop_assert!(store.len() <= capacity);
        }

        let expected: Vec<String> = (count.saturating_sub(capacity)..count)
            .map(|i| i.to_string())
            .collect();
        prop_assert_eq!(store.keys(), expected);
    }

    // Remove makes a key unreadable regardless of its recency position.
    #[test]
    fn prop_remove_at_any_position(count in 1usize..20, victim in 0usize..20) {
        let cache = Cache::new(CacheConfig::new(32)).unwrap();
        for i in 0..count {
            cache.set(i.to_string(), &i).unwrap();
        }
        let victim = (victim % count).to_string();

        cache.remove(&victim);

        prop_assert!(cache.get::<usize>(&victim).unwrap_err().is_not_found());
        prop_assert_eq!(cache.len(), count - 1);
        prop_assert!(!cache.keys().contains(&victim));
    }

    // Structured values come back equal, and mutating one read does not
    // affect the next.
    #[test]
    fn prop_round_trip_without_aliasing(
        value in prop::collection::btree_map("[a-z]{1,8}", prop::collection::vec(any::<i32>(), 0..6), 0..6)
    ) {
        let cache = Cache::new(CacheConfig::new(4)).unwrap();
        cache.set("v", &value).unwrap();

        let mut first: BTreeMap<String, Vec<i32>> = cache.get("v").unwrap();
        prop_assert_eq!(&first, &value);
        first.insert("mutated".to_string(), vec![1]);

        let second: BTreeMap<String, Vec<i32>> = cache.get("v").unwrap();
        prop_assert_eq!(second, value);
    }

    // Integers read back through a dynamic map always report as i64.
    #[test]
    fn prop_dynamic_integers_normalize_to_i64(n in any::<i32>()) {
        let cache = Cache::new(CacheConfig::new(4)).unwrap();
        let mut value = HashMap::new();
        value.insert("n", n);
        cache.set("m", &value).unwrap();

        let read: HashMap<String, crate::codec::DynamicValue> = cache.get("m").unwrap();
        prop_assert_eq!(read["n"].as_i64(), Some(i64::from(n)));
    }
}
