//! Example wiring a group into a registry with a slow backing store.
//!
//! Run with: RUST_LOG=peercache=debug cargo run --example basic_group

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use peercache::{GroupBuilder, GroupRegistry};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Group Examples ===\n");

    let db = HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]);
    let registry = GroupRegistry::new();
    let scores = GroupBuilder::new("scores")
        .cache_bytes(2 << 10)
        .loader_fn(move |key| {
            println!("   [slow db] search key {key}");
            thread::sleep(Duration::from_millis(20));
            db.get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| format!("{key} not exist").into())
        })
        .register(&registry)
        .expect("loader is set");

    // Example 1: first get loads, second is a cache hit
    println!("1. Load then hit");
    for _ in 0..2 {
        let value = scores.get("Tom").expect("Tom is in the db");
        println!("   Tom = {value}");
    }
    println!();

    // Example 2: concurrent misses share one load
    println!("2. Coalesced misses");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let group = registry.lookup("scores").expect("registered above");
            thread::spawn(move || group.get("Jack").map(|v| v.to_string()))
        })
        .collect();
    for handle in handles {
        println!("   Jack = {:?}", handle.join().expect("thread panicked"));
    }
    println!();

    // Example 3: loader errors reach the caller and are not cached
    println!("3. Missing key");
    match scores.get("kkk") {
        Ok(value) => println!("   unexpected value {value}"),
        Err(err) => println!("   error: {err}"),
    }
    println!();

    println!(
        "cached entries: {}, bytes: {}",
        scores.cached_len(),
        scores.cached_bytes()
    );
    #[cfg(feature = "metrics")]
    println!("hit ratio: {:.2}", scores.metrics().hit_ratio());
}
