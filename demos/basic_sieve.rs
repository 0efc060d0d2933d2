//! Example demonstrating the SIEVE cache eviction policy.
//!
//! SIEVE keeps one visited bit per entry and a persistent scan cursor, so a
//! cache hit is just a bit set. Visited entries get one pass of immunity from
//! eviction; the scan clears their bit as it walks by.
//!
//! Run with: cargo run --example basic_sieve

use sievekit::policy::sieve::SieveCache;

fn main() {
    println!("=== SIEVE Cache Example ===\n");

    let mut cache = SieveCache::new(3);
    println!("Created SIEVE cache: capacity={}\n", cache.capacity());

    cache.insert("page1", "content1");
    cache.insert("page2", "content2");
    cache.insert("page3", "content3");
    println!("Inserted page1, page2, page3 (len={})", cache.len());

    // A hit sets the visited bit without touching the chain.
    cache.get(&"page1");
    println!("Accessed page1 (now shielded for one eviction pass)");

    // The cache is full, so this insert runs the eviction scan. The scan
    // starts at the oldest entry, skips page1 while clearing its shield,
    // and evicts page2 instead.
    cache.insert("page4", "content4");
    println!("\nInserted page4, forcing one eviction:");
    for page in ["page1", "page2", "page3", "page4"] {
        let status = if cache.contains(&page) { "present" } else { "evicted" };
        println!("  {page}: {status}");
    }

    // Without another access, page1's immunity is spent. The hand resumes
    // near where the last eviction stopped rather than rescanning the tail.
    cache.insert("page5", "content5");
    println!("\nInserted page5, forcing another eviction:");
    for page in ["page1", "page3", "page4", "page5"] {
        let status = if cache.contains(&page) { "present" } else { "evicted" };
        println!("  {page}: {status}");
    }

    println!("\nFinal state: len={} capacity={}", cache.len(), cache.capacity());
}
