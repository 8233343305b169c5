//! Scaling tests with synthetic 50k item inventories.
//!
//! Measures the client-side work that grows with the snapshot:
//! - Full reload and category derivation
//! - Filter evaluation for each predicate
//! - Mutation followed by reload
//! - Fan-out to many subscribers

use pantry_sync::{
    apply_filter, derive_categories, ClientEvent, FilterState, InventoryClient, Item, ItemId,
    MemoryGateway, NewItem, SubscriptionConfig,
};
use std::time::Instant;

const ITEM_COUNT: usize = 50_000;
const CATEGORIES: [&str; 6] = ["Grains", "Dairy", "Legumes", "Spices", "Drinks", ""];

/// Timing helper
struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn report(&self) {
        println!("  {} took {:.2}ms", self.name, self.elapsed_ms());
    }

    fn report_with_count(&self, count: usize) {
        let ms = self.elapsed_ms();
        let per_item = if count > 0 { ms / count as f64 } else { 0.0 };
        println!(
            "  {} took {:.2}ms ({} items, {:.4}ms/item)",
            self.name, ms, count, per_item
        );
    }
}

fn synthetic_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| Item {
            id: ItemId((count - i) as u64),
            name: format!("Item {} {}", i, if i % 10 == 0 { "rice" } else { "other" }),
            category: Some(CATEGORIES[i % CATEGORIES.len()].to_string()),
            quantity: (i % 7) as f64,
            unit: "ud".to_string(),
            expiry_date: None,
            min_quantity: 3.0,
            notes: None,
        })
        .collect()
}

// =============================================================================
// Test: Reload and filter a 50k snapshot
// =============================================================================

#[test]
fn test_scaling_50k_reload_and_filter() {
    println!("\n=== 50k Items, Reload and Filter ===");

    let client = InventoryClient::new(MemoryGateway::with_items(synthetic_items(ITEM_COUNT)));

    let timer = Timer::new("Initial load with categories");
    client.load(true).unwrap();
    timer.report_with_count(ITEM_COUNT);

    assert_eq!(client.snapshot().len(), ITEM_COUNT);
    assert_eq!(client.categories().len(), CATEGORIES.len() - 1);

    let timer = Timer::new("Query filter 'rice'");
    let view = client.set_query("RICE");
    timer.report_with_count(view.len());
    assert_eq!(view.len(), ITEM_COUNT / 10);

    let timer = Timer::new("Query + category filter");
    let view = client.set_category("grains");
    timer.report_with_count(view.len());
    assert!(view
        .iter()
        .all(|item| item.category_str() == "Grains" && item.name.contains("rice")));

    let timer = Timer::new("Below-min filter alone");
    client.clear_filters();
    let view = client.set_below_min_only(true);
    timer.report_with_count(view.len());
    // quantity cycles 0..7 against a threshold of 3
    let expected = (0..ITEM_COUNT).filter(|i| i % 7 <= 3).count();
    assert_eq!(view.len(), expected);

    let timer = Timer::new("Reload keeping filters");
    client.load(false).unwrap();
    timer.report();
    assert_eq!(client.view().len(), expected);

    println!("  ✓ Reload and filter test passed");
}

// =============================================================================
// Test: Mutations against a large snapshot
// =============================================================================

#[test]
fn test_scaling_mutations_with_full_reload() {
    println!("\n=== Mutations on 50k Items ===");

    let client = InventoryClient::new(MemoryGateway::with_items(synthetic_items(ITEM_COUNT)));
    client.load(true).unwrap();

    let timer = Timer::new("Create 10 items");
    for i in 0..10 {
        client
            .create(NewItem::new(format!("New {}", i)).with_category("Frozen"))
            .unwrap();
    }
    timer.report_with_count(10);

    assert_eq!(client.snapshot().len(), ITEM_COUNT + 10);
    assert_eq!(client.filter().category, "Frozen");
    assert_eq!(client.view().len(), 10);

    let timer = Timer::new("Increment 10 items");
    for id in 1..=10u64 {
        client.increment(ItemId(id)).unwrap();
    }
    timer.report_with_count(10);

    let timer = Timer::new("Delete 10 items");
    for id in 1..=10u64 {
        client.delete(ItemId(id)).unwrap();
    }
    timer.report_with_count(10);
    assert_eq!(client.snapshot().len(), ITEM_COUNT);

    println!("  ✓ Mutation test passed");
}

// =============================================================================
// Test: Many subscribers
// =============================================================================

#[test]
fn test_scaling_subscriber_fan_out() {
    println!("\n=== Subscriber Fan-out ===");

    let client = InventoryClient::new(MemoryGateway::with_items(synthetic_items(5_000)));

    let handles: Vec<_> = (0..50)
        .map(|_| client.subscribe(SubscriptionConfig::default()))
        .collect();

    let timer = Timer::new("Load with 50 subscribers");
    client.load(true).unwrap();
    timer.report();

    let timer = Timer::new("10 filter changes");
    for i in 0..10 {
        client.set_query(format!("{}", i));
    }
    timer.report();

    for handle in &handles {
        let events = handle.drain();
        assert_eq!(events.len(), 12);
        assert!(matches!(events[0], ClientEvent::CategoriesChanged { .. }));
    }

    println!("  ✓ Fan-out test passed");
}

// =============================================================================
// Test: Slow subscriber gets dropped
// =============================================================================

#[test]
fn test_scaling_slow_subscriber_dropped() {
    println!("\n=== Slow Subscriber ===");

    let client = InventoryClient::new(MemoryGateway::with_items(synthetic_items(100)));
    let slow = client.subscribe(SubscriptionConfig {
        buffer_size: 4,
        ..Default::default()
    });
    let fast = client.subscribe(SubscriptionConfig {
        buffer_size: 1_000,
        ..Default::default()
    });

    let timer = Timer::new("200 filter changes");
    for i in 0..200 {
        client.set_below_min_only(i % 2 == 0);
    }
    timer.report();

    assert_eq!(slow.drain().len(), 4);
    assert_eq!(fast.drain().len(), 200);

    // The slow subscriber no longer receives anything
    client.refresh_view();
    assert!(slow.try_recv().is_err());
    assert_eq!(fast.drain().len(), 1);

    println!("  ✓ Slow subscriber test passed");
}

// =============================================================================
// Test: Pure functions on large inputs
// =============================================================================

#[test]
fn test_scaling_pure_view_functions() {
    println!("\n=== View Functions on 50k Items ===");

    let items = synthetic_items(ITEM_COUNT);

    let timer = Timer::new("derive_categories");
    let categories = derive_categories(&items);
    timer.report_with_count(items.len());
    assert!(!categories.contains(""));

    let timer = Timer::new("apply_filter (identity)");
    let view = apply_filter(&items, &FilterState::default());
    timer.report_with_count(view.len());
    assert_eq!(view.len(), items.len());

    println!("  ✓ View function test passed");
}
