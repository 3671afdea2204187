//! Aggregation over stored emission records

mod common;

use serde_json::json;

use common::*;
use minecarbon::emissions::{aggregate, EmissionFactors, EmissionRecords, EmissionUpdate};
use minecarbon::store::MemoryStore;

#[test]
fn no_records_gives_null_average_min_and_max() {
    let mut store = MemoryStore::new();

    let stats = aggregate(&mut store, None).unwrap();
    assert_eq!(stats.total_records, 0);
    assert_eq!(stats.total_emissions, 0.0);
    assert!(stats.average_emissions.is_none());
    assert!(stats.min_emissions.is_none());
    assert!(stats.max_emissions.is_none());

    let serialized = serde_json::to_value(stats).unwrap();
    assert_eq!(serialized["average_emissions"], json!(null));
    assert_eq!(serialized["min_emissions"], json!(null));
    assert_eq!(serialized["max_emissions"], json!(null));
}

#[test]
fn summarizes_all_records() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    for (day, total) in [(1, 10.0), (2, 20.0), (3, 30.0)] {
        records.create(submission(mine.id, day, input_totalling(total))).unwrap();
    }

    let stats = records.statistics(None).unwrap();
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.total_emissions, 60.0);
    assert_eq!(stats.average_emissions, Some(20.0));
    assert_eq!(stats.min_emissions, Some(10.0));
    assert_eq!(stats.max_emissions, Some(30.0));
}

#[test]
fn filters_by_mine() {
    let mut store = MemoryStore::new();
    let north = add_mine(&mut store, "North Pit");
    let south = add_mine(&mut store, "South Pit");
    let idle = add_mine(&mut store, "Idle Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    records.create(submission(north.id, 1, input_totalling(10.0))).unwrap();
    records.create(submission(north.id, 2, input_totalling(30.0))).unwrap();
    records.create(submission(south.id, 1, input_totalling(100.0))).unwrap();

    let north_stats = records.statistics(Some(north.id)).unwrap();
    assert_eq!(north_stats.total_records, 2);
    assert_eq!(north_stats.total_emissions, 40.0);
    assert_eq!(north_stats.average_emissions, Some(20.0));

    let all = records.statistics(None).unwrap();
    assert_eq!(all.total_records, 3);
    assert_eq!(all.max_emissions, Some(100.0));

    // A mine with no records is an empty set, not an error
    let idle_stats = records.statistics(Some(idle.id)).unwrap();
    assert_eq!(idle_stats.total_records, 0);
    assert_eq!(idle_stats.average_emissions, None);
}

#[test]
fn zero_totals_are_not_null() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    records.create(submission(mine.id, 1, input_totalling(0.0))).unwrap();

    let stats = records.statistics(Some(mine.id)).unwrap();
    assert_eq!(stats.total_records, 1);
    assert_eq!(stats.average_emissions, Some(0.0));
    assert_eq!(stats.min_emissions, Some(0.0));
    assert_eq!(stats.max_emissions, Some(0.0));
}

#[test]
fn stats_follow_updates_and_deletes() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    let first = records.create(submission(mine.id, 1, input_totalling(10.0))).unwrap();
    let second = records.create(submission(mine.id, 2, input_totalling(20.0))).unwrap();

    records.update(first.id, EmissionUpdate { date: None, input: input_totalling(50.0) }).unwrap();
    records.delete(second.id).unwrap();

    let stats = records.statistics(Some(mine.id)).unwrap();
    assert_eq!(stats.total_records, 1);
    assert_eq!(stats.total_emissions, 50.0);
}
