//! Emission record lifecycle over the in-memory store

mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;

use common::*;
use minecarbon::emissions::{EmissionFactors, EmissionInput, EmissionRecords, EmissionUpdate};
use minecarbon::store::{EmissionStore, MemoryStore};
use minecarbon::{validate, CoreError};

#[test]
fn created_record_stores_the_computed_total() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    let created = records.create(submission(mine.id, 1, reference_input())).unwrap();
    assert_close(created.total_emissions, 366.636);

    let fetched = records.get(created.id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.input(), reference_input());
}

#[test]
fn client_supplied_total_is_ignored() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;

    let body = json!({
        "mine_id": mine.id,
        "date": "2024-03-01",
        "coal_output": "100",
        "electricity_usage": 5000,
        "fuel_consumption": 200,
        "methane_leaks": 10,
        "stockpile_emissions": 2,
        "total_emissions": 1.0,
    });
    let submission = validate::emission_submission(&body).unwrap();

    let created = EmissionRecords::new(&mut store, &factors).create(submission).unwrap();
    assert_close(created.total_emissions, 366.636);
}

#[test]
fn omitted_methane_and_stockpile_default_to_zero() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;

    let body = json!({
        "mine_id": mine.id.to_string(),
        "coal_output": 10,
        "electricity_usage": 1000,
        "fuel_consumption": 500,
    });
    let submission = validate::emission_submission(&body).unwrap();
    assert_eq!(submission.date, None);

    let created = EmissionRecords::new(&mut store, &factors).create(submission).unwrap();
    assert_eq!(created.methane_leaks, 0.0);
    assert_eq!(created.stockpile_emissions, 0.0);
    assert_close(created.total_emissions, 8.0 + 0.82 + 1.34);
}

#[test]
fn update_recomputes_the_total() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    let created = records.create(submission(mine.id, 1, reference_input())).unwrap();
    let updated = records.update(created.id, EmissionUpdate {
        date: None,
        input: EmissionInput { coal_output: 200.0, ..reference_input() },
    }).unwrap();

    assert_close(updated.total_emissions, 366.636 + 80.0);
    // No date in the update keeps the original one
    assert_eq!(updated.date, created.date);
    assert_eq!(updated.mine_id, mine.id);

    let redated = records.update(created.id, EmissionUpdate {
        date: Some(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap()),
        input: reference_input(),
    }).unwrap();
    assert_eq!(redated.date, Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap());
    assert_close(redated.total_emissions, 366.636);
}

#[test]
fn missing_mine_is_rejected_without_writing() {
    let mut store = MemoryStore::new();
    let factors = EmissionFactors::IPCC;

    let err = EmissionRecords::new(&mut store, &factors)
        .create(submission(404, 1, reference_input()))
        .unwrap_err();
    assert_eq!(err.missing_entity(), Some("mine"));

    assert!(store.emission_totals(None).unwrap().is_empty());
}

#[test]
fn updating_or_deleting_a_missing_record_leaves_the_store_alone() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);
    let kept = records.create(submission(mine.id, 1, reference_input())).unwrap();

    let err = records.update(9999, EmissionUpdate { date: None, input: input_totalling(5.0) }).unwrap_err();
    assert_eq!(err.missing_entity(), Some("emission record"));

    let err = records.delete(9999).unwrap_err();
    assert_eq!(err.missing_entity(), Some("emission record"));

    assert_eq!(records.list_for_mine(mine.id).unwrap(), vec![kept]);
}

#[test]
fn delete_removes_only_that_record() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    let first = records.create(submission(mine.id, 1, input_totalling(10.0))).unwrap();
    let second = records.create(submission(mine.id, 2, input_totalling(20.0))).unwrap();

    records.delete(first.id).unwrap();

    assert_eq!(records.get(first.id).unwrap_err().missing_entity(), Some("emission record"));
    assert_eq!(records.list_for_mine(mine.id).unwrap(), vec![second]);
}

#[test]
fn records_are_listed_newest_first() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let other = add_mine(&mut store, "South Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);

    records.create(submission(mine.id, 3, input_totalling(1.0))).unwrap();
    records.create(submission(mine.id, 9, input_totalling(2.0))).unwrap();
    records.create(submission(other.id, 5, input_totalling(3.0))).unwrap();
    records.create(submission(mine.id, 6, input_totalling(4.0))).unwrap();

    let totals: Vec<f64> = records.list_for_mine(mine.id).unwrap()
        .into_iter()
        .map(|e| e.total_emissions)
        .collect();
    assert_eq!(totals, vec![2.0, 4.0, 1.0]);
}

#[test]
fn custom_factors_apply_to_new_records() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors { coal_production: 1.0, ..EmissionFactors::IPCC };

    let created = EmissionRecords::new(&mut store, &factors)
        .create(submission(mine.id, 1, reference_input()))
        .unwrap();
    assert_close(created.total_emissions, 366.636 + 20.0);
}

/// There is no isolation between concurrent updates to the same id: whichever write lands last
/// wins, and its total always matches its own inputs.
#[test]
fn same_id_updates_are_last_write_wins() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let mut records = EmissionRecords::new(&mut store, &factors);
    let created = records.create(submission(mine.id, 1, input_totalling(1.0))).unwrap();

    records.update(created.id, EmissionUpdate { date: None, input: input_totalling(50.0) }).unwrap();
    records.update(created.id, EmissionUpdate { date: None, input: input_totalling(70.0) }).unwrap();

    let stored = records.get(created.id).unwrap();
    assert_eq!(stored.total_emissions, 70.0);
    assert_eq!(stored.input(), input_totalling(70.0));
}

#[test]
fn storage_failure_surfaces_as_a_storage_error() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    let created = EmissionRecords::new(&mut store, &factors)
        .create(submission(mine.id, 1, input_totalling(10.0)))
        .unwrap();

    store.set_outage(Some("connection reset"));
    {
        let mut records = EmissionRecords::new(&mut store, &factors);

        let err = records.create(submission(mine.id, 2, input_totalling(20.0))).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }), "got {:?}", err);

        let err = records.update(created.id, EmissionUpdate { date: None, input: input_totalling(99.0) }).unwrap_err();
        assert!(matches!(err, CoreError::Storage { operation: "update", .. }), "got {:?}", err);

        let err = records.statistics(None).unwrap_err();
        assert!(matches!(err, CoreError::Storage { .. }), "got {:?}", err);
    }
    store.set_outage(None);

    // Nothing from the failed calls made it in
    let records = EmissionRecords::new(&mut store, &factors).list_for_mine(mine.id).unwrap();
    assert_eq!(records, vec![created]);
}

#[test]
fn overflowing_total_is_never_written() {
    let mut store = MemoryStore::new();
    let mine = add_mine(&mut store, "North Pit");
    let factors = EmissionFactors::IPCC;
    // Passes validation, but 1e307 m³ of methane times its GWP overflows to infinity
    let overflowing = EmissionInput { methane_leaks: 1e307, ..reference_input() };

    let mut records = EmissionRecords::new(&mut store, &factors);
    let kept = records.create(submission(mine.id, 1, reference_input())).unwrap();

    let err = records.create(submission(mine.id, 2, overflowing)).unwrap_err();
    assert!(matches!(err, CoreError::NonFiniteTotal { .. }), "got {:?}", err);

    let err = records.update(kept.id, EmissionUpdate { date: None, input: overflowing }).unwrap_err();
    assert!(matches!(err, CoreError::NonFiniteTotal { .. }), "got {:?}", err);

    let stored = records.get(kept.id).unwrap();
    assert_eq!(stored, kept);
    assert_close(stored.total_emissions, 366.636);

    assert_eq!(store.emission_totals(None).unwrap(), vec![kept.total_emissions]);
}

#[test]
fn invalid_input_never_reaches_the_store() {
    let body = json!({
        "mine_id": 1,
        "coal_output": -5,
        "electricity_usage": 1,
        "fuel_consumption": 1,
    });
    let err = validate::emission_submission(&body).unwrap_err();
    assert_eq!(err.field(), "coal_output");

    let body = json!({
        "mine_id": 1,
        "coal_output": "lots",
        "electricity_usage": 1,
        "fuel_consumption": 1,
    });
    let err = validate::emission_submission(&body).unwrap_err();
    assert_eq!(err.field(), "coal_output");
}
