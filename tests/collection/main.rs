//! Integration tests for RowCollection delegation and defaults.


use std::sync::Arc;

use rows::{call_log, calls, Plain, Recorder, Ticket};
use serde_json::json;
use sql_collection::{
    CollectionError, DatabaseHandle, Fields, InMemoryDatabase, ModelRegistry, RecordModel,
    RowCollection, RowError, DATETIME,
};

fn database() -> DatabaseHandle {
    Arc::new(InMemoryDatabase::new())
}

#[test]
fn add_keeps_call_order_and_duplicates() {
    let mut collection = RowCollection::new();
    for name in ["b", "a", "b", "c"] {
        collection.add(json!({ "name": name })).unwrap();
    }

    let names: Vec<_> = collection
        .iter()
        .map(|row| row.field("name").cloned().unwrap())
        .collect();
    assert_eq!(names, vec![json!("b"), json!("a"), json!("b"), json!("c")]);
}

#[test]
fn set_database_reaches_existing_and_later_rows() {
    let log = call_log();
    let db = database();

    let mut collection = RowCollection::new();
    collection.add(json!({})).unwrap();
    collection.add_row(Recorder::new("1", &log)).unwrap();

    collection.set_database(db.clone());
    collection.add(json!({})).unwrap();

    for index in 0..collection.len() {
        let row = collection.get_mut(index).unwrap();
        let configured = row.as_configurable().unwrap().database().unwrap();
        assert!(Arc::ptr_eq(configured, &db));
    }
}

#[test]
fn set_database_replaces_a_rows_own_database() {
    let log = call_log();
    let own = database();
    let shared = database();

    let mut recorder = Recorder::new("1", &log);
    recorder.database = Some(own.clone());

    let mut collection = RowCollection::new();
    collection.add_row(recorder).unwrap();
    assert!(Arc::ptr_eq(
        collection.get_as::<Recorder>(0).unwrap().database.as_ref().unwrap(),
        &own
    ));

    collection.set_database(shared.clone());

    let recorder = collection.get_as::<Recorder>(0).unwrap();
    assert!(Arc::ptr_eq(recorder.database.as_ref().unwrap(), &shared));
}

#[test]
fn add_overrides_a_preconfigured_row() {
    let log = call_log();
    let shared = database();

    let mut collection = RowCollection::new();
    collection.set_database(shared.clone());
    collection.set_table("users").unwrap();

    let mut recorder = Recorder::new("1", &log);
    recorder.database = Some(database());
    recorder.table = Some("archive".into());
    collection.add_row(recorder).unwrap();

    let recorder = collection.get_as::<Recorder>(0).unwrap();
    assert!(Arc::ptr_eq(recorder.database.as_ref().unwrap(), &shared));
    assert_eq!(recorder.table.as_deref(), Some("users"));
}

#[test]
fn add_leaves_rows_without_configuration_untouched() {
    let mut fields = Fields::new();
    fields.insert("name".into(), json!("ada"));

    let mut collection = RowCollection::new();
    collection.set_database(database());
    collection.set_table("users").unwrap();

    collection.add_row(Plain { fields }).unwrap();

    assert_eq!(collection.len(), 1);
    let plain = collection.get_as::<Plain>(0).unwrap();
    assert_eq!(plain.fields.len(), 1);
    assert_eq!(plain.fields["name"], json!("ada"));
}

#[test]
fn set_table_reaches_every_configurable_row() {
    let log = call_log();

    let mut collection = RowCollection::new();
    collection.add(json!({})).unwrap();
    collection.add_row(Recorder::new("1", &log)).unwrap();
    collection.add_row(Plain { fields: Fields::new() }).unwrap();

    collection.set_table("users").unwrap();

    assert_eq!(collection.table(), Some("users"));
    assert_eq!(
        collection.get_mut(0).unwrap().as_configurable().unwrap().table(),
        Some("users")
    );
    assert_eq!(collection.get_as::<Recorder>(1).unwrap().table.as_deref(), Some("users"));
}

#[test]
fn add_rejects_non_mapping_without_mutating() {
    let mut collection = RowCollection::new();
    collection.add(json!({ "name": "ada" })).unwrap();

    let err = collection.add(json!(42)).unwrap_err();

    assert_eq!(
        err,
        CollectionError::Argument {
            index: 1,
            expected: "field mapping or row",
            found: "number 42".into()
        }
    );
    assert_eq!(collection.len(), 1);
}

#[test]
fn rejected_model_keeps_previous_factory() {
    let mut registry = ModelRegistry::default();
    registry.register::<Ticket>("ticket");
    let mut collection = RowCollection::with_registry(registry);

    let err = collection.set_model("SomeUnrelatedType").unwrap_err();
    assert_eq!(
        err,
        CollectionError::Configuration {
            model: "SomeUnrelatedType".into()
        }
    );
    assert_eq!(err.to_string(), "SomeUnrelatedType is not a valid model");

    collection.add(json!({ "subject": "printer" })).unwrap();
    assert!(collection.get_as::<RecordModel>(0).is_some());

    collection.set_model("ticket").unwrap();
    collection.add(json!({ "subject": "network" })).unwrap();

    assert!(collection.get_as::<RecordModel>(0).is_some());
    assert!(collection.get_as::<Ticket>(1).is_some());
    assert_eq!(collection.model(), "ticket");
}

#[test]
fn insert_stops_at_first_failing_row() {
    let log = call_log();

    let mut collection = RowCollection::new();
    collection
        .add_row(Recorder::new("1", &log))
        .unwrap()
        .add_row(Recorder::failing("2", &log, "insert"))
        .unwrap()
        .add_row(Recorder::new("3", &log))
        .unwrap();

    let err = collection.insert(None, None).unwrap_err();

    assert_eq!(
        err,
        CollectionError::Row(RowError::Other("2 failed to insert".into()))
    );
    assert_eq!(err.to_string(), "2 failed to insert");
    assert_eq!(calls(&log), vec!["1:insert", "2:insert"]);
}

#[test]
fn persistence_calls_fan_out_in_order_with_overrides() {
    let log = call_log();
    let db = database();

    let mut collection = RowCollection::new();
    collection
        .add_row(Recorder::new("1", &log))
        .unwrap()
        .add_row(Plain { fields: Fields::new() })
        .unwrap()
        .add_row(Recorder::new("2", &log))
        .unwrap();

    collection
        .update(None, None)
        .unwrap()
        .save(Some("archive"), Some(&db))
        .unwrap()
        .remove(None, None)
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            "1:update",
            "2:update",
            "1:save@archive",
            "2:save@archive",
            "1:remove",
            "2:remove",
        ]
    );
}

#[test]
fn format_time_skips_rows_without_the_capability() {
    let log = call_log();

    let mut plain_fields = Fields::new();
    plain_fields.insert("created_at".into(), json!(0));

    let mut collection = RowCollection::new();
    collection
        .add_row(Recorder::new("1", &log))
        .unwrap()
        .add_row(Plain {
            fields: plain_fields,
        })
        .unwrap()
        .add(json!({ "created_at": 86400 }))
        .unwrap();

    collection.format_time("created_at", "%Y-%m-%d").unwrap();

    assert_eq!(calls(&log), vec!["1:format_time:created_at:%Y-%m-%d"]);
    assert_eq!(collection[1].field("created_at"), Some(&json!(0)));
    assert_eq!(collection[2].field("created_at"), Some(&json!("1970-01-02")));
}

#[test]
fn format_time_default_uses_datetime() {
    let log = call_log();

    let mut collection = RowCollection::new();
    collection.add_row(Recorder::new("1", &log)).unwrap();

    collection.format_time_default("updated_at").unwrap();

    assert_eq!(
        calls(&log),
        vec![format!("1:format_time:updated_at:{}", DATETIME)]
    );
}

#[test]
fn added_fields_read_back_from_last_row() {
    let mut collection = RowCollection::new();
    collection
        .add(json!({ "name": "ada" }))
        .unwrap()
        .add(json!({ "name": "grace", "born": 1906 }))
        .unwrap();

    let last = collection.last().unwrap();
    assert_eq!(last.field("name"), Some(&json!("grace")));
    assert_eq!(last.field("born"), Some(&json!(1906)));
}

#[test]
fn to_fields_skips_rows_without_fields() {
    let log = call_log();

    let mut collection = RowCollection::new();
    collection
        .add(json!({ "n": 1 }))
        .unwrap()
        .add_row(Recorder::new("1", &log))
        .unwrap()
        .add(json!({ "n": 2 }))
        .unwrap();

    let fields = collection.to_fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["n"], json!(1));
    assert_eq!(fields[1]["n"], json!(2));
}
