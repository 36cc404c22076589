use serde_json::json;

use super::*;

fn owner() -> Uuid {
    Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0)
}

fn record(index: u32, color: &str) -> BrickRecord {
    BrickRecord {
        brick_index: index,
        fields: BrickFields { color: Some(color.to_owned()), ..BrickFields::default() },
    }
}

fn insert(index: u32, color: &str) -> BrickChange {
    BrickChange::insert(record(index, color))
}

// =============================================================
// BrickFields / BrickRecord
// =============================================================

#[test]
fn color_falls_back_to_default_when_missing_or_blank() {
    assert_eq!(BrickFields::default().color(), DEFAULT_BRICK_COLOR);
    let blank = BrickFields { color: Some("  ".into()), ..BrickFields::default() };
    assert_eq!(blank.color(), DEFAULT_BRICK_COLOR);
    let set = BrickFields { color: Some("#8FD3FF".into()), ..BrickFields::default() };
    assert_eq!(set.color(), "#8FD3FF");
}

#[test]
fn record_deserializes_store_row() {
    let row = json!({
        "id": 41,
        "brick_index": 2384,
        "color": "#FF9BD0",
        "message": "hello wall",
        "facebook_url": null,
        "instagram_url": "https://instagram.com/me",
        "youtube_url": null,
        "tiktok_url": null,
        "x_url": "https://x.com/me",
        "owner_id": owner().to_string(),
        "status": "sold"
    });
    let rec: BrickRecord = serde_json::from_value(row).unwrap();
    assert_eq!(rec.brick_index, 2384);
    assert_eq!(rec.fields.id, Some(41));
    assert_eq!(rec.fields.message.as_deref(), Some("hello wall"));
    assert_eq!(rec.fields.links.instagram_url.as_deref(), Some("https://instagram.com/me"));
    assert_eq!(rec.fields.owner_id, Some(owner()));
}

#[test]
fn record_tolerates_sparse_row() {
    let rec: BrickRecord = serde_json::from_value(json!({ "brick_index": 7 })).unwrap();
    assert_eq!(rec.brick_index, 7);
    assert_eq!(rec.fields, BrickFields::default());
}

#[test]
fn labeled_links_skip_empty_values() {
    let links = SocialLinks {
        facebook_url: Some(String::new()),
        youtube_url: Some("https://youtube.com/@me".into()),
        x_url: Some(" https://x.com/me ".into()),
        ..SocialLinks::default()
    };
    assert_eq!(links.labeled(), vec![("YouTube", "https://youtube.com/@me"), ("X", "https://x.com/me")]);
}

// =============================================================
// BrickChange::from_record
// =============================================================

#[test]
fn from_record_accepts_sold_row() {
    let change = BrickChange::from_record(ChangeKind::Insert, &json!({
        "brick_index": 5000,
        "color": "#ABC",
        "status": "sold"
    }))
    .unwrap()
    .unwrap();
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.index, 5000);
    assert_eq!(change.fields.color(), "#ABC");
}

#[test]
fn from_record_without_status_is_accepted() {
    let change = BrickChange::from_record(ChangeKind::Update, &json!({ "brick_index": 1 })).unwrap();
    assert!(change.is_some());
}

#[test]
fn from_record_skips_unsold_rows() {
    let change = BrickChange::from_record(ChangeKind::Update, &json!({
        "brick_index": 12,
        "status": "reserved"
    }))
    .unwrap();
    assert!(change.is_none());
}

#[test]
fn from_record_rejects_non_object() {
    let err = BrickChange::from_record(ChangeKind::Insert, &json!([1, 2, 3])).unwrap_err();
    assert_eq!(err, ChangeError::NotAnObject);
}

#[test]
fn from_record_rejects_missing_or_negative_index() {
    for row in [json!({ "color": "#fff" }), json!({ "brick_index": -4 }), json!({ "brick_index": "12" })] {
        let err = BrickChange::from_record(ChangeKind::Insert, &row).unwrap_err();
        assert_eq!(err, ChangeError::MissingIndex);
    }
}

#[test]
fn from_record_rejects_index_beyond_u32() {
    let err = BrickChange::from_record(ChangeKind::Insert, &json!({ "brick_index": 5_000_000_000_u64 })).unwrap_err();
    assert_eq!(err, ChangeError::MissingIndex);
}

#[test]
fn from_record_rejects_mistyped_fields() {
    let err = BrickChange::from_record(ChangeKind::Insert, &json!({
        "brick_index": 3,
        "color": 17
    }))
    .unwrap_err();
    assert!(matches!(err, ChangeError::Malformed(_)));
}

// =============================================================
// SoldSet merge
// =============================================================

#[test]
fn applying_same_insert_twice_keeps_one_entry() {
    let mut set = SoldSet::new(Grid::MILLION);
    assert_eq!(set.apply(insert(5000, "#ABC")), Merge::Inserted);
    assert_eq!(set.apply(insert(5000, "#ABC")), Merge::Unchanged);
    assert_eq!(set.len(), 1);
    assert_eq!(set.iter().filter(|b| b.index == 5000).count(), 1);
}

#[test]
fn update_for_unknown_index_inserts() {
    let mut set = SoldSet::new(Grid::MILLION);
    let change = BrickChange { kind: ChangeKind::Update, index: 9, fields: BrickFields::default() };
    assert_eq!(set.apply(change), Merge::Inserted);
    assert!(set.contains(9));
}

#[test]
fn update_replaces_fields_of_existing_entry() {
    let mut set = SoldSet::new(Grid::MILLION);
    set.apply(insert(10, "#111111"));
    let change = BrickChange {
        kind: ChangeKind::Update,
        index: 10,
        fields: BrickFields { color: Some("#222222".into()), message: Some("hi".into()), ..BrickFields::default() },
    };
    assert_eq!(set.apply(change), Merge::Updated);
    assert_eq!(set.get(10).and_then(|f| f.message.as_deref()), Some("hi"));
    assert_eq!(set.iter().next().map(|b| b.color), Some("#222222"));
}

#[test]
fn out_of_range_index_is_not_stored() {
    let mut set = SoldSet::new(Grid::THOUSAND);
    assert_eq!(set.apply(insert(1_000, "#fff")), Merge::OutOfRange);
    assert!(set.is_empty());
}

#[test]
fn iteration_is_in_index_order() {
    let mut set = SoldSet::new(Grid::MILLION);
    for index in [42, 7, 999_999, 0] {
        set.apply(insert(index, "#fff"));
    }
    let order: Vec<u32> = set.iter().map(|b| b.index).collect();
    assert_eq!(order, vec![0, 7, 42, 999_999]);
}

#[test]
fn load_snapshot_merges_without_removing() {
    let mut set = SoldSet::new(Grid::MILLION);
    set.apply(insert(1, "#fff"));
    let changed = set.load_snapshot(vec![record(2, "#000"), record(3, "#000")]);
    assert!(changed);
    assert_eq!(set.len(), 3);
    assert!(!set.load_snapshot(vec![record(2, "#000")]));
}

#[test]
fn owned_by_filters_on_owner() {
    let mut set = SoldSet::new(Grid::MILLION);
    let mine = BrickRecord {
        brick_index: 77,
        fields: BrickFields { owner_id: Some(owner()), ..BrickFields::default() },
    };
    set.load_snapshot(vec![mine, record(5, "#fff")]);
    assert_eq!(set.owned_by(owner()), vec![77]);
    assert!(set.owned_by(Uuid::nil()).is_empty());
}

#[test]
fn record_round_trips_through_set() {
    let mut set = SoldSet::new(Grid::MILLION);
    set.apply(insert(64, "#8BE7B2"));
    let rec = set.record(64).unwrap();
    assert_eq!(rec, record(64, "#8BE7B2"));
    assert_eq!(set.records().count(), 1);
    assert!(set.record(65).is_none());
}

#[test]
fn merge_changed_flags() {
    assert!(Merge::Inserted.changed());
    assert!(Merge::Updated.changed());
    assert!(!Merge::Unchanged.changed());
    assert!(!Merge::OutOfRange.changed());
}

#[test]
fn span_limits_iteration_to_index_range() {
    let mut set = SoldSet::new(Grid::MILLION);
    for index in [999, 1000, 1500, 1999, 2000] {
        set.apply(insert(index, "#fff"));
    }
    let row: Vec<u32> = set.span(1000..=1999).map(|b| b.index).collect();
    assert_eq!(row, vec![1000, 1500, 1999]);
}
