use wall::sold::{BrickFields, ChangeKind};

use super::*;

fn owner() -> Uuid {
    Uuid::from_u128(99)
}

fn record(index: u32, owner_id: Option<Uuid>) -> BrickRecord {
    BrickRecord { brick_index: index, fields: BrickFields { owner_id, ..BrickFields::default() } }
}

fn target(index: u32) -> Target {
    Target::from_index(Grid::MILLION, index).unwrap()
}

fn loaded(records: Vec<BrickRecord>) -> WallState {
    let mut state = WallState::default();
    state.finish_load(records);
    state
}

// =============================================================
// Loading
// =============================================================

#[test]
fn new_state_is_loading_and_empty() {
    let state = WallState::default();
    assert!(state.loading);
    assert!(state.sold.is_empty());
    assert_eq!(state.sold_rev, 0);
}

#[test]
fn finish_load_clears_loading_and_bumps_rev() {
    let state = loaded(vec![record(1, None), record(2, None)]);
    assert!(!state.loading);
    assert_eq!(state.sold.len(), 2);
    assert_eq!(state.sold_rev, 1);
}

#[test]
fn failed_load_keeps_existing_bricks() {
    let mut state = loaded(vec![record(1, None)]);
    state.fail_load("offline".to_owned());
    assert_eq!(state.error.as_deref(), Some("offline"));
    assert!(!state.loading);
    assert!(state.sold.contains(1));
}

#[test]
fn replayed_changes_do_not_bump_rev() {
    let mut state = loaded(vec![]);
    let change = BrickChange::insert(record(5, None));
    assert!(state.apply_changes(vec![change.clone()]));
    let rev = state.sold_rev;
    assert!(!state.apply_changes(vec![change]));
    assert_eq!(state.sold_rev, rev);
}

#[test]
fn changes_apply_in_arrival_order() {
    let mut state = loaded(vec![]);
    let first = BrickChange {
        kind: ChangeKind::Insert,
        index: 3,
        fields: BrickFields { message: Some("first".into()), ..BrickFields::default() },
    };
    let second = BrickChange {
        kind: ChangeKind::Update,
        index: 3,
        fields: BrickFields { message: Some("second".into()), ..BrickFields::default() },
    };
    state.apply_changes(vec![first, second]);
    assert_eq!(state.sold.get(3).and_then(|f| f.message.as_deref()), Some("second"));
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn sold_brick_shows_details_without_login() {
    let mut state = loaded(vec![record(2384, None)]);
    assert_eq!(state.click(target(2384), None), ClickOutcome::ShowDetails(target(2384)));
    assert_eq!(state.modal, Modal::Details(target(2384)));
}

#[test]
fn free_brick_opens_purchase_when_signed_in() {
    let mut state = loaded(vec![]);
    assert_eq!(state.click(target(10), Some(owner())), ClickOutcome::OpenPurchase(target(10)));
    assert_eq!(state.modal, Modal::Buy(target(10)));
}

#[test]
fn free_brick_needs_login() {
    let mut state = loaded(vec![]);
    assert_eq!(state.click(target(10), None), ClickOutcome::LoginRequired);
    assert_eq!(state.modal, Modal::None);
    assert_eq!(state.notice.as_deref(), Some("You need to be logged in to buy a brick."));
}

// =============================================================
// Highlight toggle
// =============================================================

#[test]
fn highlight_requires_login() {
    let mut state = loaded(vec![record(1, Some(owner()))]);
    assert_eq!(state.toggle_highlight(None), Err(Notice::LoginToHighlight));
    assert!(!state.highlight_mine);
}

#[test]
fn highlight_requires_owned_bricks() {
    let mut state = loaded(vec![record(1, None)]);
    let err = state.toggle_highlight(Some(owner())).unwrap_err();
    assert_eq!(err, Notice::NoBricksYet);
    assert!(err.to_string().starts_with("You don't own any bricks yet."));
}

#[test]
fn highlight_toggles_and_lists_owned() {
    let mut state = loaded(vec![record(1, Some(owner())), record(7, Some(owner())), record(3, None)]);
    assert!(state.highlights(Some(owner())).is_empty());
    assert_eq!(state.toggle_highlight(Some(owner())), Ok(true));
    let set: Vec<u32> = state.highlights(Some(owner())).iter().collect();
    assert_eq!(set, vec![1, 7]);
    assert_eq!(state.toggle_highlight(Some(owner())), Ok(false));
    assert!(state.highlights(Some(owner())).is_empty());
}

// =============================================================
// Purchase commit / counts
// =============================================================

#[test]
fn commit_purchase_inserts_and_closes_modal() {
    let mut state = loaded(vec![]);
    state.claimed_total = Some(41);
    state.click(target(10), Some(owner()));
    let merge = state.commit_purchase(record(10, Some(owner())));
    assert_eq!(merge, Merge::Inserted);
    assert_eq!(state.modal, Modal::None);
    assert_eq!(state.claimed_total, Some(42));
    assert_eq!(state.sold.owned_by(owner()), vec![10]);
}

#[test]
fn commit_after_realtime_echo_does_not_double_count() {
    let mut state = loaded(vec![]);
    state.claimed_total = Some(1);
    state.apply_changes(vec![BrickChange::insert(record(10, None))]);
    assert_eq!(state.claimed_total, Some(2));
    state.commit_purchase(record(10, Some(owner())));
    assert_eq!(state.claimed_total, Some(2));
    assert_eq!(state.sold.get(10).and_then(|f| f.owner_id), Some(owner()));
}

#[test]
fn claimed_count_prefers_larger_source() {
    let mut state = loaded(vec![record(1, None), record(2, None)]);
    assert_eq!(state.claimed_count(), 2);
    state.claimed_total = Some(25_000);
    assert_eq!(state.claimed_count(), 25_000);
    state.claimed_total = Some(1);
    assert_eq!(state.claimed_count(), 2);
}

// =============================================================
// Labels
// =============================================================

#[test]
fn hover_label_texts() {
    assert_eq!(hover_label(Grid::MILLION, None), "Tap or hover a brick to inspect it");
    assert_eq!(hover_label(Grid::MILLION, Some(2384)), "Brick #2384 (x=384, y=2)");
    assert_eq!(hover_label(Grid::THOUSAND, Some(5000)), "Tap or hover a brick to inspect it");
}

#[test]
fn claimed_label_formats_counts() {
    assert_eq!(claimed_label(12_345, Grid::MILLION), "12,345 / 1,000,000 bricks claimed");
    assert_eq!(claimed_label(0, Grid::THOUSAND), "0 / 1,000 bricks claimed");
}

#[test]
fn price_label_texts() {
    let quote = Quote::new(1.0, 150.0).unwrap();
    assert_eq!(price_label(&quote, true), "Price: $1 (≈ 0.0067 SOL or 1 USDC · using fallback rate)");
    assert_eq!(price_label(&quote, false), "Price: $1 (≈ 0.0067 SOL or 1 USDC)");
    let fractional = Quote::new(1.5, 100.0).unwrap();
    assert_eq!(price_label(&fractional, false), "Price: $1.50 (≈ 0.0150 SOL or 1.50 USDC)");
}

// =============================================================
// CancelFlag / ChangeBuffer
// =============================================================

#[test]
fn cancel_flag_is_shared_between_clones() {
    let flag = CancelFlag::new();
    let seen_by_task = flag.clone();
    assert!(!seen_by_task.is_cancelled());
    flag.cancel();
    assert!(seen_by_task.is_cancelled());
}

#[test]
fn buffer_schedules_once_per_batch() {
    let mut buffer = ChangeBuffer::new();
    assert_eq!(buffer.push(BrickChange::insert(record(1, None))), BufferAction::ScheduleFlush);
    assert_eq!(buffer.push(BrickChange::insert(record(2, None))), BufferAction::Wait);
    let drained: Vec<u32> = buffer.drain().into_iter().map(|c| c.index).collect();
    assert_eq!(drained, vec![1, 2]);
    assert!(buffer.is_empty());
    assert_eq!(buffer.push(BrickChange::insert(record(3, None))), BufferAction::ScheduleFlush);
}

#[test]
fn buffer_flushes_when_batch_is_full() {
    let mut buffer = ChangeBuffer::new();
    let mut last = BufferAction::Wait;
    for index in 0..u32::try_from(CHANGE_FLUSH_BATCH_SIZE).unwrap() {
        last = buffer.push(BrickChange::insert(record(index, None)));
    }
    assert_eq!(last, BufferAction::FlushNow);
    assert_eq!(buffer.len(), CHANGE_FLUSH_BATCH_SIZE);
    assert_eq!(buffer.drain().len(), CHANGE_FLUSH_BATCH_SIZE);
}

// =============================================================
// Snapshot vs realtime ordering
// =============================================================

fn recolor(index: u32, kind: ChangeKind, color: &str) -> BrickChange {
    BrickChange { kind, index, fields: BrickFields { color: Some(color.into()), ..BrickFields::default() } }
}

fn colored(index: u32, color: &str) -> BrickRecord {
    BrickRecord { brick_index: index, fields: BrickFields { color: Some(color.into()), ..BrickFields::default() } }
}

fn color_of(state: &WallState, index: u32) -> Option<&str> {
    state.sold.get(index).map(BrickFields::color)
}

#[test]
fn update_during_first_load_survives_stale_snapshot() {
    let mut state = WallState::default();
    state.apply_changes(vec![recolor(5, ChangeKind::Update, "#NEW")]);
    assert_eq!(color_of(&state, 5), Some("#NEW"));
    state.finish_load(vec![colored(5, "#OLD"), colored(6, "#OLD")]);
    assert_eq!(color_of(&state, 5), Some("#NEW"));
    assert_eq!(color_of(&state, 6), Some("#OLD"));
}

#[test]
fn update_during_reload_survives_stale_snapshot() {
    let mut state = loaded(vec![colored(5, "#FIRST")]);
    state.begin_reload();
    state.apply_changes(vec![recolor(5, ChangeKind::Update, "#NEW")]);
    state.finish_load(vec![colored(5, "#OLD")]);
    assert_eq!(color_of(&state, 5), Some("#NEW"));
}

#[test]
fn held_changes_replay_in_arrival_order() {
    let mut state = WallState::default();
    state.apply_changes(vec![recolor(8, ChangeKind::Insert, "#A")]);
    state.apply_changes(vec![recolor(8, ChangeKind::Update, "#B")]);
    state.finish_load(vec![colored(8, "#STALE")]);
    assert_eq!(color_of(&state, 8), Some("#B"));
}

#[test]
fn changes_after_load_are_not_held() {
    let mut state = loaded(vec![]);
    state.apply_changes(vec![recolor(2, ChangeKind::Insert, "#LIVE")]);
    state.begin_reload();
    state.finish_load(vec![colored(2, "#NEWER")]);
    assert_eq!(color_of(&state, 2), Some("#NEWER"));
}

#[test]
fn abandoned_reload_drops_held_changes() {
    let mut state = loaded(vec![]);
    state.begin_reload();
    state.apply_changes(vec![recolor(3, ChangeKind::Insert, "#HELD")]);
    state.abandon_reload();
    state.apply_changes(vec![recolor(3, ChangeKind::Update, "#LATER")]);
    state.begin_reload();
    state.finish_load(vec![colored(3, "#SNAP")]);
    assert_eq!(color_of(&state, 3), Some("#SNAP"));
}

// =============================================================
// Engine sync journal
// =============================================================

#[test]
fn unsynced_copy_needs_full_sync() {
    let state = WallState::default();
    assert_eq!(state.sold_sync(None), SoldSync::Full);
    assert_eq!(state.sold_sync(Some(state.sold_rev)), SoldSync::Current);
}

#[test]
fn realtime_batch_syncs_as_changes() {
    let mut state = loaded(vec![colored(1, "#111")]);
    let synced = state.sold_rev;
    let insert = recolor(4, ChangeKind::Insert, "#444");
    state.apply_changes(vec![insert.clone()]);
    assert_eq!(state.sold_sync(Some(synced)), SoldSync::Changes(vec![insert]));
}

#[test]
fn unchanged_replays_are_not_journaled() {
    let mut state = loaded(vec![]);
    let insert = recolor(4, ChangeKind::Insert, "#444");
    state.apply_changes(vec![insert.clone()]);
    let synced = state.sold_rev;
    state.apply_changes(vec![insert]);
    assert_eq!(state.sold_sync(Some(synced)), SoldSync::Current);
}

#[test]
fn snapshot_forces_full_sync() {
    let mut state = loaded(vec![]);
    let synced = state.sold_rev;
    state.begin_reload();
    state.finish_load(vec![colored(7, "#777")]);
    assert_eq!(state.sold_sync(Some(synced)), SoldSync::Full);
}

#[test]
fn journal_overflow_forces_full_sync() {
    let mut state = loaded(vec![]);
    let synced = state.sold_rev;
    let burst: Vec<BrickChange> = (0..=u32::try_from(SOLD_JOURNAL_LIMIT).unwrap()).map(|i| recolor(i, ChangeKind::Insert, "#fff")).collect();
    state.apply_changes(burst);
    assert_eq!(state.sold_sync(Some(synced)), SoldSync::Full);
}

#[test]
fn purchase_is_journaled() {
    let mut state = loaded(vec![]);
    let synced = state.sold_rev;
    state.commit_purchase(colored(11, "#abc"));
    assert_eq!(state.sold_sync(Some(synced)), SoldSync::Changes(vec![BrickChange::insert(colored(11, "#abc"))]));
}
