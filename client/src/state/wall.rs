//! Wall page state: the sold-set cache plus everything the page overlays on it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provided as `RwSignal<WallState>` context on the wall page. The canvas
//! host catches the engine up whenever `sold_rev` moves, replaying the
//! journal of recent changes and copying the whole set only after a
//! snapshot. Components read labels and modal state from here.
//!
//! Realtime changes that arrive while a snapshot fetch is in flight are
//! applied immediately and also held back; once the snapshot commits they
//! are replayed on top of it, so a stale snapshot row never wins over a
//! newer change.

#[cfg(test)]
#[path = "wall_test.rs"]
mod wall_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;
use wall::grid::Grid;
use wall::overlay::HighlightSet;
use wall::sold::{BrickChange, BrickRecord, Merge, SoldSet};

use crate::net::price::SolPrice;
use crate::payment::Quote;
use crate::state::purchase::Target;
use crate::util::format::{brick_label, thousands};

/// Changes buffered before a flush is forced.
pub const CHANGE_FLUSH_BATCH_SIZE: usize = 256;
/// Delay before a partial batch is flushed.
pub const CHANGE_FLUSH_DELAY_MS: u32 = 16;
/// Journal entries kept before the engine falls back to a full copy.
pub const SOLD_JOURNAL_LIMIT: usize = 1024;

/// Which dialog, if any, is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    None,
    Buy(Target),
    Details(Target),
}

/// What a tap on the wall leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The brick is sold; viewing needs no sign-in.
    ShowDetails(Target),
    OpenPurchase(Target),
    LoginRequired,
}

/// How a copy of the sold-set taken at some `sold_rev` catches up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoldSync {
    Current,
    /// Replay these changes in order.
    Changes(Vec<BrickChange>),
    /// Too far behind, or a snapshot landed: copy the whole set.
    Full,
}

/// Short messages shown in place of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Notice {
    #[error("You need to be logged in to buy a brick.")]
    LoginToBuy,
    #[error("You need to be logged in to highlight your bricks.")]
    LoginToHighlight,
    #[error("Tap an empty spot on the wall to choose your brick.")]
    PickABrick,
    #[error("You don't own any bricks yet. Click somewhere on the wall to buy one! 🧱")]
    NoBricksYet,
}

#[derive(Debug, Clone)]
pub struct WallState {
    pub sold: SoldSet,
    /// Bumped whenever `sold` changes.
    pub sold_rev: u64,
    pub loading: bool,
    /// Load failure banner. The wall keeps rendering what it has.
    pub error: Option<String>,
    /// Exact claimed count from the store, when known.
    pub claimed_total: Option<u64>,
    pub hover: Option<u32>,
    pub highlight_mine: bool,
    pub modal: Modal,
    pub price: SolPrice,
    pub show_help: bool,
    /// Transient message (notices, purchase results).
    pub notice: Option<String>,
    pub live: bool,
    /// A snapshot fetch is in flight.
    snapshot_pending: bool,
    /// Changes applied during the pending fetch, replayed after it commits.
    held: Vec<BrickChange>,
    /// Recent changes tagged with the `sold_rev` they produced.
    journal: Vec<(u64, BrickChange)>,
    /// The journal holds every change after this rev.
    journal_floor: u64,
}

impl Default for WallState {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl WallState {
    pub fn new(grid: Grid) -> Self {
        Self {
            sold: SoldSet::new(grid),
            sold_rev: 0,
            loading: true,
            error: None,
            claimed_total: None,
            hover: None,
            highlight_mine: false,
            modal: Modal::None,
            price: SolPrice::default(),
            show_help: false,
            notice: None,
            live: false,
            snapshot_pending: true,
            held: Vec::new(),
            journal: Vec::new(),
            journal_floor: 0,
        }
    }

    pub fn grid(&self) -> Grid {
        self.sold.grid()
    }

    fn bump(&mut self, changed: bool) -> bool {
        if changed {
            self.sold_rev = self.sold_rev.wrapping_add(1);
        }
        changed
    }

    /// A fresh snapshot is about to be fetched; hold realtime changes for replay.
    pub fn begin_reload(&mut self) {
        self.snapshot_pending = true;
        self.held.clear();
    }

    /// Merge a full load and clear the loading state.
    ///
    /// Changes that arrived while the fetch was in flight are reapplied on
    /// top of the snapshot in arrival order.
    pub fn finish_load(&mut self, records: Vec<BrickRecord>) -> bool {
        self.loading = false;
        self.error = None;
        self.snapshot_pending = false;
        let mut changed = self.sold.load_snapshot(records);
        for change in std::mem::take(&mut self.held) {
            changed |= self.sold.apply(change).changed();
        }
        if changed {
            self.journal.clear();
            self.journal_floor = self.sold_rev.wrapping_add(1);
        }
        self.bump(changed)
    }

    /// A reload fetch failed; stop holding changes and keep what is shown.
    pub fn abandon_reload(&mut self) {
        self.snapshot_pending = false;
        self.held.clear();
    }

    pub fn fail_load(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
        self.snapshot_pending = false;
        self.held.clear();
    }

    /// Apply realtime changes in arrival order.
    pub fn apply_changes(&mut self, changes: impl IntoIterator<Item = BrickChange>) -> bool {
        let rev = self.sold_rev.wrapping_add(1);
        let mut changed = false;
        for change in changes {
            changed |= self.merge(rev, change).changed();
        }
        self.bump(changed)
    }

    fn merge(&mut self, rev: u64, change: BrickChange) -> Merge {
        if self.snapshot_pending {
            self.held.push(change.clone());
        }
        let logged = change.clone();
        let merge = self.sold.apply(change);
        if merge == Merge::Inserted {
            if let Some(total) = self.claimed_total.as_mut() {
                *total += 1;
            }
        }
        if merge.changed() {
            if self.journal.len() >= SOLD_JOURNAL_LIMIT {
                self.journal.clear();
                self.journal_floor = rev;
            } else {
                self.journal.push((rev, logged));
            }
        }
        merge
    }

    /// What a copy of `sold` taken at `synced` needs to catch up.
    pub fn sold_sync(&self, synced: Option<u64>) -> SoldSync {
        match synced {
            Some(rev) if rev == self.sold_rev => SoldSync::Current,
            Some(rev) if rev >= self.journal_floor => SoldSync::Changes(
                self.journal.iter().filter(|(at, _)| *at > rev).map(|(_, change)| change.clone()).collect(),
            ),
            _ => SoldSync::Full,
        }
    }

    /// Decide what a tap on `target` does.
    pub fn resolve_click(&self, target: Target, user: Option<Uuid>) -> ClickOutcome {
        if self.sold.contains(target.index) {
            ClickOutcome::ShowDetails(target)
        } else if user.is_some() {
            ClickOutcome::OpenPurchase(target)
        } else {
            ClickOutcome::LoginRequired
        }
    }

    /// Resolve a tap and open the matching dialog.
    pub fn click(&mut self, target: Target, user: Option<Uuid>) -> ClickOutcome {
        let outcome = self.resolve_click(target, user);
        match outcome {
            ClickOutcome::ShowDetails(t) => self.modal = Modal::Details(t),
            ClickOutcome::OpenPurchase(t) => self.modal = Modal::Buy(t),
            ClickOutcome::LoginRequired => {
                self.modal = Modal::None;
                self.notice = Some(Notice::LoginToBuy.to_string());
            }
        }
        outcome
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    /// Flip the "highlight my bricks" toggle.
    ///
    /// # Errors
    ///
    /// Returns a [`Notice`] when signed out, or when turning the highlight on
    /// with no owned bricks. The toggle is left unchanged.
    pub fn toggle_highlight(&mut self, user: Option<Uuid>) -> Result<bool, Notice> {
        let user = user.ok_or(Notice::LoginToHighlight)?;
        if !self.highlight_mine && self.sold.owned_by(user).is_empty() {
            return Err(Notice::NoBricksYet);
        }
        self.highlight_mine = !self.highlight_mine;
        Ok(self.highlight_mine)
    }

    /// Bricks to outline for `user`.
    pub fn highlights(&self, user: Option<Uuid>) -> HighlightSet {
        match user {
            Some(user) if self.highlight_mine => self.sold.owned_by(user).into_iter().collect(),
            _ => HighlightSet::new(),
        }
    }

    /// Claimed count: the store's exact total, or what is loaded if larger.
    pub fn claimed_count(&self) -> u64 {
        let loaded = self.sold.len() as u64;
        self.claimed_total.map_or(loaded, |total| total.max(loaded))
    }

    /// Record a completed purchase so the buyer sees it immediately.
    pub fn commit_purchase(&mut self, record: BrickRecord) -> Merge {
        let rev = self.sold_rev.wrapping_add(1);
        let merge = self.merge(rev, BrickChange::insert(record));
        self.bump(merge.changed());
        self.modal = Modal::None;
        merge
    }

    pub fn quote(&self, price_usd: f64) -> Option<Quote> {
        Quote::new(price_usd, self.price.usd).ok()
    }
}

/// Status bar text for the hovered brick.
pub fn hover_label(grid: Grid, hover: Option<u32>) -> String {
    match hover.and_then(|index| grid.checked_xy(index).map(|cell| (index, cell))) {
        Some((index, cell)) => brick_label(index, cell.x, cell.y),
        None => "Tap or hover a brick to inspect it".to_owned(),
    }
}

/// `N / 1,000,000 bricks claimed`.
pub fn claimed_label(count: u64, grid: Grid) -> String {
    format!("{} / {} bricks claimed", thousands(count), thousands(grid.len()))
}

fn is_whole(amount: f64) -> bool {
    amount.fract().abs() < f64::EPSILON
}

/// `$1`, or `$1.50` for fractional prices.
pub fn format_usd(price_usd: f64) -> String {
    if is_whole(price_usd) { format!("${price_usd:.0}") } else { format!("${price_usd:.2}") }
}

/// `Price: $1 (≈ 0.0067 SOL or 1 USDC)`, noting when the fallback rate is used.
pub fn price_label(quote: &Quote, is_fallback: bool) -> String {
    let fallback = if is_fallback { " · using fallback rate" } else { "" };
    let usdc = if is_whole(quote.price_usd) {
        format!("{:.0}", quote.price_usd)
    } else {
        format!("{:.2}", quote.price_usd)
    };
    format!(
        "Price: {} (≈ {:.4} SOL or {usdc} USDC{fallback})",
        format_usd(quote.price_usd),
        quote.sol_per_brick()
    )
}

/// Set once a page is torn down; async loads check it before committing.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What the caller should do after [`ChangeBuffer::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferAction {
    /// The batch is full; drain it now.
    FlushNow,
    /// First change of a batch; schedule a delayed flush.
    ScheduleFlush,
    /// A flush is already scheduled.
    Wait,
}

/// Batches realtime changes so bursts cost one state update.
#[derive(Debug, Default)]
pub struct ChangeBuffer {
    pending: Vec<BrickChange>,
    flush_scheduled: bool,
}

impl ChangeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, change: BrickChange) -> BufferAction {
        self.pending.push(change);
        if self.pending.len() >= CHANGE_FLUSH_BATCH_SIZE {
            BufferAction::FlushNow
        } else if self.flush_scheduled {
            BufferAction::Wait
        } else {
            self.flush_scheduled = true;
            BufferAction::ScheduleFlush
        }
    }

    /// Take buffered changes in arrival order and clear the schedule.
    pub fn drain(&mut self) -> Vec<BrickChange> {
        self.flush_scheduled = false;
        std::mem::take(&mut self.pending)
    }
}
