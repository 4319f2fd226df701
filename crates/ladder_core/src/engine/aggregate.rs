//! Block aggregation over atomic rungs.
//!
//! # Responsibility
//! - Present atomic rungs at 1, 3 or 5 year zoom.
//! - Materialize only blocks that contain at least one atomic rung.
//!
//! # Invariants
//! - Block start years are congruent to the span anchor modulo the span.
//! - Block boundaries depend only on anchor and span, never on the data, so
//!   new rungs change totals but never shift existing blocks.
//! - `Block::current_amount` is the exact sum of contained current amounts.
//! - Output is sorted by year, latest first.

use crate::config::BlockAnchors;
use crate::model::rung::{AtomicRung, Block, LadderRow};
use crate::model::selection::{BlockSpan, ZoomStep};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Renders atomic rungs at the requested zoom level.
///
/// `ZoomStep::One` passes rungs through unchanged; wider zoom levels build
/// blocks anchored at `anchors`. Unset targets count as `default_target`.
pub fn aggregate_rungs(
    rungs: &[AtomicRung],
    zoom: ZoomStep,
    anchors: &BlockAnchors,
    default_target: Decimal,
) -> Vec<LadderRow> {
    match zoom.block_span() {
        None => {
            let mut atomic = rungs.to_vec();
            atomic.sort_by(|left, right| right.year.cmp(&left.year));
            atomic.into_iter().map(LadderRow::Atomic).collect()
        }
        Some(span) => build_blocks(rungs, span, anchors.for_span(span), default_target)
            .into_iter()
            .map(LadderRow::Block)
            .collect(),
    }
}

/// Groups atomic rungs into `span`-year blocks pinned to `anchor`.
///
/// Candidate starts are `anchor + k * span` within
/// `[min(first rung year, anchor), last rung year]`; candidates with no
/// contained rung are dropped. Start arithmetic is done in `i64`, so any
/// `i32` year is accepted.
pub fn build_blocks(
    rungs: &[AtomicRung],
    span: BlockSpan,
    anchor: i32,
    default_target: Decimal,
) -> Vec<Block> {
    let Some(first_year) = rungs.iter().map(|rung| rung.year).min() else {
        return Vec::new();
    };
    let floor = first_block_start(first_year, span, anchor);

    let mut grouped: BTreeMap<i64, Vec<&AtomicRung>> = BTreeMap::new();
    for rung in rungs {
        let start = block_start(rung.year, span, anchor);
        if start >= floor {
            grouped.entry(start).or_default().push(rung);
        }
    }

    let mut blocks: Vec<Block> = grouped
        .into_iter()
        .filter_map(|(start, mut contained)| {
            contained.sort_by_key(|rung| rung.year);
            let head = contained.first()?;
            let tail = contained.last()?;
            Some(Block {
                span,
                year: i32::try_from(start).ok()?,
                start_date: head.start_date,
                end_date: tail.end_date,
                target_amount: contained
                    .iter()
                    .map(|rung| rung.effective_target(default_target))
                    .sum(),
                current_amount: contained.iter().map(|rung| rung.current_amount).sum(),
                rung_count: contained.len(),
            })
        })
        .collect();

    blocks.sort_by(|left, right| right.year.cmp(&left.year));
    blocks
}

/// Start year of the anchor-aligned block containing `year`.
pub fn block_start(year: i32, span: BlockSpan, anchor: i32) -> i64 {
    let step = i64::from(span.years());
    let anchor = i64::from(anchor);
    anchor + (i64::from(year) - anchor).div_euclid(step) * step
}

/// First aligned start at or after `min(first_year, anchor)`.
///
/// Rungs whose block starts before it form a leading partial block and are
/// not materialized.
pub fn first_block_start(first_year: i32, span: BlockSpan, anchor: i32) -> i64 {
    let floor = first_year.min(anchor);
    let start = block_start(floor, span, anchor);
    if start < i64::from(floor) {
        start + i64::from(span.years())
    } else {
        start
    }
}
