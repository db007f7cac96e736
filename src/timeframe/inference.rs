//! Native granularity inference for raw candle tables

use super::Timeframe;
use crate::error::{HistoryError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// How the cascade base is obtained from raw candles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasePlan {
    /// Native interval equals the entry, raw table is used as-is
    Exact(Timeframe),
    /// Native interval divides the entry, raw table is aggregated into it
    Aggregate(Timeframe),
}

impl BasePlan {
    /// The entry that becomes the cascade base
    pub fn timeframe(&self) -> Timeframe {
        match self {
            BasePlan::Exact(tf) | BasePlan::Aggregate(tf) => *tf,
        }
    }
}

/// Most frequent delta between consecutive timestamps
///
/// Ties go to the smaller delta.
pub fn native_interval(index: &[DateTime<Utc>]) -> Result<Duration> {
    if index.len() < 2 {
        return Err(HistoryError::InsufficientHistory { rows: index.len() });
    }

    let mut counts: BTreeMap<Duration, usize> = BTreeMap::new();
    for pair in index.windows(2) {
        *counts.entry(pair[1] - pair[0]).or_default() += 1;
    }

    // BTreeMap iterates ascending, so strict `>` keeps the finest of equal counts
    let mut best: Option<(Duration, usize)> = None;
    let mut tied = false;
    for (&delta, &count) in &counts {
        match best {
            Some((_, best_count)) if count > best_count => {
                best = Some((delta, count));
                tied = false;
            }
            Some((_, best_count)) if count == best_count => tied = true,
            Some(_) => {}
            None => best = Some((delta, count)),
        }
    }

    let (delta, count) = best.ok_or(HistoryError::InsufficientHistory { rows: index.len() })?;
    if tied {
        tracing::warn!(
            interval = %delta,
            count,
            "Sampling interval is ambiguous, preferring the finest candidate"
        );
    }
    Ok(delta)
}

/// Pick the base entry for a native interval
///
/// Linear scan over the fixed-duration ladder: an exact match is used
/// verbatim, otherwise the first entry the interval divides evenly.
pub fn select_base(native: Duration) -> Result<BasePlan> {
    let unsupported = HistoryError::UnsupportedGranularity { interval: native };
    let native_us = native
        .num_microseconds()
        .filter(|us| *us > 0)
        .ok_or_else(|| unsupported.clone())?;

    for tf in Timeframe::LADDER {
        let Some(duration) = tf.duration() else {
            continue;
        };
        let Some(entry_us) = duration.num_microseconds() else {
            continue;
        };

        if entry_us == native_us {
            return Ok(BasePlan::Exact(tf));
        }
        if native_us < entry_us && entry_us % native_us == 0 {
            return Ok(BasePlan::Aggregate(tf));
        }
    }

    Err(unsupported)
}

/// Infer the base plan directly from a timestamp index
pub fn infer_base(index: &[DateTime<Utc>]) -> Result<BasePlan> {
    let native = native_interval(index)?;
    let plan = select_base(native)?;
    tracing::debug!(interval = %native, base = %plan.timeframe(), "Inferred base granularity");
    Ok(plan)
}
