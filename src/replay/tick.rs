//! Tick replay: one ask/bid observation per row

use super::{CursorState, Observation};
use crate::error::{HistoryError, Result};
use crate::series::QuoteSeries;

/// Emit the next quote and advance the cursor
pub(super) fn next_quote(quotes: &QuoteSeries, state: &mut CursorState) -> Result<Observation> {
    let quote = quotes.get(state.row).ok_or(HistoryError::NoMoreData)?;
    state.row += 1;

    Ok(Observation {
        ask: quote.ask,
        bid: quote.bid,
    })
}
