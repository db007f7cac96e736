//! Candle replay: four observations per row

use super::{CursorState, Observation};
use crate::error::{HistoryError, Result};
use crate::series::CandleSeries;

/// Observations emitted per candle (Open, High, Low, Close)
pub const FIELDS_PER_CANDLE: usize = 4;

/// Emit the next candle field and advance the cursor
///
/// Exhaustion is only checked at a row boundary.
pub(super) fn next_field(series: &CandleSeries, state: &mut CursorState) -> Result<Observation> {
    if state.field == 0 && state.row >= series.len() {
        return Err(HistoryError::NoMoreData);
    }

    let value = series
        .get(state.row)
        .and_then(|candle| candle.field(state.field))
        .ok_or(HistoryError::NoMoreData)?;

    state.field += 1;
    if state.field == FIELDS_PER_CANDLE {
        state.field = 0;
        state.row += 1;
    }

    Ok(Observation::flat(value))
}
