//! Timeframe module
//!
//! The fixed ladder of granularities and inference of which entry a raw
//! table natively represents

mod inference;
mod ladder;

pub use inference::{infer_base, native_interval, select_base, BasePlan};
pub use ladder::Timeframe;
