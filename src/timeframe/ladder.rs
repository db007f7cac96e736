//! The fixed ladder of supported timeframes

use chrono::{DateTime, Datelike, Days, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds from the Unix epoch (a Thursday) to the first Monday
const EPOCH_TO_MONDAY_SECS: i64 = 4 * 86_400;

/// A position on the timeframe ladder, finest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    M1,
    M5,
    M10,
    M30,
    H1,
    H4,
    H12,
    D1,
    W1,
    /// Calendar month, variable length
    MN1,
}

impl Timeframe {
    /// All entries in ladder order
    pub const LADDER: [Timeframe; 10] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M10,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::H12,
        Timeframe::D1,
        Timeframe::W1,
        Timeframe::MN1,
    ];

    /// Fixed bucket length, `None` for the calendar month
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Timeframe::M1 => Some(Duration::minutes(1)),
            Timeframe::M5 => Some(Duration::minutes(5)),
            Timeframe::M10 => Some(Duration::minutes(10)),
            Timeframe::M30 => Some(Duration::minutes(30)),
            Timeframe::H1 => Some(Duration::hours(1)),
            Timeframe::H4 => Some(Duration::hours(4)),
            Timeframe::H12 => Some(Duration::hours(12)),
            Timeframe::D1 => Some(Duration::days(1)),
            Timeframe::W1 => Some(Duration::weeks(1)),
            Timeframe::MN1 => None,
        }
    }

    /// Whether every bucket has the same length
    pub fn is_fixed(&self) -> bool {
        self.duration().is_some()
    }

    /// The entry this one is aggregated from in the cascade
    ///
    /// Months are built from days since weeks straddle month boundaries.
    pub fn source(&self) -> Option<Timeframe> {
        match self {
            Timeframe::M1 => None,
            Timeframe::M5 => Some(Timeframe::M1),
            Timeframe::M10 => Some(Timeframe::M5),
            Timeframe::M30 => Some(Timeframe::M10),
            Timeframe::H1 => Some(Timeframe::M30),
            Timeframe::H4 => Some(Timeframe::H1),
            Timeframe::H12 => Some(Timeframe::H4),
            Timeframe::D1 => Some(Timeframe::H12),
            Timeframe::W1 => Some(Timeframe::D1),
            Timeframe::MN1 => Some(Timeframe::D1),
        }
    }

    /// Short label, e.g. "M5"
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M10 => "M10",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::H12 => "H12",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
            Timeframe::MN1 => "MN1",
        }
    }

    /// Start of the bucket containing `ts`
    ///
    /// Fixed entries align to the Unix epoch, weeks start on Monday and
    /// months on the 1st, all at 00:00 UTC.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let secs = ts.timestamp();
        let aligned = match self {
            Timeframe::MN1 => {
                let first = ts.date_naive() - Days::new(u64::from(ts.day0()));
                return first.and_time(NaiveTime::MIN).and_utc();
            }
            Timeframe::W1 => {
                let width = Duration::weeks(1).num_seconds();
                (secs - EPOCH_TO_MONDAY_SECS).div_euclid(width) * width + EPOCH_TO_MONDAY_SECS
            }
            fixed => {
                let width = fixed.duration().map_or(1, |d| d.num_seconds());
                secs.div_euclid(width) * width
            }
        };
        DateTime::from_timestamp(aligned, 0).unwrap_or(ts)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Timeframe::LADDER
            .iter()
            .copied()
            .find(|tf| tf.label() == upper)
            .ok_or_else(|| {
                let valid: Vec<&str> = Timeframe::LADDER.iter().map(|tf| tf.label()).collect();
                format!("Not valid timeframe: {s}. Valid timeframes: {valid:?}")
            })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}
