//! Record delivery.
//!
//! The core decides *whether* a record is emitted; a `RecordSink` persists it.
//! Delivery is best effort: a failed write is reported to the caller and
//! counted, but the trigger state that produced the record is not rolled back.

use crate::error::SinkError;
use crate::models::LogRecord;
use tracing::warn;

pub trait RecordSink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError>;

    /// Sink name for logging
    fn name(&self) -> &str;
}

/// Keeps records in memory. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<LogRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Delivery counters for one sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Write a record, logging and counting a failure instead of propagating it
/// past the poll.
pub fn deliver<S: RecordSink + ?Sized>(
    sink: &mut S,
    record: &LogRecord,
    stats: &mut DeliveryStats,
) -> Result<(), SinkError> {
    match sink.write(record) {
        Ok(()) => {
            stats.delivered += 1;
            Ok(())
        }
        Err(e) => {
            stats.failed += 1;
            warn!(
                "{}: failed to persist record for {} at {}: {}",
                sink.name(),
                record.matchup,
                record.clock,
                e
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct FailingSink;

    impl RecordSink for FailingSink {
        fn write(&mut self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Rejected("sheet is read-only".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn record() -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            matchup: "DEN @ PHX".to_string(),
            clock: "Q4 0:40".to_string(),
            pace: 99.1,
            home_score: 110,
            away_score: 108,
            bookmaker_total: Some(228.5),
            rich_projection: None,
            projected_remaining_points: None,
            remainder_edge: None,
            rich_adjusted_projection: None,
        }
    }

    #[test]
    fn test_memory_sink_delivery() {
        let mut sink = MemorySink::new();
        let mut stats = DeliveryStats::default();
        deliver(&mut sink, &record(), &mut stats).unwrap();
        assert_eq!(sink.records().len(), 1);
        assert_eq!(stats, DeliveryStats { delivered: 1, failed: 0 });
    }

    #[test]
    fn test_failure_is_counted_and_returned() {
        let mut stats = DeliveryStats::default();
        let result = deliver(&mut FailingSink, &record(), &mut stats);
        assert!(matches!(result, Err(SinkError::Rejected(_))));
        assert_eq!(stats.failed, 1);

        // later deliveries are unaffected
        let mut sink = MemorySink::new();
        deliver(&mut sink, &record(), &mut stats).unwrap();
        assert_eq!(stats, DeliveryStats { delivered: 1, failed: 1 });
    }
}
