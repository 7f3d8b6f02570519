use super::{Analyzer, ThreadView};
use crate::Result;
use crate::log::EventRecord;
use serde::{Deserialize, Serialize};

/// Tunables of the anomaly rule. Values are used as given, without clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThresholds {
    /// Multiple of the group average a duration must exceed
    pub factor: f64,
    /// Absolute floor a duration must exceed
    pub min_duration_ms: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            factor: 3.0,
            min_duration_ms: 500.0,
        }
    }
}

/// A record is anomalous when its duration is strictly above both the floor and
/// `threshold_factor` times its group average.
pub fn is_anomalous(
    record: &EventRecord,
    group_average: f64,
    threshold_factor: f64,
    min_duration_ms: f64,
) -> bool {
    let duration = record.duration_ms as f64;
    duration > min_duration_ms && duration > threshold_factor * group_average
}

/// A thread record together with its anomaly flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedRecord {
    #[serde(flatten)]
    pub record: EventRecord,
    pub anomalous: bool,
}

/// Flags the records of a thread against their event-type average within that thread
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    thresholds: AnomalyThresholds,
    enabled: bool,
}

impl AnomalyDetector {
    pub fn new(thresholds: AnomalyThresholds) -> Self {
        Self {
            thresholds,
            enabled: true,
        }
    }

    /// A detector that never flags anything
    pub fn disabled() -> Self {
        Self {
            thresholds: AnomalyThresholds::default(),
            enabled: false,
        }
    }

    pub fn check(&self, view: &ThreadView<'_>, record: &EventRecord) -> bool {
        if !self.enabled {
            return false;
        }
        // Averages include earlier outliers; there is no second pass.
        view.event_average(&record.event_type).is_some_and(|avg| {
            is_anomalous(
                record,
                avg,
                self.thresholds.factor,
                self.thresholds.min_duration_ms,
            )
        })
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyThresholds::default())
    }
}

impl Analyzer for AnomalyDetector {
    type Output = Vec<FlaggedRecord>;

    fn analyze(&self, view: &ThreadView<'_>) -> Result<Self::Output> {
        tracing::debug!(
            "Flagging anomalies in thread {} (factor={}, min={}ms)",
            view.thread_id,
            self.thresholds.factor,
            self.thresholds.min_duration_ms
        );

        let flagged: Vec<FlaggedRecord> = view
            .records
            .iter()
            .map(|record| FlaggedRecord {
                record: (*record).clone(),
                anomalous: self.check(view, record),
            })
            .collect();

        tracing::info!(
            "Anomaly detection complete: {} of {} records flagged",
            flagged.iter().filter(|f| f.anomalous).count(),
            flagged.len()
        );

        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::LogReader;

    fn with_duration(duration_ms: u64) -> EventRecord {
        EventRecord {
            line_index: 0,
            thread_id: "1:1-AA".to_string(),
            sequence: 1,
            session_id: 1,
            entity_id: 1,
            event_type: "X".to_string(),
            duration_ms,
        }
    }

    #[test]
    fn test_both_conditions_required() {
        // above floor, below multiple
        assert!(!is_anomalous(&with_duration(600), 300.0, 3.0, 500.0));
        // above multiple, below floor
        assert!(!is_anomalous(&with_duration(400), 100.0, 3.0, 500.0));
        assert!(is_anomalous(&with_duration(1000), 300.0, 3.0, 500.0));
    }

    #[test]
    fn test_boundaries_are_strict() {
        // exactly factor * average
        assert!(!is_anomalous(&with_duration(900), 300.0, 3.0, 100.0));
        // exactly the floor
        assert!(!is_anomalous(&with_duration(500), 10.0, 3.0, 500.0));
        assert!(is_anomalous(&with_duration(901), 300.0, 3.0, 100.0));
    }

    #[test]
    fn test_raising_factor_never_adds_anomalies() {
        let average = 250.0;
        let floor = 100.0;
        for duration in (0..5000).step_by(37) {
            let record = with_duration(duration);
            let mut previous = true;
            for factor in [0.5, 1.0, 2.0, 2.5, 3.0, 5.0, 10.0, 50.0] {
                let flagged = is_anomalous(&record, average, factor, floor);
                assert!(
                    previous || !flagged,
                    "duration {} flagged again at factor {}",
                    duration,
                    factor
                );
                previous = flagged;
            }
        }
    }

    #[test]
    fn test_tunables_are_not_clamped() {
        // factor below the suggested range still applies as given
        assert!(is_anomalous(&with_duration(150), 100.0, 1.0, 0.0));
        assert!(!is_anomalous(&with_duration(150), 100.0, 1.0, 10_000.0));
    }

    #[test]
    fn test_outlier_below_factor_times_average_is_not_anomalous() {
        let content = "[1:1-AB] (1-1 [1]) X(): 100 ms\n\
                       [1:1-AB] (2-1 [1]) X(): 120 ms\n\
                       not a record\n\
                       [1:1-AB] (3-1 [1]) X(): 2000 ms\n";
        let log = LogReader::from_str(content).unwrap();
        assert_eq!(log.len(), 3);

        let view = ThreadView::new(&log.records, "1:1-AB").unwrap();
        let average = view.event_average("X").unwrap();
        assert!((average - 740.0).abs() < 1e-9);

        let detector = AnomalyDetector::new(AnomalyThresholds {
            factor: 3.0,
            min_duration_ms: 500.0,
        });
        let flagged = detector.analyze(&view).unwrap();
        assert_eq!(flagged.len(), 3);
        // 2000 > 500 but 2000 <= 3 * 740 = 2220
        assert!(flagged.iter().all(|f| !f.anomalous));

        let detector = AnomalyDetector::new(AnomalyThresholds {
            factor: 2.0,
            min_duration_ms: 500.0,
        });
        let flagged = detector.analyze(&view).unwrap();
        let anomalous: Vec<u64> = flagged
            .iter()
            .filter(|f| f.anomalous)
            .map(|f| f.record.duration_ms)
            .collect();
        assert_eq!(anomalous, vec![2000]);
    }

    #[test]
    fn test_disabled_detector_flags_nothing() {
        let content = "[1:1-AB] (1-1 [1]) X(): 1 ms\n\
                       [1:1-AB] (2-1 [1]) X(): 1 ms\n\
                       [1:1-AB] (3-1 [1]) X(): 1 ms\n\
                       [1:1-AB] (4-1 [1]) X(): 1 ms\n\
                       [1:1-AB] (5-1 [1]) X(): 90000 ms\n";
        let log = LogReader::from_str(content).unwrap();
        let view = ThreadView::new(&log.records, "1:1-AB").unwrap();

        assert!(
            AnomalyDetector::default()
                .analyze(&view)
                .unwrap()
                .iter()
                .any(|f| f.anomalous)
        );
        assert!(
            AnomalyDetector::disabled()
                .analyze(&view)
                .unwrap()
                .iter()
                .all(|f| !f.anomalous)
        );
    }

    #[test]
    fn test_average_is_thread_scoped() {
        // The same event is slow on thread 2; thread 1's outlier is judged on its own.
        let content = "[1:1-AB] (1-1 [1]) X(): 100 ms\n\
                       [1:1-AB] (2-1 [1]) X(): 100 ms\n\
                       [1:1-AB] (3-1 [1]) X(): 100 ms\n\
                       [1:1-AB] (4-1 [1]) X(): 1000 ms\n\
                       [2:1-AB] (5-1 [1]) X(): 50000 ms\n";
        let log = LogReader::from_str(content).unwrap();
        let view = ThreadView::new(&log.records, "1:1-AB").unwrap();

        let flagged = AnomalyDetector::default().analyze(&view).unwrap();
        assert_eq!(flagged.len(), 4);
        assert!(flagged[3].anomalous); // 1000 > 3 * 325
    }
}
