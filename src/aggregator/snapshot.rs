//! Partition interval durations into epoch snapshots.
//!
//! Durations accumulate in a per-subject, per-kind `current` list. Exit
//! markers past the grace countdown seal every subject's `current` list under
//! the marker's tick (a snapshot cut). `finalize` forces one last cut and
//! hands the sealed data to `SnapshotReport` for histogram generation.

use super::subjects::SubjectArena;
use crate::event::{Category, Interval, IntervalKind, SubjectId, Tick};
use crate::histogram::{Histogram, HistogramSpec};
use crate::pipeline::{Record, RecordSink};
use crate::utils::config::{HISTO_EXTENSION, RESERVED_SUBJECTS};
use crate::utils::error::{HistogramError, ReportError};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Durations of one interval kind for one subject
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochSeries {
    current: Vec<u64>,
    epochs: BTreeMap<Tick, Vec<u64>>,
}

impl EpochSeries {
    fn seal(&mut self, key: Tick) {
        let sealed = std::mem::take(&mut self.current);
        self.epochs.entry(key).or_default().extend(sealed);
    }

    /// Sealed durations keyed by cut tick
    pub fn epochs(&self) -> &BTreeMap<Tick, Vec<u64>> {
        &self.epochs
    }

    /// Every sealed duration, cuts concatenated in tick order
    pub fn all(&self) -> Vec<u64> {
        self.epochs.values().flatten().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.epochs.values().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone, Default)]
struct SubjectSnapshots {
    kinds: [EpochSeries; 2],
}

/// Accumulates interval durations and cuts them into epochs
#[derive(Debug)]
pub struct SnapshotAggregator {
    subjects: SubjectArena<SubjectSnapshots>,
    grace_remaining: u32,
    last_timestamp: Tick,
    cut_keys: Vec<Tick>,
}

impl SnapshotAggregator {
    /// `grace_markers` exit markers pass before cuts start
    pub fn new(grace_markers: u32) -> Self {
        Self {
            subjects: SubjectArena::new(),
            grace_remaining: grace_markers,
            last_timestamp: 0,
            cut_keys: Vec::new(),
        }
    }

    /// Append an interval's duration to its subject's current list
    pub fn record_interval(&mut self, interval: &Interval) {
        let snapshots = self.subjects.ensure(interval.subject);
        snapshots.kinds[interval.kind.index()]
            .current
            .push(interval.duration());
        self.advance(interval.end);
    }

    /// Handle an exit marker stamped with `timestamp`
    ///
    /// Returns true when the marker triggered a cut.
    pub fn mark_epoch(&mut self, timestamp: Tick) -> bool {
        self.advance(timestamp);

        if self.grace_remaining > 0 {
            self.grace_remaining -= 1;
            debug!(
                "Epoch marker at t={} ignored ({} grace markers left)",
                timestamp, self.grace_remaining
            );
            return false;
        }

        self.cut(timestamp);
        true
    }

    /// Seal every subject's current lists under `key`
    pub fn cut(&mut self, key: Tick) {
        for (_, snapshots) in self.subjects.iter_mut() {
            for series in snapshots.kinds.iter_mut() {
                series.seal(key);
            }
        }
        if self.cut_keys.last() != Some(&key) {
            self.cut_keys.push(key);
        }
        debug!("Snapshot cut at t={} across {} subjects", key, self.subjects.len());
    }

    /// Ticks of the cuts performed so far
    pub fn cut_keys(&self) -> &[Tick] {
        &self.cut_keys
    }

    /// Durations accumulated since the last cut
    pub fn current(&self, subject: SubjectId, kind: IntervalKind) -> &[u64] {
        self.subjects
            .get(subject)
            .map(|s| s.kinds[kind.index()].current.as_slice())
            .unwrap_or(&[])
    }

    /// Latest timestamp seen on an interval end or exit marker
    pub fn last_timestamp(&self) -> Tick {
        self.last_timestamp
    }

    /// Force the closing cut and drop reserved subjects
    ///
    /// The closing key is one past the last timestamp so it never lands on a
    /// cut that already exists.
    pub fn finalize(mut self) -> SnapshotReport {
        let final_cut = self.last_timestamp + 1;
        self.cut(final_cut);

        for reserved in RESERVED_SUBJECTS {
            if self.subjects.remove(*reserved).is_some() {
                debug!("Dropping reserved subject {}", reserved);
            }
        }

        let subjects: BTreeMap<SubjectId, [EpochSeries; 2]> = self
            .subjects
            .into_iter_ordered()
            .map(|(id, snapshots)| (id, snapshots.kinds))
            .collect();

        info!(
            "Aggregated {} subjects over {} snapshot cuts",
            subjects.len(),
            self.cut_keys.len()
        );

        SnapshotReport {
            subjects,
            cut_keys: self.cut_keys,
            final_cut,
        }
    }

    fn advance(&mut self, timestamp: Tick) {
        self.last_timestamp = self.last_timestamp.max(timestamp);
    }
}

impl Default for SnapshotAggregator {
    fn default() -> Self {
        Self::new(crate::utils::config::DEFAULT_GRACE_MARKERS)
    }
}

impl RecordSink for SnapshotAggregator {
    fn accept(&mut self, record: &Record) {
        match record {
            Record::Interval(interval) => self.record_interval(interval),
            Record::Event(event) if event.category == Category::SubjectExited => {
                self.mark_epoch(event.tag);
            }
            Record::Event(_) => {}
        }
    }
}

/// A histogram together with the name it is written under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedHistogram {
    pub subject: SubjectId,
    pub label: String,
    pub kind: IntervalKind,
    /// Cut tick for per-epoch histograms, `None` for the aggregate view
    pub epoch: Option<Tick>,
    pub histogram: Histogram,
}

impl NamedHistogram {
    /// `<Label>[@<epoch>].<kind>.histo`
    pub fn file_name(&self) -> String {
        match self.epoch {
            Some(epoch) => format!("{}@{}.{}.{}", self.label, epoch, self.kind, HISTO_EXTENSION),
            None => format!("{}.{}.{}", self.label, self.kind, HISTO_EXTENSION),
        }
    }
}

/// Sealed per-subject durations, ready to be binned
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    subjects: BTreeMap<SubjectId, [EpochSeries; 2]>,
    cut_keys: Vec<Tick>,
    final_cut: Tick,
}

impl SnapshotReport {
    /// Eligible subjects in ascending order
    pub fn subjects(&self) -> impl Iterator<Item = SubjectId> + '_ {
        self.subjects.keys().copied()
    }

    pub fn series(&self, subject: SubjectId, kind: IntervalKind) -> Option<&EpochSeries> {
        self.subjects.get(&subject).map(|kinds| &kinds[kind.index()])
    }

    /// Every cut performed, the closing cut included
    pub fn cut_keys(&self) -> &[Tick] {
        &self.cut_keys
    }

    /// Key of the closing cut made by `finalize`
    pub fn final_cut(&self) -> Tick {
        self.final_cut
    }

    /// Build every aggregate and per-epoch histogram
    ///
    /// For each subject and kind: one histogram over all durations, plus one
    /// per cut. Aggregate histograms of one kind share a layout fitted to
    /// that kind's durations across every subject, so subjects stay
    /// comparable. Per-cut histograms share the layout fitted to their own
    /// subject's durations so epochs stay comparable. Kinds without any
    /// duration produce nothing.
    ///
    /// # Errors
    /// * `ReportError::LabelNotFound` - a subject id past the end of `labels`
    pub fn histograms(
        &self,
        labels: &[String],
        bucket_count: usize,
    ) -> Result<Vec<NamedHistogram>, ReportError> {
        let kind_specs = [
            self.kind_spec(IntervalKind::Active, bucket_count)?,
            self.kind_spec(IntervalKind::Inactive, bucket_count)?,
        ];
        let mut named = Vec::new();

        for (&subject, kinds) in &self.subjects {
            let label = lookup_label(labels, subject)?;

            for kind in IntervalKind::ALL {
                let series = &kinds[kind.index()];
                let all = series.all();
                if all.is_empty() {
                    warn!("Subject {} ({}) has no {} intervals", subject, label, kind);
                    continue;
                }
                let aggregate_spec = kind_specs[kind.index()]
                    .ok_or(HistogramError::EmptyInput)?;

                named.push(NamedHistogram {
                    subject,
                    label: label.to_string(),
                    kind,
                    epoch: None,
                    histogram: Histogram::with_spec(aggregate_spec, &all),
                });

                let epoch_spec = HistogramSpec::fit(&all, bucket_count)?;
                named.extend(series.epochs().iter().map(|(&epoch, durations)| {
                    NamedHistogram {
                        subject,
                        label: label.to_string(),
                        kind,
                        epoch: Some(epoch),
                        histogram: Histogram::with_spec(epoch_spec, durations),
                    }
                }));
            }
        }

        debug!("Generated {} histograms", named.len());
        Ok(named)
    }

    /// Layout fitted to one kind's durations across every subject
    fn kind_spec(
        &self,
        kind: IntervalKind,
        bucket_count: usize,
    ) -> Result<Option<HistogramSpec>, ReportError> {
        let maxima: Vec<u64> = self
            .subjects
            .values()
            .filter_map(|kinds| kinds[kind.index()].epochs.values().flatten().max().copied())
            .collect();

        if maxima.is_empty() {
            return Ok(None);
        }
        Ok(Some(HistogramSpec::fit(&maxima, bucket_count)?))
    }
}

/// Resolve a subject's output label from the ordinal table
pub fn lookup_label(labels: &[String], subject: SubjectId) -> Result<&str, ReportError> {
    labels
        .get(subject as usize)
        .map(String::as_str)
        .ok_or(ReportError::LabelNotFound(subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn interval(subject: SubjectId, kind: IntervalKind, start: Tick, end: Tick) -> Record {
        Record::Interval(Interval::new(subject, kind, start, end))
    }

    fn exit(subject: SubjectId, tick: Tick) -> Record {
        Record::Event(Event::new(Category::SubjectExited, subject, tick))
    }

    fn labels() -> Vec<String> {
        crate::utils::config::PipelineConfig::default().labels
    }

    #[test]
    fn test_intervals_accumulate_in_current() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 10));
        aggregator.accept(&interval(2, IntervalKind::Inactive, 10, 15));
        aggregator.accept(&interval(2, IntervalKind::Active, 15, 40));

        assert_eq!(aggregator.current(2, IntervalKind::Active), &[10, 25]);
        assert_eq!(aggregator.current(2, IntervalKind::Inactive), &[5]);
        assert_eq!(aggregator.current(3, IntervalKind::Active), &[] as &[u64]);
        assert_eq!(aggregator.last_timestamp(), 40);
    }

    #[test]
    fn test_grace_markers_then_cuts() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 4));

        assert!(!aggregator.mark_epoch(5));
        assert!(!aggregator.mark_epoch(6));
        assert!(aggregator.cut_keys().is_empty());
        assert_eq!(aggregator.current(2, IntervalKind::Active), &[4]);

        assert!(aggregator.mark_epoch(7));
        assert_eq!(aggregator.cut_keys(), &[7]);
        assert!(aggregator.current(2, IntervalKind::Active).is_empty());

        assert!(aggregator.mark_epoch(9));
        assert_eq!(aggregator.cut_keys(), &[7, 9]);
    }

    #[test]
    fn test_cut_is_global() {
        let mut aggregator = SnapshotAggregator::new(0);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 3));
        aggregator.accept(&interval(3, IntervalKind::Inactive, 0, 8));
        aggregator.accept(&exit(4, 8));

        let report = aggregator.finalize();
        let a = report.series(2, IntervalKind::Active).unwrap();
        let c = report.series(3, IntervalKind::Inactive).unwrap();
        assert_eq!(a.epochs().get(&8), Some(&vec![3]));
        assert_eq!(c.epochs().get(&8), Some(&vec![8]));
        assert_eq!(report.cut_keys(), &[8, 9]);
    }

    #[test]
    fn test_finalize_cut_is_one_past_last_timestamp() {
        let mut aggregator = SnapshotAggregator::new(0);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 12));
        aggregator.accept(&exit(2, 12));
        aggregator.accept(&interval(2, IntervalKind::Active, 12, 12));

        let report = aggregator.finalize();
        assert_eq!(report.final_cut(), 13);

        let series = report.series(2, IntervalKind::Active).unwrap();
        assert_eq!(series.epochs().get(&12), Some(&vec![12]));
        assert_eq!(series.epochs().get(&13), Some(&vec![0]));
    }

    #[test]
    fn test_same_tick_cuts_merge() {
        let mut aggregator = SnapshotAggregator::new(0);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 5));
        aggregator.accept(&exit(3, 5));
        aggregator.accept(&interval(2, IntervalKind::Active, 5, 5));
        aggregator.accept(&exit(4, 5));

        let report = aggregator.finalize();
        let series = report.series(2, IntervalKind::Active).unwrap();
        assert_eq!(series.epochs().get(&5), Some(&vec![5, 0]));
        assert_eq!(report.cut_keys(), &[5, 6]);
    }

    #[test]
    fn test_reserved_subjects_dropped() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(0, IntervalKind::Active, 0, 2));
        aggregator.accept(&interval(1, IntervalKind::Active, 2, 4));
        aggregator.accept(&interval(2, IntervalKind::Active, 4, 6));

        let report = aggregator.finalize();
        assert_eq!(report.subjects().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_histograms_named_and_counted() {
        let mut aggregator = SnapshotAggregator::new(0);
        aggregator.accept(&interval(5, IntervalKind::Active, 0, 10));
        aggregator.accept(&interval(5, IntervalKind::Inactive, 10, 15));
        aggregator.accept(&exit(3, 20));
        aggregator.accept(&interval(5, IntervalKind::Active, 15, 40));

        let report = aggregator.finalize();
        let named = report.histograms(&labels(), 20).unwrap();
        let names: Vec<String> = named.iter().map(NamedHistogram::file_name).collect();

        assert_eq!(
            names,
            vec![
                "B.active.histo",
                "B@20.active.histo",
                "B@41.active.histo",
                "B.inactive.histo",
                "B@20.inactive.histo",
                "B@41.inactive.histo",
            ]
        );

        let aggregate_active = &named[0].histogram;
        assert_eq!(aggregate_active.total_count(), 2);
        assert_eq!(aggregate_active.spec().bucket_width(), 1);

        // With a single subject both layouts come from the same durations
        assert_eq!(named[1].histogram.spec(), aggregate_active.spec());
        assert_eq!(named[1].histogram.total_count(), 1);
        assert_eq!(named[2].histogram.total_count(), 1);
        assert_eq!(named[5].histogram.total_count(), 0);
    }

    #[test]
    fn test_label_not_found() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(6, IntervalKind::Active, 0, 3));

        let report = aggregator.finalize();
        assert!(matches!(
            report.histograms(&labels(), 20),
            Err(ReportError::LabelNotFound(6))
        ));
    }

    #[test]
    fn test_empty_kind_skipped() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 3));

        let named = aggregator.finalize().histograms(&labels(), 20).unwrap();
        assert!(named.iter().all(|n| n.kind == IntervalKind::Active));
        assert_eq!(named.len(), 2);
    }

    #[test]
    fn test_aggregate_layout_shared_across_subjects() {
        let mut aggregator = SnapshotAggregator::new(2);
        aggregator.accept(&interval(2, IntervalKind::Active, 0, 200));
        aggregator.accept(&interval(3, IntervalKind::Active, 200, 220));

        let named = aggregator.finalize().histograms(&labels(), 20).unwrap();
        let find = |label: &str, epoch: Option<Tick>| {
            named
                .iter()
                .find(|n| n.label == label && n.kind == IntervalKind::Active && n.epoch == epoch)
                .unwrap()
        };

        // Aggregates use the widest subject's layout
        assert_eq!(find("A", None).histogram.spec().bucket_width(), 10);
        assert_eq!(find("C", None).histogram.spec().bucket_width(), 10);
        assert_eq!(find("C", None).histogram.buckets()[2].count, 1);

        // Epochs keep their own subject's layout
        assert_eq!(find("A", Some(221)).histogram.spec().bucket_width(), 10);
        assert_eq!(find("C", Some(221)).histogram.spec().bucket_width(), 1);
    }

    #[test]
    fn test_epoch_layout_fitted_to_all_epochs() {
        let mut aggregator = SnapshotAggregator::new(0);
        aggregator.accept(&interval(2, IntervalKind::Inactive, 0, 100));
        aggregator.accept(&exit(2, 100));
        aggregator.accept(&interval(2, IntervalKind::Inactive, 100, 103));

        let report = aggregator.finalize();
        let series = report.series(2, IntervalKind::Inactive).unwrap();
        assert_eq!(series.all(), vec![100, 3]);
        assert!(!series.is_empty());

        let named = report.histograms(&labels(), 20).unwrap();
        let late = named.iter().find(|n| n.epoch == Some(104)).unwrap();
        // Width comes from the 100-tick epoch, not from the lone 3
        assert_eq!(late.histogram.spec().bucket_width(), 5);
        assert_eq!(late.histogram.buckets()[0].count, 1);
    }
}
