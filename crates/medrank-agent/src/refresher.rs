//! Background recompute of aggregate weights.
//!
//! Producers send a full submissions snapshot tagged with a generation
//! number. The worker recomputes every aggregate from scratch and publishes
//! the result on a `watch` channel. A result older than the one already
//! published is dropped, so readers only ever see the newest snapshot.

use medrank_ranker::aggregate::{aggregate, AggregateWeightVector, WeightSubmission};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// "Submissions changed" notification.
#[derive(Debug, Clone)]
pub struct SubmissionsChanged {
    /// Monotonically increasing; starts at 1.
    pub generation: u64,
    pub submissions: Vec<WeightSubmission>,
}

/// Latest published aggregates. Generation 0 means nothing computed yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSnapshot {
    pub generation: u64,
    pub submissions: usize,
    pub aggregates: Vec<AggregateWeightVector>,
}

/// Spawn the refresher worker.
///
/// The worker exits once every sender is dropped; the watch channel then
/// reports closed to its receivers.
pub fn start_aggregate_refresher() -> (
    mpsc::UnboundedSender<SubmissionsChanged>,
    watch::Receiver<AggregateSnapshot>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<SubmissionsChanged>();
    let (publish, results) = watch::channel(AggregateSnapshot::default());

    tokio::spawn(async move {
        info!("Started aggregate refresher");

        while let Some(mut event) = rx.recv().await {
            // Only the newest queued snapshot is worth computing.
            while let Ok(next) = rx.try_recv() {
                if next.generation > event.generation {
                    event = next;
                }
            }

            let published = publish.borrow().generation;
            if event.generation <= published {
                debug!(
                    generation = event.generation,
                    published, "Discarding stale submissions snapshot"
                );
                continue;
            }

            let snapshot = AggregateSnapshot {
                generation: event.generation,
                submissions: event.submissions.len(),
                aggregates: aggregate(&event.submissions),
            };

            let updated = publish.send_if_modified(|current| {
                if snapshot.generation > current.generation {
                    *current = snapshot;
                    true
                } else {
                    false
                }
            });
            if updated {
                debug!(generation = event.generation, "Published aggregates");
            }
        }

        info!("Aggregate refresher stopped");
    });

    (tx, results)
}

/// Hands out generation numbers for a single producer.
#[derive(Debug)]
pub struct SubmissionsNotifier {
    tx: mpsc::UnboundedSender<SubmissionsChanged>,
    generation: u64,
}

impl SubmissionsNotifier {
    pub fn new(tx: mpsc::UnboundedSender<SubmissionsChanged>) -> Self {
        Self { tx, generation: 0 }
    }

    /// Queue a recompute. Returns false once the worker has stopped.
    pub fn notify(&mut self, submissions: Vec<WeightSubmission>) -> bool {
        self.generation += 1;
        self.tx
            .send(SubmissionsChanged {
                generation: self.generation,
                submissions,
            })
            .is_ok()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrank_ranker::Attribute;
    use pretty_assertions::assert_eq;

    fn subs(weights: &[f64]) -> Vec<WeightSubmission> {
        weights
            .iter()
            .map(|&w| WeightSubmission::new(Some("faculty")).with(Attribute::AverageGpa, w))
            .collect()
    }

    async fn final_snapshot(mut results: watch::Receiver<AggregateSnapshot>) -> AggregateSnapshot {
        while results.changed().await.is_ok() {}
        let snapshot = results.borrow().clone();
        snapshot
    }

    #[tokio::test]
    async fn test_publishes_recomputed_aggregates() {
        let (tx, mut results) = start_aggregate_refresher();
        let mut notifier = SubmissionsNotifier::new(tx);
        assert!(notifier.notify(subs(&[10.0, 20.0, 90.0])));

        results.changed().await.unwrap();
        let snapshot = results.borrow().clone();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.submissions, 3);
        assert_eq!(snapshot.aggregates.len(), 2);
        assert_eq!(snapshot.aggregates[0].display_label(), "All (3)");
        assert_eq!(snapshot.aggregates[1].weights.get(Attribute::AverageGpa), 20.0);
    }

    #[tokio::test]
    async fn test_stale_generation_discarded() {
        let (tx, results) = start_aggregate_refresher();
        tx.send(SubmissionsChanged { generation: 2, submissions: subs(&[40.0]) }).unwrap();
        tx.send(SubmissionsChanged { generation: 1, submissions: subs(&[5.0, 5.0]) }).unwrap();
        drop(tx);

        let snapshot = final_snapshot(results).await;
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.submissions, 1);
        assert_eq!(snapshot.aggregates[0].weights.get(Attribute::AverageGpa), 40.0);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (tx, results) = start_aggregate_refresher();
        let mut notifier = SubmissionsNotifier::new(tx);
        notifier.notify(subs(&[10.0]));
        notifier.notify(subs(&[10.0, 30.0]));
        notifier.notify(subs(&[10.0, 30.0, 80.0]));
        assert_eq!(notifier.generation(), 3);
        drop(notifier);

        let snapshot = final_snapshot(results).await;
        assert_eq!(snapshot.generation, 3);
        assert_eq!(snapshot.aggregates[0].count, 3);
        assert_eq!(snapshot.aggregates[0].weights.get(Attribute::AverageGpa), 30.0);
    }

    #[test]
    fn test_empty_submissions_publish_no_groups() {
        let snapshot = tokio_test::block_on(async {
            let (tx, results) = start_aggregate_refresher();
            SubmissionsNotifier::new(tx).notify(Vec::new());
            final_snapshot(results).await
        });
        assert_eq!(snapshot.generation, 1);
        assert!(snapshot.aggregates.is_empty());
    }
}
