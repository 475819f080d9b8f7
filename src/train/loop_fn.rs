use std::time::Instant;

use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::{LabelledDataPoint, ParallelCollection};
use crate::error::{DnnError, Result};
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::process::gradients::Gradients;
use crate::train::epoch_stats::EpochStats;
use crate::train::outcome::TrainOutcome;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` with mini-batch gradient descent until the mean gradient
/// of a mini-batch is within `config.gradient_cutoff` or `config.max_epochs`
/// epochs have passed.
///
/// Each epoch is split into `config.batches_per_epoch` mini-batches by
/// `epoch_batches`, so every row is used exactly once per epoch. Per
/// mini-batch, per-example gradients are mapped in parallel over a read-only
/// snapshot of the weights, then summed and averaged. `optimizer` applies
/// the mean once. The convergence test runs after every update.
///
/// Every `config.report_every` epochs the mean cost over the whole dataset
/// is logged and sent on `config.progress_tx`; it never affects control flow.
///
/// # Errors
/// - `EmptyDataset` if `data` has no rows
/// - `DimensionMismatch` if any example does not fit the topography; checked
///   for every row before the first update
/// - `DistributedExecutionFailure` from the backend, which aborts the run
pub fn train_loop<C>(
    network: &mut Network,
    data: &C,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<TrainOutcome>
where
    C: ParallelCollection<Item = LabelledDataPoint>,
{
    let complete = data.cache();
    if complete.count() == 0 {
        return Err(DnnError::EmptyDataset);
    }
    {
        let snapshot: &Network = network;
        complete.try_map(|point| snapshot.check_point(point))?;
    }

    info!("Learning Rate = {}", optimizer.learning_rate);
    info!("Maximum Epochs = {}", config.max_epochs);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let batches = config.batches_per_epoch.max(1);
    let started = Instant::now();

    for epoch in 1..=config.max_epochs {
        for (batch_index, batch) in epoch_batches(&complete, batches, &mut rng)?.into_iter().enumerate() {
            let batch_size = batch.count();
            if batch_size == 0 {
                trace!("epoch {epoch}, batch {batch_index}: empty, skipped");
                continue;
            }

            let mean = batch_gradient(network, &batch)?.scale(1.0 / batch_size as f64);
            optimizer.step(network, &mean)?;
            trace!(
                "epoch {epoch}, batch {batch_index}: {batch_size} examples, max |gradient| = {:e}",
                mean.max_abs()
            );

            if mean.is_converged(config.gradient_cutoff) {
                info!("Converged after {epoch} epoch(s)");
                return Ok(TrainOutcome::Converged { epoch });
            }
        }

        if config.report_every > 0 && epoch % config.report_every == 0 {
            let cost = mean_cost(network, &complete)?;
            debug!("Completed {epoch} iterations; Cost = {cost}");
            if let Some(ref tx) = config.progress_tx {
                // A dropped receiver only means nobody is listening.
                let _ = tx.send(EpochStats {
                    epoch,
                    max_epochs: config.max_epochs,
                    cost,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }
        }
    }

    info!("Did not converge within {} epochs", config.max_epochs);
    Ok(TrainOutcome::Exhausted)
}

/// Splits one epoch's working set into `batches` mini-batches.
///
/// The working set is a fraction-1.0 sample of `complete` without replacement.
/// Batch `i` then draws `1 / (batches - i)` of the rows still left and those
/// rows are subtracted before the next draw, so the batches are disjoint and
/// together cover the working set. Batches may be empty.
pub fn epoch_batches<C, R>(complete: &C, batches: usize, rng: &mut R) -> Result<Vec<C>>
where
    C: ParallelCollection<Item = LabelledDataPoint>,
    R: Rng,
{
    let mut remaining = complete.sample(false, 1.0, rng.gen())?;
    let mut drawn = Vec::with_capacity(batches);
    for batch_index in 0..batches {
        let fraction = 1.0 / (batches - batch_index) as f64;
        let batch = remaining.sample(false, fraction, rng.gen())?;
        remaining = remaining.subtract(&batch)?;
        drawn.push(batch);
    }
    Ok(drawn)
}

/// Mean per-example cost over `data` under the current weights.
pub fn mean_cost<C>(network: &Network, data: &C) -> Result<f64>
where
    C: ParallelCollection<Item = LabelledDataPoint>,
{
    let cost = network.cost();
    let costs = data.try_map(|point| cost.compute(point))?.collect();
    if costs.is_empty() {
        return Err(DnnError::EmptyDataset);
    }
    Ok(costs.iter().sum::<f64>() / costs.len() as f64)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Sum of the per-example gradients of a non-empty batch.
fn batch_gradient<C>(network: &Network, batch: &C) -> Result<Gradients>
where
    C: ParallelCollection<Item = LabelledDataPoint>,
{
    let back_propagate = network.back_propagate();
    batch
        .try_map(|point| back_propagate.compute(point))?
        .reduce(Gradients::combine)?
        .ok_or_else(|| {
            DnnError::DistributedExecutionFailure("reduce over a non-empty batch returned nothing".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LabelledData;
    use crate::network::{Mode, NetworkSpec};
    use std::sync::mpsc;

    fn line(n: usize) -> LabelledData {
        let points = (0..n)
            .map(|i| {
                let x = i as f64 / n as f64;
                LabelledDataPoint::new(vec![x], vec![2.0 * x - 0.5])
            })
            .collect();
        LabelledData::new(points, 3).unwrap()
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let mut network = Network::new(&[1, 1], Mode::Regression).unwrap();
        let data = LabelledData::new(Vec::new(), 2).unwrap();
        assert_eq!(
            network.train(&data, &TrainConfig::default()).unwrap_err(),
            DnnError::EmptyDataset
        );
    }

    #[test]
    fn malformed_row_aborts_before_any_update() {
        let mut network = NetworkSpec::new(&[1, 1], Mode::Regression).with_seed(1).build().unwrap();
        let before = network.clone();
        let mut points: Vec<_> = line(20).collect();
        points.push(LabelledDataPoint::new(vec![0.0, 0.0], vec![0.0]));
        let data = LabelledData::new(points, 2).unwrap();

        let err = network.train(&data, &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, DnnError::DimensionMismatch { context: "features", .. }));
        assert_eq!(network, before);
    }

    #[test]
    fn exhausted_run_returns_the_sentinel() {
        let mut network = NetworkSpec::new(&[1, 1], Mode::Regression).with_seed(2).build().unwrap();
        let config = TrainConfig::new(0.01, 3, 0.0).with_seed(4);
        let outcome = network.train(&line(30), &config).unwrap();
        assert_eq!(outcome, TrainOutcome::Exhausted);
        assert_eq!(outcome.epoch_or_sentinel(), -1);
    }

    #[test]
    fn learns_a_line_and_converges() {
        let mut network = NetworkSpec::new(&[1, 1], Mode::Regression).with_seed(2).build().unwrap();
        let data = line(40);
        let before = mean_cost(&network, &data).unwrap();

        let config = TrainConfig::new(0.5, 5000, 1e-4).with_seed(8);
        let outcome = network.train(&data, &config).unwrap();

        assert!(outcome.is_converged(), "{outcome:?}");
        assert!(outcome.epoch().unwrap() >= 1);
        // A batch can meet the cutoff before the whole set is fitted, so only
        // the direction of travel is checked.
        assert!(mean_cost(&network, &data).unwrap() < before);
    }

    #[test]
    fn reports_cost_on_the_progress_channel() {
        let (tx, rx) = mpsc::channel();
        let mut network = NetworkSpec::new(&[1, 1], Mode::Regression).with_seed(3).build().unwrap();
        let config = TrainConfig::new(0.1, 20, 0.0).with_seed(1).with_progress(tx);
        network.train(&line(30), &config).unwrap();

        let reports: Vec<EpochStats> = rx.try_iter().collect();
        assert_eq!(reports.iter().map(|r| r.epoch).collect::<Vec<_>>(), vec![10, 20]);
        assert!(reports.iter().all(|r| r.max_epochs == 20 && r.cost.is_finite()));
        assert!(reports[1].cost <= reports[0].cost);
    }

    #[test]
    fn same_seeds_train_identically() {
        let spec = NetworkSpec::new(&[1, 2, 1], Mode::Regression).with_seed(6);
        let mut a = spec.build().unwrap();
        let mut b = spec.build().unwrap();
        let config = TrainConfig::new(0.1, 5, 0.0).with_seed(10);
        a.train(&line(25), &config).unwrap();
        b.train(&line(25), &config).unwrap();
        for (la, lb) in a.layers().iter().zip(b.layers()) {
            for (ra, rb) in la.weights().data.iter().zip(&lb.weights().data) {
                for (x, y) in ra.iter().zip(rb) {
                    assert!((x - y).abs() < 1e-12);
                }
            }
        }
    }
}
