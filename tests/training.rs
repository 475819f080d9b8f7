use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use dnnet::train::{epoch_batches, mean_cost};
use dnnet::{
    DnnError, LabelledData, LabelledDataPoint, Mode, NetworkSpec, ParallelCollection,
    Partitioned, Result, TrainConfig, TrainOutcome, UnlabelledData,
};
use rand::{rngs::StdRng, SeedableRng};

fn separable() -> LabelledData {
    let mut points = Vec::new();
    for i in 0..20 {
        let i = i as f64;
        points.push(LabelledDataPoint::new(vec![-1.5 + 0.05 * i, -1.0 + 0.03 * i], vec![0.0]));
        points.push(LabelledDataPoint::new(vec![1.0 + 0.05 * i, 1.5 - 0.03 * i], vec![1.0]));
    }
    LabelledData::new(points, 4).unwrap()
}

#[test]
fn epoch_batches_cover_every_row_exactly_once() {
    let points = (0..97)
        .map(|i| LabelledDataPoint::new(vec![i as f64], vec![0.0]))
        .collect();
    let data = LabelledData::new(points, 4).unwrap();
    let mut rng = StdRng::seed_from_u64(31);

    for _ in 0..3 {
        let batches = epoch_batches(&data, 10, &mut rng).unwrap();
        assert_eq!(batches.len(), 10);

        let seen: Vec<u64> = batches
            .iter()
            .flat_map(|batch| batch.collect())
            .map(|point| point.features[0] as u64)
            .collect();
        let unique: HashSet<u64> = seen.iter().copied().collect();
        assert_eq!(seen.len(), 97);
        assert_eq!(unique, (0..97).collect::<HashSet<u64>>());
    }
}

#[test]
fn single_batch_epoch_is_the_whole_dataset() {
    let data = separable();
    let batches = epoch_batches(&data, 1, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].count(), data.count());
}

#[test]
fn classifier_separates_two_clusters() {
    let data = separable();
    let mut network = NetworkSpec::new(&[2, 4, 1], Mode::Classification)
        .with_seed(42)
        .build()
        .unwrap();
    let before = mean_cost(&network, &data).unwrap();

    let config = TrainConfig::new(1.0, 2000, 0.01).with_seed(7);
    let outcome = network.train(&data, &config).unwrap();

    assert!(matches!(outcome, TrainOutcome::Converged { .. }), "{outcome:?}");
    assert!(outcome.epoch_or_sentinel() >= 1);
    assert!(mean_cost(&network, &data).unwrap() < before);
}

#[test]
fn training_is_reproducible_with_seeds() {
    let spec = NetworkSpec::new(&[2, 4, 1], Mode::Classification).with_seed(3);
    let config = TrainConfig::new(0.5, 15, 0.0).with_seed(11);

    let mut a = spec.build().unwrap();
    let mut b = spec.build().unwrap();
    assert_eq!(a.train(&separable(), &config).unwrap(), TrainOutcome::Exhausted);
    assert_eq!(b.train(&separable(), &config).unwrap(), TrainOutcome::Exhausted);

    let probe = [0.25, -0.75];
    assert_abs_diff_eq!(a.run(&probe).unwrap()[0], b.run(&probe).unwrap()[0], epsilon = 1e-12);
}

#[test]
fn predict_labels_with_the_affine_map() {
    let network = NetworkSpec::new(&[1, 1], Mode::Regression).with_seed(17).build().unwrap();
    let output = &network.layers()[1];
    let (w, b) = (output.weights().data[0][0], output.biases()[0]);

    let data = UnlabelledData::new(vec![vec![-2.0], vec![0.0], vec![3.5]], 2).unwrap();
    let labelled = network.predict(&data).unwrap().collect();

    assert_eq!(labelled.len(), 3);
    for point in &labelled {
        assert_abs_diff_eq!(point.target[0], w * point.features[0] + b, epsilon = 1e-12);
    }
}

#[test]
fn predict_rejects_wrong_feature_width() {
    let network = NetworkSpec::new(&[2, 1], Mode::Regression).with_seed(1).build().unwrap();
    let data = UnlabelledData::new(vec![vec![1.0, 2.0], vec![1.0]], 1).unwrap();
    assert!(network.predict(&data).is_err());
}

/// Delegates to `LabelledData`, except that the `fail_on`-th map (counting
/// from zero) panics inside the workers.
struct FailingWorkers {
    inner: LabelledData,
    maps: Arc<AtomicUsize>,
    fail_on: usize,
}

impl FailingWorkers {
    fn wrap(&self, inner: LabelledData) -> FailingWorkers {
        FailingWorkers { inner, maps: Arc::clone(&self.maps), fail_on: self.fail_on }
    }
}

impl ParallelCollection for FailingWorkers {
    type Item = LabelledDataPoint;
    type Mapped<U: Clone + Send + Sync> = Partitioned<U>;

    fn count(&self) -> usize {
        self.inner.count()
    }

    fn sample(&self, with_replacement: bool, fraction: f64, seed: u64) -> Result<Self> {
        Ok(self.wrap(self.inner.sample(with_replacement, fraction, seed)?))
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        Ok(self.wrap(self.inner.subtract(&other.inner)?))
    }

    fn cache(&self) -> Self {
        self.wrap(self.inner.cache())
    }

    fn try_map<U, F>(&self, f: F) -> Result<Partitioned<U>>
    where
        U: Clone + Send + Sync,
        F: Fn(&LabelledDataPoint) -> Result<U> + Send + Sync,
    {
        if self.maps.fetch_add(1, Ordering::SeqCst) == self.fail_on {
            self.inner.try_map(|_| -> Result<U> { panic!("worker lost") })
        } else {
            self.inner.try_map(f)
        }
    }

    fn reduce<F>(&self, f: F) -> Result<Option<LabelledDataPoint>>
    where
        F: Fn(LabelledDataPoint, LabelledDataPoint) -> LabelledDataPoint + Send + Sync,
    {
        self.inner.reduce(f)
    }

    fn collect(&self) -> Vec<LabelledDataPoint> {
        self.inner.collect()
    }
}

#[test]
fn worker_failure_aborts_training_before_any_update() {
    // Map 0 validates the rows; map 1 is the first mini-batch gradient.
    let data = FailingWorkers { inner: separable(), maps: Arc::new(AtomicUsize::new(0)), fail_on: 1 };
    let mut network = NetworkSpec::new(&[2, 4, 1], Mode::Classification)
        .with_seed(5)
        .build()
        .unwrap();
    let before = network.clone();

    let err = network.train(&data, &TrainConfig::new(1.0, 50, 0.0).with_seed(1)).unwrap_err();
    match err {
        DnnError::DistributedExecutionFailure(message) => assert!(message.contains("worker lost")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(network, before);
}

#[test]
fn worker_failure_mid_run_stops_training() {
    let maps = Arc::new(AtomicUsize::new(0));
    let data = FailingWorkers { inner: separable(), maps: Arc::clone(&maps), fail_on: 4 };
    let mut network = NetworkSpec::new(&[2, 4, 1], Mode::Classification)
        .with_seed(5)
        .build()
        .unwrap();

    let result = network.train(&data, &TrainConfig::new(0.1, 50, 0.0).with_seed(1));
    assert!(matches!(result, Err(DnnError::DistributedExecutionFailure(_))));
    // Nothing is mapped after the failing call.
    assert_eq!(maps.load(Ordering::SeqCst), 5);
}
