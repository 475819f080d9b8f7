use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::data::collection::ParallelCollection;
use crate::error::{DnnError, Result};

// Mixes the partition index into the sampling seed.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

static SHARED_POOL: OnceLock<Arc<ThreadPool>> = OnceLock::new();

/// The process-wide worker pool, sized by rayon's default (one worker per
/// available core unless `RAYON_NUM_THREADS` says otherwise).
fn shared_pool() -> Result<Arc<ThreadPool>> {
    if let Some(pool) = SHARED_POOL.get() {
        return Ok(Arc::clone(pool));
    }
    let pool = ThreadPoolBuilder::new()
        .thread_name(|i| format!("dnnet-worker-{i}"))
        .build()
        .map_err(|e| DnnError::DistributedExecutionFailure(e.to_string()))?;
    // A concurrent caller may have won the race; its pool is used instead.
    Ok(Arc::clone(SHARED_POOL.get_or_init(|| Arc::new(pool))))
}

struct Row<T> {
    id: u64,
    value: Arc<T>,
}

impl<T> Clone for Row<T> {
    fn clone(&self) -> Self {
        Row { id: self.id, value: Arc::clone(&self.value) }
    }
}

/// In-process `ParallelCollection` backed by a rayon thread pool.
///
/// Rows keep the id they were created with through `sample`, `subtract` and
/// `map`, so `subtract` removes exactly the rows that were drawn. Clones share
/// both the rows and the pool.
pub struct Partitioned<T> {
    partitions: Arc<Vec<Vec<Row<T>>>>,
    pool: Arc<ThreadPool>,
}

impl<T> Clone for Partitioned<T> {
    fn clone(&self) -> Self {
        Partitioned {
            partitions: Arc::clone(&self.partitions),
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<T: Clone + Send + Sync> Partitioned<T> {
    /// Splits `items` into `partitions` contiguous chunks.
    ///
    /// The partition count only shapes the data layout. Every collection made
    /// this way runs on one shared pool whose size does not depend on it.
    pub fn new(items: Vec<T>, partitions: usize) -> Result<Partitioned<T>> {
        Ok(Partitioned::with_pool(items, partitions, shared_pool()?))
    }

    /// Like `new`, on an existing pool.
    pub fn with_pool(items: Vec<T>, partitions: usize, pool: Arc<ThreadPool>) -> Partitioned<T> {
        let partitions = partitions.max(1);
        let chunk = ((items.len() + partitions - 1) / partitions).max(1);
        let mut split: Vec<Vec<Row<T>>> = (0..partitions).map(|_| Vec::with_capacity(chunk)).collect();
        for (id, value) in items.into_iter().enumerate() {
            split[id / chunk].push(Row { id: id as u64, value: Arc::new(value) });
        }
        Partitioned { partitions: Arc::new(split), pool }
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    fn derive<U>(&self, partitions: Vec<Vec<Row<U>>>) -> Partitioned<U> {
        Partitioned { partitions: Arc::new(partitions), pool: Arc::clone(&self.pool) }
    }

    /// Runs `job` on the pool. A worker panic becomes
    /// `DistributedExecutionFailure` instead of unwinding into the caller.
    fn run<R, F>(&self, job: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.pool.install(job)))
            .map_err(|payload| DnnError::DistributedExecutionFailure(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {message}")
    } else {
        "worker panicked".to_string()
    }
}

fn sample_partition<T>(
    rows: &[Row<T>],
    with_replacement: bool,
    fraction: f64,
    rng: &mut StdRng,
) -> Vec<Row<T>> {
    if with_replacement {
        let poisson = match Poisson::new(fraction) {
            Ok(poisson) => poisson,
            // Only a zero rate is rejected here, which draws nothing.
            Err(_) => return Vec::new(),
        };
        rows.iter()
            .flat_map(|row| {
                let copies = poisson.sample(rng) as usize;
                std::iter::repeat(row.clone()).take(copies)
            })
            .collect()
    } else {
        rows.iter()
            .filter(|_| rng.gen::<f64>() < fraction)
            .cloned()
            .collect()
    }
}

impl<T: Clone + Send + Sync> ParallelCollection for Partitioned<T> {
    type Item = T;
    type Mapped<U: Clone + Send + Sync> = Partitioned<U>;

    fn count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    fn sample(&self, with_replacement: bool, fraction: f64, seed: u64) -> Result<Self> {
        let valid = if with_replacement {
            fraction.is_finite() && fraction >= 0.0
        } else {
            (0.0..=1.0).contains(&fraction)
        };
        if !valid {
            return Err(DnnError::InvalidArgument(format!(
                "sample fraction {fraction} (with replacement: {with_replacement})"
            )));
        }

        let partitions: Vec<Vec<Row<T>>> = self.run(|| {
            self.partitions
                .par_iter()
                .enumerate()
                .map(|(index, rows)| {
                    let mut rng = StdRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(SEED_STRIDE));
                    sample_partition(rows, with_replacement, fraction, &mut rng)
                })
                .collect()
        })?;
        Ok(self.derive(partitions))
    }

    fn subtract(&self, other: &Self) -> Result<Self> {
        let drawn: HashSet<u64> = other.partitions.iter().flatten().map(|row| row.id).collect();
        let partitions: Vec<Vec<Row<T>>> = self.run(|| {
            self.partitions
                .par_iter()
                .map(|rows| rows.iter().filter(|row| !drawn.contains(&row.id)).cloned().collect())
                .collect()
        })?;
        Ok(self.derive(partitions))
    }

    /// Rows are already materialised in memory; this shares them.
    fn cache(&self) -> Self {
        self.clone()
    }

    fn try_map<U, F>(&self, f: F) -> Result<Partitioned<U>>
    where
        U: Clone + Send + Sync,
        F: Fn(&T) -> Result<U> + Send + Sync,
    {
        let partitions: Vec<Vec<Row<U>>> = self.run(|| {
            self.partitions
                .par_iter()
                .map(|rows| {
                    rows.iter()
                        .map(|row| Ok(Row { id: row.id, value: Arc::new(f(row.value.as_ref())?) }))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()
        })??;
        Ok(self.derive(partitions))
    }

    fn reduce<F>(&self, f: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        self.run(|| {
            self.partitions
                .par_iter()
                .filter_map(|rows| {
                    rows.iter()
                        .map(|row| T::clone(&row.value))
                        .reduce(|a, b| f(a, b))
                })
                .reduce_with(|a, b| f(a, b))
        })
    }

    fn collect(&self) -> Vec<T> {
        self.partitions
            .iter()
            .flatten()
            .map(|row| T::clone(&row.value))
            .collect()
    }
}

/// Labelled examples on the in-process backend.
pub type LabelledData = Partitioned<crate::data::point::LabelledDataPoint>;

/// Feature vectors awaiting prediction on the in-process backend.
pub type UnlabelledData = Partitioned<Vec<f64>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize, partitions: usize) -> Partitioned<u64> {
        Partitioned::new((0..n as u64).collect(), partitions).unwrap()
    }

    fn sorted(mut v: Vec<u64>) -> Vec<u64> {
        v.sort_unstable();
        v
    }

    #[test]
    fn splits_into_partitions_and_collects_in_order() {
        let data = numbers(10, 3);
        assert_eq!(data.num_partitions(), 3);
        assert_eq!(data.count(), 10);
        assert_eq!(data.collect(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn partition_count_does_not_size_the_pool() {
        let wide = numbers(4000, 4000);
        let narrow = numbers(10, 2);
        assert_eq!(wide.num_partitions(), 4000);
        assert_eq!(wide.count(), 4000);
        assert!(Arc::ptr_eq(&wide.pool, &narrow.pool));
        assert_eq!(wide.map(|x| x + 1).unwrap().reduce(|a, b| a + b).unwrap(), Some((1..=4000).sum()));
    }

    #[test]
    fn more_partitions_than_rows() {
        let data = numbers(2, 4);
        assert_eq!(data.count(), 2);
        assert_eq!(data.collect(), vec![0, 1]);
    }

    #[test]
    fn map_and_reduce() {
        let data = numbers(100, 4);
        let squares = data.map(|x| x * x).unwrap();
        assert_eq!(squares.reduce(|a, b| a + b).unwrap(), Some((0..100u64).map(|x| x * x).sum()));
        assert_eq!(numbers(0, 2).reduce(|a, b| a + b).unwrap(), None);
    }

    #[test]
    fn try_map_propagates_the_error() {
        let data = numbers(20, 4);
        let result = data.try_map(|&x| {
            if x == 13 {
                Err(DnnError::EmptyDataset)
            } else {
                Ok(x)
            }
        });
        assert_eq!(result.err(), Some(DnnError::EmptyDataset));
    }

    #[test]
    fn worker_panic_becomes_execution_failure() {
        let data = numbers(8, 2);
        let result = data.map(|&x| if x == 5 { panic!("boom") } else { x });
        match result {
            Err(DnnError::DistributedExecutionFailure(message)) => assert!(message.contains("boom")),
            other => panic!("unexpected result: {:?}", other.map(|c| c.collect())),
        }
    }

    #[test]
    fn sampling_without_replacement_is_a_subset_and_reproducible() {
        let data = numbers(1000, 4);
        let a = data.sample(false, 0.3, 17).unwrap();
        let b = data.sample(false, 0.3, 17).unwrap();
        assert_eq!(a.collect(), b.collect());

        let drawn = a.collect();
        let unique: HashSet<u64> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), drawn.len());
        assert!(drawn.len() > 200 && drawn.len() < 400);
    }

    #[test]
    fn full_fraction_keeps_everything() {
        let data = numbers(50, 3);
        assert_eq!(data.sample(false, 1.0, 3).unwrap().collect(), data.collect());
        assert_eq!(data.sample(false, 0.0, 3).unwrap().count(), 0);
    }

    #[test]
    fn sampling_with_replacement_may_repeat_rows() {
        let data = numbers(500, 2);
        let drawn = data.sample(true, 2.0, 5).unwrap();
        assert!(drawn.count() > 800);
        assert!(data.sample(true, 0.0, 5).unwrap().count() == 0);
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        let data = numbers(5, 1);
        assert!(matches!(data.sample(false, 1.5, 0), Err(DnnError::InvalidArgument(_))));
        assert!(matches!(data.sample(true, -0.1, 0), Err(DnnError::InvalidArgument(_))));
        assert!(matches!(data.sample(false, f64::NAN, 0), Err(DnnError::InvalidArgument(_))));
    }

    #[test]
    fn subtract_removes_drawn_rows_even_with_duplicate_values() {
        let data = Partitioned::new(vec![7u64; 6], 2).unwrap();
        let drawn = data.sample(false, 0.5, 11).unwrap();
        let rest = data.subtract(&drawn).unwrap();
        assert_eq!(drawn.count() + rest.count(), 6);
    }

    #[test]
    fn subtract_partitions_the_source() {
        let data = numbers(200, 4);
        let drawn = data.sample(false, 0.4, 1).unwrap();
        let rest = data.subtract(&drawn).unwrap();
        let mut all = drawn.collect();
        all.extend(rest.collect());
        assert_eq!(sorted(all), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn mapped_rows_keep_their_identity() {
        let data = numbers(30, 3);
        let drawn = data.sample(false, 0.5, 9).unwrap();
        let doubled = data.map(|x| x * 2).unwrap();
        let drawn_doubled = drawn.map(|x| x * 2).unwrap();
        let rest = doubled.subtract(&drawn_doubled).unwrap();
        assert_eq!(rest.count(), 30 - drawn.count());
    }
}
