use crate::error::Result;

/// A partitioned collection processed with map/reduce style operations.
///
/// Implementations decide where partitions live and how they are scheduled;
/// training only relies on the operations below. Mapping functions must be
/// pure: they may run concurrently, in any order, on any worker.
pub trait ParallelCollection: Sized + Sync {
    type Item: Clone + Send + Sync;
    type Mapped<U: Clone + Send + Sync>: ParallelCollection<Item = U>;

    fn count(&self) -> usize;

    /// Draws a random subset. Without replacement every row is kept
    /// independently with probability `fraction` (which must lie in [0, 1]);
    /// with replacement each row appears a Poisson(`fraction`) number of times.
    /// Equal seeds give equal samples.
    fn sample(&self, with_replacement: bool, fraction: f64, seed: u64) -> Result<Self>;

    /// Rows of `self` that were not drawn into `other`.
    fn subtract(&self, other: &Self) -> Result<Self>;

    /// Materialises the collection so repeated passes do not recompute it.
    fn cache(&self) -> Self;

    /// Applies `f` to every row; the first error aborts the whole operation.
    fn try_map<U, F>(&self, f: F) -> Result<Self::Mapped<U>>
    where
        U: Clone + Send + Sync,
        F: Fn(&Self::Item) -> Result<U> + Send + Sync;

    fn map<U, F>(&self, f: F) -> Result<Self::Mapped<U>>
    where
        U: Clone + Send + Sync,
        F: Fn(&Self::Item) -> U + Send + Sync,
    {
        self.try_map(|item| Ok(f(item)))
    }

    /// Folds all rows with `f`, which must be associative and commutative.
    /// `None` for an empty collection.
    fn reduce<F>(&self, f: F) -> Result<Option<Self::Item>>
    where
        F: Fn(Self::Item, Self::Item) -> Self::Item + Send + Sync;

    /// Every row, in partition order.
    fn collect(&self) -> Vec<Self::Item>;
}
