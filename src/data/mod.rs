pub mod collection;
pub mod partitioned;
pub mod point;

pub use collection::ParallelCollection;
pub use partitioned::{LabelledData, Partitioned, UnlabelledData};
pub use point::LabelledDataPoint;
