//! Datasets shared between producer threads and the render thread.

mod default_dataset;
mod lock;

use std::fmt;
use std::sync::Arc;

use crate::core::SyncBitState;

pub use default_dataset::DefaultDataSet;
pub use lock::{DataSetLock, DataSetReadGuard};

pub const DIM_X: usize = 0;
pub const DIM_Y: usize = 1;

/// Data source drawn by renderers and fitted by axes.
///
/// Implementations may be mutated from any thread. Readers hold
/// [`DataSetLock::read_owned`] while they access values, and every mutation
/// is reported through [`bit_state`](DataSet::bit_state).
pub trait DataSet: Send + Sync + fmt::Debug {
    fn name(&self) -> String;

    fn lock(&self) -> &DataSetLock;

    fn bit_state(&self) -> &Arc<SyncBitState>;

    /// `(min, max)` of the finite values along `dimension`, `None` when there
    /// are none.
    fn axis_range(&self, dimension: usize) -> Option<(f64, f64)>;

    fn point_count(&self) -> usize;

    /// Value at `index` along `dimension`; NaN when out of bounds.
    fn value(&self, dimension: usize, index: usize) -> f64;
}

/// Identity of a shared dataset, stable for the lifetime of the `Arc`.
pub(crate) fn dataset_key(dataset: &Arc<dyn DataSet>) -> usize {
    Arc::as_ptr(dataset).cast::<()>() as usize
}
