use std::sync::Arc;

use parking_lot::RwLock;

use super::{DIM_X, DIM_Y, DataSet, DataSetLock};
use crate::core::{ChartBit, DATASET_MASK, DataPoint, SyncBitState};

const DATA_BITS: u32 = ChartBit::mask(&[ChartBit::DataSetData, ChartBit::DataSetRange]);

/// XY point list guarded by its [`DataSetLock`].
#[derive(Debug)]
pub struct DefaultDataSet {
    name: RwLock<String>,
    lock: DataSetLock,
    points: RwLock<Vec<DataPoint>>,
    state: Arc<SyncBitState>,
}

impl DefaultDataSet {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_points(name, Vec::new())
    }

    #[must_use]
    pub fn with_points(name: impl Into<String>, points: Vec<DataPoint>) -> Self {
        let name = name.into();
        Self {
            state: Arc::new(SyncBitState::init_clean(
                format!("dataset `{name}`"),
                DATASET_MASK,
            )),
            name: RwLock::new(name),
            lock: DataSetLock::new(),
            points: RwLock::new(points),
        }
    }

    pub fn set_name(&self, name: impl Into<String>) {
        {
            let _write = self.lock.write();
            *self.name.write() = name.into();
        }
        self.state.set_dirty(ChartBit::DataSetName.bit());
    }

    pub fn add(&self, x: f64, y: f64) {
        self.mutate(|points| points.push(DataPoint::new(x, y)));
    }

    pub fn extend(&self, points: impl IntoIterator<Item = DataPoint>) {
        self.mutate(|current| current.extend(points));
    }

    pub fn set_points(&self, points: Vec<DataPoint>) {
        self.mutate(|current| *current = points);
    }

    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Copy of the current points.
    #[must_use]
    pub fn points(&self) -> Vec<DataPoint> {
        self.points.read().clone()
    }

    fn mutate(&self, change: impl FnOnce(&mut Vec<DataPoint>)) {
        {
            let _write = self.lock.write();
            change(&mut self.points.write());
        }
        // Notify after the write side is released so listeners may read.
        self.state.set_dirty(DATA_BITS);
    }
}

impl DataSet for DefaultDataSet {
    fn name(&self) -> String {
        self.name.read().clone()
    }

    fn lock(&self) -> &DataSetLock {
        &self.lock
    }

    fn bit_state(&self) -> &Arc<SyncBitState> {
        &self.state
    }

    fn axis_range(&self, dimension: usize) -> Option<(f64, f64)> {
        let points = self.points.read();
        points
            .iter()
            .map(|point| coordinate(point, dimension))
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            })
    }

    fn point_count(&self) -> usize {
        self.points.read().len()
    }

    fn value(&self, dimension: usize, index: usize) -> f64 {
        self.points
            .read()
            .get(index)
            .map_or(f64::NAN, |point| coordinate(point, dimension))
    }
}

fn coordinate(point: &DataPoint, dimension: usize) -> f64 {
    match dimension {
        DIM_X => point.x,
        DIM_Y => point.y,
        _ => f64::NAN,
    }
}
