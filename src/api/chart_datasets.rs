use std::sync::Arc;

use tracing::trace;

use crate::core::{ChartBit, SyncStateListener};
use crate::dataset::{DataSet, dataset_key};
use crate::error::{ChartError, ChartResult};
use crate::extensions::ChartRenderer;
use crate::render::Canvas;

use super::Chart;
use super::chart::DataSetSubscription;

impl<C: Canvas> Chart<C> {
    /// Attaches a dataset drawn by the first renderer.
    pub fn add_dataset(&mut self, dataset: Arc<dyn DataSet>) -> ChartResult<()> {
        let key = dataset_key(&dataset);
        if self.datasets.iter().any(|entry| dataset_key(entry) == key) {
            return Err(ChartError::InvalidData(format!(
                "dataset `{}` is already attached to the chart",
                dataset.name()
            )));
        }
        self.subscribe_dataset(&dataset);
        self.datasets.push(dataset);
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
        Ok(())
    }

    /// Returns `true` when the dataset was attached.
    pub fn remove_dataset(&mut self, dataset: &Arc<dyn DataSet>) -> ChartResult<bool> {
        let key = dataset_key(dataset);
        let Some(position) = self
            .datasets
            .iter()
            .position(|entry| dataset_key(entry) == key)
        else {
            return Ok(false);
        };
        self.datasets.remove(position);
        self.unsubscribe_dataset(dataset)?;
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
        Ok(true)
    }

    #[must_use]
    pub fn datasets(&self) -> &[Arc<dyn DataSet>] {
        &self.datasets
    }

    /// Every distinct dataset, attached directly or through a renderer.
    #[must_use]
    pub fn all_datasets(&self) -> Vec<Arc<dyn DataSet>> {
        self.dataset_subscriptions
            .values()
            .map(|subscription| Arc::clone(&subscription.dataset))
            .collect()
    }

    /// Registers a renderer with a unique id, subscribing its datasets.
    pub fn add_renderer(&mut self, renderer: Box<dyn ChartRenderer>) -> ChartResult<()> {
        let renderer_id = renderer.id().to_owned();
        if renderer_id.is_empty() {
            return Err(ChartError::InvalidData(
                "renderer id must not be empty".to_owned(),
            ));
        }
        if self.has_renderer(&renderer_id) {
            return Err(ChartError::InvalidData(format!(
                "renderer with id `{renderer_id}` is already registered"
            )));
        }
        for dataset in renderer.datasets() {
            self.subscribe_dataset(dataset);
        }
        renderer
            .bit_state()
            .add_change_listener(self.state_as_listener());
        self.renderers.push(renderer);
        self.state.set_dirty(ChartBit::ChartRenderers.bit());
        Ok(())
    }

    /// Unregisters a renderer by id. Returns the renderer when removed.
    pub fn remove_renderer(
        &mut self,
        renderer_id: &str,
    ) -> ChartResult<Option<Box<dyn ChartRenderer>>> {
        let Some(position) = self.renderer_position(renderer_id) else {
            return Ok(None);
        };
        let renderer = self.renderers.remove(position);
        for dataset in renderer.datasets() {
            self.unsubscribe_dataset(dataset)?;
        }
        renderer
            .bit_state()
            .remove_change_listener(&self.state_as_listener())?;
        self.state.set_dirty(ChartBit::ChartRenderers.bit());
        Ok(Some(renderer))
    }

    /// Attaches a dataset to a registered renderer.
    pub fn add_renderer_dataset(
        &mut self,
        renderer_id: &str,
        dataset: Arc<dyn DataSet>,
    ) -> ChartResult<()> {
        let position = self
            .renderer_position(renderer_id)
            .ok_or_else(|| ChartError::UnknownRenderer(renderer_id.to_owned()))?;
        self.subscribe_dataset(&dataset);
        self.renderers[position].add_dataset(dataset);
        Ok(())
    }

    /// Detaches a dataset from a registered renderer. Returns `true` when the
    /// renderer had it.
    pub fn remove_renderer_dataset(
        &mut self,
        renderer_id: &str,
        dataset: &Arc<dyn DataSet>,
    ) -> ChartResult<bool> {
        let position = self
            .renderer_position(renderer_id)
            .ok_or_else(|| ChartError::UnknownRenderer(renderer_id.to_owned()))?;
        if !self.renderers[position].remove_dataset(dataset) {
            return Ok(false);
        }
        self.unsubscribe_dataset(dataset)?;
        Ok(true)
    }

    #[must_use]
    pub fn renderer(&self, renderer_id: &str) -> Option<&dyn ChartRenderer> {
        self.renderers
            .iter()
            .find(|renderer| renderer.id() == renderer_id)
            .map(|renderer| renderer.as_ref())
    }

    #[must_use]
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    #[must_use]
    pub fn has_renderer(&self, renderer_id: &str) -> bool {
        self.renderer_position(renderer_id).is_some()
    }

    fn renderer_position(&self, renderer_id: &str) -> Option<usize> {
        self.renderers
            .iter()
            .position(|renderer| renderer.id() == renderer_id)
    }

    /// The aggregator listens to each dataset once, however many times it is
    /// attached.
    fn subscribe_dataset(&mut self, dataset: &Arc<dyn DataSet>) {
        let subscription = self
            .dataset_subscriptions
            .entry(dataset_key(dataset))
            .or_insert_with(|| DataSetSubscription {
                dataset: Arc::clone(dataset),
                refs: 0,
            });
        subscription.refs += 1;
        if subscription.refs == 1 {
            dataset
                .bit_state()
                .add_change_listener(self.aggregator_as_listener());
            trace!(dataset = %dataset.name(), "subscribed dataset aggregator");
        }
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
    }

    fn unsubscribe_dataset(&mut self, dataset: &Arc<dyn DataSet>) -> ChartResult<()> {
        let key = dataset_key(dataset);
        let Some(subscription) = self.dataset_subscriptions.get_mut(&key) else {
            return Ok(());
        };
        subscription.refs -= 1;
        if subscription.refs == 0 {
            self.dataset_subscriptions.shift_remove(&key);
            dataset
                .bit_state()
                .remove_change_listener(&self.aggregator_as_listener())?;
            trace!(dataset = %dataset.name(), "unsubscribed dataset aggregator");
        }
        self.state.set_dirty(ChartBit::ChartDataSets.bit());
        Ok(())
    }

    fn aggregator_as_listener(&self) -> Arc<dyn SyncStateListener> {
        self.dataset_state.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::api::Chart;
    use crate::dataset::{DataSet, DefaultDataSet};
    use crate::error::ChartError;
    use crate::extensions::LineRenderer;

    fn dataset(name: &str) -> Arc<dyn DataSet> {
        Arc::new(DefaultDataSet::new(name))
    }

    #[test]
    fn shared_dataset_is_subscribed_once() {
        let mut chart = Chart::headless().expect("chart");
        let shared = dataset("shared");
        chart.add_dataset(Arc::clone(&shared)).expect("add");
        chart.add_renderer(Box::new(LineRenderer::new("line"))).expect("renderer");
        chart
            .add_renderer_dataset("line", Arc::clone(&shared))
            .expect("renderer dataset");

        assert_eq!(shared.bit_state().change_listener_count(), 1);
        assert_eq!(chart.all_datasets().len(), 1);

        assert!(chart.remove_dataset(&shared).expect("remove"));
        assert_eq!(shared.bit_state().change_listener_count(), 1);
        assert!(chart.remove_renderer("line").expect("remove").is_some());
        assert_eq!(shared.bit_state().change_listener_count(), 0);
        assert!(chart.all_datasets().is_empty());
    }

    #[test]
    fn duplicate_registrations_are_rejected() {
        let mut chart = Chart::headless().expect("chart");
        let a = dataset("a");
        chart.add_dataset(Arc::clone(&a)).expect("add");
        assert!(chart.add_dataset(a).is_err());

        chart.add_renderer(Box::new(LineRenderer::new("line"))).expect("renderer");
        assert!(chart.add_renderer(Box::new(LineRenderer::new("line"))).is_err());
        assert!(chart.add_renderer(Box::new(LineRenderer::new(""))).is_err());
        assert_eq!(chart.renderer_count(), 1);
    }

    #[test]
    fn renderer_datasets_cascade_on_add_and_remove() {
        let mut chart = Chart::headless().expect("chart");
        let mut renderer = LineRenderer::new("line");
        let own = dataset("own");
        crate::extensions::ChartRenderer::add_dataset(&mut renderer, Arc::clone(&own));
        chart.add_renderer(Box::new(renderer)).expect("renderer");
        assert_eq!(own.bit_state().change_listener_count(), 1);

        assert!(chart.remove_renderer_dataset("line", &own).expect("remove"));
        assert!(!chart.remove_renderer_dataset("line", &own).expect("remove"));
        assert_eq!(own.bit_state().change_listener_count(), 0);
        assert_eq!(chart.renderer("line").map(|r| r.datasets().len()), Some(0));

        let err = chart
            .add_renderer_dataset("missing", own)
            .expect_err("unknown renderer");
        assert!(matches!(err, ChartError::UnknownRenderer(id) if id == "missing"));
    }
}
