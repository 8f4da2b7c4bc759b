use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{DataSet, dataset_key};

use super::ChartRenderer;

/// One legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    /// Id of the renderer drawing the dataset, `None` for chart datasets.
    pub renderer: Option<String>,
}

pub trait Legend {
    /// Rebuilds the entries from the chart's datasets and renderers.
    fn update_legend(&mut self, datasets: &[Arc<dyn DataSet>], renderers: &[&dyn ChartRenderer]);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    fn items(&self) -> &[LegendItem];
}

/// One item per distinct dataset, labelled with the dataset name.
#[derive(Debug, Clone)]
pub struct DefaultLegend {
    items: Vec<LegendItem>,
    visible: bool,
}

impl DefaultLegend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            visible: true,
        }
    }
}

impl Default for DefaultLegend {
    fn default() -> Self {
        Self::new()
    }
}

impl Legend for DefaultLegend {
    fn update_legend(&mut self, datasets: &[Arc<dyn DataSet>], renderers: &[&dyn ChartRenderer]) {
        self.items.clear();
        let mut seen = Vec::new();
        let chart_entries = datasets.iter().map(|dataset| (dataset, None));
        let renderer_entries = renderers.iter().flat_map(|renderer| {
            let id = renderer.id();
            renderer
                .datasets()
                .iter()
                .map(move |dataset| (dataset, Some(id)))
        });
        for (dataset, renderer) in chart_entries.chain(renderer_entries) {
            let key = dataset_key(dataset);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            self.items.push(LegendItem {
                label: dataset.name(),
                renderer: renderer.map(str::to_owned),
            });
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn items(&self) -> &[LegendItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DefaultLegend, Legend};
    use crate::dataset::{DataSet, DefaultDataSet};
    use crate::extensions::{ChartRenderer, LineRenderer};

    #[test]
    fn one_item_per_distinct_dataset() {
        let shared: Arc<dyn DataSet> = Arc::new(DefaultDataSet::new("shared"));
        let own: Arc<dyn DataSet> = Arc::new(DefaultDataSet::new("own"));
        let mut renderer = LineRenderer::new("line");
        renderer.add_dataset(Arc::clone(&shared));
        renderer.add_dataset(own);

        let mut legend = DefaultLegend::new();
        legend.update_legend(&[shared], &[&renderer as &dyn ChartRenderer]);

        let labels: Vec<&str> = legend.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["shared", "own"]);
        assert_eq!(legend.items()[0].renderer, None);
        assert_eq!(legend.items()[1].renderer.as_deref(), Some("line"));
        assert!(legend.is_visible());
    }
}
