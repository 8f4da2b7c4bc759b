use crate::core::ChartBit;
use crate::error::{ChartError, ChartResult};
use crate::extensions::ChartPlugin;
use crate::render::Canvas;

use super::Chart;

impl<C: Canvas> Chart<C> {
    /// Registers a plugin with unique identifier and binds its overlay group.
    pub fn add_plugin(&mut self, plugin: Box<dyn ChartPlugin>) -> ChartResult<()> {
        let plugin_id = plugin.id().to_owned();
        if plugin_id.is_empty() {
            return Err(ChartError::InvalidData(
                "plugin id must not be empty".to_owned(),
            ));
        }
        if self.has_plugin(&plugin_id) {
            return Err(ChartError::InvalidData(format!(
                "plugin with id `{plugin_id}` is already registered"
            )));
        }
        plugin
            .bit_state()
            .add_change_listener(self.state_as_listener());
        self.overlay_layer
            .push((plugin_id, plugin.overlay().clone()));
        self.plugins.push(plugin);
        self.state.set_dirty(ChartBit::ChartPlugins.bit());
        Ok(())
    }

    /// Unregisters a plugin by id and unbinds its overlay group. Returns the
    /// plugin when removed.
    pub fn remove_plugin(&mut self, plugin_id: &str) -> ChartResult<Option<Box<dyn ChartPlugin>>> {
        let Some(position) = self
            .plugins
            .iter()
            .position(|entry| entry.id() == plugin_id)
        else {
            return Ok(None);
        };
        let plugin = self.plugins.remove(position);
        self.overlay_layer.retain(|(owner, _)| owner != plugin_id);
        plugin
            .bit_state()
            .remove_change_listener(&self.state_as_listener())?;
        self.state.set_dirty(ChartBit::ChartPlugins.bit());
        Ok(Some(plugin))
    }

    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin.id() == plugin_id)
    }
}
