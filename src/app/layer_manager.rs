use std::ops::{Deref, DerefMut};

use crate::{
    actions::{Action, LayerManageAction, Layers},
    page::{Layer, date_form::DateForm, help_popup::HelpPopup, home::Home},
    tui::Event,
    utils::help_msg::HelpMsg,
};
use color_eyre::{Result, eyre::eyre};
use ratatui::Frame;
use tracing::{info, warn};

use super::RootState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventHandlingStatus {
    Consumed,
    ShouldPropagate,
}

pub(super) struct BoxedLayer(Box<dyn Layer>);
impl Deref for BoxedLayer {
    type Target = dyn Layer;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
impl DerefMut for BoxedLayer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}
impl From<Box<dyn Layer>> for BoxedLayer {
    fn from(layer: Box<dyn Layer>) -> Self {
        Self(layer)
    }
}
impl BoxedLayer {
    fn into_layer_config(self, render: bool) -> LayerConfig {
        LayerConfig {
            layer: self,
            render,
        }
    }
}

pub(super) struct LayerConfig {
    layer: BoxedLayer,
    render: bool,
}

impl Deref for LayerConfig {
    type Target = BoxedLayer;

    fn deref(&self) -> &Self::Target {
        &self.layer
    }
}
impl DerefMut for LayerConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.layer
    }
}

pub(super) struct LayerManager {
    layers: Vec<LayerConfig>,
}

impl Deref for LayerManager {
    type Target = Vec<LayerConfig>;

    fn deref(&self) -> &Self::Target {
        &self.layers
    }
}
impl DerefMut for LayerManager {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.layers
    }
}

impl LayerManager {
    pub(super) fn new(layer: Box<dyn Layer>) -> Self {
        Self {
            layers: vec![LayerConfig {
                layer: BoxedLayer(layer),
                render: true,
            }],
        }
    }

    pub(super) fn render(&mut self, f: &mut Frame) {
        self.layers
            .iter_mut()
            .filter(|page| page.render)
            .for_each(|page| page.render(f, f.area()));
    }

    /// Only the top layer sees terminal events.
    pub(super) fn handle_event(&self, event: &Event) -> Result<EventHandlingStatus> {
        let last_page = self.layers.last().ok_or(eyre!("No page in stack"))?;
        last_page.handle_events(event)
    }

    pub(super) fn top_help_msg(&self) -> HelpMsg {
        self.layers
            .last()
            .map(|page| page.get_help_msg())
            .unwrap_or_default()
    }

    /// Handle LayerManageAction for root app, updating the layer stack
    pub(super) fn handle_layer_action(
        &mut self,
        action: &LayerManageAction,
        state: &RootState,
    ) -> Result<()> {
        match action {
            LayerManageAction::Swap(target) => {
                let Some(layer) = LayerManager::get_layer(target, state) else {
                    return Ok(());
                };
                self.layers.pop();
                self.layers.push(layer.into_layer_config(true));
                info!(
                    "Swapping page to {}, current layer stack length {}",
                    target,
                    self.layers.len()
                );
            }
            LayerManageAction::Push(target) => {
                let Some(layer) = LayerManager::get_layer(&target.layer, state) else {
                    return Ok(());
                };
                if let Some(current) = self.layers.last_mut() {
                    current.render = target.render_self;
                }
                self.layers.push(layer.into_layer_config(true));
                info!(
                    "Pushing a {} page, current page will {} render, new layer stack length {}",
                    target.layer,
                    if target.render_self { "still" } else { "not" },
                    self.layers.len()
                );
            }
            LayerManageAction::Pop => {
                self.layers.pop();
                if self.layers.is_empty() {
                    let home = LayerManager::get_layer(&Layers::Home, state)
                        .ok_or(eyre!("Failed to build the home page"))?;
                    self.layers.push(home.into_layer_config(true));
                }
                if let Some(current) = self.layers.last_mut() {
                    current.render = true;
                }
                info!(
                    "Popping page, current layer stack length {}",
                    self.layers.len()
                );
            }
        }
        Ok(())
    }

    /// Every layer sees every action, so a form covered by the help popup
    /// still receives its own debounced resolutions.
    pub(super) fn handle_action(&mut self, action: &Action) -> Result<()> {
        for layer in self.layers.iter_mut() {
            layer.update(action)?;
        }
        Ok(())
    }

    /// Get a new layer based on the given layer type
    fn get_layer(layer: &Layers, state: &RootState) -> Option<BoxedLayer> {
        let mut page = match layer {
            Layers::Home => Box::new(Home::new(state.action_tx.clone().into())) as Box<dyn Layer>,
            Layers::DateForm(variant) => Box::new(DateForm::new(
                *variant,
                &state.config.field,
                state.action_tx.clone().into(),
            )),
            Layers::Help(help_msg) => {
                let help = HelpPopup::new(state.action_tx.clone().into(), help_msg.clone());
                match help {
                    Some(help) => Box::new(help) as Box<dyn Layer>,
                    None => {
                        warn!("Help message is empty");
                        return None;
                    }
                }
            }
        };
        page.init();
        Some(page.into())
    }
}
