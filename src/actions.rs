use color_eyre::eyre::{Context, Result, eyre};

use crate::{
    component::{calendar::CalendarAction, date_input::DateInputAction, input::InputAction},
    page::{
        date_form::{DateFormAction, FormVariant},
        help_popup::HelpPopupAction,
        home::HomeAction,
    },
    utils::help_msg::HelpMsg,
};

#[derive(Clone, Debug)]
pub enum Action {
    Tick,
    Render,
    Quit,
    SwitchInputMode(bool),
    Layer(LayerManageAction),

    Home(HomeAction),
    DateForm(DateFormAction),
    HelpPopup(HelpPopupAction),

    Comp((CompAction, u64)),
}

#[derive(Clone, Debug, strum::Display)]
pub enum Layers {
    Home,
    DateForm(FormVariant),
    Help(HelpMsg),
}

#[derive(Clone, Debug)]
pub struct TargetLayer {
    pub layer: Layers,
    /// Whether the layer underneath keeps rendering
    pub render_self: bool,
}

#[derive(Clone, Debug)]
pub enum LayerManageAction {
    Swap(Layers),
    Push(TargetLayer),
    Pop,
}

impl From<LayerManageAction> for Action {
    fn from(value: LayerManageAction) -> Self {
        Action::Layer(value)
    }
}

#[derive(Clone, Debug)]
pub enum CompAction {
    Input(InputAction),
    DateInput(DateInputAction),
    Calendar(CalendarAction),
}

#[derive(Clone, Debug)]
pub struct ActionSender(pub tokio::sync::mpsc::UnboundedSender<Action>);

impl ActionSender {
    pub fn send<T: Into<Action>>(&self, action: T) {
        self.0.send(action.into()).with_context(||"Action Receiver is dropped or closed, which should not happen if app is still running.").unwrap();
    }

    /// Like [`ActionSender::send`], for background tasks that may outlive the app.
    pub fn try_send<T: Into<Action>>(&self, action: T) -> Result<()> {
        self.0
            .send(action.into())
            .map_err(|_| eyre!("Action Receiver is dropped or closed"))
    }
}
impl From<tokio::sync::mpsc::UnboundedSender<Action>> for ActionSender {
    fn from(value: tokio::sync::mpsc::UnboundedSender<Action>) -> Self {
        ActionSender(value)
    }
}
