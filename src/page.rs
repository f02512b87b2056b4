//! Page module handles different UI pages and their behaviors.
//!
//! This module provides traits and implementations for managing different pages
//! in the TUI application, including their rendering, event handling, and state management.

use crate::actions::Action;
use crate::app::layer_manager::EventHandlingStatus;
use crate::tui::Event;
use crate::utils::help_msg::HelpMsg;
use color_eyre::eyre::Result;
use downcast_rs::{DowncastSync, impl_downcast};
use ratatui::Frame;
use ratatui::layout::Rect;

pub(crate) mod date_form;
pub(crate) mod help_popup;
pub(crate) mod home;

/// A trait that represents a UI layer/page in the application.
///
/// Implements core functionality for pages including initialization,
/// rendering, and event handling. Pages must be both Send and Sync safe.
///
/// # Type Requirements
/// - Must implement [`WidgetExt`]
/// - Must implement [`EventLoopParticipant`]
/// - Must implement [`DowncastSync`]
pub(crate) trait Layer: WidgetExt + EventLoopParticipant + DowncastSync {
    /// Initialize the page
    fn init(&mut self) {}

    /// Key hints of the page in its current state
    fn get_help_msg(&self) -> HelpMsg {
        HelpMsg::default()
    }
}
impl_downcast!(sync Layer);

/// Extension trait for widgets that can be rendered to the screen.
///
/// Provides the interface for rendering UI components to a specific area
/// of the terminal frame.
pub(crate) trait WidgetExt {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Trait for components that participate in the event loop.
///
/// Provides methods for handling events and updating state based on actions.
/// Also includes test utilities for simulating event loop iterations.
///
/// # Test Features
/// When compiled with test configuration, provides additional methods:
/// - `event_loop_once`: Processes a single event and subsequent actions
/// - `event_loop_once_with_action`: Processes a single action and subsequent actions
pub(crate) trait EventLoopParticipant {
    /// Handle an event. Keys the page has no use for are reported as
    /// [`EventHandlingStatus::ShouldPropagate`] so the app can act on them.
    fn handle_events(&self, event: &Event) -> Result<EventHandlingStatus>;

    /// Update the state with an action
    fn update(&mut self, action: &Action) -> Result<()>;

    #[cfg(test)]
    /// Handle the event and check the returned status as [`EventHandlingStatus::Consumed`].
    fn handle_event_with_status_check(&mut self, event: &Event) {
        let status = self.handle_events(event).unwrap();
        assert!(matches!(status, EventHandlingStatus::Consumed));
    }

    #[cfg(test)]
    /// Handle one event, then every action it caused
    fn event_loop_once(
        &mut self,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<Action>,
        event: Event,
    ) {
        let _ = self.handle_events(&event).unwrap();
        self.drain_actions(rx);
    }

    #[cfg(test)]
    /// Apply one action, then every action it caused
    fn event_loop_once_with_action(
        &mut self,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<Action>,
        action: Action,
    ) {
        self.update(&action).unwrap();
        self.drain_actions(rx);
    }

    #[cfg(test)]
    fn drain_actions(&mut self, rx: &mut tokio::sync::mpsc::UnboundedReceiver<Action>) {
        while let Ok(action) = rx.try_recv() {
            self.update(&action).unwrap();
        }
    }
}
