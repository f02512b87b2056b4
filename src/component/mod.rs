pub(crate) mod calendar;
pub(crate) mod date_input;
pub(crate) mod input;

use color_eyre::eyre::Result;

use crate::{actions::Action, page::WidgetExt};

pub(crate) trait Component: WidgetExt {
    fn handle_events(&self, event: &crate::tui::Event) -> Result<()>;

    fn update(&mut self, action: &Action) -> Result<()>;
}

/// A fresh component id, distinct from every id in `taken`.
pub(crate) fn new_comp_id(taken: &[u64]) -> u64 {
    loop {
        let id = rand::random::<u64>();
        if !taken.contains(&id) {
            return id;
        }
    }
}
