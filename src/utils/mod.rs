//! Helpers shared by every layer.
//!
//! ```text
//! utils/
//! ├── errors.rs     - color-eyre hooks and the panic hook
//! ├── help_msg.rs   - key hints shown at the bottom and in the help popup
//! ├── key_events.rs - key event wrapper and its display form
//! └── logging.rs    - tracing subscriber writing to the data directory
//! ```

#[cfg(not(tarpaulin_include))]
pub(crate) mod errors;
pub(crate) mod help_msg;
pub(crate) mod key_events;
#[cfg(not(tarpaulin_include))]
pub(crate) mod logging;
