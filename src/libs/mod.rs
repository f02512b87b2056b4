//! Domain logic with no terminal in sight.
//!
//! - `natural_date`: free text to date-time
//! - `temporal`: the state behind the date field
//! - `debounce`: one pending delayed action at a time
//! - `validation`: rules the date form checks before submitting

pub(crate) mod debounce;
pub(crate) mod natural_date;
pub(crate) mod temporal;
pub(crate) mod validation;
