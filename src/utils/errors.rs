//! Error reporting and the panic hook.
//!
//! `color-eyre` renders every `Result` that bubbles out of `main`. On panic
//! the terminal is restored first, then debug builds print a `better-panic`
//! backtrace and release builds write a `human-panic` report. Either way the
//! report also lands in the log file.

use std::panic::PanicHookInfo;

use color_eyre::{Result, config::PanicHook};
use tracing::error;

pub fn init() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(move |info| {
        on_panic(&panic_hook, info);
        std::process::exit(libc::EXIT_FAILURE);
    }));
    Ok(())
}

fn on_panic(panic_hook: &PanicHook, info: &PanicHookInfo<'_>) {
    if let Err(err) = crate::tui::restore() {
        error!("Unable to restore the terminal: {err:?}");
    }

    let report = panic_hook.panic_report(info).to_string();
    error!("{}", strip_ansi_escapes::strip_str(&report));

    #[cfg(not(debug_assertions))]
    {
        use human_panic::{handle_dump, metadata, print_msg};
        let metadata = metadata!();
        let file_path = handle_dump(&metadata, info);
        if print_msg(file_path, &metadata).is_err() {
            eprintln!(
                "{} crashed, and the crash report could not be printed",
                env!("CARGO_PKG_NAME")
            );
        }
        eprintln!("{report}");
    }

    #[cfg(debug_assertions)]
    better_panic::Settings::auto()
        .most_recent_first(false)
        .lineno_suffix(true)
        .verbosity(better_panic::Verbosity::Full)
        .create_panic_handler()(info);
}

/// `dbg!` for the log file: emits the expression and its value as a
/// `tracing` event, `DEBUG` unless a level is given, and returns the value.
#[macro_export]
macro_rules! trace_dbg {
    (target: $target:expr, level: $level:expr, $ex:expr) => {{
        let value = $ex;
        tracing::event!(target: $target, $level, ?value, stringify!($ex));
        value
    }};
    (level: $level:expr, $ex:expr) => {
        $crate::trace_dbg!(target: module_path!(), level: $level, $ex)
    };
    ($ex:expr) => {
        $crate::trace_dbg!(level: tracing::Level::DEBUG, $ex)
    };
}
