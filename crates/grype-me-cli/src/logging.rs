//! Console logging in the format the Actions runner understands.
//!
//! Everything goes to stdout without timestamps. Warnings and errors carry
//! a `Warning:` / `Error:` prefix so they stand out in the job log.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub struct ActionLogFormat;

impl<S, N> FormatEvent<S, N> for ActionLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let prefix = match *event.metadata().level() {
            Level::ERROR => "Error: ",
            Level::WARN => "Warning: ",
            Level::DEBUG | Level::TRACE => "Debug: ",
            _ => "",
        };

        writer.write_str(prefix)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(debug: bool) {
    let default_filter = if debug {
        "info,grype_me_core=debug,grype_me_cli=debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stdout)
        .event_format(ActionLogFormat)
        .init();
}
