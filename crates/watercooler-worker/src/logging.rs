//! `tracing` output for environments that only offer a line-oriented console.
//!
//! [`LineLayer`] renders each event as `LEVEL target: message key=value ..` and
//! hands the line to a writer closure. The Worker installs it with a closure
//! around `console_log!`; tests install it with a closure that collects lines.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::EnvFilter;

/// Filter used when the configured directive is missing or does not parse.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Formats events into single lines for `writer`.
pub struct LineLayer<W> {
    writer: W,
}

impl<W> LineLayer<W>
where
    W: Fn(&str) + Send + Sync + 'static,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<S, W> Layer<S> for LineLayer<W>
where
    S: Subscriber,
    W: Fn(&str) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        (self.writer)(&visitor.finish(meta.level(), meta.target()));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self, level: &Level, target: &str) -> String {
        format!("{:>5} {target}: {}{}", level.as_str(), self.message, self.fields)
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

/// Parse a filter directive such as `debug` or `watercooler_worker=debug,info`.
pub fn env_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// A subscriber that filters with `directive` and writes lines to `writer`.
pub fn line_subscriber<W>(
    directive: Option<&str>,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: Fn(&str) + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter(directive))
        .with(LineLayer::new(writer))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing::{debug, info, warn};

    use super::*;

    fn capture<F: FnOnce()>(directive: Option<&str>, f: F) -> Vec<String> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let subscriber = line_subscriber(directive, move |line: &str| {
            sink.lock().unwrap().push(line.to_string())
        });
        tracing::subscriber::with_default(subscriber, f);
        let out = lines.lock().unwrap().clone();
        out
    }

    #[test]
    fn renders_message_and_fields_on_one_line() {
        let lines = capture(None, || {
            warn!(claim_token_id = %"t-1", expected = 2, "Claim lost the race");
        });

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(" WARN "));
        assert!(lines[0].contains("Claim lost the race"));
        assert!(lines[0].contains(" claim_token_id=t-1"));
        assert!(lines[0].contains(" expected=2"));
    }

    #[test]
    fn default_filter_drops_debug() {
        let lines = capture(None, || {
            debug!("noisy");
            info!("kept");
        });

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("kept"));
    }

    #[test]
    fn directive_can_lower_the_level() {
        let lines = capture(Some("debug"), || debug!("now visible"));
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn bad_directive_falls_back_to_info() {
        let lines = capture(Some("watercooler=loud"), || {
            debug!("hidden");
            info!("shown");
        });
        assert_eq!(lines, vec![format!(" INFO {}: shown", module_path!())]);
    }
}
