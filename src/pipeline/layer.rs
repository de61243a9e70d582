//! Route `tracing` events into an [`AppendPipeline`](super::AppendPipeline).

use super::writer::PipelineHandle;
use crate::level::Level;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Events from the pipeline itself are never fed back into it
const PIPELINE_TARGET: &str = super::TARGET_PREFIX;

/// A tracing layer that writes every event as a pipeline record.
///
/// The event target becomes the tag, the `message` field the message and
/// any other fields are appended as `name=value`.
#[derive(Clone)]
pub struct PipelineLayer {
    pipeline: PipelineHandle,
}

impl PipelineLayer {
    pub fn new(pipeline: PipelineHandle) -> Self {
        Self { pipeline }
    }
}

fn level_of(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::INFO => Level::Info,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::TRACE => Level::Verbose,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S> Layer<S> for PipelineLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target().starts_with(PIPELINE_TARGET) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            visitor.message = metadata.name().to_string();
        }
        visitor.message.push_str(&visitor.fields);

        self.pipeline
            .log(level_of(metadata.level()), metadata.target(), &visitor.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::parse_header;
    use crate::pipeline::{AppendPipeline, PipelineOptions};
    use std::fs;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    fn pipeline(dir: &TempDir) -> AppendPipeline {
        let mut options = PipelineOptions::new(dir.path());
        options.file_name = Some("trace.log".into());
        options.process_name = Some("tracer".into());
        AppendPipeline::new(options).unwrap()
    }

    #[test]
    fn test_events_become_records() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        let subscriber = tracing_subscriber::registry().with(PipelineLayer::new(pipeline.handle()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "app::net", attempt = 2, "connection lost");
            tracing::error!(target: "app", "fatal");
        });
        pipeline.stop();

        let text = fs::read_to_string(pipeline.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first = parse_header(lines[0]).unwrap();
        assert_eq!(first.level, Level::Warn);
        assert_eq!(first.tag, "app.net");
        assert!(lines[0].ends_with("connection lost attempt=2"));

        assert_eq!(parse_header(lines[1]).unwrap().level, Level::Error);
    }

    #[test]
    fn test_pipeline_events_are_not_recorded() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(&dir);
        let subscriber = tracing_subscriber::registry().with(PipelineLayer::new(pipeline.handle()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "logkit::pipeline::writer", "failed to flush log records");
            tracing::trace!(target: "app", "kept");
        });
        pipeline.stop();

        let text = fs::read_to_string(pipeline.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("V/app: kept"));
    }
}
