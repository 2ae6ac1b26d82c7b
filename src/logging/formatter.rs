use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Boxed fmt-слой: конкретный тип формата (json/pretty/compact) стирается.
pub type BoxedLayer<S> = Box<dyn LayerTrait<S> + Send + Sync>;

/// Собирает fmt-слой по конфигурации поверх произвольного writer.
pub fn build_formatter_from_config<S, W>(
    config: &LoggingConfig,
    format: LogFormat,
    with_ansi: bool,
    writer: W,
) -> BoxedLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(with_ansi)
        .with_target(config.with_target)
        .with_thread_names(config.with_thread_ids)
        .with_thread_ids(config.with_thread_ids);

    match format {
        LogFormat::Json => Box::new(base.json().with_current_span(true)),
        LogFormat::Pretty => Box::new(base.pretty().with_span_events(FmtSpan::CLOSE)),
        LogFormat::Compact => Box::new(base.compact()),
    }
}
