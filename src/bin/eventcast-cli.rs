//! CLI клиент eventcast
//!
//! Публикует события в брокер или печатает получаемые сообщения как JSON
//! построчно.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use eventcast::{
    message::{Event, Message, Payload},
    AdapterConfig, AdapterState, Publisher, Subscriber,
};
use tracing::debug;

/// Основная структура CLI аргументов
#[derive(Parser)]
#[command(name = "eventcast-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "eventcast CLI - publish and watch events", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Базовый адрес брокера
    #[arg(
        short,
        long,
        default_value = "ws://127.0.0.1:8000",
        env = "EVENTCAST_URL",
        help = "Базовый адрес брокера"
    )]
    url: String,
    /// Таймаут подключения в секундах
    #[arg(long, default_value = "5", help = "Таймаут подключения в секундах")]
    timeout: u64,
    /// Включить подробный вывод (debug)
    #[arg(short, long, help = "Включить подробный вывод для отладки")]
    verbose: bool,
    /// Подавить логирование
    #[arg(short = 'q', long, help = "Подавить логирование")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Подкоманды CLI
#[derive(Subcommand)]
enum Commands {
    /// Опубликовать событие
    #[command(alias = "pub")]
    Publish {
        /// Числовой тип события
        #[arg(short = 't', long = "type", help = "Числовой тип события")]
        kind: Option<i64>,
        /// Атрибуты события (JSON-объект)
        #[arg(short, long, help = "Атрибуты события, JSON-объект")]
        payload: Option<String>,
        /// Метаданные (JSON-объект)
        #[arg(short, long, help = "Метаданные сообщения, JSON-объект")]
        extra: Option<String>,
        /// Сколько раз отправить
        #[arg(short = 'n', long, default_value = "1", help = "Количество повторов")]
        repeat: usize,
        /// Сколько ждать отправки очереди, мс
        #[arg(long, default_value = "2000", help = "Сколько ждать отправки очереди, мс")]
        drain_ms: u64,
    },
    /// Печатать получаемые сообщения
    #[command(alias = "sub")]
    Subscribe {
        /// Остановиться после N сообщений
        #[arg(short = 'n', long, help = "Остановиться после N сообщений")]
        limit: Option<usize>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let connect_timeout = Duration::from_secs(cli.timeout);
    match &cli.command {
        Commands::Publish {
            kind,
            payload,
            extra,
            repeat,
            drain_ms,
        } => {
            let message = build_message(*kind, payload.as_deref(), extra.as_deref())?;
            let config = AdapterConfig::publisher(&cli.url).with_connect_timeout(connect_timeout);
            publish(config, message, *repeat, Duration::from_millis(*drain_ms)).await
        }
        Commands::Subscribe { limit } => {
            let config = AdapterConfig::subscriber(&cli.url).with_connect_timeout(connect_timeout);
            subscribe(config, *limit).await
        }
    }
}

/// Собирает сообщение из аргументов командной строки.
fn build_message(
    kind: Option<i64>,
    payload: Option<&str>,
    extra: Option<&str>,
) -> Result<Message> {
    let payload = payload
        .map(|p| parse_object("--payload", p))
        .transpose()?;
    let extra = extra.map(|e| parse_object("--extra", e)).transpose()?;

    let event = match (kind, payload) {
        (Some(kind), payload) => Some(Event::new(kind, payload.unwrap_or_default())),
        (None, Some(_)) => bail!("--payload requires --type"),
        (None, None) => None,
    };
    Ok(Message::new(event, extra))
}

fn parse_object(
    flag: &str,
    text: &str,
) -> Result<Payload> {
    match serde_json::from_str(text).with_context(|| format!("{flag}: invalid JSON"))? {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!("{flag}: expected a JSON object, got {other}"),
    }
}

async fn publish(
    config: AdapterConfig,
    message: Message,
    repeat: usize,
    drain_timeout: Duration,
) -> Result<()> {
    let publisher = Publisher::new(config);
    for _ in 0..repeat {
        publisher.send(message.clone());
    }

    let task = tokio::spawn({
        let publisher = publisher.clone();
        async move { publisher.run().await }
    });

    let started = Instant::now();
    while publisher.pending() > 0 && !publisher.state().is_terminal() {
        if started.elapsed() > drain_timeout {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Последний снятый из очереди кадр мог ещё не уйти в сокет.
    tokio::time::sleep(publisher.config().poll_interval * 5).await;

    let failed = publisher.state() == AdapterState::Closed;
    let unsent = publisher.pending();
    publisher.stop();
    task.await.context("publisher task failed")?;

    if failed || unsent > 0 {
        bail!("{unsent} of {repeat} message(s) were not sent");
    }
    debug!(repeat, "Published");
    Ok(())
}

async fn subscribe(
    config: AdapterConfig,
    limit: Option<usize>,
) -> Result<()> {
    let subscriber = Subscriber::new(config);
    let task = tokio::spawn({
        let subscriber = subscriber.clone();
        async move { subscriber.run().await }
    });

    let mut received = 0usize;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    'outer: loop {
        while let Some(message) = subscriber.get() {
            println!("{}", message.encode()?);
            received += 1;
            if limit.is_some_and(|n| received >= n) {
                break 'outer;
            }
        }
        if subscriber.state().is_terminal() {
            break;
        }
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(Duration::from_millis(10)) => {}
        }
    }

    subscriber.stop();
    task.await.context("subscriber task failed")?;
    debug!(received, "Subscriber finished");
    Ok(())
}

/// Инициализация логирования: логи идут в stderr, stdout занят данными.
fn init_logging(
    verbose: bool,
    quiet: bool,
) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if quiet {
        "off"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message() {
        let msg = build_message(Some(7), Some(r#"{"button": 1}"#), None).unwrap();
        assert_eq!(msg.kind().map(|k| k.0), Some(7));
        assert!(msg.extra.is_none());

        let empty = build_message(None, None, None).unwrap();
        assert!(empty.is_empty());

        let extra_only = build_message(None, None, Some(r#"{"pos": [1, 2]}"#)).unwrap();
        assert!(extra_only.event.is_none());
        assert!(extra_only.extra.is_some());
    }

    #[test]
    fn test_build_message_errors() {
        assert!(build_message(None, Some("{}"), None).is_err());
        assert!(build_message(Some(1), Some("[1]"), None).is_err());
        assert!(build_message(Some(1), None, Some("not json")).is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "eventcast-cli",
            "--url",
            "ws://h:1",
            "publish",
            "--type",
            "3",
            "-n",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.url, "ws://h:1");
        assert!(matches!(
            cli.command,
            Commands::Publish {
                kind: Some(3),
                repeat: 4,
                ..
            }
        ));
    }
}
