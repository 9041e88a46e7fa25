use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const DEFAULT_LOG_FILTER: &str = "flashfix=info,tower_http=warn";
pub const LOG_FEED_CAPACITY: usize = 500;

/// Tees formatted log lines to stdout and to the `/api/logs` feed.
#[derive(Clone)]
pub(crate) struct LogFeedMakeWriter {
    pub sender: broadcast::Sender<String>,
}

impl<'a> MakeWriter<'a> for LogFeedMakeWriter {
    type Writer = LogFeedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogFeedWriter {
            sender: self.sender.clone(),
        }
    }
}

pub(crate) struct LogFeedWriter {
    sender: broadcast::Sender<String>,
}

impl std::io::Write for LogFeedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let line = String::from_utf8_lossy(buf).trim_end().to_string();
        if !line.is_empty() {
            let _ = self.sender.send(line); // no subscribers is fine
        }
        std::io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}

/// Install the global subscriber for the server process. `RUST_LOG` wins
/// over the built-in filter.
pub(crate) fn init_server_logging(sender: broadcast::Sender<String>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(LogFeedMakeWriter { sender })
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn writer_forwards_trimmed_lines_to_feed() {
        let (tx, mut rx) = broadcast::channel(4);
        let mut writer = LogFeedMakeWriter { sender: tx }.make_writer();
        writer.write_all(b"INFO flashfix: booking recorded\n").unwrap();
        writer.write_all(b"\n").unwrap();

        assert_eq!(rx.try_recv().unwrap(), "INFO flashfix: booking recorded");
        assert!(rx.try_recv().is_err());
    }
}
