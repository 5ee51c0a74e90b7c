//! File logger setup for embedding binaries.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use time::{format_description, OffsetDateTime, UtcOffset};
use tracing::subscriber::set_global_default;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::FmtSubscriber;

/// Install a global subscriber writing to a timestamped log file in `dir`.
///
/// Fails if another global subscriber is already set; test code should use
/// `tracing_subscriber::fmt().try_init()` instead.
pub fn init_file_logger(dir: &Path) -> anyhow::Result<()> {
    let stamp = format_description::parse("[year][month][day]-[hour][minute][second]")
        .context("building log file name format")?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let file_name = format!("tournament-{}.log", now.format(&stamp)?);
    let file = File::create(dir.join(&file_name))
        .with_context(|| format!("creating log file {file_name}"))?;

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer_format = format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")
        .context("building log timestamp format")?;
    let timer = tracing_subscriber::fmt::time::OffsetTime::new(offset, timer_format);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(BoxMakeWriter::new(file))
        .finish();
    set_global_default(subscriber).context("a global tracing subscriber is already set")?;
    Ok(())
}
