use std::io::{Stderr, Write};

use anyhow::{Context, Result};

use super::notifier::{NotificationSink, UserNotification};
use crate::domain::value_objects::enums::notification_durations::NotificationDuration;

/// Shows notifications as lines on a terminal.
pub struct ConsoleSink<W: Write + Send = Stderr> {
    writer: W,
}

impl ConsoleSink<Stderr> {
    pub fn stderr() -> Self {
        Self {
            writer: std::io::stderr(),
        }
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> NotificationSink for ConsoleSink<W> {
    fn show(&mut self, notification: &UserNotification) -> Result<()> {
        let marker = match notification.duration {
            NotificationDuration::Short => "*",
            NotificationDuration::Long => "!",
        };
        writeln!(
            self.writer,
            "[{}] {} {}",
            notification.created_at.format("%H:%M:%S"),
            marker,
            notification.message
        )
        .context("failed to write notification")?;
        self.writer.flush().context("failed to flush notification")?;
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "console"
    }
}
