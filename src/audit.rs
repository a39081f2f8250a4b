//! Audit events consumed by the intrusion-prevention tool in front of the proxy.
//!
//! Every event is a `tracing` event on [`AUDIT_TARGET`]. The telemetry setup
//! routes that target to `<log-dir>/app.log` through [`AuditFormat`], which
//! writes one `YYYY-MM-DD HH:MM:SS,mmm - LEVEL - message` line per event. The
//! message texts are matched by external ban filters and must stay stable.

use anyhow::{Context, Result};
use chrono::Local;
use std::{
    borrow::Cow,
    fmt::{self, Write as _},
    fs::{self, File, OpenOptions},
    path::Path,
};
use tracing::{
    field::{Field, Visit},
    error, info, warn, Event, Level, Metadata, Subscriber,
};
use tracing_subscriber::{
    filter::FilterFn,
    fmt::{format, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

pub const AUDIT_TARGET: &str = "webgate::audit";
pub const AUDIT_LOG_FILE: &str = "app.log";

/// Escape control characters so a crafted username or header cannot start a new log line.
fn clean(value: &str) -> Cow<'_, str> {
    if value.chars().any(char::is_control) {
        Cow::Owned(
            value
                .chars()
                .map(|c| {
                    if c.is_control() {
                        c.escape_default().to_string()
                    } else {
                        c.to_string()
                    }
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}

pub fn startup(address: &str) {
    info!(target: AUDIT_TARGET, "Starting webgate application on {}", clean(address));
}

pub fn home_access(ip: &str) {
    info!(target: AUDIT_TARGET, "Access to home page from {}", clean(ip));
}

pub fn login_success(username: &str, ip: &str) {
    info!(
        target: AUDIT_TARGET,
        "Successful login for user '{}' from {}",
        clean(username),
        clean(ip)
    );
}

pub fn login_empty_credentials(ip: &str) {
    warn!(target: AUDIT_TARGET, "Login attempt with empty credentials from {}", clean(ip));
}

/// Unknown user and wrong password share this line.
pub fn login_failure(username: &str, ip: &str) {
    warn!(
        target: AUDIT_TARGET,
        "Failed login attempt for user '{}' from {}",
        clean(username),
        clean(ip)
    );
}

pub fn private_access(username: &str, ip: &str) {
    info!(
        target: AUDIT_TARGET,
        "Access to private area by user '{}' from {}",
        clean(username),
        clean(ip)
    );
}

pub fn logout(username: &str, ip: &str) {
    info!(
        target: AUDIT_TARGET,
        "User '{}' logged out from {}",
        clean(username),
        clean(ip)
    );
}

pub fn not_found(ip: &str, url: &str) {
    warn!(target: AUDIT_TARGET, "404 error from {} - URL: {}", clean(ip), clean(url));
}

pub fn server_error(ip: &str, url: &str, detail: &str) {
    error!(
        target: AUDIT_TARGET,
        "500 error from {} - URL: {} - {}",
        clean(ip),
        clean(url),
        clean(detail)
    );
}

/// Create `dir` if needed and open the audit log for appending.
///
/// # Errors
/// Returns an error if the directory or file cannot be created.
pub fn open_log_file(dir: &Path) -> Result<File> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let path = dir.join(AUDIT_LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open audit log {}", path.display()))
}

fn is_audit_event(metadata: &Metadata<'_>) -> bool {
    metadata.target() == AUDIT_TARGET && *metadata.level() <= Level::INFO
}

/// Only audit events, INFO and above. The target is matched exactly, so
/// events from modules under `webgate::audit` stay out of the file.
#[must_use]
pub fn audit_filter() -> FilterFn {
    FilterFn::new(is_audit_event as fn(&Metadata<'_>) -> bool)
}

/// Audit log line layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuditFormat;

const fn level_name(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

struct MessageVisitor<'a> {
    message: &'a mut String,
}

impl Visit for MessageVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        }
    }
}

impl<S, N> FormatEvent<S, N> for AuditFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        event.record(&mut MessageVisitor {
            message: &mut message,
        });
        writeln!(
            writer,
            "{} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            level_name(*event.metadata().level()),
            message
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::{fmt as subscriber_fmt, layer::SubscriberExt, Layer, Registry};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().unwrap().clone())
                .unwrap()
                .lines()
                .map(ToString::to_string)
                .collect()
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<String> {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let layer = subscriber_fmt::layer()
            .event_format(AuditFormat)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_filter(audit_filter());
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        buffer.lines()
    }

    #[test]
    fn lines_follow_the_ban_filter_layout() {
        let lines = capture(|| {
            login_failure("admin", "1.2.3.4");
            login_success("admin", "1.2.3.4");
            server_error("9.9.9.9", "/boom", "kaboom");
        });

        assert_eq!(lines.len(), 3);
        let layout =
            Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} - (INFO|WARNING|ERROR) - ")
                .unwrap();
        for line in &lines {
            assert!(layout.is_match(line), "unexpected line: {line}");
        }
        assert!(lines[0].ends_with(" - WARNING - Failed login attempt for user 'admin' from 1.2.3.4"));
        assert!(lines[1].ends_with(" - INFO - Successful login for user 'admin' from 1.2.3.4"));
        assert!(lines[2].ends_with(" - ERROR - 500 error from 9.9.9.9 - URL: /boom - kaboom"));
    }

    #[test]
    fn every_event_has_its_own_message() {
        let lines = capture(|| {
            home_access("1.1.1.1");
            login_empty_credentials("1.1.1.1");
            private_access("user", "1.1.1.1");
            logout("user", "1.1.1.1");
            not_found("1.1.1.1", "/missing");
        });

        assert!(lines[0].ends_with("INFO - Access to home page from 1.1.1.1"));
        assert!(lines[1].ends_with("WARNING - Login attempt with empty credentials from 1.1.1.1"));
        assert!(lines[2].ends_with("INFO - Access to private area by user 'user' from 1.1.1.1"));
        assert!(lines[3].ends_with("INFO - User 'user' logged out from 1.1.1.1"));
        assert!(lines[4].ends_with("WARNING - 404 error from 1.1.1.1 - URL: /missing"));
    }

    #[test]
    fn control_characters_cannot_forge_lines() {
        let lines = capture(|| {
            login_failure("x' from 6.6.6.6\n2024-01-01 00:00:00,000 - WARNING - y", "1.2.3.4");
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\\n"));
    }

    #[test]
    fn other_targets_are_not_audited() {
        let lines = capture(|| {
            tracing::warn!("not an audit event");
            tracing::warn!(target: "webgate::audit::nested", "child target");
            tracing::debug!(target: AUDIT_TARGET, "below threshold");
        });
        assert!(lines.is_empty());
    }

    #[test]
    fn open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("var/log/webapp");
        let file = open_log_file(&nested);
        assert!(file.is_ok());
        assert!(nested.join(AUDIT_LOG_FILE).exists());
    }
}
