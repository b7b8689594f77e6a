// src/utils/log.rs

//! Phase banners and summaries on top of the `log` facade.
//!
//! Keeps the output of long runs readable: a header per phase, numbered
//! steps and a key/value summary at the end of each phase.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a step in a process
pub fn step(step_num: usize, total: usize, message: &str) {
    log::info!("[STEP {}/{}] {}", step_num, total, message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("[SUMMARY] {}", title);
    for (key, value) in items {
        log::info!("    {}: {}", key, value);
    }
}

/// Format an elapsed duration the way summaries print it.
pub fn elapsed(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

/// Create the log file of one run: `{dir}/log_YYYYmmdd_HHMMSS.txt`.
pub fn create_run_log(dir: &Path, started: NaiveDateTime) -> io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("log_{}.txt", started.format("%Y%m%d_%H%M%S")));
    let file = File::options().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Writer that copies everything to a console stream and a log file.
///
/// A failing file write never silences the console.
pub struct Tee<C, F> {
    console: C,
    file: F,
}

impl<C: Write, F: Write> Tee<C, F> {
    pub fn new(console: C, file: F) -> Self {
        Self { console, file }
    }
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        let _ = self.file.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        self.console.flush()
    }
}
