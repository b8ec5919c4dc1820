/// Plain-text log file sink
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

pub fn init_file_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Failed to create log directory {}: {}", parent.display(), e);
                return;
            }
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => *LOG_FILE.lock() = Some(BufWriter::new(file)),
        Err(e) => eprintln!("Failed to open log file {}: {}", path.display(), e),
    }
}

pub fn write_to_file(line: &str) {
    let mut guard = LOG_FILE.lock();
    if let Some(writer) = guard.as_mut() {
        // A failing log file must never take the service down
        let _ = writeln!(writer, "{}", line);
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_FILE.lock().as_mut() {
        let _ = writer.flush();
    }
}
