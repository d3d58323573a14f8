//! Append-only hit sink shared by all worker threads.
//!
//! Each hit becomes one `x,z,energy` line (`x`, `z` in cm, energy in MeV).
//! Lines from different threads may appear in any order, but every line is
//! written whole: each line is formatted in full and appended with a single
//! `write_all` under one mutex owned by the [`HitRecorder`] for its whole
//! life. The file is not buffered, so a failed write is seen by the
//! `record` call that owns the hit.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::RecordingError;
use crate::scoring::HitRecord;
use crate::units::{CM, MEV};

/// Length of generated run tokens.
const TOKEN_LEN: usize = 16;

/// File suffix of hit sinks.
pub const HITS_EXTENSION: &str = "csv";

/// Identity of one run's output: a directory and a unique token.
///
/// The sink lives at `<output_dir>/<token>.csv`, so concurrent runs sharing a
/// directory never write to the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    output_dir: PathBuf,
    token: String,
}

impl RunContext {
    /// Creates a context with a fresh random token.
    #[must_use]
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        Self::with_token(output_dir, token)
    }

    /// Creates a context with a caller-chosen token.
    #[must_use]
    pub fn with_token<P: AsRef<Path>, S: Into<String>>(output_dir: P, token: S) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of this run's hit file.
    #[must_use]
    pub fn hits_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{HITS_EXTENSION}", self.token))
    }
}

/// Counters reported when a sink is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecorderStats {
    /// Hits written to the sink.
    pub recorded: u64,
    /// Hits lost to write failures or a closed sink.
    pub dropped: u64,
}

struct Sink {
    path: PathBuf,
    file: File,
}

/// Thread-safe append-only hit writer.
///
/// `record` never fails: a hit that cannot be written is dropped and
/// counted, and the run continues.
#[derive(Default)]
pub struct HitRecorder {
    sink: Mutex<Option<Sink>>,
    recorded: AtomicU64,
    dropped: AtomicU64,
}

impl std::fmt::Debug for HitRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecorder")
            .field("path", &self.path())
            .field("stats", &self.stats())
            .finish()
    }
}

impl HitRecorder {
    /// Creates a recorder with no open sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the sink lock. A panic in another holder does not leave the
    /// sink unusable.
    fn lock(&self) -> MutexGuard<'_, Option<Sink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the run's sink for appending, creating the directory if needed.
    ///
    /// Counters are reset. Existing content at the path is kept.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::AlreadyOpen`] if a sink is open, or
    /// [`RecordingError::Io`] if the file cannot be opened.
    pub fn open(&self, run: &RunContext) -> Result<(), RecordingError> {
        let mut guard = self.lock();
        if let Some(sink) = guard.as_ref() {
            return Err(RecordingError::AlreadyOpen(sink.path.display().to_string()));
        }
        fs::create_dir_all(run.output_dir())?;
        let path = run.hits_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.recorded.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        info!(path = %path.display(), token = run.token(), "opened hit sink");
        *guard = Some(Sink {
            path,
            file,
        });
        Ok(())
    }

    /// Appends one hit line.
    ///
    /// A hit whose line cannot be written is counted in
    /// [`RecorderStats::dropped`] instead of [`RecorderStats::recorded`].
    pub fn record(&self, hit: &HitRecord) {
        let result = {
            let mut guard = self.lock();
            match guard.as_mut() {
                Some(sink) => {
                    let line = format!(
                        "{},{},{}\n",
                        hit.x / CM,
                        hit.z / CM,
                        hit.kinetic_energy / MEV
                    );
                    sink.file
                        .write_all(line.as_bytes())
                        .map_err(RecordingError::from)
                }
                None => Err(RecordingError::NotOpen),
            }
        };
        match result {
            Ok(()) => {
                self.recorded.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(error = %err, dropped, "dropped hit");
            }
        }
    }

    /// Syncs the sink to disk, then closes it.
    ///
    /// Every `record` call that returned before `close` was called is on disk
    /// when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingError::NotOpen`] if no sink is open, or
    /// [`RecordingError::Io`] if syncing fails. The sink is closed either
    /// way.
    pub fn close(&self) -> Result<RecorderStats, RecordingError> {
        let sink = self.lock().take().ok_or(RecordingError::NotOpen)?;
        let Sink { path, file } = sink;
        file.sync_all()?;
        let stats = self.stats();
        debug!(path = %path.display(), recorded = stats.recorded, dropped = stats.dropped, "closed hit sink");
        Ok(stats)
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> RecorderStats {
        RecorderStats {
            recorded: self.recorded.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Path of the open sink, if any.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|s| s.path.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hit(x_cm: f64, z_cm: f64, energy: f64) -> HitRecord {
        HitRecord {
            x: x_cm * CM,
            z: z_cm * CM,
            kinetic_energy: energy * MEV,
        }
    }

    #[test]
    fn generated_tokens_are_unique_and_alphanumeric() {
        let a = RunContext::new("out");
        let b = RunContext::new("out");
        assert_ne!(a.token(), b.token());
        assert_eq!(a.token().len(), TOKEN_LEN);
        assert!(a.token().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn sink_path_is_token_with_csv_suffix() {
        let run = RunContext::with_token("data", "abc123");
        assert_eq!(run.hits_path(), Path::new("data").join("abc123.csv"));
    }

    #[test]
    fn dotted_tokens_keep_distinct_sinks() {
        let a = RunContext::with_token("out", "run.1");
        let b = RunContext::with_token("out", "run.2");
        assert_ne!(a.hits_path(), b.hits_path());
        assert_eq!(a.hits_path(), Path::new("out").join("run.1.csv"));
    }

    #[test]
    fn writes_one_line_per_hit_in_output_units() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunContext::with_token(dir.path(), "run");
        let recorder = HitRecorder::new();
        recorder.open(&run).unwrap();
        recorder.record(&hit(1.0, 2.0, 5.0));
        recorder.record(&hit(-0.5, 0.25, 0.1));
        let stats = recorder.close().unwrap();
        assert_eq!(stats, RecorderStats { recorded: 2, dropped: 0 });

        let text = fs::read_to_string(run.hits_path()).unwrap();
        assert_eq!(text, "1,2,5\n-0.5,0.25,0.1\n");
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunContext::with_token(dir.path(), "run");
        let recorder = HitRecorder::new();
        for _ in 0..2 {
            recorder.open(&run).unwrap();
            recorder.record(&hit(1.0, 1.0, 1.0));
            recorder.close().unwrap();
        }
        let text = fs::read_to_string(run.hits_path()).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn record_without_sink_is_dropped_not_fatal() {
        let recorder = HitRecorder::new();
        recorder.record(&hit(1.0, 1.0, 1.0));
        assert_eq!(recorder.stats().dropped, 1);
        assert!(matches!(recorder.close(), Err(RecordingError::NotOpen)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn write_failure_drops_hit_and_run_continues() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let run = RunContext::with_token(dir.path(), "full");
        std::os::unix::fs::symlink(full, run.hits_path()).unwrap();

        let recorder = HitRecorder::new();
        recorder.open(&run).unwrap();
        for _ in 0..10 {
            recorder.record(&hit(1.0, 1.0, 1.0));
        }
        assert_eq!(recorder.stats(), RecorderStats { recorded: 0, dropped: 10 });
        assert!(recorder.is_open());
        let _ = recorder.close();
        assert!(!recorder.is_open());
    }

    #[test]
    fn double_open_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = HitRecorder::new();
        recorder.open(&RunContext::with_token(dir.path(), "a")).unwrap();
        let err = recorder
            .open(&RunContext::with_token(dir.path(), "b"))
            .unwrap_err();
        assert!(matches!(err, RecordingError::AlreadyOpen(_)));
        assert!(recorder.is_open());
    }

    #[test]
    fn open_creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let run = RunContext::with_token(dir.path().join("analysis").join("data"), "run");
        let recorder = HitRecorder::new();
        recorder.open(&run).unwrap();
        assert_eq!(recorder.path(), Some(run.hits_path()));
        recorder.close().unwrap();
        assert!(run.hits_path().exists());
    }
}
