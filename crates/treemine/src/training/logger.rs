//! Verbosity-gated training log output.
//!
//! Messages go through the `log` facade; the host application picks the
//! backend. [`Verbosity`] filters on top of whatever the backend enables.

use std::time::Instant;

/// How much a training run reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Silent,
    Warning,
    Info,
    Debug,
}

/// Logger for one training run.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
        }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[inline]
    fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    pub fn start_training(&mut self, n_rows: usize, dimension: usize, fuzzy: bool) {
        self.started = Some(Instant::now());
        if self.enabled(Verbosity::Info) {
            log::info!(
                "SOTA training on {n_rows} rows, dimension {dimension}{}",
                if fuzzy { " (fuzzy)" } else { "" }
            );
        }
    }

    pub fn log_level(&self, level: u32, max_level: u32, n_rows: usize) {
        if self.enabled(Verbosity::Info) {
            log::info!("hierarchy level {level}/{max_level}: {n_rows} rows");
        }
    }

    pub fn log_epoch(&self, epoch: u64, error: f64) {
        if self.enabled(Verbosity::Debug) {
            log::debug!("epoch {epoch}: summed resource {error:.6}");
        }
    }

    pub fn log_cycle(&self, cycle: u64, n_leaves: usize, max_resource: f64, variability: f64) {
        if self.enabled(Verbosity::Info) {
            log::info!(
                "cycle {cycle}: {n_leaves} leaves, max resource {max_resource:.6}, variability {variability:.6}"
            );
        }
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(Verbosity::Warning) {
            log::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_leaves: usize, epochs: u64, cycles: u64) {
        if self.enabled(Verbosity::Info) {
            let elapsed = self.started.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0);
            log::info!(
                "training finished: {n_leaves} leaves after {cycles} cycles and {epochs} epochs ({elapsed:.3}s)"
            );
        }
    }
}
