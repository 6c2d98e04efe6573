//! Progress reporting utilities

use crate::result::Summary;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Coarse phases of one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    Aligning { sections: usize },
    Assembling,
}

/// Receives progress callbacks from the runner, possibly from rayon workers
pub trait ProgressObserver: Send + Sync {
    fn stage(&self, _stage: Stage) {}

    fn section_done(&self, _name: &str) {}

    fn finished(&self, _summary: &Summary) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Progress reporter for the CLI
#[derive(Debug)]
pub struct ProgressReporter {
    extract_pb: Mutex<Option<ProgressBar>>,
    sections_pb: Mutex<Option<ProgressBar>>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for a comparison
    pub fn new_for_compare() -> Self {
        Self {
            extract_pb: Mutex::new(None),
            sections_pb: Mutex::new(None),
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            extract_pb: Mutex::new(None),
            sections_pb: Mutex::new(None),
            show_progress: false,
        }
    }

    fn finish_extract(&self, message: &str) {
        if let Ok(mut slot) = self.extract_pb.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(message.to_string());
            }
        }
    }

    fn finish_sections(&self, message: &str) {
        if let Ok(mut slot) = self.sections_pb.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(message.to_string());
            }
        }
    }
}

impl ProgressObserver for ProgressReporter {
    fn stage(&self, stage: Stage) {
        if !self.show_progress {
            return;
        }
        match stage {
            Stage::Extracting => {
                if let Ok(mut slot) = self.extract_pb.lock() {
                    *slot = Some(create_spinner("Extracting documents..."));
                }
            }
            Stage::Aligning { sections } => {
                self.finish_extract("Documents extracted");
                if let Ok(mut slot) = self.sections_pb.lock() {
                    *slot = Some(create_progress_bar(sections as u64, "Aligning sections"));
                }
            }
            Stage::Assembling => self.finish_sections("Sections compared"),
        }
    }

    fn section_done(&self, name: &str) {
        if let Ok(slot) = self.sections_pb.lock() {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(name.to_string());
                pb.inc(1);
            }
        }
    }

    fn finished(&self, summary: &Summary) {
        self.finish_extract("Documents extracted");
        self.finish_sections(&format!("{} changes", summary.total_changes()));
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure all progress bars are cleaned up silently
        for slot in [&mut self.extract_pb, &mut self.sections_pb] {
            if let Ok(slot) = slot.get_mut() {
                if let Some(pb) = slot.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}
