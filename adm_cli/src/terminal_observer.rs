use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use adm_core::events::observer::TransferObserver;
use adm_core::types::types::Handle;

/// Renders transfer progress as a single indicatif percent bar.
pub struct TerminalObserver {
    /// Lazily created on the first notification.
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn ensure_bar(&self) -> ProgressBar {
        let mut bar = self.bar.lock().unwrap();
        bar.get_or_insert_with(|| {
            let style = ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos:>3}% {msg}")
                .unwrap()
                .progress_chars("=>-");
            let pb = ProgressBar::new(100);
            pb.set_style(style);
            pb
        })
        .clone()
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferObserver for TerminalObserver {
    async fn on_progress(&self, handle: Handle, percent: f64) {
        let pb = self.ensure_bar();
        pb.set_message(format!("transfer {}", handle));
        pb.set_position(percent as u64);
    }

    async fn on_success(&self, _handle: Handle, path: &Path) {
        let pb = self.ensure_bar();
        pb.set_position(100);
        pb.finish_with_message(format!("saved to {}", path.display()));
    }

    async fn on_error(&self, _handle: Handle, code: u32) {
        let pb = self.ensure_bar();
        pb.abandon_with_message(format!("failed with code {}", code));
    }
}
