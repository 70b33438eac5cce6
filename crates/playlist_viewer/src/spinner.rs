use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use playlist_core::ListObserver;

/// Busy indicator: spins while a page fetch is in flight and clears when it
/// settles, success or failure alike.
pub struct BusySpinner {
    bar: Mutex<Option<ProgressBar>>,
}

impl BusySpinner {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ListObserver for BusySpinner {
    fn busy_changed(&self, busy: bool) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        if busy {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}").expect("spinner template"),
            );
            bar.set_message("loading playlist...");
            bar.enable_steady_tick(Duration::from_millis(80));
            *slot = Some(bar);
        } else if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
    }
}
