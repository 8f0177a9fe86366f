use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::apply::{apply_theme, ThemeSink};
use crate::config::ExtractionConfig;
use crate::source::ImageSource;
use crate::theme::ThemeRecord;

/// Runs an extraction under a caller-imposed deadline.
///
/// Expiry is reported the same way as a load failure.
pub async fn extract_palette_within(
    source: &ImageSource,
    config: &ExtractionConfig,
    deadline: Duration,
) -> Option<ThemeRecord> {
    match tokio::time::timeout(deadline, crate::extract_palette_with(source, config)).await {
        Ok(theme) => theme,
        Err(_) => {
            warn!("palette extraction for {source} exceeded {deadline:?}");
            None
        }
    }
}

/// A background extraction whose result is applied to a sink only while
/// someone is still interested in it.
///
/// Dropping the binding withdraws interest. The task keeps running to
/// completion but its result is discarded.
pub struct ThemeBinding {
    interested: Arc<AtomicBool>,
    task: Option<JoinHandle<bool>>,
}

impl ThemeBinding {
    pub fn spawn<S>(
        source: ImageSource,
        config: ExtractionConfig,
        sink: Arc<Mutex<S>>,
        deadline: Option<Duration>,
    ) -> Self
    where
        S: ThemeSink + Send + 'static,
    {
        let interested = Arc::new(AtomicBool::new(true));
        let flag = interested.clone();
        let task = tokio::spawn(async move {
            let theme = match deadline {
                Some(deadline) => extract_palette_within(&source, &config, deadline).await,
                None => crate::extract_palette_with(&source, &config).await,
            };
            let Some(theme) = theme else {
                return false;
            };
            if !flag.load(Ordering::Acquire) {
                debug!("discarding theme for {source}: binding withdrawn");
                return false;
            }
            let mut sink = sink.lock().unwrap_or_else(PoisonError::into_inner);
            apply_theme(&theme, &mut *sink);
            true
        });
        Self {
            interested,
            task: Some(task),
        }
    }

    pub fn cancel(&self) {
        self.interested.store(false, Ordering::Release);
    }

    pub fn is_interested(&self) -> bool {
        self.interested.load(Ordering::Acquire)
    }

    /// Waits for the task. Returns whether a theme was applied.
    pub async fn join(mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        match task.await {
            Ok(applied) => applied,
            Err(err) => {
                warn!("theme task failed: {err}");
                false
            }
        }
    }
}

impl Drop for ThemeBinding {
    fn drop(&mut self) {
        self.cancel();
    }
}
