//! Session controller: the public lifecycle surface of a watcher.

use crate::config::WatchConfig;
use crate::detector::Detector;
use crate::scheduler::PollScheduler;
use crate::state::RunFlag;
use std::sync::Arc;
use tagwatch_core::{EventSink, TagEvent};
use tagwatch_driver::ReaderDriver;
use tracing::{debug, info, warn};

/// Watches a contactless reader and reports tag arrivals and departures.
///
/// One watcher owns one reader driver and runs at most one detection run at
/// a time. A run is started with [`start`](TagWatcher::start) and delivers
/// its whole lifecycle as events on the sink handed in; the consumer's own
/// execution never blocks on the reader.
///
/// # Lifecycle
///
/// 1. `start(sink)` - accepted iff no run is active. Opens the device and
///    configures the initiator in the background; failure emits one
///    `Error` event and ends the run. Success emits `Listening` and begins
///    polling.
/// 2. Arrivals and departures stream as `Detected`/`Removed` events, in
///    transition order, indefinitely.
/// 3. `stop()` - fire-and-forget. The in-flight poll notices the stop
///    flag, the device is closed in the background, and a single terminal
///    `Closed` event signals that teardown actually finished.
///
/// `start` and `stop` must be called from within a Tokio runtime; the run
/// itself is a spawned task.
///
/// # Examples
///
/// ```no_run
/// use tagwatch_core::event_channel;
/// use tagwatch_driver::MockReader;
/// use tagwatch_session::TagWatcher;
///
/// #[tokio::main]
/// async fn main() {
///     let (reader, field) = MockReader::new();
///     field.place_tag(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
///
///     let watcher = TagWatcher::new(reader);
///     let (sink, mut events) = event_channel(32);
///     watcher.start(sink);
///
///     while let Some(event) = events.next().await {
///         println!("{event:?}");
///     }
/// }
/// ```
pub struct TagWatcher<D: ReaderDriver> {
    driver: Arc<D>,
    config: WatchConfig,
    running: RunFlag,
}

impl<D: ReaderDriver> TagWatcher<D> {
    /// Create a watcher with the default configuration.
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, WatchConfig::default())
    }

    /// Create a watcher with explicit polling intervals.
    pub fn with_config(driver: D, config: WatchConfig) -> Self {
        Self {
            driver: Arc::new(driver),
            config,
            running: RunFlag::new(),
        }
    }

    /// Whether a detection run is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// The underlying driver's version string.
    ///
    /// Synchronous and side-effect free; safe to call at any time.
    #[must_use]
    pub fn version(&self) -> String {
        self.driver.version()
    }

    /// Begin a detection run, delivering all results through `sink`.
    ///
    /// Asynchronous: returns immediately, outcomes arrive as events. A
    /// start while a run is already active is ignored (the new sink is
    /// dropped, so its stream ends right away).
    pub fn start(&self, sink: EventSink) {
        if !self.running.begin() {
            warn!("start requested while a run is active, ignoring");
            return;
        }

        info!("starting detection run");

        let scheduler = match PollScheduler::spawn() {
            Ok(scheduler) => scheduler,
            Err(error) => {
                warn!(%error, "could not start poll worker");
                self.running.halt();
                tokio::spawn(async move {
                    sink.emit(TagEvent::Error {
                        message: error.to_string(),
                    })
                    .await;
                });
                return;
            }
        };

        let detector = Detector::new(
            Arc::clone(&self.driver),
            self.config.clone(),
            self.running.clone(),
            sink,
            scheduler,
        );
        tokio::spawn(detector.run());
    }

    /// Request teardown of the active run.
    ///
    /// Fire-and-forget: the presence loop observes the flag between poll
    /// iterations, so teardown completes eventually rather than
    /// immediately; the terminal `Closed` event is the completion signal.
    /// A stop with no active run does nothing.
    pub fn stop(&self) {
        if self.running.halt() {
            info!("stop requested, close event will follow teardown");
        } else {
            debug!("stop requested while stopped, nothing to do");
        }
    }
}
