//! Detection state machine: the search/confirm cycle of one run.
//!
//! The [`Detector`] drives the whole lifecycle of a detection run on the
//! consumer context: it opens the device through one background unit,
//! announces readiness, then alternates between [`DetectionState::Searching`]
//! (one blocking selection per unit) and [`DetectionState::Monitoring`] (one
//! unit busy-polling presence until departure or stop). Device ownership
//! round-trips through every unit - moved into the closure, returned with
//! its result - so exactly one context ever holds the open handle.

use crate::config::WatchConfig;
use crate::scheduler::{PollScheduler, ScheduleError};
use crate::state::{DetectionState, RunFlag};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tagwatch_core::{EventSink, TagDetection, TagEvent};
use tagwatch_driver::{DeviceSession, ReaderDriver, Selection};
use tokio::time::sleep;
use tracing::{debug, trace, warn};

/// Outcome of one monitoring unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PresenceOutcome {
    /// The target stopped answering while the run was still live.
    Departed,

    /// The run flag flipped to Stopped mid-loop.
    Halted,
}

/// Busy-poll the selected target until it departs or the run is stopped.
///
/// Runs entirely inside a single unit of background work, never yielding
/// back to the scheduler. The run flag is checked between iterations, so a
/// stop request is noticed within one presence round-trip plus one
/// interval.
pub(crate) fn watch_presence<D: ReaderDriver>(
    session: &mut DeviceSession<D>,
    running: &RunFlag,
    interval: Duration,
) -> PresenceOutcome {
    loop {
        if !running.is_running() {
            return PresenceOutcome::Halted;
        }

        match session.is_present() {
            Ok(true) => {}
            Ok(false) => return PresenceOutcome::Departed,
            Err(error) => {
                // A vanished target reads as a failed round-trip on real
                // hardware; both mean the tag is gone.
                trace!(%error, "presence check failed, treating target as departed");
                return PresenceOutcome::Departed;
            }
        }

        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
}

/// Open the device and configure the initiator, releasing everything on
/// any failure branch. Runs as one background unit.
fn open_session<D: ReaderDriver>(driver: Arc<D>) -> tagwatch_driver::Result<DeviceSession<D>> {
    let mut session = DeviceSession::open(driver)?;
    if let Err(error) = session.init_initiator() {
        session.close();
        return Err(error);
    }
    Ok(session)
}

/// State machine driving one detection run.
pub(crate) struct Detector<D: ReaderDriver> {
    driver: Arc<D>,
    config: WatchConfig,
    running: RunFlag,
    sink: EventSink,
    scheduler: PollScheduler,
}

impl<D: ReaderDriver> Detector<D> {
    pub(crate) fn new(
        driver: Arc<D>,
        config: WatchConfig,
        running: RunFlag,
        sink: EventSink,
        scheduler: PollScheduler,
    ) -> Self {
        Self {
            driver,
            config,
            running,
            sink,
            scheduler,
        }
    }

    /// Run one full detection stream: open, announce, cycle, tear down.
    pub(crate) async fn run(self) {
        let opened = {
            let driver = Arc::clone(&self.driver);
            self.scheduler.submit(move || open_session(driver)).await
        };

        let session = match opened {
            Ok(Ok(session)) => session,
            Ok(Err(error)) => {
                warn!(%error, "reader setup failed");
                self.sink
                    .emit(TagEvent::Error {
                        message: error.to_string(),
                    })
                    .await;
                self.running.halt();
                return;
            }
            Err(error) => {
                self.fatal(error).await;
                return;
            }
        };

        if !self.running.is_running() {
            // Stop raced the open; close silently, the terminal event is
            // still owed.
            self.teardown(session).await;
            return;
        }

        self.sink.emit(TagEvent::Listening).await;

        if let Some(session) = self.cycle(session).await {
            self.teardown(session).await;
        }
    }

    /// Alternate Searching/Monitoring until the run flag goes Stopped.
    ///
    /// Returns the session for teardown, or `None` if the scheduler died
    /// and took the session with it.
    async fn cycle(&self, mut session: DeviceSession<D>) -> Option<DeviceSession<D>> {
        let mut state = DetectionState::Searching;

        while self.running.is_running() {
            match state {
                DetectionState::Searching => {
                    let outcome = self
                        .scheduler
                        .submit(move || {
                            let mut session = session;
                            let selection = session.select_passive_target();
                            (session, selection)
                        })
                        .await;

                    let (returned, selection) = match outcome {
                        Ok(pair) => pair,
                        Err(error) => {
                            self.fatal(error).await;
                            return None;
                        }
                    };
                    session = returned;

                    match selection {
                        Ok(Selection::Found(info)) => {
                            if !self.running.is_running() {
                                break;
                            }
                            debug!(uid = %info.uid, "target selected");
                            self.sink
                                .emit(TagEvent::Detected(TagDetection::new(
                                    info.uid,
                                    info.modulation,
                                )))
                                .await;
                            trace!(from = %state, to = %DetectionState::Monitoring, "state transition");
                            state = DetectionState::Monitoring;
                        }
                        Ok(Selection::NotFound) => {
                            trace!("field quiet, retrying selection");
                            sleep(self.config.select_retry_interval).await;
                        }
                        Err(error) => {
                            debug!(%error, "selection failed, retrying");
                            sleep(self.config.select_retry_interval).await;
                        }
                    }
                }
                DetectionState::Monitoring => {
                    let running = self.running.clone();
                    let interval = self.config.presence_poll_interval;

                    let outcome = self
                        .scheduler
                        .submit(move || {
                            let mut session = session;
                            let outcome = watch_presence(&mut session, &running, interval);
                            (session, outcome)
                        })
                        .await;

                    let (returned, outcome) = match outcome {
                        Ok(pair) => pair,
                        Err(error) => {
                            self.fatal(error).await;
                            return None;
                        }
                    };
                    session = returned;

                    match outcome {
                        PresenceOutcome::Departed => {
                            if !self.running.is_running() {
                                break;
                            }
                            debug!("target departed");
                            self.sink.emit(TagEvent::Removed).await;
                            trace!(from = %state, to = %DetectionState::Searching, "state transition");
                            state = DetectionState::Searching;
                        }
                        PresenceOutcome::Halted => break,
                    }
                }
            }
        }

        Some(session)
    }

    /// Close the device through the scheduler and emit the terminal event.
    async fn teardown(&self, session: DeviceSession<D>) {
        if let Err(error) = self.scheduler.submit(move || session.close()).await {
            debug!(%error, "close unit lost, resources released on drop");
        }
        self.sink.emit(TagEvent::Closed).await;
        debug!("detection run closed");
    }

    /// The scheduler is gone: report it once and end the run.
    async fn fatal(&self, error: ScheduleError) {
        warn!(%error, "poll scheduler unavailable, aborting run");
        self.sink
            .emit(TagEvent::Error {
                message: error.to_string(),
            })
            .await;
        self.running.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagwatch_driver::MockReader;

    fn open_mock() -> (DeviceSession<MockReader>, tagwatch_driver::MockFieldHandle) {
        let (reader, field) = MockReader::new();
        let session = DeviceSession::open(Arc::new(reader)).unwrap();
        (session, field)
    }

    #[test]
    fn test_watch_presence_departs_when_tag_leaves() {
        let (mut session, field) = open_mock();
        field.place_tag(vec![0x01, 0x02, 0x03, 0x04]).unwrap();

        let running = RunFlag::new();
        running.begin();

        let remover = {
            let field = field.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                field.remove_tag();
            })
        };

        let outcome = watch_presence(&mut session, &running, Duration::from_millis(1));
        assert_eq!(outcome, PresenceOutcome::Departed);
        assert!(running.is_running());

        remover.join().unwrap();
        session.close();
    }

    #[test]
    fn test_watch_presence_halts_on_stop() {
        let (mut session, field) = open_mock();
        field.place_tag(vec![0x01, 0x02, 0x03, 0x04]).unwrap();

        let running = RunFlag::new();
        running.begin();

        let stopper = {
            let running = running.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                running.halt();
            })
        };

        let outcome = watch_presence(&mut session, &running, Duration::from_millis(1));
        assert_eq!(outcome, PresenceOutcome::Halted);
        // The tag never left the field.
        assert!(field.tag_present());

        stopper.join().unwrap();
        session.close();
    }

    #[test]
    fn test_watch_presence_stopped_flag_short_circuits() {
        let (mut session, field) = open_mock();
        field.place_tag(vec![0x01, 0x02, 0x03, 0x04]).unwrap();

        let running = RunFlag::new(); // never started

        let outcome = watch_presence(&mut session, &running, Duration::from_millis(1));
        assert_eq!(outcome, PresenceOutcome::Halted);
        assert_eq!(field.presence_check_count(), 0);

        session.close();
    }

    #[test]
    fn test_open_session_closes_on_initiator_failure() {
        let (reader, field) = MockReader::new();
        field.fail_initiator_init(true);

        let result = open_session(Arc::new(reader));
        assert!(result.is_err());
        assert_eq!(field.devices_closed(), 1);
        assert_eq!(field.contexts_released(), 1);
    }
}
