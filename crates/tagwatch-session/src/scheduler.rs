//! Poll scheduler: runs blocking reader work off the consumer context.
//!
//! One detection run owns one [`PollScheduler`], which owns one dedicated
//! worker thread. Units of work are executed strictly one at a time in
//! submission order, and each unit's result is delivered back to the
//! awaiting task - the consumer execution context - through a oneshot.
//! Because the detection loop only submits the next unit from the
//! completion of the previous one, at most one poll is ever outstanding per
//! run, and a teardown unit submitted during a long poll simply queues
//! behind it.

use std::sync::mpsc;
use std::thread;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

/// A unit of outstanding work: the operation to run off the consumer
/// context, already wired to its completion channel.
type PendingWork = Box<dyn FnOnce() + Send + 'static>;

/// Errors that can occur when scheduling background work.
///
/// Both variants are fatal to the run that hits them: the scheduler does
/// not retry, and callers surface the failure as an error event.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The worker thread could not be spawned.
    #[error("Failed to spawn poll worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker thread is gone and cannot take or finish work.
    #[error("Poll worker is no longer available")]
    WorkerGone,
}

/// Background executor for blocking reader calls.
///
/// Dropping the scheduler closes the work queue; the worker thread drains
/// whatever was already queued and exits.
///
/// # Examples
///
/// ```
/// use tagwatch_session::PollScheduler;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = PollScheduler::spawn().unwrap();
/// let answer = scheduler.submit(|| 6 * 7).await.unwrap();
/// assert_eq!(answer, 42);
/// # }
/// ```
#[derive(Debug)]
pub struct PollScheduler {
    work_tx: mpsc::Sender<PendingWork>,
}

impl PollScheduler {
    /// Spawn the worker thread and return the scheduler that feeds it.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Spawn`] if the OS refuses the thread.
    pub fn spawn() -> Result<Self, ScheduleError> {
        let (work_tx, work_rx) = mpsc::channel::<PendingWork>();

        thread::Builder::new()
            .name("tagwatch-poll".to_string())
            .spawn(move || {
                while let Ok(unit) = work_rx.recv() {
                    unit();
                }
                trace!("poll worker queue closed, exiting");
            })?;

        Ok(Self { work_tx })
    }

    /// Run `work` on the worker thread and resolve with its result.
    ///
    /// The work runs exactly once, after every previously submitted unit
    /// has finished, and the returned future resolves exactly once, after
    /// the work - on the awaiting task, never concurrently with it. If the
    /// future is dropped before completion the work still runs; only its
    /// result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::WorkerGone`] if the worker thread has
    /// terminated (it dies with any unit that panics). Work rejected this
    /// way is dropped, not run.
    pub async fn submit<T, F>(&self, work: F) -> Result<T, ScheduleError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();

        let unit: PendingWork = Box::new(move || {
            let _ = done_tx.send(work());
        });

        self.work_tx
            .send(unit)
            .map_err(|_| ScheduleError::WorkerGone)?;

        done_rx.await.map_err(|_| ScheduleError::WorkerGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_submit_returns_work_result() {
        let scheduler = PollScheduler::spawn().unwrap();
        let value = scheduler.submit(|| "polled".to_string()).await.unwrap();
        assert_eq!(value, "polled");
    }

    #[tokio::test]
    async fn test_units_run_in_submission_order() {
        let scheduler = PollScheduler::spawn().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let log = Arc::clone(&log);
            scheduler
                .submit(move || log.lock().unwrap().push(i))
                .await
                .unwrap();
        }

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_work_moves_ownership_through_the_unit() {
        let scheduler = PollScheduler::spawn().unwrap();
        let owned = vec![1u8, 2, 3];

        let (returned, len) = scheduler
            .submit(move || {
                let len = owned.len();
                (owned, len)
            })
            .await
            .unwrap();

        assert_eq!(len, 3);
        assert_eq!(returned, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_panicking_unit_kills_the_worker() {
        let scheduler = PollScheduler::spawn().unwrap();

        let result = scheduler.submit::<(), _>(|| panic!("poll blew up")).await;
        assert!(matches!(result, Err(ScheduleError::WorkerGone)));

        // Every later submission is refused.
        let result = scheduler.submit(|| ()).await;
        assert!(matches!(result, Err(ScheduleError::WorkerGone)));
    }
}
