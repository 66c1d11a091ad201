//! Event loop hosting a [`CaptureController`]
//!
//! UI events arrive over an mpsc channel and are applied one at a time on
//! a single task. Every change is published as a [`Snapshot`] on a watch
//! channel. Submissions run on their own task so the loop keeps draining
//! events (all of which `Submitting` ignores); their outcome comes back
//! tagged with the session generation and is dropped if the session moved
//! on or the driver was unmounted meanwhile.

use crate::camera::CameraSource;
use crate::controller::{CaptureController, Event, SessionState, Snapshot};
use crate::errors::SubmissionError;
use crate::submission::Submitter;
use crate::types::VerificationResult;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session driver has stopped")]
pub struct DriverClosed;

type Outcome = (u64, Result<VerificationResult, SubmissionError>);

pub struct SessionDriver {
    events: mpsc::Sender<Event>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl SessionDriver {
    /// Move `controller` onto a new task. Must be called inside a tokio runtime.
    pub fn spawn<C, S>(controller: CaptureController<C, S>) -> Self
    where
        C: CameraSource + 'static,
        S: Submitter + 'static,
    {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
        let (snapshots_tx, snapshots_rx) = watch::channel(controller.snapshot());
        let task = tokio::spawn(run(controller, events_rx, snapshots_tx));
        Self {
            events: events_tx,
            snapshots: snapshots_rx,
            task,
        }
    }

    pub async fn send(&self, event: Event) -> Result<(), DriverClosed> {
        self.events.send(event).await.map_err(|_| DriverClosed)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub async fn wait_for_state(&self, state: SessionState) -> Result<Snapshot, DriverClosed> {
        let mut rx = self.subscribe();
        rx.wait_for(|s| s.state == state)
            .await
            .map(|s| s.clone())
            .map_err(|_| DriverClosed)
    }

    /// Stop the loop, release the camera and discard any in-flight result.
    pub async fn unmount(self) -> Result<Snapshot, DriverClosed> {
        let Self {
            events,
            snapshots,
            task,
        } = self;
        drop(events);
        task.await.map_err(|_| DriverClosed)?;
        let last = snapshots.borrow().clone();
        Ok(last)
    }
}

async fn run<C, S>(
    mut controller: CaptureController<C, S>,
    mut events: mpsc::Receiver<Event>,
    snapshots: watch::Sender<Snapshot>,
) where
    C: CameraSource + 'static,
    S: Submitter + 'static,
{
    let (done_tx, mut done_rx) = mpsc::channel::<Outcome>(1);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if event == Event::ConfirmSubmit {
                    if let Some(ticket) = controller.begin_submission() {
                        let submitter = controller.submitter();
                        let done = done_tx.clone();
                        tokio::spawn(async move {
                            let outcome = submitter.submit(ticket.frame()).await;
                            if done.send((ticket.generation(), outcome)).await.is_err() {
                                log::debug!("Session gone; dropping submission outcome");
                            }
                        });
                    }
                } else {
                    controller.handle(event).await;
                }
            }
            Some((generation, outcome)) = done_rx.recv() => {
                controller.finish_submission(generation, outcome);
            }
        }
        snapshots.send_replace(controller.snapshot());
    }

    controller.shutdown();
    snapshots.send_replace(controller.snapshot());
    log::info!("Session driver stopped in state {}", controller.state());
}
