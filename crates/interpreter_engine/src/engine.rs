use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error};
use tokio::runtime::Runtime;

use crate::submit::{ReqwestSubmitter, SubmitSettings, Submitter};
use crate::timer::ReplaceableTimer;
use crate::upload::{read_upload, ReadError};
use crate::{
    EngineEvent, EngineStopped, ErrorTicket, FailureKind, IngestId, SubmissionId,
    SubmissionRequest, SubmitError,
};

enum EngineCommand {
    Work(Work),
    ScheduleErrorClear { ticket: ErrorTicket, delay: Duration },
}

/// Commands that must each be answered by exactly one event.
enum Work {
    ReadFile {
        ingest_id: IngestId,
        path: PathBuf,
    },
    Submit {
        submission_id: SubmissionId,
        request: SubmissionRequest,
    },
}

impl Work {
    fn pending(&self) -> Pending {
        match self {
            Work::ReadFile { ingest_id, .. } => Pending::Read(*ingest_id),
            Work::Submit { submission_id, .. } => Pending::Submit(*submission_id),
        }
    }

    async fn run(self, submitter: &dyn Submitter) -> EngineEvent {
        match self {
            Work::ReadFile { ingest_id, path } => EngineEvent::FileLoaded {
                ingest_id,
                result: read_upload(&path).await,
            },
            Work::Submit {
                submission_id,
                request,
            } => EngineEvent::SubmissionCompleted {
                submission_id,
                result: submitter.submit(request).await,
            },
        }
    }
}

/// Identity of a unit of work, kept so its failure can still be reported.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Read(IngestId),
    Submit(SubmissionId),
}

impl Pending {
    fn failed(self, reason: &str) -> EngineEvent {
        match self {
            Pending::Read(ingest_id) => EngineEvent::FileLoaded {
                ingest_id,
                result: Err(ReadError::Interrupted(reason.to_string())),
            },
            Pending::Submit(submission_id) => EngineEvent::SubmissionCompleted {
                submission_id,
                result: Err(SubmitError::new(FailureKind::Network, reason)),
            },
        }
    }
}

/// Handle to the background IO thread. Clones share the same thread and event queue.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: SubmitSettings) -> Result<Self, SubmitError> {
        let submitter = ReqwestSubmitter::new(settings)?;
        Ok(Self::with_submitter(Arc::new(submitter)))
    }

    pub fn with_submitter(submitter: Arc<dyn Submitter>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    let reason = format!("engine runtime unavailable: {err}");
                    fail_commands(&cmd_rx, &event_tx, &reason);
                    return;
                }
            };
            let mut error_timer = ReplaceableTimer::new(runtime.handle().clone());
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::ScheduleErrorClear { ticket, delay } => {
                        let event_tx = event_tx.clone();
                        error_timer.schedule(delay, move || {
                            let _ = event_tx.send(EngineEvent::ErrorClearDue { ticket });
                        });
                    }
                    EngineCommand::Work(work) => {
                        spawn_supervised(&runtime, submitter.clone(), work, event_tx.clone());
                    }
                }
            }
            engine_debug!("Engine command channel closed");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn read_file(
        &self,
        ingest_id: IngestId,
        path: impl Into<PathBuf>,
    ) -> Result<(), EngineStopped> {
        self.send(EngineCommand::Work(Work::ReadFile {
            ingest_id,
            path: path.into(),
        }))
    }

    pub fn submit(
        &self,
        submission_id: SubmissionId,
        request: SubmissionRequest,
    ) -> Result<(), EngineStopped> {
        self.send(EngineCommand::Work(Work::Submit {
            submission_id,
            request,
        }))
    }

    /// Schedules an `ErrorClearDue` event, replacing any clear still pending.
    pub fn schedule_error_clear(
        &self,
        ticket: ErrorTicket,
        delay: Duration,
    ) -> Result<(), EngineStopped> {
        self.send(EngineCommand::ScheduleErrorClear { ticket, delay })
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing arrived yet.
    pub fn wait_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        let rx = self.event_rx.lock().map_err(|_| EngineStopped)?;
        match rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.wait_event(timeout).ok().flatten()
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineStopped> {
        self.cmd_tx.send(command).map_err(|_| EngineStopped)
    }
}

/// Runs `work` on the runtime and reports its event, or a failure event if the task dies.
fn spawn_supervised(
    runtime: &Runtime,
    submitter: Arc<dyn Submitter>,
    work: Work,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let pending = work.pending();
    let task = runtime.spawn(async move { work.run(submitter.as_ref()).await });
    runtime.spawn(async move {
        let event = match task.await {
            Ok(event) => event,
            Err(err) => {
                engine_error!("Engine task for {:?} failed: {}", pending, err);
                pending.failed(&format!("engine task failed: {err}"))
            }
        };
        let _ = event_tx.send(event);
    });
}

/// Answers every command with a failure when no runtime could be started.
fn fail_commands(
    cmd_rx: &mpsc::Receiver<EngineCommand>,
    event_tx: &mpsc::Sender<EngineEvent>,
    reason: &str,
) {
    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Work(work) => {
                let _ = event_tx.send(work.pending().failed(reason));
            }
            EngineCommand::ScheduleErrorClear { ticket, delay } => {
                let event_tx = event_tx.clone();
                thread::spawn(move || {
                    thread::sleep(delay);
                    let _ = event_tx.send(EngineEvent::ErrorClearDue { ticket });
                });
            }
        }
    }
}
