use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use interpreter_core::{
    AssistantReply, Effect, LoadedUpload, Msg, ParseFailure, SubmissionPayload, SubmitFailure,
    UploadedFile,
};
use interpreter_engine::{
    AnalysisReply, EngineEvent, EngineHandle, EngineStopped, LoadedTable, ReadError,
    SubmissionRequest, SubmitError, SubmitSettings,
};

use super::app::AppEvent;

pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(settings: SubmitSettings, msg_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine, msg_tx };
        runner.spawn_event_loop();
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let fallback = undelivered(&effect);
            let sent = match effect {
                Effect::ReadFile { ingest_id, path } => {
                    engine_info!("ReadFile ingest_id={} path={:?}", ingest_id, path);
                    self.engine.read_file(ingest_id, path)
                }
                Effect::SendSubmission {
                    submission_id,
                    payload,
                } => {
                    engine_info!(
                        "SendSubmission submission_id={} file_bytes={}",
                        submission_id,
                        payload.file.size()
                    );
                    self.engine.submit(submission_id, to_request(payload))
                }
                Effect::ScheduleErrorClear { ticket, delay } => {
                    engine_debug!("ScheduleErrorClear ticket={} delay={:?}", ticket, delay);
                    self.engine.schedule_error_clear(ticket, delay)
                }
            };
            if let Err(err) = sent {
                engine_error!("Effect not delivered: {}", err);
                self.deliver_fallback(fallback);
            }
        }
    }

    fn deliver_fallback(&self, fallback: Fallback) {
        match fallback {
            Fallback::Now(msg) => {
                let _ = self.msg_tx.send(AppEvent::Core(msg));
            }
            Fallback::After(delay, msg) => {
                let msg_tx = self.msg_tx.clone();
                thread::spawn(move || {
                    thread::sleep(delay);
                    let _ = msg_tx.send(AppEvent::Core(msg));
                });
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            let msg = match engine.wait_event(Duration::from_millis(100)) {
                Ok(Some(event)) => map_event(event),
                Ok(None) => continue,
                Err(err) => {
                    engine_error!("Engine event stream closed: {}", err);
                    let _ = msg_tx.send(AppEvent::Core(Msg::EngineStopped));
                    break;
                }
            };
            if msg_tx.send(AppEvent::Core(msg)).is_err() {
                break;
            }
        });
    }
}

/// What the core must hear instead when an effect cannot reach the engine.
#[derive(Debug, PartialEq, Eq)]
enum Fallback {
    Now(Msg),
    After(Duration, Msg),
}

fn undelivered(effect: &Effect) -> Fallback {
    let reason = EngineStopped.to_string();
    match effect {
        Effect::ReadFile { ingest_id, .. } => Fallback::Now(Msg::FileLoaded {
            ingest_id: *ingest_id,
            result: Err(ParseFailure::Unreadable(reason)),
        }),
        Effect::SendSubmission { submission_id, .. } => Fallback::Now(Msg::SubmissionFinished {
            submission_id: *submission_id,
            result: Err(SubmitFailure::TransportOrServer(reason)),
        }),
        Effect::ScheduleErrorClear { ticket, delay } => {
            Fallback::After(*delay, Msg::ErrorClearDue { ticket: *ticket })
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::FileLoaded { ingest_id, result } => Msg::FileLoaded {
            ingest_id,
            result: map_loaded(result),
        },
        EngineEvent::SubmissionCompleted {
            submission_id,
            result,
        } => Msg::SubmissionFinished {
            submission_id,
            result: map_reply(result),
        },
        EngineEvent::ErrorClearDue { ticket } => Msg::ErrorClearDue { ticket },
    }
}

fn map_loaded(result: Result<LoadedTable, ReadError>) -> Result<LoadedUpload, ParseFailure> {
    match result {
        Ok(table) => Ok(LoadedUpload {
            file: UploadedFile::new(table.file_name, table.bytes),
            rows: table.rows,
        }),
        Err(ReadError::Empty) => Err(ParseFailure::Empty),
        Err(err) => {
            engine_warn!("File read failed: {}", err);
            Err(ParseFailure::Unreadable(err.to_string()))
        }
    }
}

fn map_reply(result: Result<AnalysisReply, SubmitError>) -> Result<AssistantReply, SubmitFailure> {
    match result {
        Ok(reply) => Ok(AssistantReply {
            answer: reply.answer,
            images: reply.images,
        }),
        Err(err) if err.kind.is_payload_too_large() => Err(SubmitFailure::PayloadTooLarge),
        Err(err) => Err(SubmitFailure::TransportOrServer(err.to_string())),
    }
}

fn to_request(payload: SubmissionPayload) -> SubmissionRequest {
    SubmissionRequest {
        file_name: payload.file.name,
        file_bytes: payload.file.bytes,
        column_data: payload.column_data,
        messages: payload.messages,
        model: payload.model.as_str().to_string(),
        allow_logging: payload.allow_logging,
    }
}
