//! Off-thread WAV decoding
//!
//! The buffer is moved into a dedicated worker thread, which sends back
//! exactly one message and exits. A worker that dies before sending is
//! reported as `WorkerFailure`, distinct from a decode error.

use crate::error::{Error, Result};
use crate::model::AudioData;
use crate::wav;
use std::any::Any;
use std::sync::mpsc;
use std::thread;

/// The single message a decode worker sends back
#[derive(Debug)]
pub enum WorkerMessage<T> {
    Decoded(T),
    Failed(Error),
}

/// Decode a WAV buffer on a worker thread, taking ownership of the buffer
pub fn decode_wav_in_worker(buffer: Vec<u8>) -> Result<AudioData> {
    log::debug!("Handing {} bytes to WAV decode worker", buffer.len());
    run_in_worker("wav-decoder", move || wav::decode(&buffer))
}

/// Run `job` on a named thread and wait for its one message
pub(crate) fn run_in_worker<T, F>(name: &str, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<WorkerMessage<T>>(1);

    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let message = match job() {
                Ok(value) => WorkerMessage::Decoded(value),
                Err(e) => WorkerMessage::Failed(e),
            };
            // receiver only disappears if the caller is gone
            let _ = tx.send(message);
        })
        .map_err(|e| Error::WorkerFailure {
            reason: format!("failed to spawn {} worker: {}", name, e),
        })?;

    let message = rx.recv();
    let exit = handle.join();

    match (message, exit) {
        (Ok(WorkerMessage::Decoded(value)), _) => Ok(value),
        (Ok(WorkerMessage::Failed(e)), _) => Err(e),
        (Err(_), Err(panic)) => Err(Error::WorkerFailure {
            reason: format!("{} worker panicked: {}", name, panic_message(&*panic)),
        }),
        (Err(_), Ok(())) => Err(Error::WorkerFailure {
            reason: format!("{} worker exited without sending a result", name),
        }),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
