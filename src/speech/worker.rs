//! Background speech jobs
//!
//! Runs a [`SpeechPipeline`] render on its own thread so an interactive loop
//! can keep polling for input. The outcome arrives on a channel; a cancelled
//! job never delivers audio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use tracing::{debug, warn};

use crate::dsp::EchoParameters;
use crate::error::EchovoxError;
use crate::speech::{SpeechPipeline, SpeechRequest};

/// Result of a background speech job
#[derive(Debug)]
pub enum SpeechOutcome {
    /// Encoded, echo-processed audio ready for playback
    Rendered(Vec<u8>),
    /// The job failed; the error is terminal for this request only
    Failed(EchovoxError),
    /// The job was cancelled and its result discarded
    Cancelled,
}

impl SpeechOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SpeechOutcome::Rendered(_))
    }
}

/// Handle to one background speech job
///
/// Dropping the handle cancels the job. The outcome is delivered once; polls
/// after delivery return `None`.
pub struct SpeechWorker {
    cancel: Arc<AtomicBool>,
    delivered: AtomicBool,
    receiver: Receiver<SpeechOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl SpeechWorker {
    /// Start rendering `request` on a background thread
    pub fn spawn(
        pipeline: Arc<SpeechPipeline>,
        request: SpeechRequest,
        params: EchoParameters,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = bounded(1);

        let job_cancel = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let result = pipeline.render_with_cancel(&request, &params, &job_cancel);

            let outcome = if job_cancel.load(Ordering::SeqCst) {
                SpeechOutcome::Cancelled
            } else {
                match result {
                    Ok(bytes) => SpeechOutcome::Rendered(bytes),
                    Err(EchovoxError::Cancelled) => SpeechOutcome::Cancelled,
                    Err(err) => {
                        warn!(error = %err, code = err.error_code(), "speech job failed");
                        SpeechOutcome::Failed(err)
                    }
                }
            };

            // Receiver may already be gone if the handle was dropped
            if sender.send(outcome).is_err() {
                debug!("speech outcome discarded; handle dropped");
            }
        });

        Self {
            cancel,
            delivered: AtomicBool::new(false),
            receiver,
            handle: Some(handle),
        }
    }

    /// Request cancellation; the job stops at its next stage boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Non-blocking poll for the outcome
    ///
    /// Returns `None` while the job is still running and after the outcome
    /// has already been returned.
    pub fn try_outcome(&self) -> Option<SpeechOutcome> {
        if self.is_delivered() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(outcome) => Some(self.deliver(outcome)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(SpeechOutcome::Failed(EchovoxError::WorkerDisconnected))
            }
        }
    }

    /// Wait up to `timeout` for the outcome
    pub fn wait_timeout(&self, timeout: Duration) -> Option<SpeechOutcome> {
        if self.is_delivered() {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(self.deliver(outcome)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                Some(SpeechOutcome::Failed(EchovoxError::WorkerDisconnected))
            }
        }
    }

    /// Block until the job finishes
    ///
    /// Returns `None` if a poll already returned the outcome.
    pub fn wait(mut self) -> Option<SpeechOutcome> {
        if self.is_delivered() {
            return None;
        }
        let outcome = match self.receiver.recv() {
            Ok(outcome) => self.deliver(outcome),
            Err(_) => SpeechOutcome::Failed(EchovoxError::WorkerDisconnected),
        };
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("speech worker thread panicked");
            }
        }
        Some(outcome)
    }

    fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::SeqCst)
    }

    // A cancel that races with a finished render still discards the audio
    fn deliver(&self, outcome: SpeechOutcome) -> SpeechOutcome {
        self.delivered.store(true, Ordering::SeqCst);
        if self.is_cancelled() {
            SpeechOutcome::Cancelled
        } else {
            outcome
        }
    }
}

impl Drop for SpeechWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}
