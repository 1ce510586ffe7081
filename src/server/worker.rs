// ============================================================
// Layer 4 — Inference Worker
// ============================================================
// Burn modules are Send but not Sync, so the model can't sit
// behind a shared reference in the router state. Instead one
// dedicated thread owns the Forecaster and serves jobs from a
// channel; handlers await a oneshot reply.
//
//   handler ──Job{input, reply}──▶ mpsc ──▶ "inference" thread
//   handler ◀──────── oneshot ◀──── forecaster.predict(input)
//
// Jobs run one at a time in arrival order. The thread exits
// once every InferenceWorker handle has been dropped.
//
// A panic inside the forecaster is caught and answered as an
// inference error, so one bad job can't take the thread down
// while /health still reports the model as loaded.

use anyhow::{anyhow, Context, Result};
use std::{
    any::Any,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::mpsc,
    thread,
};
use tokio::sync::oneshot;

use crate::domain::matrix::ImageMatrix;
use crate::domain::prediction::Prediction;
use crate::domain::traits::Forecaster;
use crate::server::error::PredictError;

struct Job {
    input: ImageMatrix,
    reply: oneshot::Sender<Result<Prediction>>,
}

/// Cloneable handle to the inference thread.
#[derive(Clone)]
pub struct InferenceWorker {
    jobs: mpsc::Sender<Job>,
}

impl InferenceWorker {
    /// Move `forecaster` onto a new "inference" thread.
    pub fn spawn<F>(forecaster: F) -> Result<Self>
    where
        F: Forecaster + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Job>();

        thread::Builder::new()
            .name("inference".into())
            .spawn(move || {
                for job in queue {
                    let result = catch_unwind(AssertUnwindSafe(|| forecaster.predict(&job.input)))
                        .unwrap_or_else(|payload| Err(panic_error(payload)));
                    // Receiver gone means the client hung up.
                    let _ = job.reply.send(result);
                }
                tracing::debug!("Inference worker stopped");
            })
            .context("Cannot spawn inference thread")?;

        Ok(Self { jobs })
    }

    /// Queue one job and wait for its result. Every failure on the
    /// worker side comes back as [`PredictError::Inference`].
    pub async fn predict(&self, input: ImageMatrix) -> Result<Prediction, PredictError> {
        let (reply, response) = oneshot::channel();
        self.jobs
            .send(Job { input, reply })
            .map_err(|_| PredictError::Inference("inference worker has stopped".into()))?;

        response
            .await
            .map_err(|_| PredictError::Inference("inference worker dropped the request".into()))?
            .map_err(|e| PredictError::Inference(format!("{e:#}")))
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let msg = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    tracing::error!("Forecaster panicked: {msg}");
    anyhow!("forecaster panicked: {msg}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matrix::{FEATURES, SLOTS};
    use crate::domain::prediction::RawPrediction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl Forecaster for Counting {
        fn forecast(&self, input: &ImageMatrix) -> Result<RawPrediction> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let first = input.rows()[0][0];
            Ok(RawPrediction { schedule_prob: [first; SLOTS], quantity: [first; SLOTS] })
        }
    }

    struct Failing;

    impl Forecaster for Failing {
        fn forecast(&self, _input: &ImageMatrix) -> Result<RawPrediction> {
            anyhow::bail!("forward pass exploded")
        }
    }

    /// Panics on the first call only.
    struct PanicsOnce(AtomicUsize);

    impl Forecaster for PanicsOnce {
        fn forecast(&self, _input: &ImageMatrix) -> Result<RawPrediction> {
            if self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("index out of bounds");
            }
            Ok(RawPrediction { schedule_prob: [0.9; SLOTS], quantity: [1.0; SLOTS] })
        }
    }

    #[tokio::test]
    async fn test_jobs_reach_the_forecaster() {
        let calls  = Arc::new(AtomicUsize::new(0));
        let worker = InferenceWorker::spawn(Counting(calls.clone())).unwrap();

        let input = ImageMatrix::new([[0.75; FEATURES]; SLOTS]);
        let p = worker.predict(input).await.unwrap();
        assert_eq!(p.schedule, [1; SLOTS]);
        assert_eq!(p.quantity, [0.75; SLOTS]);

        let clone = worker.clone();
        clone.predict(input).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_forecaster_error_is_reported() {
        let worker = InferenceWorker::spawn(Failing).unwrap();
        let input  = ImageMatrix::new([[0.0; FEATURES]; SLOTS]);
        match worker.predict(input).await {
            Err(PredictError::Inference(msg)) => assert!(msg.contains("exploded")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_worker_survives_a_panicking_forecaster() {
        let worker = InferenceWorker::spawn(PanicsOnce(AtomicUsize::new(0))).unwrap();
        let input  = ImageMatrix::new([[0.0; FEATURES]; SLOTS]);

        match worker.predict(input).await {
            Err(PredictError::Inference(msg)) => {
                assert!(msg.contains("panicked"));
                assert!(msg.contains("index out of bounds"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let p = worker.predict(input).await.unwrap();
        assert_eq!(p.schedule, [1; SLOTS]);
    }
}
