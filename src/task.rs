//! One-shot background tasks.
//!
//! Every call to [`run_in_background`] creates a fresh execution context (an
//! OS thread natively, a web worker on the web), sends it one request and
//! resolves once its single response arrives. Contexts are never reused.

use engine::{tracing, Image, Luminance, PermutationSet, PixelBuffer, WorkRequest, WorkResponse};
#[cfg(not(target_arch = "wasm32"))]
use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Script the web worker is started from. Built from the `task_worker` crate.
#[cfg(target_arch = "wasm32")]
pub const WORKER_SCRIPT: &str = "./task_worker.js";

/// A computation that can be shipped to a background context as a
/// [`WorkRequest`] and answered with a [`WorkResponse`].
pub trait BackgroundTask: 'static {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Used to name the background context.
    const NAME: &'static str;

    fn request(input: Self::Input) -> WorkRequest;

    fn response(response: WorkResponse) -> Result<Self::Output>;

    /// What runs inside the background context.
    fn execute(input: Self::Input) -> Result<Self::Output> {
        Self::response(task_worker::handle_request(Self::request(input)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn run_in_background<T: BackgroundTask>(input: T::Input) -> Result<T::Output> {
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name(format!("{}-worker", T::NAME))
        .spawn(move || {
            let output = T::execute(input);
            if tx.send(output).is_err() {
                tracing::debug!("{} output dropped before it was received", T::NAME);
            }
        })
        .map_err(|err| Error::Spawn(err.to_string()))?;
    tracing::debug!("started {} background context", T::NAME);

    // a panicking context drops the sender without answering
    rx.await.map_err(|_| Error::Disconnected)?
}

#[cfg(target_arch = "wasm32")]
pub async fn run_in_background<T: BackgroundTask>(input: T::Input) -> Result<T::Output> {
    use std::{cell::RefCell, rc::Rc};

    use js_sys::Uint8Array;
    use tokio::sync::oneshot;
    use wasm_bindgen::{prelude::*, JsCast};
    use web_sys::{ErrorEvent, Event, MessageEvent, Worker};

    let request = T::request(input).to_bytes().map_err(Error::Crashed)?;

    let worker = Worker::new(WORKER_SCRIPT).map_err(|err| Error::Spawn(format!("{:?}", err)))?;
    tracing::debug!("started {} web worker", T::NAME);

    let (tx, rx) = oneshot::channel::<Result<Vec<u8>>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let onmessage = {
        let tx = tx.clone();
        Closure::wrap(Box::new(move |event: MessageEvent| {
            let data: Uint8Array = event.data().unchecked_into();
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(data.to_vec()));
            }
        }) as Box<dyn FnMut(_)>)
    };
    let onerror = {
        let tx = tx.clone();
        // a script that fails to load fires a plain `Event`, not an `ErrorEvent`
        Closure::wrap(Box::new(move |event: Event| {
            let message = event.dyn_ref::<ErrorEvent>().map(ErrorEvent::message);
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(worker_failure(message)));
            }
        }) as Box<dyn FnMut(_)>)
    };
    worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    worker.set_onerror(Some(onerror.as_ref().unchecked_ref()));

    let posted = worker
        .post_message(&Uint8Array::from(request.as_slice()))
        .map_err(|err| Error::Spawn(format!("{:?}", err)));
    let received = match posted {
        Ok(()) => rx.await.map_err(|_| Error::Disconnected).and_then(|res| res),
        Err(err) => Err(err),
    };

    worker.terminate();
    drop((onmessage, onerror));

    T::response(WorkResponse::from_bytes(&received?))
}

/// Maps a worker error event to an error. Events without a message come from
/// a worker whose script never ran.
pub fn worker_failure(message: Option<String>) -> Error {
    match message {
        Some(message) if !message.is_empty() => Error::Crashed(message),
        _ => Error::Spawn(String::from("worker script failed to load")),
    }
}

/// Generates permutations in a background context.
pub struct PermutationTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationInput {
    pub size: i64,
    pub limit: u32,
}

impl BackgroundTask for PermutationTask {
    type Input = PermutationInput;
    type Output = PermutationSet;

    const NAME: &'static str = "permutations";

    fn request(input: Self::Input) -> WorkRequest {
        WorkRequest::Permutations {
            size: input.size,
            limit: input.limit,
        }
    }

    fn response(response: WorkResponse) -> Result<Self::Output> {
        match response {
            WorkResponse::Permutations(set) => Ok(set),
            WorkResponse::Failed(err) => Err(err.into()),
            other => Err(Error::UnexpectedResponse {
                task: Self::NAME,
                got: other.kind(),
            }),
        }
    }
}

/// Converts an image to grayscale in a background context.
pub struct GrayscaleTask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleInput {
    pub image: Image,
    pub luminance: Luminance,
}

impl BackgroundTask for GrayscaleTask {
    type Input = GrayscaleInput;
    type Output = PixelBuffer;

    const NAME: &'static str = "grayscale";

    fn request(input: Self::Input) -> WorkRequest {
        let (width, height, pixels) = input.image.into_parts();
        WorkRequest::Grayscale {
            pixels: pixels.into_vec(),
            width,
            height,
            luminance: input.luminance,
        }
    }

    fn response(response: WorkResponse) -> Result<Self::Output> {
        match response {
            WorkResponse::Grayscale(pixels) => Ok(pixels),
            WorkResponse::Failed(err) => Err(err.into()),
            other => Err(Error::UnexpectedResponse {
                task: Self::NAME,
                got: other.kind(),
            }),
        }
    }
}

/// Generates permutations on the calling thread.
pub fn permutations_inline(size: i64, limit: u32) -> Result<PermutationSet> {
    Ok(engine::permutations_with_limit(size, limit)?)
}

pub async fn permutations_offloaded(size: i64, limit: u32) -> Result<PermutationSet> {
    run_in_background::<PermutationTask>(PermutationInput { size, limit }).await
}

pub async fn grayscale_offloaded(image: Image, luminance: Luminance) -> Result<PixelBuffer> {
    run_in_background::<GrayscaleTask>(GrayscaleInput { image, luminance }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::EngineError;

    #[test]
    fn mismatched_response_is_reported() {
        let err = PermutationTask::response(WorkResponse::Grayscale(PixelBuffer::default())).unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedResponse {
                task: "permutations",
                got: "grayscale"
            }
        );
        assert!(err.is_background_failure());
    }

    #[test]
    fn failed_response_becomes_engine_error() {
        let err = GrayscaleTask::response(WorkResponse::Failed(EngineError::MisalignedBuffer { len: 3 })).unwrap_err();
        assert_eq!(err, Error::Engine(EngineError::MisalignedBuffer { len: 3 }));
        assert!(!err.is_background_failure());
    }

    #[test]
    fn worker_error_events_always_map_to_an_error() {
        assert_eq!(
            worker_failure(Some("boom".to_string())),
            Error::Crashed("boom".to_string())
        );
        assert!(matches!(worker_failure(None), Error::Spawn(_)));
        assert!(matches!(worker_failure(Some(String::new())), Error::Spawn(_)));
        assert!(worker_failure(None).is_background_failure());
    }

    #[test]
    fn inline_rejects_negative_size() {
        assert_eq!(
            permutations_inline(-1, 10).unwrap_err(),
            Error::Engine(EngineError::NegativeSize(-1))
        );
    }
}
