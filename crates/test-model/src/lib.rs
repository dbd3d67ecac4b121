//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hemachat_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the outcome script, which is
/// how the model should respond to each request, in submission order. If
/// there are no outcomes left in the script, an error will be returned.
///
/// Clones share the script, the request log and the request counter, so a
/// test can keep a clone to observe the provider after moving it into the
/// code under test.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<VecDeque<PresetOutcome>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
    request_count: Arc<AtomicUsize>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends an outcome to the script.
    #[inline]
    pub fn add_outcome(&mut self, outcome: PresetOutcome) {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(outcome);
    }

    /// Makes every request resolve after the given delay.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns how many requests have been sent to this provider.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Returns the most recent request, if any.
    #[inline]
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .last()
            .cloned()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .push(req.clone());
        let outcome = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match outcome {
                Some(PresetOutcome::Reply(content)) => {
                    Ok(ModelReply::with_content(content))
                }
                Some(PresetOutcome::EmptyReply) => Ok(ModelReply::default()),
                Some(PresetOutcome::Failure(kind)) => Err(Error {
                    message: "scripted failure",
                    kind,
                }),
                None => Err(Error {
                    message: "no outcomes left in the script",
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}
