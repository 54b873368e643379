use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::{Method, StatusCode};
use yad2_scraper::{HttpRequest, Response, Transport, TransportError, TransportErrorKind};

pub const PAGE_BODY: &str =
    r#"<html><body><a href="https://www.yad2.co.il/">yad2</a></body></html>"#;

pub type Outcome = Result<Response, TransportError>;

pub fn page(status: StatusCode, body: &str) -> Outcome {
    let url = "https://www.yad2.co.il/vehicles/cars";
    Ok(Response::new(Method::GET, url, status, body))
}

pub fn ok_page() -> Outcome {
    page(StatusCode::OK, PAGE_BODY)
}

pub fn connection_refused() -> Outcome {
    Err(TransportError::new(
        TransportErrorKind::Connect,
        "connection refused",
    ))
}

/// What the scraper handed to the transport.
#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    closes: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Replays canned outcomes in order; runs dry with a connection error.
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Outcome>>,
    recorder: Recorder,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Outcome>) -> (Self, Recorder) {
        let recorder = Recorder::default();
        let transport = Self {
            outcomes: Mutex::new(outcomes.into()),
            recorder: recorder.clone(),
        };
        (transport, recorder)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError> {
        self.recorder.requests.lock().unwrap().push(request.clone());
        let outcome = self.outcomes.lock().unwrap().pop_front();
        outcome.unwrap_or_else(connection_refused)
    }

    fn close(&mut self) {
        self.recorder.closes.fetch_add(1, Ordering::SeqCst);
    }
}
