use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Replays canned responses by exact URL. The last queued response for a URL
/// repeats; an unknown URL is a 404.
#[derive(Default)]
pub struct StubHttp {
    routes: Mutex<HashMap<String, VecDeque<Result<String, HttpError>>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.to_string()))
    }

    pub fn fail(self, url: &str, err: HttpError) -> Self {
        self.push(url, Err(err))
    }

    fn push(self, url: &str, outcome: Result<String, HttpError>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }
}

#[async_trait]
impl HttpClient for StubHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());

        let outcome = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&request.url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match outcome {
            Some(Ok(body)) => Ok(HttpResponse {
                status: 200,
                url: request.url,
                body,
            }),
            Some(Err(e)) => Err(e),
            None => Err(HttpError::Status {
                status: 404,
                body: String::new(),
            }),
        }
    }
}
