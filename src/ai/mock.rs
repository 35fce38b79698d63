use super::{VisionRequest, VisionService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Content(String),
    Empty,
    Status(u16),
}

pub struct MockVisionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    requests: Arc<Mutex<Vec<VisionRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_content_response(self, content: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Content(content));
        self
    }

    pub fn with_empty_response(self) -> Self {
        self.replies.lock().unwrap().push(MockReply::Empty);
        self
    }

    pub fn with_status_error(self, status: u16) -> Self {
        self.replies.lock().unwrap().push(MockReply::Status(status));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn last_request(&self) -> Option<VisionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn complete(&self, _api_key: &str, request: &VisionRequest) -> Result<Option<String>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.requests.lock().unwrap().push(request.clone());

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            // Minimal well-formed analysis
            return Ok(Some(
                r#"{"currentScore": 6.0, "potentialScore": 8.0, "summary": "Mock analysis."}"#
                    .to_string(),
            ));
        }

        let index = (*count - 1) % replies.len();
        match &replies[index] {
            MockReply::Content(content) => Ok(Some(content.clone())),
            MockReply::Empty => Ok(None),
            MockReply::Status(status) => Err(Error::UpstreamStatus { status: *status }),
        }
    }
}
