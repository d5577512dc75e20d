//! In-memory stand-ins for the queue, transform and mail services.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use queue_digest::ai::prompt_builder::CONDENSE_INSTRUCTION;
use queue_digest::ai::{TextTransform, TransformRequest};
use queue_digest::core::config::AppConfig;
use queue_digest::core::models::QueueItem;
use queue_digest::email::{NotificationService, OutboundEmail};
use queue_digest::errors::{DigestError, TransformError};
use queue_digest::queue::QueueService;

/// Shared, ordered record of every call the fakes see.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn item(id: &str, content: &str) -> QueueItem {
    QueueItem::new(id, format!("token-{id}"), content)
}

pub struct FakeQueue {
    items: Vec<QueueItem>,
    fail_receive: bool,
    fail_removal: HashSet<String>,
    log: CallLog,
}

impl FakeQueue {
    pub fn new(items: Vec<QueueItem>, log: CallLog) -> Self {
        Self {
            items,
            fail_receive: false,
            fail_removal: HashSet::new(),
            log,
        }
    }

    pub fn failing_receive(log: CallLog) -> Self {
        Self {
            fail_receive: true,
            ..Self::new(Vec::new(), log)
        }
    }

    pub fn fail_removal_of(mut self, id: &str) -> Self {
        self.fail_removal.insert(id.to_string());
        self
    }

    pub fn removed(&self) -> Vec<String> {
        entries(&self.log)
            .into_iter()
            .filter_map(|e| e.strip_prefix("remove:").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl QueueService for FakeQueue {
    async fn receive(&self, max_count: usize) -> Result<Vec<QueueItem>, DigestError> {
        self.log.lock().unwrap().push(format!("receive:{max_count}"));
        if self.fail_receive {
            return Err(DigestError::AcquisitionError("queue unavailable".to_string()));
        }
        Ok(self.items.iter().take(max_count).cloned().collect())
    }

    async fn remove(&self, id: &str, removal_token: &str) -> Result<(), DigestError> {
        assert_eq!(removal_token, format!("token-{id}"), "token must match id");
        if self.fail_removal.contains(id) {
            self.log.lock().unwrap().push(format!("remove-failed:{id}"));
            return Err(DigestError::RemovalError(format!("{id}: rejected")));
        }
        self.log.lock().unwrap().push(format!("remove:{id}"));
        Ok(())
    }
}

/// Deterministic transform: the condense pass yields `c(<text>)`, the shorten
/// pass `s(<text>)`. Any input listed in `failing` fails with a 500.
pub struct EchoTransform {
    failing: HashSet<String>,
    log: CallLog,
}

impl EchoTransform {
    pub fn new(log: CallLog) -> Self {
        Self {
            failing: HashSet::new(),
            log,
        }
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }
}

#[async_trait]
impl TextTransform for EchoTransform {
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        let condense = request.system_instruction == CONDENSE_INSTRUCTION;
        self.log.lock().unwrap().push(format!(
            "{}:{}",
            if condense { "condense" } else { "shorten" },
            request.user_text
        ));
        if request.user_text.starts_with("slow") {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }
        if self.failing.contains(&request.user_text) {
            return Err(TransformError::Api {
                status: 500,
                body: "model overloaded".to_string(),
            });
        }
        Ok(if condense {
            format!("c({})", request.user_text)
        } else {
            format!("s({})", request.user_text)
        })
    }
}

/// Hands out pre-scripted responses in call order.
pub struct ScriptedTransform {
    responses: Mutex<VecDeque<Result<String, TransformError>>>,
    pub requests: Mutex<Vec<TransformRequest>>,
}

impl ScriptedTransform {
    pub fn new(responses: Vec<Result<String, TransformError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextTransform for ScriptedTransform {
    async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransformError::EmptyResponse))
    }
}

pub struct FakeNotifier {
    fail: bool,
    log: CallLog,
    pub sent: Mutex<Vec<OutboundEmail>>,
}

impl FakeNotifier {
    pub fn new(log: CallLog) -> Self {
        Self {
            fail: false,
            log,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(log: CallLog) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }
}

#[async_trait]
impl NotificationService for FakeNotifier {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DigestError> {
        self.log.lock().unwrap().push("send".to_string());
        if self.fail {
            return Err(DigestError::DeliveryError("SMTP send failed: 554".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("DIGEST_QUEUE_URL", "https://sqs.us-east-1.amazonaws.com/123/digest"),
        ("OPENAI_API_KEY", "sk-test"),
        ("MAIL_ACCOUNT", "digest@example.com"),
        ("MAIL_PASSWORD", "secret"),
        ("MAIL_TO", "reader@example.com"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
}
