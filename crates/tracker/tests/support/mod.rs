//! In-memory stand-ins for the REST client, terminal, and pacer.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dispatch::{Pacer, Pause, RepositoryId, RestClient, Terminal, TransportError};
use serde_json::Value;

pub fn repo() -> RepositoryId {
    RepositoryId::new("OWNER/REPO").unwrap()
}

// ---------------------------------------------------------------------------
// REST client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

enum Reply {
    Body(String),
    Fail(TransportError),
}

/// Answers each registered (method, path) once, in registration order, and
/// records every call it receives. Unregistered calls fail.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, method: Method, path: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_get(self, path: &str, body: &str) -> Self {
        self.push(Method::Get, path, Reply::Body(body.to_owned()))
    }

    pub fn on_post(self, path: &str, body: &str) -> Self {
        self.push(Method::Post, path, Reply::Body(body.to_owned()))
    }

    pub fn fail_get(self, path: &str, error: TransportError) -> Self {
        self.push(Method::Get, path, Reply::Fail(error))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    /// Registered replies that were never requested.
    pub fn unused(&self) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|((method, path), queue)| format!("{method:?} {path} x{}", queue.len()))
            .collect()
    }

    fn answer(&self, method: Method, path: &str, body: Option<Value>) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_owned(),
            body,
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&(method, path.to_owned()))
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(error)) => Err(error),
            None => Err(TransportError::Connection(format!(
                "no stub registered for {method:?} {path}"
            ))),
        }
    }
}

#[async_trait]
impl RestClient for ScriptedClient {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        self.answer(Method::Get, path, None)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String, TransportError> {
        self.answer(Method::Post, path, Some(body.clone()))
    }
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Enter,
    Leave,
    Refresh,
    Frame(String),
}

/// Records screen operations; frames are appended to `stdout`.
#[derive(Debug, Default)]
pub struct RecordingTerminal {
    pub events: Vec<ScreenEvent>,
    pub fail_writes: bool,
}

impl RecordingTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                ScreenEvent::Frame(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ScreenEvent::Frame(_)))
            .count()
    }

    /// `true` when every enter has a matching leave.
    pub fn screen_restored(&self) -> bool {
        let enters = self.events.iter().filter(|e| **e == ScreenEvent::Enter).count();
        let leaves = self.events.iter().filter(|e| **e == ScreenEvent::Leave).count();
        enters == leaves && self.events.last() != Some(&ScreenEvent::Enter)
    }
}

impl Terminal for RecordingTerminal {
    fn enter_alternate_screen(&mut self) -> io::Result<()> {
        self.events.push(ScreenEvent::Enter);
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> io::Result<()> {
        self.events.push(ScreenEvent::Leave);
        Ok(())
    }

    fn refresh_screen(&mut self) -> io::Result<()> {
        self.events.push(ScreenEvent::Refresh);
        Ok(())
    }

    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
        }
        self.events.push(ScreenEvent::Frame(frame.to_owned()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// Returns immediately, recording each requested interval. Optionally reports
/// an interrupt on the n-th pause (1-based).
#[derive(Debug, Default)]
pub struct InstantPacer {
    pauses: Mutex<Vec<Duration>>,
    interrupt_on: Option<usize>,
}

impl InstantPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupting_on(pause: usize) -> Self {
        Self {
            interrupt_on: Some(pause),
            ..Self::default()
        }
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, interval: Duration) -> Pause {
        let mut pauses = self.pauses.lock().unwrap();
        pauses.push(interval);
        if self.interrupt_on == Some(pauses.len()) {
            Pause::Interrupted
        } else {
            Pause::Elapsed
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const JOBS_ONE_PASSED_BUILD: &str = r#"{
  "total_count": 1,
  "jobs": [
    {
      "id": 123,
      "run_id": 123,
      "name": "build",
      "status": "completed",
      "conclusion": "success",
      "started_at": "2022-07-20T11:20:13Z",
      "completed_at": "2022-07-20T11:22:12Z",
      "steps": [
        {"name": "Run actions/checkout@v2", "status": "completed", "conclusion": "success", "number": 1},
        {"name": "Test", "status": "completed", "conclusion": "success", "number": 2}
      ]
    }
  ]
}"#;

pub fn run_json(id: u64, status: &str) -> String {
    format!(r#"{{"id": {id}, "workflow_id": 456, "name": "foo", "status": "{status}"}}"#)
}

pub fn listing_json(runs: &[(u64, &str)]) -> String {
    let runs: Vec<String> = runs.iter().map(|(id, status)| run_json(*id, status)).collect();
    format!(
        r#"{{"total_count": {}, "workflow_runs": [{}]}}"#,
        runs.len(),
        runs.join(",")
    )
}
