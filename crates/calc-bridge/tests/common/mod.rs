//! Shared test helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use calc_bridge::{BridgeConfig, BridgeError, CalcBridge, HostUi, HttpReply, Result, Transport};
use calc_bridge_core::Workbook;

/// A request as the mock transport saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

/// Transport that records every call and answers from a queue
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<VecDeque<Result<HttpReply>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: HttpReply) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn reply_json(self, status: u16, body: serde_json::Value) -> Self {
        self.reply(HttpReply::json(status, body.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(BridgeError::Transport(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RecordedCall) -> Result<HttpReply> {
        self.calls.lock().unwrap().push(call);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::Transport("no reply queued".into())))
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpReply> {
        self.answer(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
        })
    }

    fn get(&self, url: &str) -> Result<HttpReply> {
        self.answer(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
        })
    }
}

pub fn config() -> BridgeConfig {
    BridgeConfig::new("http://calc.test", "http://batch.test").unwrap()
}

pub fn bridge(transport: MockTransport) -> CalcBridge<MockTransport> {
    CalcBridge::with_transport(config(), transport)
}

/// Alerts and toasts collected in order
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub alerts: Vec<String>,
    pub toasts: Vec<String>,
}

impl HostUi for RecordingUi {
    fn alert(&mut self, _title: &str, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn toast(&mut self, _title: &str, message: &str) {
        self.toasts.push(message.to_string());
    }
}

/// A small model sheet: inputs in column A, formulas in column B
pub fn model_workbook() -> Workbook {
    let mut wb = Workbook::empty();
    wb.add_worksheet_with_name("Model").unwrap();
    let ws = wb.worksheet_by_name_mut("Model").unwrap();
    ws.set_cell_value("A1", 10).unwrap();
    ws.set_cell_formula("B1", "=A1*2").unwrap();
    ws.set_cell_value("A2", 20).unwrap();
    ws.set_cell_value("B2", "=A2*2").unwrap();
    wb
}
