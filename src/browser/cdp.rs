use crate::error::{Result, SuiteError};
use base64::Engine as _;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const ATTACH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// In-flight network requests of the attached page, fed by `Network.*` events.
#[derive(Debug)]
pub struct NetworkActivity {
    inflight: HashSet<String>,
    last_change: Instant,
}

impl Default for NetworkActivity {
    fn default() -> Self {
        Self {
            inflight: HashSet::new(),
            last_change: Instant::now(),
        }
    }
}

impl NetworkActivity {
    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    /// No request in flight for at least `quiet`.
    pub fn is_idle_for(&self, quiet: Duration) -> bool {
        self.inflight.is_empty() && self.last_change.elapsed() >= quiet
    }

    fn started(&mut self, request_id: &str) {
        self.inflight.insert(request_id.to_string());
        self.last_change = Instant::now();
    }

    fn finished(&mut self, request_id: &str) {
        if self.inflight.remove(request_id) {
            self.last_change = Instant::now();
        }
    }

    fn reset(&mut self) {
        self.inflight.clear();
        self.last_change = Instant::now();
    }
}

/// Apply one CDP event. Returns true for a main-frame navigation.
fn apply_event(method: &str, params: &Value, network: &mut NetworkActivity) -> bool {
    let request_id = params.get("requestId").and_then(Value::as_str);
    match method {
        "Page.frameNavigated" => {
            let is_main = params
                .get("frame")
                .map(|f| f.get("parentId").is_none())
                .unwrap_or(false);
            if is_main {
                network.reset();
            }
            is_main
        }
        "Network.requestWillBeSent" => {
            if let Some(id) = request_id {
                network.started(id);
            }
            false
        }
        "Network.loadingFinished" | "Network.loadingFailed" => {
            if let Some(id) = request_id {
                network.finished(id);
            }
            false
        }
        _ => false,
    }
}

/// Split a CDP response into its `result` or a protocol error.
fn parse_response(method: &str, response: Value) -> Result<Value> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(SuiteError::Cdp {
            method: method.to_string(),
            message,
        });
    }
    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

/// Unwrap a `Runtime.evaluate` result, surfacing page exceptions.
fn evaluation_value(result: Value) -> Result<Value> {
    if let Some(details) = result.get("exceptionDetails") {
        let message = details
            .get("exception")
            .and_then(|e| e.get("description"))
            .and_then(Value::as_str)
            .or_else(|| details.get("text").and_then(Value::as_str))
            .unwrap_or("evaluation threw")
            .to_string();
        return Err(SuiteError::Cdp {
            method: "Runtime.evaluate".to_string(),
            message,
        });
    }
    Ok(result
        .get("result")
        .and_then(|r| r.get("value"))
        .cloned()
        .unwrap_or(Value::Null))
}

/// Encode a Rust string as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Region of the page to capture, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// CDP client over a raw WebSocket to one page target.
pub struct CdpClient {
    label: String,
    cdp_port: u16,
    ws_tx: tokio::sync::Mutex<Option<WsSink>>,
    pending: PendingMap,
    next_id: AtomicU64,
    navigations: watch::Receiver<u64>,
    network: Arc<Mutex<NetworkActivity>>,
    command_timeout: Duration,
    reader: JoinHandle<()>,
}

impl CdpClient {
    /// Attach to a browser listening on `cdp_port`, retrying until its first
    /// page target accepts a WebSocket connection or `timeout` elapses.
    pub async fn attach(label: impl Into<String>, cdp_port: u16, timeout: Duration) -> Result<Self> {
        let label = label.into();
        let list_url = format!("http://127.0.0.1:{}/json/list", cdp_port);
        let deadline = Instant::now() + timeout;
        let mut attempts = 0u32;

        let ws_url = loop {
            attempts += 1;
            let last_error = match reqwest::get(&list_url).await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<Value>().await {
                        Ok(targets) => match page_ws_url(&targets) {
                            Some(url) => break url,
                            None => "No page target found".to_string(),
                        },
                        Err(e) => format!("Failed to parse targets response: {}", e),
                    }
                }
                Ok(response) => format!("HTTP error: {}", response.status()),
                Err(e) => format!("Connection error: {}", e),
            };

            if Instant::now() >= deadline {
                return Err(SuiteError::Launch(format!(
                    "Failed to reach Chrome on port {} after {} attempts: {}",
                    cdp_port, attempts, last_error
                )));
            }
            tracing::debug!("Attach attempt {} on port {}: {}", attempts, cdp_port, last_error);
            tokio::time::sleep(ATTACH_POLL_INTERVAL).await;
        };

        tracing::info!("Connecting to page target WebSocket: {}", ws_url);
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .map_err(|e| SuiteError::WebSocket(format!("Failed to connect: {}", e)))?;
        let (tx, mut rx) = ws_stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let network = Arc::new(Mutex::new(NetworkActivity::default()));
        let (nav_tx, nav_rx) = watch::channel(0u64);

        let reader = {
            let pending = Arc::clone(&pending);
            let network = Arc::clone(&network);
            let label = label.clone();
            tokio::spawn(async move {
                while let Some(msg) = rx.next().await {
                    match msg {
                        Ok(WsMessage::Text(text)) => {
                            let Ok(json) = serde_json::from_str::<Value>(&text) else {
                                continue;
                            };
                            if let Some(id) = json.get("id").and_then(Value::as_u64) {
                                if let Some(sender) = pending.lock().remove(&id) {
                                    let _ = sender.send(json);
                                }
                            } else if let Some(method) = json.get("method").and_then(Value::as_str) {
                                let params = json.get("params").cloned().unwrap_or(Value::Null);
                                if apply_event(method, &params, &mut network.lock()) {
                                    nav_tx.send_modify(|n| *n += 1);
                                }
                            }
                        }
                        Ok(WsMessage::Close(_)) => {
                            tracing::debug!("WebSocket closed for {}", label);
                            break;
                        }
                        Err(e) => {
                            tracing::debug!("WebSocket error for {}: {:?}", label, e);
                            break;
                        }
                        _ => {}
                    }
                }
                // Dropping the senders fails every waiting command
                pending.lock().clear();
            })
        };

        let client = Self {
            label,
            cdp_port,
            ws_tx: tokio::sync::Mutex::new(Some(tx)),
            pending,
            next_id: AtomicU64::new(1),
            navigations: nav_rx,
            network,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            reader,
        };

        client.send_command("Page.enable", json!({})).await?;
        client.send_command("Runtime.enable", json!({})).await?;
        client.send_command("Network.enable", json!({})).await?;
        tracing::info!("CDP client {} attached on port {}", client.label, cdp_port);

        Ok(client)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cdp_port(&self) -> u16 {
        self.cdp_port
    }

    /// Send a CDP command and wait for its result.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        {
            let mut guard = self.ws_tx.lock().await;
            let sink = guard.as_mut().ok_or_else(|| {
                SuiteError::WebSocket("WebSocket not connected".to_string())
            })?;
            if let Err(e) = sink.send(WsMessage::Text(command.to_string())).await {
                self.pending.lock().remove(&id);
                return Err(SuiteError::WebSocket(format!(
                    "Failed to send {}: {}",
                    method, e
                )));
            }
        }

        match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(response)) => parse_response(method, response),
            Ok(Err(_)) => Err(SuiteError::WebSocket(format!(
                "Connection closed while waiting for {}",
                method
            ))),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(SuiteError::Timeout(format!(
                    "{} got no response within {:?}",
                    method, self.command_timeout
                )))
            }
        }
    }

    /// Evaluate a JavaScript expression and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true
                }),
            )
            .await?;
        evaluation_value(result)
    }

    /// Number of main-frame navigations seen so far.
    pub fn navigation_count(&self) -> u64 {
        *self.navigations.borrow()
    }

    /// Wait until the main-frame navigation counter passes `after`.
    pub async fn wait_for_navigation_after(&self, after: u64, timeout: Duration) -> Result<()> {
        let mut rx = self.navigations.clone();
        let waited = tokio::time::timeout(timeout, rx.wait_for(|n| *n > after))
            .await
            .map(|r| r.map(|_| ()));
        match waited {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(SuiteError::WebSocket(
                "Connection closed while waiting for navigation".to_string(),
            )),
            Err(_) => Err(SuiteError::Timeout(format!(
                "No navigation committed within {:?}",
                timeout
            ))),
        }
    }

    /// Start a navigation and wait for the new document to commit.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let before = self.navigation_count();
        let result = self.send_command("Page.navigate", json!({ "url": url })).await?;

        if let Some(error) = result
            .get("errorText")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
        {
            return Err(SuiteError::Navigation(format!("{}: {}", url, error)));
        }

        // Same-document navigations carry no loaderId and emit no frameNavigated
        if result.get("loaderId").is_some() {
            self.wait_for_navigation_after(before, timeout).await?;
        }
        tracing::debug!("Navigated to: {}", url);
        Ok(())
    }

    pub fn is_network_idle(&self, quiet: Duration) -> bool {
        self.network.lock().is_idle_for(quiet)
    }

    pub async fn url(&self) -> Result<String> {
        let value = self.evaluate("window.location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn title(&self) -> Result<String> {
        let value = self.evaluate("document.title").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn ready_state(&self) -> Result<String> {
        let value = self.evaluate("document.readyState").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        self.send_command(
            "Emulation.setDeviceMetricsOverride",
            json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn set_timezone(&self, timezone_id: &str) -> Result<()> {
        self.send_command(
            "Emulation.setTimezoneOverride",
            json!({ "timezoneId": timezone_id }),
        )
        .await?;
        Ok(())
    }

    pub async fn set_color_scheme(&self, scheme: &str) -> Result<()> {
        self.send_command(
            "Emulation.setEmulatedMedia",
            json!({ "features": [{ "name": "prefers-color-scheme", "value": scheme }] }),
        )
        .await?;
        Ok(())
    }

    /// CSS size of the whole document.
    pub async fn content_size(&self) -> Result<(f64, f64)> {
        let metrics = self.send_command("Page.getLayoutMetrics", json!({})).await?;
        let size = metrics
            .get("cssContentSize")
            .or_else(|| metrics.get("contentSize"))
            .ok_or_else(|| SuiteError::Cdp {
                method: "Page.getLayoutMetrics".to_string(),
                message: "missing content size".to_string(),
            })?;
        let width = size.get("width").and_then(Value::as_f64).unwrap_or(0.0);
        let height = size.get("height").and_then(Value::as_f64).unwrap_or(0.0);
        Ok((width, height))
    }

    /// Capture a PNG of the viewport, or of `clip` when given.
    pub async fn screenshot(&self, clip: Option<Clip>) -> Result<Vec<u8>> {
        let mut params = json!({ "format": "png" });
        if let Some(clip) = clip {
            params["clip"] = serde_json::to_value(clip)?;
            params["captureBeyondViewport"] = json!(true);
        }

        let result = self.send_command("Page.captureScreenshot", params).await?;
        let data = result
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| SuiteError::Cdp {
                method: "Page.captureScreenshot".to_string(),
                message: "no image data".to_string(),
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| SuiteError::Cdp {
                method: "Page.captureScreenshot".to_string(),
                message: format!("invalid base64: {}", e),
            })
    }

    /// Close the WebSocket. The browser process is owned by the caller.
    pub async fn close(&self) {
        if let Some(mut sink) = self.ws_tx.lock().await.take() {
            let _ = sink.close().await;
        }
        self.reader.abort();
        tracing::info!("CDP client {} closed", self.label);
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn page_ws_url(targets: &Value) -> Option<String> {
    targets
        .as_array()?
        .iter()
        .find(|t| t.get("type").and_then(Value::as_str) == Some("page"))?
        .get("webSocketDebuggerUrl")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("it's \"quoted\""), r#""it's \"quoted\"""#);
        assert_eq!(js_string("a\\b\nc"), r#""a\\b\nc""#);
    }

    #[test]
    fn test_parse_response_error() {
        let err = parse_response(
            "DOM.getDocument",
            json!({"id": 3, "error": {"code": -32000, "message": "No node"}}),
        )
        .unwrap_err();
        assert!(matches!(err, SuiteError::Cdp { ref message, .. } if message == "No node"));

        let ok = parse_response("Page.enable", json!({"id": 1, "result": {}})).unwrap();
        assert_eq!(ok, json!({}));
    }

    #[test]
    fn test_evaluation_value() {
        let value = evaluation_value(json!({"result": {"type": "number", "value": 4}})).unwrap();
        assert_eq!(value, json!(4));

        let undefined = evaluation_value(json!({"result": {"type": "undefined"}})).unwrap();
        assert_eq!(undefined, Value::Null);

        let thrown = evaluation_value(json!({
            "result": {"type": "object"},
            "exceptionDetails": {"text": "Uncaught", "exception": {"description": "ReferenceError: x is not defined"}}
        }));
        assert!(matches!(thrown, Err(SuiteError::Cdp { ref message, .. }) if message.contains("ReferenceError")));
    }

    #[test]
    fn test_page_ws_url_picks_page_target() {
        let targets = json!([
            {"type": "service_worker", "webSocketDebuggerUrl": "ws://sw"},
            {"type": "page", "webSocketDebuggerUrl": "ws://page"}
        ]);
        assert_eq!(page_ws_url(&targets).as_deref(), Some("ws://page"));
        assert_eq!(page_ws_url(&json!([])), None);
    }

    #[test]
    fn test_network_events_track_inflight() {
        let mut network = NetworkActivity::default();
        apply_event("Network.requestWillBeSent", &json!({"requestId": "1"}), &mut network);
        apply_event("Network.requestWillBeSent", &json!({"requestId": "2"}), &mut network);
        assert_eq!(network.inflight(), 2);

        apply_event("Network.loadingFinished", &json!({"requestId": "1"}), &mut network);
        apply_event("Network.loadingFailed", &json!({"requestId": "2"}), &mut network);
        assert_eq!(network.inflight(), 0);
        assert!(network.is_idle_for(Duration::ZERO));
        assert!(!network.is_idle_for(Duration::from_secs(60)));
    }

    #[test]
    fn test_only_main_frame_counts_as_navigation() {
        let mut network = NetworkActivity::default();
        assert!(apply_event(
            "Page.frameNavigated",
            &json!({"frame": {"id": "main", "url": "http://x/"}}),
            &mut network
        ));
        assert!(!apply_event(
            "Page.frameNavigated",
            &json!({"frame": {"id": "child", "parentId": "main"}}),
            &mut network
        ));
    }
}
