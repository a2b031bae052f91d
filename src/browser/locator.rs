//! Lazy element queries. A locator stores a chain of query steps and resolves
//! them in the page on every use, so it survives re-renders and navigations.

use crate::browser::cdp::{js_string, Clip};
use crate::browser::page::Page;
use crate::browser::poll_until;
use crate::error::{Result, SuiteError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Applies the query steps and yields the matching elements in document order.
const RESOLVER_JS: &str = r#"(ops) => {
    const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
    let els = null;
    for (const op of ops) {
        if (op.css !== undefined) {
            const roots = els === null ? [document] : els;
            const next = [];
            for (const root of roots) {
                for (const el of root.querySelectorAll(op.css)) {
                    if (!next.includes(el)) next.push(el);
                }
            }
            els = next;
        } else if (op.hasText !== undefined) {
            const needle = norm(op.hasText);
            els = (els || []).filter((el) => norm(el.textContent).includes(needle));
        } else if (op.nth !== undefined) {
            const list = els || [];
            const i = op.nth < 0 ? list.length + op.nth : op.nth;
            els = i >= 0 && i < list.length ? [list[i]] : [];
        }
    }
    return els || [];
}"#;

const VISIBLE_JS: &str = r#"(el) => {
    const style = window.getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') return false;
    const rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
enum Op {
    Css(String),
    HasText(String),
    Nth(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorState {
    Attached,
    Detached,
    Visible,
    Hidden,
}

impl LocatorState {
    fn as_str(&self) -> &'static str {
        match self {
            LocatorState::Attached => "attached",
            LocatorState::Detached => "detached",
            LocatorState::Visible => "visible",
            LocatorState::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionOutcome {
    count: usize,
    #[serde(default)]
    status: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct Presence {
    count: usize,
    visible: usize,
}

#[derive(Clone)]
pub struct Locator {
    page: Page,
    ops: Vec<Op>,
}

impl Locator {
    pub(crate) fn new(page: Page, selector: &str) -> Self {
        Self {
            page,
            ops: vec![Op::Css(selector.to_string())],
        }
    }

    fn with(&self, op: Op) -> Self {
        let mut ops = self.ops.clone();
        ops.push(op);
        Self {
            page: self.page.clone(),
            ops,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Descendants of every current match that match `selector`.
    pub fn locator(&self, selector: &str) -> Self {
        self.with(Op::Css(selector.to_string()))
    }

    /// Keep matches whose text contains `text`, ignoring case and whitespace runs.
    pub fn filter_has_text(&self, text: &str) -> Self {
        self.with(Op::HasText(text.to_string()))
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn last(&self) -> Self {
        self.nth(-1)
    }

    /// Zero-based; negative indexes count from the end.
    pub fn nth(&self, index: i64) -> Self {
        self.with(Op::Nth(index))
    }

    fn script(&self, body: &str) -> Result<String> {
        let ops = serde_json::to_string(&self.ops)?;
        Ok(format!(
            "(() => {{ const __els = ({})({}); const __visible = {}; {} }})()",
            RESOLVER_JS, ops, VISIBLE_JS, body
        ))
    }

    async fn eval(&self, body: &str) -> Result<Value> {
        let script = self.script(body)?;
        self.page.client().evaluate(&script).await
    }

    fn strict(&self, count: usize) -> Result<()> {
        if count > 1 {
            return Err(SuiteError::StrictModeViolation {
                selector: self.to_string(),
                count,
            });
        }
        Ok(())
    }

    /// Number of elements currently matching. Does not wait.
    pub async fn count(&self) -> Result<usize> {
        let value = self.eval("return __els.length;").await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// `textContent` of every match, in document order. Does not wait.
    pub async fn all_text_contents(&self) -> Result<Vec<String>> {
        let value = self
            .eval("return __els.map((el) => el.textContent || '');")
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn presence(&self) -> Result<Presence> {
        let value = self
            .eval("return { count: __els.length, visible: __els.filter(__visible).length };")
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Whether the single match is rendered. No match counts as not visible.
    pub async fn is_visible(&self) -> Result<bool> {
        let presence = self.presence().await?;
        self.strict(presence.count)?;
        Ok(presence.visible == 1)
    }

    pub async fn is_enabled(&self) -> Result<bool> {
        let value = self
            .eval(
                "if (__els.length !== 1) return { count: __els.length, status: 'missing' }; \
                 return { count: 1, status: 'done', value: !__els[0].disabled };",
            )
            .await?;
        let outcome: ActionOutcome = serde_json::from_value(value)?;
        self.strict(outcome.count)?;
        if outcome.count == 0 {
            return Err(SuiteError::ElementNotFound(self.to_string()));
        }
        Ok(outcome.value.as_bool().unwrap_or(false))
    }

    /// Wait for exactly one attached match and read a property from it.
    async fn read_single(&self, body: &str) -> Result<Value> {
        let script = self.script(&format!(
            "if (__els.length !== 1) return {{ count: __els.length }}; \
             const el = __els[0]; \
             return {{ count: 1, status: 'done', value: (() => {{ {} }})() }};",
            body
        ))?;
        let timeout = self.page.timeouts().action();
        let what = format!("{} to be attached", self);
        let script = script.as_str();
        let client = self.page.client();

        poll_until(timeout, &what, move || async move {
            let outcome: ActionOutcome = serde_json::from_value(client.evaluate(script).await?)?;
            self.strict(outcome.count)?;
            Ok((outcome.count == 1).then_some(outcome.value))
        })
        .await
    }

    pub async fn text_content(&self) -> Result<String> {
        let value = self.read_single("return el.textContent || '';").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn input_value(&self) -> Result<String> {
        let value = self.read_single("return el.value === undefined ? '' : String(el.value);").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        let value = self
            .read_single(&format!("return el.getAttribute({});", js_string(name)))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    /// Wait until the single match is visible (and enabled when asked), then
    /// run `body` against it as `el`. `body` returning `null` means "not yet".
    async fn act(&self, action: &str, body: &str, require_enabled: bool) -> Result<Value> {
        let script = self.script(&format!(
            "if (__els.length !== 1) return {{ count: __els.length }}; \
             const el = __els[0]; \
             if (!__visible(el)) return {{ count: 1, status: 'hidden' }}; \
             if ({} && el.disabled) return {{ count: 1, status: 'disabled' }}; \
             const __result = ((el) => {{ {} }})(el); \
             if (__result === null || __result === undefined) return {{ count: 1, status: 'pending' }}; \
             return {{ count: 1, status: 'done', value: __result }};",
            require_enabled, body
        ))?;
        let timeout = self.page.timeouts().action();
        let what = format!("{} on {}", action, self);
        let target = self.to_string();
        let script = script.as_str();
        let client = self.page.client();

        self.page
            .traced(action, Some(&target), async {
                poll_until(timeout, &what, move || async move {
                    let outcome: ActionOutcome =
                        serde_json::from_value(client.evaluate(script).await?)?;
                    self.strict(outcome.count)?;
                    if outcome.status == "done" {
                        return Ok(Some(outcome.value));
                    }
                    tracing::trace!("{} waiting: {} ({} matches)", action, outcome.status, outcome.count);
                    Ok(None)
                })
                .await
            })
            .await
    }

    pub async fn click(&self) -> Result<()> {
        self.act(
            "click",
            "el.scrollIntoView({ block: 'center', inline: 'center' }); el.click(); return true;",
            true,
        )
        .await?;
        Ok(())
    }

    /// Replace the value of an input or textarea and fire `input` and `change`.
    pub async fn fill(&self, value: &str) -> Result<()> {
        let body = format!(
            "el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return true;",
            js_string(value)
        );
        self.act("fill", &body, true).await?;
        Ok(())
    }

    /// Select the option whose value or label equals `value`; returns the selected value.
    pub async fn select_option(&self, value: &str) -> Result<String> {
        let body = format!(
            "const want = {}; \
             const opt = Array.from(el.options || []).find((o) => o.value === want || o.label.trim() === want); \
             if (!opt) return null; \
             Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set.call(el, opt.value); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             return opt.value;",
            js_string(value)
        );
        let selected = self.act("select_option", &body, true).await?;
        Ok(selected.as_str().unwrap_or_default().to_string())
    }

    /// Wait for the locator to reach `state`. Unlike actions this does not
    /// require a single match: any visible match satisfies `Visible`.
    pub async fn wait_for(&self, state: LocatorState, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.page.timeouts().action());
        let what = format!("{} to be {}", self, state.as_str());

        poll_until(timeout, &what, move || async move {
            let presence = self.presence().await?;
            let reached = match state {
                LocatorState::Attached => presence.count > 0,
                LocatorState::Detached => presence.count == 0,
                LocatorState::Visible => presence.visible > 0,
                LocatorState::Hidden => presence.visible == 0,
            };
            Ok(reached.then_some(()))
        })
        .await
    }

    /// Document-space bounding box of the single visible match.
    pub async fn bounding_box(&self) -> Result<Clip> {
        let value = self
            .act(
                "bounding_box",
                "el.scrollIntoView({ block: 'center', inline: 'center' }); \
                 const r = el.getBoundingClientRect(); \
                 return { x: r.left + window.scrollX, y: r.top + window.scrollY, width: r.width, height: r.height };",
                false,
            )
            .await?;
        let get = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Clip {
            x: get("x"),
            y: get("y"),
            width: get("width"),
            height: get("height"),
            scale: 1.0,
        })
    }

    /// PNG of the single visible match.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let clip = self.bounding_box().await?;
        self.page.client().screenshot(Some(clip)).await
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            match op {
                Op::Css(selector) if i == 0 => write!(f, "locator('{}')", selector)?,
                Op::Css(selector) => write!(f, ".locator('{}')", selector)?,
                Op::HasText(text) => write!(f, ".filter(has_text='{}')", text)?,
                Op::Nth(0) => write!(f, ".first()")?,
                Op::Nth(-1) => write!(f, ".last()")?,
                Op::Nth(n) => write!(f, ".nth({})", n)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
