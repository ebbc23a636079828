//! Chat log and opponent commentary
//!
//! Game events become short system lines in a rolling chat log. The opponent
//! can also "talk" through a text-generation service; those requests are
//! fire-and-forget and never block or change play. A reply that arrives after
//! the game was restarted is dropped.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{BallKind, GameEvent, Side, WinReason};

/// Messages kept in the log
pub const MAX_MESSAGES: usize = 5;

pub const BOT_NAME: &str = "Rack-O-Bot";
pub const MODEL_NAME: &str = "gemini-2.5-flash";
pub const MAX_OUTPUT_TOKENS: u32 = 50;
pub const TEMPERATURE: f32 = 0.8;

/// Shown instead of a reply when no API key was built in
pub const NO_KEY_REPLY: &str = "Beep boop. (Add API Key for real talk)";
/// Shown when the request fails
pub const FAILURE_REPLY: &str = "Testing my circuits...";
/// Shown when the service answers with no text
pub const EMPTY_REPLY: &str = "...";
/// Requests still pending after this long are aborted
pub const REQUEST_TIMEOUT_MS: u32 = 8_000;

const SYSTEM_INSTRUCTION: &str = "You are \"Rack-O-Bot\", a competitive, slightly snarky but fair \
robot playing 8-ball pool against a human. Reply to each game event with short, witty table talk \
of under 20 words. Praise good play with a backhanded compliment, gently roast scratches and \
misses, and when it is your shot announce your intent or confidence.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    System,
    You,
    Bot,
}

impl Sender {
    pub fn label(self) -> &'static str {
        match self {
            Sender::System => "System",
            Sender::You => "You",
            Sender::Bot => BOT_NAME,
        }
    }

    fn for_side(side: Side) -> Self {
        match side {
            Side::Player => Sender::You,
            Side::Opponent => Sender::Bot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// Handle for one in-flight commentary request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentaryTicket {
    generation: u64,
}

/// Rolling log of the last few messages
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    generation: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(ChatMessage {
            sender,
            text: text.into(),
        });
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Empty the log for a new game; outstanding tickets become stale
    pub fn reset(&mut self) {
        self.messages.clear();
        self.generation += 1;
    }

    /// Take a ticket before starting a request
    pub fn ticket(&self) -> CommentaryTicket {
        CommentaryTicket {
            generation: self.generation,
        }
    }

    /// Post a reply if its game is still the current one
    pub fn accept(&mut self, ticket: CommentaryTicket, text: impl Into<String>) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Dropping stale commentary reply");
            return false;
        }
        self.push(Sender::Bot, text);
        true
    }

    /// Log the chat lines for `event`
    pub fn record(&mut self, event: &GameEvent) {
        if let Some((sender, text)) = event_message(event) {
            self.push(sender, text);
        }
    }
}

/// Chat line for a game event, if it has one
pub fn event_message(event: &GameEvent) -> Option<(Sender, String)> {
    let message = match event {
        GameEvent::ShotFired {
            side: Side::Player, ..
        } => (Sender::You, "Shot fired!".to_string()),
        GameEvent::GroupAssigned { side, group } => {
            let who = match side {
                Side::Player => "You are",
                Side::Opponent => "Robot is",
            };
            (Sender::System, format!("{} {}s.", who, group.as_str()))
        }
        GameEvent::Scratch { .. } => (Sender::System, "Scratch! Ball in Hand.".to_string()),
        GameEvent::BallsReturned { .. } => (
            Sender::System,
            "Opponent ball pocketed! Returning to table.".to_string(),
        ),
        GameEvent::ExtraTurn { side } => (Sender::for_side(*side), "Nice shot! Go again.".to_string()),
        GameEvent::CueBallPlaced { side: Side::Player } => {
            (Sender::System, "Ball placed.".to_string())
        }
        GameEvent::PlacementRejected => (
            Sender::System,
            "Can't place the cue ball there.".to_string(),
        ),
        GameEvent::GameOver { winner, reason } => {
            let why = match reason {
                WinReason::LegalClearance => "cleared the table",
                WinReason::EarlyEight => "opponent sank the 8 early",
                WinReason::ScratchOnEight => "opponent scratched on the 8",
            };
            (Sender::System, format!("{} wins: {}.", winner.name(), why))
        }
        _ => return None,
    };
    Some(message)
}

/// Event description sent to the commentary service, if the event deserves one
pub fn commentary_prompt(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::OpponentTargeting { kind, number } => Some(describe_target(*kind, *number)),
        _ => None,
    }
}

/// "Robot targeting SOLID 3."
pub fn describe_target(kind: BallKind, number: Option<u8>) -> String {
    match number {
        Some(n) => format!("Robot targeting {} {}.", kind.as_str(), n),
        None => format!("Robot targeting {}.", kind.as_str()),
    }
}

/// Why no commentary text came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentaryError {
    /// Built without an API key
    MissingApiKey,
    /// The request could not be sent or read
    Network(String),
    /// No answer within [`REQUEST_TIMEOUT_MS`]
    Timeout,
    /// The service answered with a non-success status
    Status(u16),
    /// The response body was not the expected JSON
    Malformed(String),
}

impl fmt::Display for CommentaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentaryError::MissingApiKey => write!(f, "no API key configured"),
            CommentaryError::Network(msg) => write!(f, "network error: {}", msg),
            CommentaryError::Timeout => write!(f, "no reply within {} ms", REQUEST_TIMEOUT_MS),
            CommentaryError::Status(code) => write!(f, "service returned HTTP {}", code),
            CommentaryError::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl std::error::Error for CommentaryError {}

impl CommentaryError {
    /// Text shown in the chat in place of a reply
    pub fn fallback_text(&self) -> &'static str {
        match self {
            CommentaryError::MissingApiKey => NO_KEY_REPLY,
            _ => FAILURE_REPLY,
        }
    }
}

/// Turn a request result into the line the opponent says
pub fn reply_or_fallback(result: Result<String, CommentaryError>) -> String {
    match result {
        Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(CommentaryError::MissingApiKey) => NO_KEY_REPLY.to_string(),
        Err(e) => {
            log::error!("Commentary request failed: {}", e);
            e.fallback_text().to_string()
        }
    }
}

// generateContent wire format

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// JSON body for one commentary request
pub fn request_body(event_description: &str) -> String {
    let request = GenerateRequest {
        system_instruction: Content {
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
        contents: vec![Content {
            parts: vec![Part {
                text: event_description.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        },
    };
    // Plain structs of strings and numbers always serialize
    serde_json::to_string(&request).unwrap_or_default()
}

/// Text of the first candidate; empty if the service sent none
pub fn parse_reply(body: &str) -> Result<String, CommentaryError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| CommentaryError::Malformed(e.to_string()))?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
        .unwrap_or_default();
    Ok(text)
}

/// Key baked in at build time
pub fn api_key() -> Option<&'static str> {
    option_env!("GEMINI_API_KEY").filter(|k| !k.is_empty())
}

pub fn endpoint() -> String {
    format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
        MODEL_NAME
    )
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{AbortSignal, Request, RequestInit, RequestMode, Response};

    use super::*;

    fn js_error(value: JsValue) -> CommentaryError {
        CommentaryError::Network(format!("{:?}", value))
    }

    /// Rejections after the signal fired are timeouts, not network faults
    fn fetch_error(signal: &AbortSignal) -> impl Fn(JsValue) -> CommentaryError + '_ {
        move |value| {
            if signal.aborted() {
                CommentaryError::Timeout
            } else {
                js_error(value)
            }
        }
    }

    /// Ask the service to comment on an event
    pub async fn request_commentary(event_description: &str) -> Result<String, CommentaryError> {
        let key = api_key().ok_or(CommentaryError::MissingApiKey)?;
        let window = web_sys::window().ok_or_else(|| CommentaryError::Network("no window".into()))?;

        let signal = AbortSignal::timeout_with_u32(REQUEST_TIMEOUT_MS);
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_signal(Some(&signal));
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&request_body(event_description)));

        let request = Request::new_with_str_and_init(&endpoint(), &opts).map_err(js_error)?;
        let headers = request.headers();
        headers.set("Content-Type", "application/json").map_err(js_error)?;
        headers.set("x-goog-api-key", key).map_err(js_error)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(fetch_error(&signal))?
            .dyn_into()
            .map_err(js_error)?;
        if !response.ok() {
            return Err(CommentaryError::Status(response.status()));
        }

        let body = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(fetch_error(&signal))?
            .as_string()
            .ok_or_else(|| CommentaryError::Malformed("body is not text".into()))?;
        parse_reply(&body)
    }

    /// Request commentary and always come back with something to say
    pub async fn generate_commentary(event_description: &str) -> String {
        reply_or_fallback(request_commentary(event_description).await)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{generate_commentary, request_commentary};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Group;

    #[test]
    fn test_log_keeps_last_five() {
        let mut log = ChatLog::new();
        for i in 0..7 {
            log.push(Sender::System, format!("msg {}", i));
        }
        assert_eq!(log.len(), MAX_MESSAGES);
        let first = log.messages().next().unwrap();
        assert_eq!(first.text, "msg 2");
    }

    #[test]
    fn test_stale_reply_is_dropped() {
        let mut log = ChatLog::new();
        let old = log.ticket();
        log.reset();
        assert!(!log.accept(old, "too late"));
        assert!(log.is_empty());

        let fresh = log.ticket();
        assert!(log.accept(fresh, "hello"));
        assert_eq!(log.messages().next().unwrap().sender, Sender::Bot);
    }

    #[test]
    fn test_event_messages() {
        let group = GameEvent::GroupAssigned {
            side: Side::Player,
            group: Group::Solids,
        };
        assert_eq!(event_message(&group).unwrap().1, "You are SOLIDs.");

        let group = GameEvent::GroupAssigned {
            side: Side::Opponent,
            group: Group::Stripes,
        };
        assert_eq!(event_message(&group).unwrap().1, "Robot is STRIPEs.");

        let extra = event_message(&GameEvent::ExtraTurn { side: Side::Opponent }).unwrap();
        assert_eq!(extra, (Sender::Bot, "Nice shot! Go again.".to_string()));

        assert!(event_message(&GameEvent::TurnPassed { to: Side::Player }).is_none());
        assert!(event_message(&GameEvent::ShotFired {
            side: Side::Opponent,
            power: 13.0
        })
        .is_none());
    }

    #[test]
    fn test_targeting_prompt() {
        let event = GameEvent::OpponentTargeting {
            kind: BallKind::Solid,
            number: Some(3),
        };
        assert_eq!(commentary_prompt(&event).unwrap(), "Robot targeting SOLID 3.");
        assert!(commentary_prompt(&GameEvent::PlacementRejected).is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let body: serde_json::Value = serde_json::from_str(&request_body("Robot targeting EIGHT 8.")).unwrap();
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 50);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Robot targeting EIGHT 8.");
        assert!(
            body["systemInstruction"]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains(BOT_NAME)
        );
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Nice try, human."}]}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Nice try, human.");
        assert_eq!(parse_reply(r#"{"candidates":[]}"#).unwrap(), "");
        assert!(matches!(parse_reply("<html>"), Err(CommentaryError::Malformed(_))));
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(reply_or_fallback(Err(CommentaryError::MissingApiKey)), NO_KEY_REPLY);
        assert_eq!(reply_or_fallback(Err(CommentaryError::Status(500))), FAILURE_REPLY);
        assert_eq!(reply_or_fallback(Ok("  ".into())), EMPTY_REPLY);
        assert_eq!(reply_or_fallback(Ok("Heh.".into())), "Heh.");
    }

    #[test]
    fn test_timeout_falls_back_to_placeholder() {
        assert_eq!(reply_or_fallback(Err(CommentaryError::Timeout)), FAILURE_REPLY);
        assert_eq!(CommentaryError::Timeout.fallback_text(), FAILURE_REPLY);
        assert!(CommentaryError::Timeout.to_string().contains("8000"));
    }
}
