// src/chat.rs

use crate::api::ApiClient;
use crate::constants::{PENDING_REPLY_TEXT, QUICK_ASKS, QUICK_ASK_WINDOW, SYSTEM_PROMPT};
use crate::models::{ChatReply, RecommendedProduct};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Local instruction only; never rendered, never sent.
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Resolved,
    Errored,
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, MessageStatus::Resolved)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, MessageStatus::Resolved)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, MessageStatus::Resolved)
    }

    pub fn placeholder() -> Self {
        Self::new(Role::Assistant, PENDING_REPLY_TEXT, MessageStatus::Pending)
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::new(Role::Assistant, format!("Error: {}", message), MessageStatus::Errored)
    }
}

/// What a caller needs to issue the request for a turn that was just started.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub placeholder_id: Uuid,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input, or a request was already in flight.
    Ignored,
    Replied,
    Failed(String),
}

/// In-memory conversation for a single session.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    recommendations: Vec<RecommendedProduct>,
    in_flight: Option<Uuid>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
            recommendations: Vec::new(),
            in_flight: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_send(&self, input: &str) -> bool {
        !input.trim().is_empty() && !self.is_loading()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Every message a user should see, in order.
    pub fn visible_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    pub fn recommendations(&self) -> &[RecommendedProduct] {
        &self.recommendations
    }

    /// Appends the user's turn and a pending placeholder.
    ///
    /// The returned history holds every settled turn up to and including the
    /// new one; the placeholder is excluded.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        if !self.can_send(input) {
            return None;
        }

        self.messages.push(ChatMessage::user(input.trim()));
        let history: Vec<ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.status == MessageStatus::Resolved)
            .cloned()
            .collect();

        let placeholder = ChatMessage::placeholder();
        let placeholder_id = placeholder.id;
        self.messages.push(placeholder);
        self.in_flight = Some(placeholder_id);

        Some(PendingTurn {
            placeholder_id,
            history,
        })
    }

    fn remove_placeholder(&mut self, id: Uuid) {
        self.messages.retain(|m| m.id != id);
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }

    pub fn resolve(&mut self, placeholder_id: Uuid, reply: ChatReply) {
        self.remove_placeholder(placeholder_id);
        if let Some(text) = reply.reply {
            self.messages.push(ChatMessage::assistant(text));
        }
        self.recommendations = reply.recommendations;
    }

    /// Replaces the placeholder with an error bubble; recommendations are kept.
    pub fn fail(&mut self, placeholder_id: Uuid, error: impl std::fmt::Display) {
        self.remove_placeholder(placeholder_id);
        self.messages.push(ChatMessage::error(error));
    }

    /// Runs one full turn against the service. Exactly one request, no retries.
    pub async fn send(&mut self, client: &ApiClient, input: &str) -> SendOutcome {
        let Some(turn) = self.begin_turn(input) else {
            return SendOutcome::Ignored;
        };

        match client
            .chat_recommendations(&turn.history, client.chat_top_k())
            .await
        {
            Ok(reply) => {
                self.resolve(turn.placeholder_id, reply);
                SendOutcome::Replied
            }
            Err(e) => {
                log::error!("chat request failed: {}", e);
                let message = e.to_string();
                self.fail(turn.placeholder_id, &message);
                SendOutcome::Failed(message)
            }
        }
    }
}

/// A window over the predefined one-click prompts.
#[derive(Debug, Clone)]
pub struct QuickAsks {
    prompts: Vec<&'static str>,
    start: usize,
    window: usize,
}

impl Default for QuickAsks {
    fn default() -> Self {
        Self::new(QUICK_ASKS.to_vec(), QUICK_ASK_WINDOW)
    }
}

impl QuickAsks {
    pub fn new(prompts: Vec<&'static str>, window: usize) -> Self {
        Self {
            prompts,
            start: 0,
            window: window.max(1),
        }
    }

    pub fn all(&self) -> &[&'static str] {
        &self.prompts
    }

    pub fn visible(&self) -> &[&'static str] {
        let end = (self.start + self.window).min(self.prompts.len());
        &self.prompts[self.start..end]
    }

    pub fn can_prev(&self) -> bool {
        self.start > 0
    }

    pub fn can_next(&self) -> bool {
        self.start + self.window < self.prompts.len()
    }

    pub fn next(&mut self) {
        let last_start = self.prompts.len().saturating_sub(self.window);
        self.start = (self.start + self.window).min(last_start);
    }

    pub fn prev(&mut self) {
        self.start = self.start.saturating_sub(self.window);
    }

    /// Prompt at a 1-based position within the visible window.
    pub fn pick(&self, position: usize) -> Option<&'static str> {
        position
            .checked_sub(1)
            .and_then(|i| self.visible().get(i))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn reply(text: Option<&str>) -> ChatReply {
        ChatReply {
            reply: text.map(str::to_string),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_new_conversation_hides_system_prompt() {
        let convo = Conversation::new();
        assert_eq!(convo.messages().len(), 1);
        assert_eq!(convo.messages()[0].role, Role::System);
        assert_eq!(convo.visible_messages().count(), 0);
    }

    #[test]
    fn test_can_send() {
        let mut convo = Conversation::new();
        assert!(!convo.can_send("   "));
        assert!(convo.can_send("chairs"));
        convo.begin_turn("chairs").unwrap();
        assert!(!convo.can_send("tables"));
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut convo = Conversation::new();
        let turn = convo.begin_turn("  dining chairs  ").unwrap();

        let visible: Vec<_> = convo.visible_messages().collect();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content, "dining chairs");
        assert_eq!(visible[1].status, MessageStatus::Pending);
        assert_eq!(visible[1].id, turn.placeholder_id);

        assert_eq!(turn.history.len(), 2);
        assert!(turn.history.iter().all(|m| m.status != MessageStatus::Pending));
        assert!(convo.begin_turn("again").is_none());
    }

    #[test]
    fn test_error_bubbles_stay_out_of_history() {
        let mut convo = Conversation::new();
        let turn = convo.begin_turn("chairs").unwrap();
        convo.fail(turn.placeholder_id, "503 Service Unavailable");

        let turn = convo.begin_turn("racks").unwrap();
        assert!(turn
            .history
            .iter()
            .all(|m| m.status == MessageStatus::Resolved));
        assert!(!turn.history.iter().any(|m| m.content.starts_with("Error:")));
        let users: Vec<_> = turn
            .history
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(users, vec!["chairs", "racks"]);
    }

    #[test]
    fn test_resolve_removes_placeholder_by_id() {
        let mut convo = Conversation::new();
        let turn = convo.begin_turn("racks").unwrap();
        // A user message quoting the placeholder text must survive.
        convo.messages.insert(1, ChatMessage::user("Please wait, I said"));

        convo.resolve(turn.placeholder_id, reply(Some("Here are racks")));

        let contents: Vec<_> = convo.visible_messages().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Please wait, I said", "racks", "Here are racks"]);
        assert!(!convo.is_loading());
    }

    #[test]
    fn test_resolve_without_reply_text() {
        let mut convo = Conversation::new();
        let turn = convo.begin_turn("racks").unwrap();
        convo.resolve(turn.placeholder_id, reply(None));
        assert_eq!(convo.visible_messages().count(), 1);
    }

    #[test]
    fn test_fail_appends_error_and_keeps_recommendations() {
        let mut convo = Conversation::new();
        let turn = convo.begin_turn("chairs").unwrap();
        convo.resolve(
            turn.placeholder_id,
            ChatReply {
                reply: Some("Chairs".to_string()),
                recommendations: vec![RecommendedProduct {
                    product: crate::schema::product_from_value(&json!({"uniq_id": "c1"})).unwrap(),
                    score: Some(0.5),
                    generated_text: None,
                }],
            },
        );

        let turn = convo.begin_turn("racks").unwrap();
        convo.fail(turn.placeholder_id, "500 Internal Server Error boom");

        let last = convo.visible_messages().last().unwrap();
        assert_eq!(last.status, MessageStatus::Errored);
        assert_eq!(last.content, "Error: 500 Internal Server Error boom");
        assert!(convo
            .visible_messages()
            .all(|m| m.status != MessageStatus::Pending));
        assert!(!convo.is_loading());
        assert_eq!(convo.recommendations().len(), 1);
    }

    #[test]
    fn test_quick_ask_carousel() {
        let mut asks = QuickAsks::default();
        assert_eq!(asks.visible().len(), 4);
        assert!(!asks.can_prev());
        assert!(asks.can_next());
        assert_eq!(asks.pick(1), Some(QUICK_ASKS[0]));
        assert_eq!(asks.pick(0), None);
        assert_eq!(asks.pick(5), None);

        for _ in 0..10 {
            asks.next();
        }
        assert_eq!(asks.visible(), &QUICK_ASKS[16..20]);
        assert!(!asks.can_next());

        asks.prev();
        assert_eq!(asks.visible()[0], QUICK_ASKS[12]);
        for _ in 0..10 {
            asks.prev();
        }
        assert!(!asks.can_prev());
    }

    #[test]
    fn test_quick_ask_uneven_window() {
        let mut asks = QuickAsks::new(vec!["a", "b", "c", "d", "e"], 2);
        asks.next();
        asks.next();
        assert_eq!(asks.visible(), &["d", "e"]);
    }

    #[tokio::test]
    async fn test_send_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/recommendations/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Try this rack",
                "recommendations": [
                    {"product": {"uniq_id": "r1", "title": "Shoe Rack", "price": "$19.99"}, "score": 0.93}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let mut convo = Conversation::new();

        assert_eq!(convo.send(&client, "shoe storage").await, SendOutcome::Replied);
        assert_eq!(convo.recommendations().len(), 1);
        assert_eq!(convo.recommendations()[0].product.price, Some(19.99));
        let last = convo.visible_messages().last().unwrap();
        assert_eq!(last.content, "Try this rack");
        assert_eq!(convo.send(&client, "  ").await, SendOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_send_failure_becomes_error_bubble() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/recommendations/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let mut convo = Conversation::new();

        match convo.send(&client, "chairs").await {
            SendOutcome::Failed(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let last = convo.visible_messages().last().unwrap();
        assert_eq!(last.status, MessageStatus::Errored);
        assert!(last.content.contains("model loading"));
        assert!(!convo.is_loading());
    }
}
