//! Wire types for the remote answering service.
//!
//! These are the HTTP request/response bodies of the three endpoints the
//! client consumes. They are NOT the domain types from repochat-types --
//! those stay transport-agnostic.

use serde::{Deserialize, Serialize};

use repochat_types::chat::ChatTurn;

/// Request body for `POST /embed`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequestBody {
    pub repo_url: String,
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequestBody {
    pub query: String,
    pub repo: String,
    /// The conversation as it stood before this query, oldest first.
    pub chat_history: Vec<ChatTurn>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatAnswerBody {
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_request_shape() {
        let body = EmbedRequestBody {
            repo_url: "https://github.com/org/foo.git".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"repo_url":"https://github.com/org/foo.git"}"#);
    }

    #[test]
    fn test_chat_request_shape() {
        let body = ChatRequestBody {
            query: "What does main.py do?".to_string(),
            repo: "foo".to_string(),
            chat_history: vec![ChatTurn::user("hi"), ChatTurn::bot("hello")],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"query":"What does main.py do?","repo":"foo","chat_history":[{"user":"You","text":"hi"},{"user":"Bot","text":"hello"}]}"#
        );
    }

    #[test]
    fn test_answer_body_parses() {
        let body: ChatAnswerBody =
            serde_json::from_str(r#"{"answer":"main.py starts the service"}"#).unwrap();
        assert_eq!(body.answer, "main.py starts the service");
    }

    #[test]
    fn test_answer_body_ignores_extra_fields() {
        let body: ChatAnswerBody =
            serde_json::from_str(r#"{"answer":"ok","model":"gpt-4o"}"#).unwrap();
        assert_eq!(body.answer, "ok");
    }
}
