use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::chat::TurnCancelled;

/// Closed set of channel handlers reachable at `/ws/{handler}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Chat,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
        }
    }
}

#[derive(Debug, Error)]
#[error("Handler '{0}' not found.")]
pub struct UnknownHandler(pub String);

impl FromStr for HandlerKind {
    type Err = UnknownHandler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            other => Err(UnknownHandler(other.to_string())),
        }
    }
}

/// Behavior behind one handler name.
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    /// Runs once after the connection is registered and acknowledged.
    async fn on_connect(&self, thread_id: &str, user_id: &str);

    /// Handle one inbound payload. Only cancellation is reported back.
    async fn handle(
        &self,
        thread_id: &str,
        user_id: &str,
        payload: Value,
        cancel: &CancellationToken,
    ) -> Result<(), TurnCancelled>;
}

#[derive(Default, Clone)]
pub struct HandlerMap {
    handlers: HashMap<HandlerKind, Arc<dyn ChannelHandler>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: HandlerKind, handler: Arc<dyn ChannelHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn get(&self, kind: HandlerKind) -> Option<Arc<dyn ChannelHandler>> {
        self.handlers.get(&kind).cloned()
    }

    /// Look a handler up by its path segment.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ChannelHandler>, UnknownHandler> {
        let kind = name.parse::<HandlerKind>()?;
        self.get(kind).ok_or_else(|| UnknownHandler(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_names() {
        assert_eq!("chat".parse::<HandlerKind>().unwrap(), HandlerKind::Chat);
        assert_eq!(HandlerKind::Chat.as_str(), "chat");

        let err = "voice".parse::<HandlerKind>().unwrap_err();
        assert_eq!(err.to_string(), "Handler 'voice' not found.");
    }

    #[test]
    fn test_unregistered_kind_is_unknown() {
        let map = HandlerMap::new();
        assert!(map.resolve("chat").is_err());
    }
}
