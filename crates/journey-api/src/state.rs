use std::sync::Arc;

use journey_agent::{AgentRunner, LeadRecorder, TitleGenerator};
use journey_persist::ConversationStore;

use crate::chat::{ChatHandler, CoordinatorSettings, LeadSummaryTrigger, StreamCoordinator};
use crate::config::Config;
use crate::ws::{ConnectionRegistry, HandlerKind, HandlerMap};

/// Shared application state passed to all handlers
///
/// Built once by the entry point; every registry and store is a single
/// injected instance shared through `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connections: Arc<ConnectionRegistry>,
    pub conversations: Arc<dyn ConversationStore>,
    pub leads: Arc<LeadRecorder>,
    pub handlers: Arc<HandlerMap>,
}

impl AppState {
    /// Wire the chat pipeline around the given collaborators.
    pub fn new(
        config: Config,
        conversations: Arc<dyn ConversationStore>,
        agent: Arc<dyn AgentRunner>,
        titles: Arc<dyn TitleGenerator>,
        leads: Arc<LeadRecorder>,
    ) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let settings = CoordinatorSettings {
            chatbot_name: config.chat.chatbot_name.clone(),
            history_mode: config.chat.history_mode,
            recursion_limit: config.chat.recursion_limit,
        };
        let coordinator = Arc::new(StreamCoordinator::new(
            connections.clone(),
            conversations.clone(),
            agent,
            titles,
            LeadSummaryTrigger::new(leads.clone()),
            settings,
        ));
        let chat = Arc::new(ChatHandler::new(coordinator, connections.clone(), conversations.clone()));
        let handlers = HandlerMap::new().with(HandlerKind::Chat, chat);

        Self {
            config: Arc::new(config),
            connections,
            conversations,
            leads,
            handlers: Arc::new(handlers),
        }
    }
}
