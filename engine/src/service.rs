//! Conversation service
//!
//! Transport-agnostic `POST /conversation`: keeps the state of every live
//! conversation keyed by id and turns each request into the ordered event
//! list for that exchange. Requests for the same conversation are serialized
//! by a per-conversation lock; different conversations proceed in parallel.

use crate::conversation::ConversationState;
use crate::events::ConversationEvent;
use crate::orchestrator::Orchestrator;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

/// Incoming message, optionally continuing a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    pub message: String,
}

/// Events produced by one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    pub events: Vec<ConversationEvent>,
}

type Slot = Arc<Mutex<ConversationState>>;

pub struct ConversationService {
    orchestrator: Arc<Orchestrator>,
    conversations: RwLock<HashMap<Uuid, Slot>>,
}

impl ConversationService {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Handle one request.
    ///
    /// Without a `conversation_id` a new conversation is started; it is only
    /// kept if the message was accepted.
    ///
    /// # Errors
    ///
    /// * `EngineError::EmptyMessage` - blank message
    /// * `EngineError::UnknownConversation` - the id does not exist
    /// * configuration errors from the orchestrator
    pub async fn post(
        &self,
        request: ConversationRequest,
    ) -> Result<ConversationResponse, EngineError> {
        if request.message.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let Some(conversation_id) = request.conversation_id else {
            return self.start(&request.message).await;
        };

        let slot = self
            .conversations
            .read()
            .await
            .get(&conversation_id)
            .map(Arc::clone)
            .ok_or_else(|| EngineError::UnknownConversation(conversation_id.to_string()))?;

        let mut state = slot.lock().await;
        let exchange = self
            .orchestrator
            .handle_user_message(&state, &request.message)
            .await?;
        let events = exchange.events();
        *state = exchange.state;

        Ok(ConversationResponse {
            conversation_id,
            events,
        })
    }

    async fn start(&self, message: &str) -> Result<ConversationResponse, EngineError> {
        let state = self.orchestrator.new_conversation();
        let exchange = self.orchestrator.handle_user_message(&state, message).await?;
        let events = exchange.events();

        let conversation_id = Uuid::new_v4();
        self.conversations
            .write()
            .await
            .insert(conversation_id, Arc::new(Mutex::new(exchange.state)));
        info!("Started conversation {}", conversation_id);

        Ok(ConversationResponse {
            conversation_id,
            events,
        })
    }

    /// Register an existing conversation, e.g. one restored from a transcript
    pub async fn restore(&self, state: ConversationState) -> Uuid {
        let conversation_id = Uuid::new_v4();
        self.conversations
            .write()
            .await
            .insert(conversation_id, Arc::new(Mutex::new(state)));
        conversation_id
    }

    /// Copy of a conversation's current state
    pub async fn snapshot(&self, conversation_id: Uuid) -> Option<ConversationState> {
        let slot = self
            .conversations
            .read()
            .await
            .get(&conversation_id)
            .map(Arc::clone)?;
        let state = slot.lock().await;
        Some(state.clone())
    }

    /// Forget a conversation, returning its final state.
    ///
    /// Waits for an in-flight request on the same conversation to finish;
    /// later requests with this id get `UnknownConversation`.
    pub async fn end(&self, conversation_id: Uuid) -> Option<ConversationState> {
        let slot = self.conversations.write().await.remove(&conversation_id)?;
        let state = slot.lock().await.clone();
        info!(
            "Ended conversation {} after {} turns",
            conversation_id,
            state.turns().len()
        );
        Some(state)
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}
