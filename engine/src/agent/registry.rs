//! Agent registry
//!
//! Static catalog mapping each `AgentId` to its definition and behavior. The
//! registry is validated once at construction; after that every lookup the
//! orchestrator performs is infallible for registered ids.

use super::{
    content_expert, critic, faq, instructional_design, triage, Agent, AgentDefinition,
};
use sdk::errors::EngineError;
use sdk::types::AgentId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A definition paired with the behavior that generates for it
#[derive(Clone)]
pub struct RegisteredAgent {
    pub definition: AgentDefinition,
    pub behavior: Arc<dyn Agent>,
}

impl std::fmt::Debug for RegisteredAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredAgent")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Collects agents before validation
#[derive(Default)]
pub struct RegistryBuilder {
    agents: Vec<RegisteredAgent>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, definition: AgentDefinition, behavior: Arc<dyn Agent>) -> Self {
        self.agents.push(RegisteredAgent {
            definition,
            behavior,
        });
        self
    }

    /// Validate the catalog and freeze it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedRegistry` if an id is registered twice,
    /// an agent lists itself as a handoff target, or a handoff target is not
    /// registered.
    pub fn build(self) -> Result<AgentRegistry, EngineError> {
        let mut index = HashMap::with_capacity(self.agents.len());
        for (position, agent) in self.agents.iter().enumerate() {
            let id = agent.definition.id.clone();
            if index.insert(id.clone(), position).is_some() {
                return Err(EngineError::MalformedRegistry(format!(
                    "agent '{}' is registered more than once",
                    id
                )));
            }
        }

        for agent in &self.agents {
            let definition = &agent.definition;
            for target in &definition.allowed_handoffs {
                if target == &definition.id {
                    return Err(EngineError::MalformedRegistry(format!(
                        "agent '{}' lists itself as a handoff target",
                        definition.id
                    )));
                }
                if !index.contains_key(target) {
                    return Err(EngineError::MalformedRegistry(format!(
                        "agent '{}' hands off to unregistered agent '{}'",
                        definition.id, target
                    )));
                }
            }
        }

        debug!("Agent registry built with {} agents", self.agents.len());

        Ok(AgentRegistry {
            agents: self.agents,
            index,
        })
    }
}

/// Validated agent catalog
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<RegisteredAgent>,
    index: HashMap<AgentId, usize>,
}

impl AgentRegistry {
    /// The course-design catalog: Triage plus the four specialists
    pub fn builtin() -> Result<Self, EngineError> {
        RegistryBuilder::new()
            .register(triage::definition(), Arc::new(triage::TriageAgent))
            .register(
                instructional_design::definition(),
                Arc::new(instructional_design::InstructionalDesignAgent),
            )
            .register(faq::definition(), Arc::new(faq::FaqAgent))
            .register(
                content_expert::definition(),
                Arc::new(content_expert::ContentExpertAgent),
            )
            .register(critic::definition(), Arc::new(critic::CriticAgent))
            .build()
    }

    pub fn get(&self, id: &AgentId) -> Option<&RegisteredAgent> {
        self.index.get(id).map(|&position| &self.agents[position])
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.index.contains_key(id)
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> impl Iterator<Item = &AgentDefinition> {
        self.agents.iter().map(|agent| &agent.definition)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{ids, AgentContext, Candidate};

    struct Silent;

    impl Agent for Silent {
        fn generate(&self, _ctx: &AgentContext<'_>) -> Candidate {
            Candidate::reply("...")
        }
    }

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = AgentRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 5);

        for id in [
            ids::TRIAGE,
            ids::INSTRUCTIONAL_DESIGN,
            ids::FAQ,
            ids::CONTENT_EXPERT,
            ids::CRITIC,
        ] {
            assert!(registry.contains(&AgentId::from(id)), "missing {id}");
        }

        let triage = registry.get(&AgentId::from(ids::TRIAGE)).unwrap();
        assert_eq!(triage.definition.allowed_handoffs.len(), 4);
        assert!(triage.definition.allowed_tools.is_empty());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let err = RegistryBuilder::new()
            .register(AgentDefinition::new("a", "A", "..."), Arc::new(Silent))
            .register(AgentDefinition::new("a", "A again", "..."), Arc::new(Silent))
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedRegistry(_)));
    }

    #[test]
    fn test_self_handoff_is_rejected() {
        let err = RegistryBuilder::new()
            .register(
                AgentDefinition::new("a", "A", "...").with_handoffs(["a"]),
                Arc::new(Silent),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn test_unknown_handoff_target_is_rejected() {
        let err = RegistryBuilder::new()
            .register(
                AgentDefinition::new("a", "A", "...").with_handoffs(["ghost"]),
                Arc::new(Silent),
            )
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
