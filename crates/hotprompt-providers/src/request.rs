//! Request building — validates user input against the catalog and
//! produces the provider-agnostic `ChatRequest`.

use std::sync::Arc;

use hotprompt_core::error::DispatchError;
use hotprompt_core::types::{ChatCompletionRequest, Message, Provider};

use crate::registry::ModelCatalog;

/// One system + user exchange, validated at construction.
///
/// Only [`RequestBuilder::build`] creates these, so the model is always
/// in the catalog for the provider and the user text is never blank.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    system_instruction: String,
    user_text: String,
    provider: Provider,
    model: String,
}

impl ChatRequest {
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The user text, trimmed.
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The `{model, messages: [system, user]}` body every backend sends.
    pub fn to_wire(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(self.system_instruction.clone()),
                Message::user(self.user_text.clone()),
            ],
        }
    }
}

/// Builds `ChatRequest`s against a model catalog.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    catalog: Arc<ModelCatalog>,
}

impl RequestBuilder {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Validate and assemble a request. No side effects.
    ///
    /// Blank input is rejected before the model is checked, so it always
    /// yields `EmptyInput` whatever the other arguments are.
    pub fn build(
        &self,
        system_instruction: &str,
        user_text: &str,
        provider: Provider,
        model: &str,
    ) -> Result<ChatRequest, DispatchError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(DispatchError::EmptyInput);
        }

        if !self.catalog.contains(provider, model) {
            return Err(DispatchError::InvalidModel {
                provider,
                model: model.to_string(),
            });
        }

        Ok(ChatRequest {
            system_instruction: system_instruction.to_string(),
            user_text: user_text.to_string(),
            provider,
            model: model.to_string(),
        })
    }
}
