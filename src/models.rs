use serde::Serialize;

use crate::api::AIProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub max_tokens: Option<u32>,
    pub provider: AIProvider,
}

pub const GROQ_MODELS: &[AiModel] = &[
    AiModel {
        id: "qwen-2.5-coder-32b",
        name: "Qwen 2.5 Coder (32B)",
        description: "Specialized model for coding tasks with enhanced programming capabilities",
        max_tokens: None,
        provider: AIProvider::Groq,
    },
    AiModel {
        id: "llama3-8b-8192",
        name: "Llama 3 (8B)",
        description: "Efficient and versatile model for general-purpose tasks",
        max_tokens: None,
        provider: AIProvider::Groq,
    },
    AiModel {
        id: "llama3-70b-8192",
        name: "Llama 3 (70B)",
        description: "High-capacity model with strong reasoning and generation capabilities",
        max_tokens: None,
        provider: AIProvider::Groq,
    },
    AiModel {
        id: "mixtral-8x7b-32768",
        name: "Mixtral (8x7B)",
        description: "Mixture of experts model with broad knowledge and long context window",
        max_tokens: None,
        provider: AIProvider::Groq,
    },
    AiModel {
        id: "gemma-7b-it",
        name: "Gemma (7B)",
        description: "Lightweight model with good instruction-following abilities",
        max_tokens: None,
        provider: AIProvider::Groq,
    },
];

pub const GEMINI_MODELS: &[AiModel] = &[
    AiModel {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        description: "Fast and efficient model for quick responses",
        max_tokens: Some(8192),
        provider: AIProvider::Gemini,
    },
    AiModel {
        id: "gemini-2.0-pro",
        name: "Gemini 2.0 Pro",
        description: "Advanced model for complex reasoning and generation",
        max_tokens: Some(32768),
        provider: AIProvider::Gemini,
    },
];

pub fn available_models(provider: AIProvider) -> &'static [AiModel] {
    match provider {
        AIProvider::Groq => GROQ_MODELS,
        AIProvider::Gemini => GEMINI_MODELS,
    }
}

pub fn default_model(provider: AIProvider) -> &'static str {
    available_models(provider)[0].id
}

pub fn find_model(id: &str) -> Option<&'static AiModel> {
    GROQ_MODELS.iter().chain(GEMINI_MODELS).find(|m| m.id == id)
}

/// Display name for a model id; unknown ids are shown as-is.
pub fn model_name(id: &str) -> &str {
    find_model(id).map(|m| m.name).unwrap_or(id)
}
