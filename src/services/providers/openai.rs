/// OpenAI chat-completions explanation provider
///
/// Builds a shopping-assistant prompt from the product fields and the user's
/// behavior summary, and asks for a 2-3 sentence explanation.
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{BehaviorProfile, Product},
    services::providers::ExplanationGenerator,
};

const MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 150;

/// Returned when the API call succeeds but the completion comes back empty
const EMPTY_COMPLETION_TEXT: &str =
    "This product matches your interests based on your browsing history.";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiExplainer {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OpenAiExplainer {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    fn build_prompt(product: &Product, profile: &BehaviorProfile) -> String {
        let mut behavior_context = Vec::new();
        if let Some(category) = &profile.top_category {
            behavior_context.push(format!("preference for {}", category));
        }
        if let Some(avg_price) = profile.avg_price {
            behavior_context.push(format!("typical budget around ${:.2}", avg_price));
        }
        if profile.total_views > 0 {
            behavior_context.push(format!("{} products viewed", profile.total_views));
        }
        if !profile.recent_searches.is_empty() {
            behavior_context.push(format!(
                "recent searches: \"{}\"",
                profile.recent_searches.join("\", \"")
            ));
        }

        let behavior_summary = if behavior_context.is_empty() {
            "their browsing activity".to_string()
        } else {
            behavior_context.join(", ")
        };

        format!(
            "You are a friendly personal shopping assistant. Explain why this product is recommended to the user.\n\n\
             Product Details:\n\
             - Name: {}\n\
             - Category: {}\n\
             - Price: ${}\n\
             - Rating: {}/5\n\n\
             User Profile:\n\
             {}\n\n\
             Write a personalized 2-3 sentence explanation of why this product matches their interests. \
             Be conversational and engaging. Focus on the value proposition based on their behavior.",
            product.title, product.category, product.price, product.rating_rate, behavior_summary
        )
    }
}

#[async_trait]
impl ExplanationGenerator for OpenAiExplainer {
    async fn explain(&self, product: Product, profile: BehaviorProfile) -> AppResult<String> {
        let prompt = Self::build_prompt(&product, &profile);

        let url = format!("{}/chat/completions", self.api_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: MODEL,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_TEXT.to_string());

        tracing::debug!(
            product_id = product.id,
            chars = text.len(),
            "Explanation generated"
        );

        Ok(text)
    }
}
