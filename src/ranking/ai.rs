use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::AiSettings;
use crate::core::{MatchMethod, MatchResult, NgoCandidate, ScoredCandidate, MAX_ALTERNATIVES};
use crate::error::{MatchEngineError, Result};
use crate::ranking::{eligible, MatchRequest, Ranker};
use crate::scoring::capacity_score;

/// Confidence assumed when the model omits one
const DEFAULT_AI_CONFIDENCE: f64 = 0.8;

/// Chat-completions client that asks a language model to pick the NGO
pub struct AiRanker {
    client: Client,
    settings: AiSettings,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
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

/// JSON object the model is instructed to return
#[derive(Debug, Deserialize)]
struct AiRecommendation {
    #[serde(default)]
    recommended_ngo_id: Option<i64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    alternative_ids: Vec<i64>,
}

impl AiRanker {
    /// Create new AI ranker; fails when no API key is configured
    pub fn new(settings: AiSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| MatchEngineError::Config("OPENAI_API_KEY not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    fn build_prompt(request: &MatchRequest, candidates: &[&NgoCandidate]) -> Result<String> {
        let donation = &request.donation;

        let ngos_info: Vec<serde_json::Value> = candidates
            .iter()
            .map(|ngo| {
                serde_json::json!({
                    "id": ngo.id,
                    "name": ngo.name,
                    "organization": ngo.organization,
                    "capacity": ngo.capacity,
                    "location": ngo.city().unwrap_or("Not specified"),
                    "specialization": ngo.specialization.as_deref().unwrap_or("General"),
                })
            })
            .collect();

        Ok(format!(
            "Analyze this food donation and recommend the best NGO match:\n\n\
             DONATION DETAILS:\n\
             - Food: {}\n\
             - Quantity: {} {}\n\
             - Quality: {}\n\
             - Expiry: {}\n\n\
             AVAILABLE NGOs:\n{}\n\n\
             Consider NGO capacity vs donation quantity, specialization match, \
             location proximity (if available) and overall suitability.\n\n\
             Respond with JSON in this format:\n\
             {{\"recommended_ngo_id\": number, \"reasoning\": string, \
             \"confidence\": number between 0.0 and 1.0, \
             \"alternative_ids\": [2-3 alternative NGO ids]}}",
            donation.food_name,
            donation.quantity,
            donation.unit,
            donation.quality,
            donation.expiry_date,
            serde_json::to_string_pretty(&ngos_info)?,
        ))
    }

    /// Call the chat completions endpoint and return the message content
    async fn complete(&self, prompt: String) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat { kind: "json_object" },
            max_tokens: 300,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MatchEngineError::AiApi(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MatchEngineError::AiApi(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| MatchEngineError::AiApi(format!("Invalid JSON: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| MatchEngineError::InvalidAiResponse("empty completion".to_string()))
    }

    /// Turn the model's JSON answer into a result over known candidates
    pub(crate) fn interpret(
        content: &str,
        request: &MatchRequest,
        candidates: &[&NgoCandidate],
    ) -> Result<MatchResult> {
        let recommendation: AiRecommendation = serde_json::from_str(content)
            .map_err(|e| MatchEngineError::InvalidAiResponse(format!("unparseable answer: {}", e)))?;

        let selected_id = recommendation.recommended_ngo_id.ok_or_else(|| {
            MatchEngineError::InvalidAiResponse("no recommended_ngo_id".to_string())
        })?;

        let find = |id: i64| candidates.iter().copied().find(|ngo| ngo.id == id);
        let quantity = request.donation.quantity;
        let score = |ngo: &NgoCandidate| {
            let capacity = capacity_score(ngo.capacity, quantity);
            ScoredCandidate::new(ngo.clone(), capacity, capacity)
        };

        let chosen = find(selected_id).ok_or_else(|| {
            MatchEngineError::InvalidAiResponse(format!(
                "recommended NGO {} is not an eligible candidate",
                selected_id
            ))
        })?;

        let mut seen = HashSet::from([selected_id]);
        let alternatives: Vec<ScoredCandidate> = recommendation
            .alternative_ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| find(*id))
            .take(MAX_ALTERNATIVES)
            .map(&score)
            .collect();

        let confidence = recommendation
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_AI_CONFIDENCE)
            .clamp(0.0, 1.0);

        let reasoning = recommendation
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "AI-based matching".to_string());

        Ok(MatchResult {
            selected: Some(score(chosen)),
            alternatives,
            reasoning,
            confidence,
            method: MatchMethod::Ai,
            proximity_enabled: false,
            total_nearby: 0,
        })
    }
}

#[async_trait]
impl Ranker for AiRanker {
    async fn rank(&self, request: &MatchRequest, candidates: &[NgoCandidate]) -> Result<MatchResult> {
        let pool: Vec<&NgoCandidate> = eligible(candidates).collect();
        if pool.is_empty() {
            return Ok(MatchResult::empty("No NGOs available"));
        }

        let prompt = Self::build_prompt(request, &pool)?;
        let content = self.complete(prompt).await?;
        Self::interpret(&content, request, &pool)
    }

    fn name(&self) -> &str {
        "ai"
    }
}
