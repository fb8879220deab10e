use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::ExtractionError;
use crate::profile::PartialProfile;

/// Trait for structured fact extraction from one user message.
///
/// Implementations return only the facts they can confidently infer; an
/// error here never aborts a turn — the orchestrator absorbs it.
#[async_trait]
pub trait FactExtractor: Send + Sync {
    async fn extract(&self, message: &str) -> Result<PartialProfile, ExtractionError>;
}

/// Extraction instruction. The model fills the schema below and returns
/// null for anything it is not sure about.
const EXTRACTION_INSTRUCTION: &str = "Extrahuj klíčová fakta o seniorovi: věk, bydliště, \
     zájmy, potřeby, zdravotní stav a omezení. Pokud si nejsi jistý, vrať null.";

/// LLM-backed extractor constraining the model's reply to the
/// [`PartialProfile`] shape via a JSON schema response format.
pub struct OpenAiExtractor {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: String, model: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "age": { "type": ["integer", "null"] },
                "place_of_residence": { "type": ["string", "null"] },
                "hobbies": { "type": ["string", "null"], "description": "Koníčky, např. hudba." },
                "social_service_interest": { "type": ["string", "null"] },
                "health_status": { "type": ["string", "null"] },
                "medical_diagnosis": { "type": ["string", "null"] },
                "life_limitations": { "type": ["string", "null"] },
            },
            "required": [
                "age",
                "place_of_residence",
                "hobbies",
                "social_service_interest",
                "health_status",
                "medical_diagnosis",
                "life_limitations",
            ],
            "additionalProperties": false,
        })
    }
}

#[async_trait]
impl FactExtractor for OpenAiExtractor {
    async fn extract(&self, message: &str) -> Result<PartialProfile, ExtractionError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": EXTRACTION_INSTRUCTION },
                { "role": "user", "content": message },
            ],
            "temperature": 0.2,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "senior_info_extraction",
                    "strict": true,
                    "schema": Self::response_schema(),
                },
            },
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError(format!("{status}: {text}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractionError(e.to_string()))?;

        let content = parsed
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| ExtractionError("reply carried no content".into()))?;

        serde_json::from_str::<PartialProfile>(content)
            .map_err(|e| ExtractionError(format!("malformed structured reply: {e}")))
    }
}
