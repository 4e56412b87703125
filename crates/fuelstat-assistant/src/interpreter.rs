//! Free-text command interpretation through a language-model API
//!
//! The model is prompted to answer with a fixed JSON schema; its reply is
//! validated by [`parse_command`]. Replies are never retried.

use crate::command::{DashboardCommand, parse_command};
use chrono::NaiveDate;
use fuelstat_core::config::{AssistantSettings, DEFAULT_TIMEOUT};
use fuelstat_core::error::{FuelstatError, Result};
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use tracing::{debug, info};

pub const MAX_OUTPUT_TOKENS: u32 = 400;

/// Instructions sent ahead of the user's text
///
/// Unspecified dates default to the current month up to `today`.
pub fn system_prompt(today: NaiveDate) -> String {
    let first_of_month = today.format("%Y-%m-01");
    format!(
        r#"Você é um orquestrador para um dashboard de abastecimentos.
Responda SOMENTE em JSON válido, sem markdown, sem texto extra, sem explicações.
Formato:
{{
  "acao": "<acao>",
  "filtros": {{
    "data_inicial": "YYYY-MM-DD",
    "hora_inicial": "HH:MM",
    "data_final": "YYYY-MM-DD",
    "hora_final": "HH:MM"
  }},
  "filtros_extras": {{
    "produto": "<nome do produto ou vazio>",
    "colaborador": "<nome do funcionário ou vazio>",
    "nivel": "<nível ou vazio>"
  }},
  "parametros": {{
    "top_n": <numero> (opcional),
    "modo": "<linha|barras|area|dispersao>" (opcional)
  }}
}}

Ações possíveis:
- mostrar_tendencia
- mostrar_top_colaboradores
- mostrar_kpis

Se não especificar data/hora, use:
data_inicial = {first_of_month}, hora_inicial = "00:00",
data_final = {today}, hora_final = "23:59".
"#,
        today = today.format("%Y-%m-%d"),
    )
}

/// Concatenated `output_text` parts of a Responses API body
pub fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = body
        .get("output")?
        .as_array()?
        .iter()
        .filter_map(|item| item.get("content")?.as_array())
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text")?.as_str())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

/// Maps free text to a [`DashboardCommand`]
pub struct CommandInterpreter {
    client: reqwest::Client,
    settings: AssistantSettings,
}

impl CommandInterpreter {
    pub fn new(settings: AssistantSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Ask the model and validate its reply
    pub async fn interpret(&self, text: &str, today: NaiveDate) -> Result<DashboardCommand> {
        let reply = self.complete(text, today).await?;
        debug!("Assistant reply: {}", reply);
        let command = parse_command(&reply)?;
        info!(action = ?command.action, "Interpreted command");
        Ok(command)
    }

    /// Raw reply text for `text`
    pub async fn complete(&self, text: &str, today: NaiveDate) -> Result<String> {
        let url = format!("{}/responses", self.settings.base_url);
        let payload = json!({
            "model": self.settings.model,
            "input": [
                {"role": "system", "content": system_prompt(today)},
                {"role": "user", "content": text}
            ],
            "max_output_tokens": MAX_OUTPUT_TOKENS
        });

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.settings.api_key))
            .json(&payload)
            .timeout(DEFAULT_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        extract_output_text(&body)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FuelstatError::AssistantResponse {
                reason: "reply has no output text".to_string(),
                raw: body.to_string(),
            })
    }
}
