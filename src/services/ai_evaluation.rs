use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::core::config::Settings;

const EVALUATION_SYSTEM_PROMPT: &str = r#"You are an experienced examiner grading a student's answer sheet against the teacher's answer key.

The first attachment is the answer key, the remaining attachments are the student's answer-sheet pages in order.

Grading rules:
1. Award marks per question according to the answer key and its marking scheme.
2. Partial credit is allowed for partially correct descriptive answers.
3. Never award more than the stated maximum total marks.
4. If a page is unreadable, grade what is legible and mention the problem in the feedback.

Respond with strict JSON only:
{
  "marks_obtained": <number between 0 and the maximum>,
  "feedback": "<2-5 sentences of constructive feedback for the student>"
}
"#;

#[derive(Debug, Clone)]
pub(crate) struct EvaluateRequest {
    pub(crate) key_file_url: String,
    pub(crate) sheet_file_urls: Vec<String>,
    pub(crate) total_marks: i32,
    pub(crate) exam_name: String,
    pub(crate) subject: String,
    pub(crate) submission_id: String,
}

#[derive(Debug, Clone)]
pub(crate) struct AiVerdict {
    pub(crate) marks_obtained: f64,
    pub(crate) feedback: String,
}

#[derive(Debug, Clone)]
pub(crate) struct AiEvaluationService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AiEvaluationService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai().ai_request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().ai_model.clone(),
            max_tokens: settings.ai().ai_max_tokens,
        })
    }

    pub(crate) fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub(crate) async fn evaluate(&self, request: EvaluateRequest) -> Result<AiVerdict> {
        if !self.is_configured() {
            anyhow::bail!("OPENAI_API_KEY is not configured");
        }

        let timer = Instant::now();

        let user_prompt = format!(
            "Exam: {}\nSubject: {}\nMaximum marks: {}\n\nThe first image is the answer key; \
             the following {} image(s) are the student's answer-sheet pages. Grade the \
             submission and respond with the JSON format described in the system prompt.",
            request.exam_name,
            request.subject,
            request.total_marks,
            request.sheet_file_urls.len(),
        );

        let mut content = vec![json!({"type": "text", "text": user_prompt})];
        for file_url in std::iter::once(&request.key_file_url).chain(&request.sheet_file_urls) {
            if file_url.starts_with("http") {
                content.push(json!({
                    "type": "image_url",
                    "image_url": {"url": file_url}
                }));
            } else {
                content.push(json!({
                    "type": "image_url",
                    "image_url": {"url": format!("data:image/jpeg;base64,{file_url}")}
                }));
            }
        }

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": EVALUATION_SYSTEM_PROMPT},
                {"role": "user", "content": content}
            ],
            "max_completion_tokens": self.max_tokens,
            "temperature": 0.0,
            "response_format": {"type": "json_object"}
        });

        tracing::info!(submission_id = %request.submission_id, "Sending AI evaluation request");

        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;
        let mut body = Value::Null;

        for attempt in 0..=3 {
            let response =
                self.client.post(&url).bearer_auth(&self.api_key).json(&payload).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    body = resp.json().await.unwrap_or(Value::Null);
                    if status.is_success() {
                        last_error = None;
                        break;
                    }
                    last_error = Some(anyhow::anyhow!("AI API error: {body}"));
                }
                Err(err) => {
                    last_error = Some(anyhow::anyhow!(err).context("Failed to call AI API"));
                }
            }

            if attempt < 3 {
                tokio::time::sleep(Duration::from_secs(2_u64.pow(attempt as u32))).await;
            }
        }

        if let Some(err) = last_error {
            return Err(err);
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing AI response content")?;

        let result: Value =
            serde_json::from_str(content).context("Failed to parse AI verdict JSON")?;
        let verdict = parse_verdict(&result)?;

        let tokens_used = body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(|value| value.as_u64());

        tracing::info!(
            submission_id = %request.submission_id,
            duration_seconds = timer.elapsed().as_secs_f64(),
            tokens_used = tokens_used,
            marks_obtained = verdict.marks_obtained,
            "AI evaluation completed"
        );

        Ok(verdict)
    }
}

fn parse_verdict(result: &Value) -> Result<AiVerdict> {
    let marks_obtained = result
        .get("marks_obtained")
        .and_then(|value| value.as_f64())
        .context("AI verdict is missing a numeric marks_obtained")?;

    let feedback = result
        .get("feedback")
        .and_then(|value| value.as_str())
        .unwrap_or("No feedback provided.")
        .to_string();

    Ok(AiVerdict { marks_obtained, feedback })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verdict_reads_marks_and_feedback() {
        let raw = json!({"marks_obtained": 72.5, "feedback": "Solid work."});
        let verdict = parse_verdict(&raw).expect("verdict");
        assert_eq!(verdict.marks_obtained, 72.5);
        assert_eq!(verdict.feedback, "Solid work.");
    }

    #[test]
    fn parse_verdict_defaults_missing_feedback() {
        let raw = json!({"marks_obtained": 10});
        let verdict = parse_verdict(&raw).expect("verdict");
        assert_eq!(verdict.feedback, "No feedback provided.");
    }

    #[test]
    fn parse_verdict_rejects_missing_marks() {
        let raw = json!({"feedback": "no marks here"});
        assert!(parse_verdict(&raw).is_err());
    }
}
