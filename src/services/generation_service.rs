use crate::error::Result;
use crate::models::question::{Blank, Difficulty, Question, QuestionDetails, QuizMode};
use crate::utils::text::blank_marker_count;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use uuid::Uuid;

/// The question-generation side of the external facade. May legitimately
/// return an empty list; callers treat empty as a hard failure for the
/// batch.
#[allow(async_fn_in_trait)]
pub trait QuestionSource {
    async fn generate_questions(
        &self,
        source_text: &str,
        mode: QuizMode,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Question>>;
}

#[derive(Clone)]
pub struct OpenAiGenerationService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerationService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    fn system_prompt() -> &'static str {
        r#"You are a study coach generating quiz questions from a student's own study material.
The output must be a valid JSON object containing a 'questions' array.

Rules:
1. Generate exactly the requested number of questions at the requested difficulty.
2. Every question must be answerable from the supplied source text alone.
3. Follow the schema example for the requested mode exactly.
4. CRITICAL: for choice questions, VARY the correct_index. Do NOT always use 0.
5. Avoid "All of the above" or "None of the above" options.
"#
    }

    fn schema_example(mode: QuizMode) -> JsonValue {
        match mode {
            QuizMode::Standard | QuizMode::Explain => serde_json::json!({
                "questions": [{
                    "prompt": "Question text...",
                    "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
                    "correct_index": 2,
                    "explanation": "Why the option at index 2 is correct..."
                }]
            }),
            QuizMode::Swipe => serde_json::json!({
                "questions": [{
                    "prompt": "A statement that is either true or false...",
                    "is_true": false
                }]
            }),
            QuizMode::FillBlanks => serde_json::json!({
                "questions": [{
                    "prompt": "Topic of the sentence...",
                    "text_with_blanks": "Water boils at ___ degrees Celsius at ___ pressure.",
                    "blanks": [
                        { "accepted_answers": ["100", "one hundred"] },
                        { "accepted_answers": ["atmospheric", "standard"] }
                    ]
                }]
            }),
        }
    }

    async fn chat(&self, payload: JsonValue) -> Result<JsonValue> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Generation API error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .and_then(|s| serde_json::from_str(s).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid generation response format").into())
    }

    /// Coerces loosely-typed model output into the closed question union.
    /// Malformed entries are dropped, the batch is truncated to `count`.
    pub fn sanitize_questions(
        &self,
        raw: &JsonValue,
        mode: QuizMode,
        difficulty: Difficulty,
        count: usize,
    ) -> Vec<Question> {
        let arr_val = if let Some(arr) = raw.get("questions").and_then(|a| a.as_array()) {
            arr.clone()
        } else if let Some(arr) = raw.as_array() {
            arr.clone()
        } else {
            vec![]
        };

        let mut rng = rand::thread_rng();
        let mut questions = Vec::new();

        for val in arr_val.iter() {
            match Self::coerce_question(val, mode, difficulty, &mut rng) {
                Ok(q) => questions.push(q),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed generated question");
                }
            }
        }

        if questions.len() > count {
            questions.truncate(count);
        }

        questions
    }

    fn coerce_question(
        v: &JsonValue,
        mode: QuizMode,
        difficulty: Difficulty,
        rng: &mut impl rand::Rng,
    ) -> anyhow::Result<Question> {
        let prompt = v
            .get("prompt")
            .and_then(|s| s.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing prompt"))?
            .to_string();

        let details = match mode {
            QuizMode::Standard | QuizMode::Explain => {
                let (options, correct_index, explanation) = Self::coerce_choice_payload(v, rng)?;
                if mode == QuizMode::Standard {
                    QuestionDetails::Standard {
                        options,
                        correct_index,
                        explanation,
                    }
                } else {
                    QuestionDetails::Explain {
                        options,
                        correct_index,
                        explanation,
                    }
                }
            }
            QuizMode::Swipe => {
                let is_true = v
                    .get("is_true")
                    .and_then(|b| b.as_bool())
                    .or_else(|| v.get("correct_index").and_then(|i| i.as_i64()).map(|i| i == 0))
                    .ok_or_else(|| anyhow::anyhow!("missing is_true"))?;
                QuestionDetails::Swipe {
                    correct_index: usize::from(!is_true),
                }
            }
            QuizMode::FillBlanks => {
                let text_with_blanks = v
                    .get("text_with_blanks")
                    .and_then(|s| s.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("missing text_with_blanks"))?
                    .to_string();

                let blanks = Self::coerce_blanks(v)?;
                if blanks.is_empty() {
                    anyhow::bail!("no blanks");
                }
                if blank_marker_count(&text_with_blanks) != blanks.len() {
                    anyhow::bail!(
                        "blank marker count does not match blank count in: {}",
                        text_with_blanks
                    );
                }
                QuestionDetails::FillBlanks {
                    text_with_blanks,
                    blanks,
                }
            }
        };

        Ok(Question {
            id: Uuid::new_v4(),
            prompt,
            difficulty,
            details,
        })
    }

    fn coerce_choice_payload(
        v: &JsonValue,
        rng: &mut impl rand::Rng,
    ) -> anyhow::Result<(Vec<String>, usize, String)> {
        let mut options: Vec<String> = v
            .get("options")
            .and_then(|o| o.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|x| x.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if options.len() != 4 {
            anyhow::bail!("expected 4 options, got {}", options.len());
        }

        let correct = v
            .get("correct_index")
            .and_then(|i| i.as_i64())
            .ok_or_else(|| anyhow::anyhow!("missing correct_index"))?;
        if correct < 0 || correct as usize >= options.len() {
            anyhow::bail!("correct_index {} out of range", correct);
        }

        // Shuffle so the correct option does not cluster at one position;
        // the index is remapped before the question is handed out and is
        // immutable afterwards.
        let correct_option = options[correct as usize].clone();
        options.shuffle(rng);
        let correct_index = options
            .iter()
            .position(|o| o == &correct_option)
            .unwrap_or(0);

        let explanation = v
            .get("explanation")
            .and_then(|s| s.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        Ok((options, correct_index, explanation))
    }

    fn coerce_blanks(v: &JsonValue) -> anyhow::Result<Vec<Blank>> {
        let raw = v
            .get("blanks")
            .and_then(|b| b.as_array())
            .ok_or_else(|| anyhow::anyhow!("missing blanks"))?;

        let mut blanks = Vec::new();
        for (idx, item) in raw.iter().enumerate() {
            let accepted: Vec<String> = item
                .get("accepted_answers")
                .and_then(|a| a.as_array())
                .map(|a| {
                    a.iter()
                        .filter_map(|x| x.as_str())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            if accepted.is_empty() {
                anyhow::bail!("blank {} has no accepted answers", idx);
            }

            let id = item
                .get("id")
                .and_then(|s| s.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("b{}", idx + 1));

            blanks.push(Blank {
                id,
                accepted_answers: accepted,
            });
        }

        Ok(blanks)
    }
}

impl QuestionSource for OpenAiGenerationService {
    async fn generate_questions(
        &self,
        source_text: &str,
        mode: QuizMode,
        difficulty: Difficulty,
        count: usize,
    ) -> Result<Vec<Question>> {
        let user_payload = serde_json::json!({
            "mode": mode.label(),
            "difficulty": difficulty.label(),
            "required_count": count,
            "schema_example": Self::schema_example(mode),
            "source_text": source_text,
        });

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": Self::system_prompt()},
                {"role": "user", "content": serde_json::to_string(&user_payload)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.8
        });

        let response = self.chat(payload).await?;
        let questions = self.sanitize_questions(&response, mode, difficulty, count);
        tracing::info!(
            "generated {} {} question(s) at {} difficulty",
            questions.len(),
            mode.label(),
            difficulty.label()
        );
        Ok(questions)
    }
}
