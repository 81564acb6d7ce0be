//! Optional second pass: a free-text business analysis of the generated prompt document.

use crate::error::LlmError;
use crate::extract::SENTINEL;
use crate::llm::{ChatClient, ChatRequest, Message, Usage};
use crate::utils::sanitize_filename;
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::sync::Arc;

const ANALYST_SYSTEM_PROMPT: &str = "You are a professional business analyst and marketing \
    consultant. Provide clear, actionable insights based on business information.";

pub const ANALYSIS_TEMPERATURE: f32 = 0.7;
pub const ANALYSIS_MAX_TOKENS: u32 = 800;

/// Runs the analysis request against a chat endpoint.
pub struct BusinessAnalyst {
    client: Arc<dyn ChatClient>,
}

impl BusinessAnalyst {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self { client }
    }

    /// Analyse `document` (the filled-in prompt) for the business named `company_name`
    pub async fn analyze(
        &self,
        document: &str,
        company_name: &str,
    ) -> Result<AnalysisReport, LlmError> {
        ::log::info!(
            "Requesting business analysis ({} chars of prompt)",
            document.chars().count()
        );
        let completion = self.client.complete(&build_request(document)).await?;

        Ok(AnalysisReport {
            company_name: company_name.to_string(),
            prompt_document: document.to_string(),
            analysis: completion.content,
            usage: completion.usage,
            generated_at: Local::now(),
        })
    }
}

/// Analysis request: analyst framing, five requested sections, temperature 0.7, 800 tokens
pub fn build_request(document: &str) -> ChatRequest {
    let prompt = format!(
        "Based on the following business information, provide a comprehensive analysis \
         and suggestions:\n\n{}\n\nPlease provide:\n\
         1. Business Overview (2-3 sentences)\n\
         2. Key Strengths (3-4 points)\n\
         3. Marketing Suggestions (3-4 ideas)\n\
         4. Potential Improvements (2-3 suggestions)\n\
         5. Target Audience Analysis (1-2 sentences)\n\n\
         Format your response professionally with clear sections.\n",
        document
    );

    ChatRequest::new()
        .message(Message::system(ANALYST_SYSTEM_PROMPT))
        .message(Message::user(prompt))
        .temperature(ANALYSIS_TEMPERATURE)
        .max_tokens(ANALYSIS_MAX_TOKENS)
}

/// The analysis together with what it was based on, ready to be saved
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub company_name: String,
    pub prompt_document: String,
    pub analysis: String,
    pub usage: Option<Usage>,
    pub generated_at: DateTime<Local>,
}

impl AnalysisReport {
    fn display_company(&self) -> &str {
        let name = self.company_name.trim();
        if name.is_empty() || name == SENTINEL {
            "Business"
        } else {
            name
        }
    }

    /// Suggested file name for the downloadable report
    pub fn download_name(&self) -> String {
        format!("{}_analysis.txt", sanitize_filename(self.display_company()))
    }

    /// Plain-text report: title, timestamp, the prompt document, the analysis and usage
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Business Analysis Report - {}", self.display_company());
        let _ = writeln!(
            out,
            "Generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        );
        let _ = write!(out, "\nOriginal Prompt:\n{}\n", self.prompt_document);
        let _ = write!(out, "\nAnalysis:\n{}\n", self.analysis);
        if let Some(usage) = &self.usage {
            let _ = writeln!(
                out,
                "\nToken usage: {} total ({} prompt, {} completion)",
                usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
            );
        }
        out
    }
}
