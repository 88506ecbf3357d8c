//! External reformatting service
//!
//! A `Formatter` receives the full prompt (example layout plus projected
//! source data) and returns free-form text. The width instruction in the
//! prompt is advisory; callers always reflow the response themselves.
//!
//! Every call carries a `CancellationToken`. Implementations should stop
//! waiting once it fires, but callers must still check the token after the
//! call settles and drop the result if it was cancelled.

mod gemini;

pub use gemini::GeminiFormatter;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatterError {
    #[error("No API key configured (set SHEETWRAP_API_KEY or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("The service returned no text")]
    EmptyResponse,

    #[error("Request was cancelled")]
    Cancelled,
}

/// Turns a prompt into reformatted text
#[async_trait]
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    async fn format(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<String, FormatterError>;
}

/// Build the reformatting prompt.
///
/// The model is told to convert the whole source, keep lines within
/// `max_width` characters and answer with plain text only.
pub fn build_prompt(example: &str, source: &str, max_width: usize) -> String {
    format!(
        "You are an expert data formatter. Your task is to reformat the entire 'Source Data' \
by applying the structure and style demonstrated in the 'Example Output Format'. \
The example shows *how* to format the data, but you must process and convert all data \
from the source file. Do not omit any data from the source.

**Example Output Format (This demonstrates the desired structure):**
{example}

**Source Data (Apply the formatting logic to this entire dataset):**
{source}

**Formatting Rules:**
1. Each output line MUST NOT exceed {max_width} characters.
2. Your response must contain ONLY the formatted text.
3. Do NOT include any explanations, markdown formatting (like ```), code snippets, \
or separators like '---'. The output must be pure, clean text.

**Formatted Output (Containing all converted data from the source):**"
    )
}
