use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::family::FamilyDefaults;
use crate::request::GenerationParams;

/// Turn framing required by the text completions API
pub fn wrap_prompt(rendered: &str) -> String
{   format!("\n\nHuman: {}\n\nAssistant:", rendered)
}

// ===== Request =====

#[derive(Debug, Clone, Serialize)]
pub struct ClaudeRequest<'a>
{   pub prompt: String
  , pub max_tokens_to_sample: u32
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>
  , pub top_p: f32
  , pub stop_sequences: &'a [String]
}

// ===== Responses =====

/// Same shape for complete documents and streamed chunks
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeCompletion
{   pub completion: String
  , #[serde(default)]
    pub stop_reason: Option<String>
}

pub fn build_request(
  rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   super::encode(&ClaudeRequest
    {   prompt: wrap_prompt(rendered)
      , max_tokens_to_sample: params.max_tokens
      , temperature: params.temperature
      , top_k: defaults.top_k
      , top_p: defaults.top_p
      , stop_sequences: &defaults.stop_sequences
    })
}

pub fn completion_text(document: &[u8]) -> Result<String, Error>
{   let response: ClaudeCompletion = super::decode(document)?;
    Ok(response.completion)
}

pub fn fragment_text(fragment: &[u8]) -> Result<String, Error>
{   completion_text(fragment)
}
