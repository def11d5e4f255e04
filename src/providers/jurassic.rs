use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::family::FamilyDefaults;
use crate::request::GenerationParams;

// ===== Request =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurassicRequest<'a>
{   pub prompt: &'a str
  , pub max_tokens: u32
  , pub temperature: f32
  , pub top_p: f32
  , pub stop_sequences: &'a [String]
  , pub count_penalty: Penalty
  , pub presence_penalty: Penalty
  , pub frequency_penalty: Penalty
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Penalty
{   pub scale: u32
}

// ===== Response =====

#[derive(Debug, Clone, Deserialize)]
pub struct JurassicResponse
{   pub completions: Vec<JurassicCompletion>
}

#[derive(Debug, Clone, Deserialize)]
pub struct JurassicCompletion
{   pub data: CompletionData
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionData
{   pub text: String
}

pub fn build_request(
  rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   super::encode(&JurassicRequest
    {   prompt: rendered
      , max_tokens: params.max_tokens
      , temperature: params.temperature
      , top_p: defaults.top_p
      , stop_sequences: &defaults.stop_sequences
      , count_penalty: Penalty::default()
      , presence_penalty: Penalty::default()
      , frequency_penalty: Penalty::default()
    })
}

pub fn completion_text(document: &[u8]) -> Result<String, Error>
{   let response: JurassicResponse = super::decode(document)?;
    response.completions
      .into_iter()
      .next()
      .map(|c| c.data.text)
      .ok_or_else(|| Error::malformed("empty completions", document))
}
