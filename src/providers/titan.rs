use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::family::FamilyDefaults;
use crate::request::GenerationParams;

// ===== Request =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanRequest<'a>
{   pub input_text: &'a str
  , pub text_generation_config: TextGenerationConfig<'a>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGenerationConfig<'a>
{   pub max_token_count: u32
  , pub stop_sequences: &'a [String]
  , pub temperature: f32
  , pub top_p: f32
}

// ===== Responses =====

#[derive(Debug, Clone, Deserialize)]
pub struct TitanResponse
{   pub results: Vec<TitanResult>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResult
{   pub output_text: String
  , #[serde(default)]
    pub completion_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanChunk
{   pub output_text: String
  , #[serde(default)]
    pub index: Option<u32>
}

pub fn build_request(
  rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   super::encode(&TitanRequest
    {   input_text: rendered
      , text_generation_config: TextGenerationConfig
        {   max_token_count: params.max_tokens
          , stop_sequences: &defaults.stop_sequences
          , temperature: params.temperature
          , top_p: defaults.top_p
        }
    })
}

pub fn completion_text(document: &[u8]) -> Result<String, Error>
{   let response: TitanResponse = super::decode(document)?;
    response.results
      .into_iter()
      .next()
      .map(|r| r.output_text)
      .ok_or_else(|| Error::malformed("empty results", document))
}

pub fn fragment_text(fragment: &[u8]) -> Result<String, Error>
{   let chunk: TitanChunk = super::decode(fragment)?;
    Ok(chunk.output_text)
}
