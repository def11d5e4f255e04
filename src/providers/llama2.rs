use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::family::FamilyDefaults;
use crate::request::GenerationParams;

#[derive(Debug, Clone, Serialize)]
pub struct LlamaRequest<'a>
{   pub prompt: &'a str
  , pub max_gen_len: u32
  , pub temperature: f32
  , pub top_p: f32
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlamaGeneration
{   pub generation: String
  , #[serde(default)]
    pub stop_reason: Option<String>
}

pub fn build_request(
  rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   super::encode(&LlamaRequest
    {   prompt: rendered
      , max_gen_len: params.max_tokens
      , temperature: params.temperature
      , top_p: defaults.top_p
    })
}

pub fn completion_text(document: &[u8]) -> Result<String, Error>
{   let response: LlamaGeneration = super::decode(document)?;
    Ok(response.generation)
}

pub fn fragment_text(fragment: &[u8]) -> Result<String, Error>
{   completion_text(fragment)
}
