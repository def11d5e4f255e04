use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::family::FamilyDefaults;
use crate::request::GenerationParams;

#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a>
{   pub prompt: &'a str
  , pub max_tokens: u32
  , pub temperature: f32
  , pub p: f32
}

/// Same shape for complete documents and streamed chunks
#[derive(Debug, Clone, Deserialize)]
pub struct CommandResponse
{   pub generations: Vec<Generation>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation
{   pub text: String
  , #[serde(default)]
    pub finish_reason: Option<String>
}

pub fn build_request(
  rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   super::encode(&CommandRequest
    {   prompt: rendered
      , max_tokens: params.max_tokens
      , temperature: params.temperature
      , p: defaults.top_p
    })
}

pub fn completion_text(document: &[u8]) -> Result<String, Error>
{   let response: CommandResponse = super::decode(document)?;
    response.generations
      .into_iter()
      .next()
      .map(|g| g.text)
      .ok_or_else(|| Error::malformed("empty generations", document))
}

pub fn fragment_text(fragment: &[u8]) -> Result<String, Error>
{   completion_text(fragment)
}
