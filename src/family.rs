//! Model family dispatch
//!
//! A family is derived once per request from the model identifier and
//! then drives both payload construction and response extraction.

use std::fmt;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::PromptStyle;

/// Wire-protocol dialect of a hosted model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily
{   /// Amazon Titan text models
    Titan
  , /// Anthropic Claude (text completions API)
    Claude
  , /// Cohere Command
    Command
  , /// Meta Llama 2
    Llama2
  , /// AI21 Jurassic-2
    Jurassic
}

/// Identifier substrings, checked in this order.
const FAMILY_MARKERS: [(&str, ModelFamily); 5] =
[   ("cohere.command", ModelFamily::Command)
  , ("meta.llama2", ModelFamily::Llama2)
  , ("amazon.titan", ModelFamily::Titan)
  , ("anthropic.claude", ModelFamily::Claude)
  , ("ai21.j2", ModelFamily::Jurassic)
];

impl ModelFamily
{   /// Resolve the family of an opaque model identifier
    pub fn from_model_id(model_id: &str)
      -> Result<Self, Error>
    {   match FAMILY_MARKERS
          .iter()
          .find(|(marker, _)| model_id.contains(marker))
        {   Some((_, family)) => {
              debug!("Model {} resolved to family {}", model_id, family);
              Ok(*family)
            }
          , None => {
              error!("No family matches model: {}", model_id);
              Err(Error::UnknownModelFamily(model_id.to_string()))
            }
        }
    }

    /// Identifier substring that selects this family
    pub fn marker(&self) -> &'static str
    {   FAMILY_MARKERS
          .iter()
          .find(|(_, family)| family == self)
          .map(|(marker, _)| *marker)
          .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   ModelFamily::Titan => "titan"
          , ModelFamily::Claude => "claude"
          , ModelFamily::Command => "command"
          , ModelFamily::Llama2 => "llama2"
          , ModelFamily::Jurassic => "jurassic"
        }
    }

    /// Whether the family has a streamed fragment format
    pub fn supports_streaming(&self) -> bool
    {   !matches!(self, ModelFamily::Jurassic)
    }

    /// Fixed sampling defaults that are part of the family contract
    pub fn defaults(&self, style: PromptStyle) -> FamilyDefaults
    {   let conversational = style == PromptStyle::Conversational;
        match self
        {   ModelFamily::Command => FamilyDefaults
            {   top_p: 0.9
              , top_k: None
              , stop_sequences: vec![]
            }
          , ModelFamily::Llama2 => FamilyDefaults
            {   top_p: 0.9
              , top_k: None
              , stop_sequences: vec![]
            }
          , ModelFamily::Titan => FamilyDefaults
            {   top_p: 0.9
              , top_k: None
              , stop_sequences: if conversational
                { stop(&["User:"]) } else { vec![] }
            }
          , ModelFamily::Claude => FamilyDefaults
            {   top_p: 1.0
              , top_k: Some(250)
              , stop_sequences: if conversational
                { stop(&["Human:", "User:"]) } else { stop(&["Human:"]) }
            }
          , ModelFamily::Jurassic => FamilyDefaults
            {   top_p: 1.0
              , top_k: None
              , stop_sequences: if conversational
                { stop(&["User:"]) } else { vec![] }
            }
        }
    }
}

impl fmt::Display for ModelFamily
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

fn stop(seqs: &[&str]) -> Vec<String>
{   seqs.iter().map(|s| s.to_string()).collect()
}

/// Family-owned sampling values the caller never chooses
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDefaults
{   pub top_p: f32
  , pub top_k: Option<u32>
  , pub stop_sequences: Vec<String>
}
