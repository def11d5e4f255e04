//! Prompt templates and per-request generation inputs

use serde::{Deserialize, Serialize};
use crate::error::Error;

/// Canonical placeholder name
pub const INPUT_PLACEHOLDER: &str = "INPUT";

/// Template used by the text-improver front-ends
pub const IMPROVER_TEMPLATE: &str
  = "Improve upon the following text in a critical but helpful way:\n$INPUT";

/// Template used by the question-answering front-end
pub const ASK_TEMPLATE: &str
  = "Provide a helpful, friendly response to this user question:\n$INPUT";

/// Template used by the chat front-end
pub const CHAT_TEMPLATE: &str
  = "You are a helpful and succinct assistant. \
     Give a one-sentence reply to the user's question.\n$INPUT";

/// How the prompt body is framed and how replies are cleaned up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle
{   /// Single question, single answer
    #[default]
    Completion
  , /// Transcript of `User:`/`Assistant:` turns
    Conversational
}

/// A prompt with one named `$NAME` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate
{   text: String
  , placeholder: String
}

impl PromptTemplate
{   /// Template using the canonical `$INPUT` placeholder
    pub fn new(text: impl Into<String>) -> Self
    {   Self::with_placeholder(text, INPUT_PLACEHOLDER)
    }

    /// Template using a `$name` placeholder
    pub fn with_placeholder(
      text: impl Into<String>
    , name: &str
    ) -> Self
    {   PromptTemplate
        {   text: text.into()
          , placeholder: format!("${}", name)
        }
    }

    pub fn as_str(&self) -> &str
    {   &self.text
    }

    pub fn placeholder(&self) -> &str
    {   &self.placeholder
    }

    pub fn has_placeholder(&self) -> bool
    {   self.text.contains(&self.placeholder)
    }

    /// Literal substitution. Without a placeholder the template is
    /// returned unchanged.
    pub fn render(&self, input: &str) -> String
    {   self.text.replace(&self.placeholder, input)
    }
}

impl Default for PromptTemplate
{   fn default() -> Self
    {   PromptTemplate::new(IMPROVER_TEMPLATE)
    }
}

/// Substitute `input` for `$INPUT` in `template`
pub fn render(template: &str, input: &str) -> String
{   PromptTemplate::new(template).render(input)
}

/// Caller-chosen generation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams
{   /// Sampling temperature in [0, 1]
    pub temperature: f32
  , /// Upper bound on generated tokens
    pub max_tokens: u32
  , pub style: PromptStyle
}

impl GenerationParams
{   pub fn new(temperature: f32, max_tokens: u32)
      -> Result<Self, Error>
    {   let params = GenerationParams
        {   temperature
          , max_tokens
          , style: PromptStyle::Completion
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_style(mut self, style: PromptStyle) -> Self
    {   self.style = style;
        self
    }

    pub fn validate(&self) -> Result<(), Error>
    {   if !(0.0..=1.0).contains(&self.temperature)
        {   return Err(Error::InvalidConfiguration(format!(
              "temperature must be within [0, 1], got {}",
              self.temperature
            )));
        }
        if self.max_tokens == 0
        {   return Err(Error::InvalidConfiguration(
              "max_tokens must be greater than zero".to_string()
            ));
        }
        Ok(())
    }
}

impl Default for GenerationParams
{   fn default() -> Self
    {   GenerationParams
        {   temperature: 0.9
          , max_tokens: 1024
          , style: PromptStyle::Completion
        }
    }
}

/// Everything needed for one model call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest
{   /// Opaque model identifier from the catalog
    pub model_id: String
  , pub template: PromptTemplate
  , /// Text substituted into the template (may be a whole transcript)
    pub input: String
  , pub params: GenerationParams
}

impl PromptRequest
{   pub fn new(
      model_id: impl Into<String>
    , template: PromptTemplate
    , input: impl Into<String>
    , params: GenerationParams
    ) -> Self
    {   PromptRequest
        {   model_id: model_id.into()
          , template
          , input: input.into()
          , params
        }
    }
}
