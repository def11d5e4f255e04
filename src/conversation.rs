//! Chat transcript kept by the caller between requests.
//! The pipeline only ever sees `Transcript::render()`.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Input that starts a fresh conversation
pub const NEW_CONVERSATION_KEYWORD: &str = "/new";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role
{   User
  , Assistant
}

impl fmt::Display for Role
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Role::User => f.write_str("User")
          , Role::Assistant => f.write_str("Assistant")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn
{   pub role: Role
  , pub content: String
}

/// How full the transcript is relative to the token budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPressure
{   Low
  , Elevated
  , Exceeded
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript
{   turns: Vec<Turn>
}

impl Transcript
{   pub fn new() -> Self
    {   Transcript::default()
    }

    pub fn is_reset_command(input: &str) -> bool
    {   input.trim() == NEW_CONVERSATION_KEYWORD
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>)
    {   self.turns.push(Turn { role, content: content.into() });
    }

    pub fn push_user(&mut self, content: impl Into<String>)
    {   self.push(Role::User, content)
    }

    pub fn push_assistant(&mut self, content: impl Into<String>)
    {   self.push(Role::Assistant, content)
    }

    pub fn turns(&self) -> &[Turn]
    {   &self.turns
    }

    pub fn is_empty(&self) -> bool
    {   self.turns.is_empty()
    }

    pub fn clear(&mut self)
    {   self.turns.clear();
    }

    /// One `Role: content` line per turn
    pub fn render(&self) -> String
    {   self.turns
          .iter()
          .map(|t| format!("{}: {}\n", t.role, t.content))
          .collect()
    }

    /// Rough estimate at four bytes per token
    pub fn estimated_tokens(&self) -> usize
    {   self.render().len() / 4
    }

    pub fn pressure(&self, max_tokens: u32) -> MemoryPressure
    {   let used = self.estimated_tokens() as f64;
        let budget = max_tokens as f64;
        if used > budget
        {   MemoryPressure::Exceeded
        } else if used > budget * 0.8
        {   MemoryPressure::Elevated
        } else
        {   MemoryPressure::Low
        }
    }
}
