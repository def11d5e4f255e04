//! Client configuration and the supported region table

use serde::{Deserialize, Serialize};

/// Bedrock regions offered to the operator (label, region code)
pub const REGIONS: [(&str, &str); 5] =
[   ("US East (N. Virginia)", "us-east-1")
  , ("US West (N. California)", "us-west-2")
  , ("Asia Pacific (Singapore)", "ap-southeast-1")
  , ("Asia Pacific (Tokyo)", "ap-northeast-1")
  , ("Europe (Frankfurt)", "eu-central-1")
];

pub const DEFAULT_REGION: &str = "us-east-1";

pub fn is_known_region(region: &str) -> bool
{   REGIONS.iter().any(|(_, code)| *code == region)
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Region code, e.g. `us-east-1`
    pub region: String
  , /// Bedrock API key sent as a bearer token
    pub api_key: Option<String>
  , /// Runtime endpoint override (invoke calls)
    pub runtime_endpoint: Option<String>
  , /// Control-plane endpoint override (model listing)
    pub control_endpoint: Option<String>
  , /// Request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   region: DEFAULT_REGION.to_string()
          , api_key: None
          , runtime_endpoint: None
          , control_endpoint: None
          , timeout_secs: None
        }
    }
}

impl ClientConfig
{   /// Configuration from the process environment
    pub fn from_env() -> Self
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
      F: Fn(&str) -> Option<String>
    {   let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        ClientConfig
        {   region: non_empty("AWS_REGION")
              .or_else(|| non_empty("AWS_DEFAULT_REGION"))
              .unwrap_or_else(|| DEFAULT_REGION.to_string())
          , api_key: non_empty("AWS_BEARER_TOKEN_BEDROCK")
          , runtime_endpoint: non_empty("BEDROCK_RUNTIME_ENDPOINT")
          , control_endpoint: non_empty("BEDROCK_ENDPOINT")
          , timeout_secs: non_empty("BEDROCK_TIMEOUT_SECS")
              .and_then(|v| v.parse().ok())
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self
    {   self.region = region.into();
        self
    }

    /// Base URL for invoke calls
    pub fn runtime_url(&self) -> String
    {   self.runtime_endpoint
          .clone()
          .unwrap_or_else(|| {
            format!("https://bedrock-runtime.{}.amazonaws.com", self.region)
          })
          .trim_end_matches('/')
          .to_string()
    }

    /// Base URL for the model listing
    pub fn control_url(&self) -> String
    {   self.control_endpoint
          .clone()
          .unwrap_or_else(|| {
            format!("https://bedrock.{}.amazonaws.com", self.region)
          })
          .trim_end_matches('/')
          .to_string()
    }
}
