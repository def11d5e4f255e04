//! Per-family wire formats
//!
//! Each module owns the request shape and the response extraction
//! paths of one family; the functions here dispatch on `ModelFamily`.

pub mod claude;
pub mod cohere;
pub mod jurassic;
pub mod llama2;
pub mod titan;

use log::{error, trace};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::family::{FamilyDefaults, ModelFamily};
use crate::request::GenerationParams;

/// Serialize the family-shaped request body for a rendered prompt
pub fn request_body(
  family: ModelFamily
, rendered: &str
, params: &GenerationParams
, defaults: &FamilyDefaults
) -> Result<Vec<u8>, Error>
{   match family
    {   ModelFamily::Titan => titan::build_request(rendered, params, defaults)
      , ModelFamily::Claude => claude::build_request(rendered, params, defaults)
      , ModelFamily::Command => cohere::build_request(rendered, params, defaults)
      , ModelFamily::Llama2 => llama2::build_request(rendered, params, defaults)
      , ModelFamily::Jurassic => jurassic::build_request(rendered, params, defaults)
    }
}

/// Generated text of a complete (non-streamed) response document
pub fn completion_text(
  family: ModelFamily
, document: &[u8]
) -> Result<String, Error>
{   match family
    {   ModelFamily::Titan => titan::completion_text(document)
      , ModelFamily::Claude => claude::completion_text(document)
      , ModelFamily::Command => cohere::completion_text(document)
      , ModelFamily::Llama2 => llama2::completion_text(document)
      , ModelFamily::Jurassic => jurassic::completion_text(document)
    }
}

/// Text delta carried by one streamed fragment
pub fn fragment_text(
  family: ModelFamily
, fragment: &[u8]
) -> Result<String, Error>
{   match family
    {   ModelFamily::Titan => titan::fragment_text(fragment)
      , ModelFamily::Claude => claude::fragment_text(fragment)
      , ModelFamily::Command => cohere::fragment_text(fragment)
      , ModelFamily::Llama2 => llama2::fragment_text(fragment)
      , ModelFamily::Jurassic => {
          error!("Fragment received for non-streaming family");
          Err(Error::StreamingNotSupported(family.to_string()))
        }
    }
}

pub(crate) fn encode<T: Serialize>(body: &T)
  -> Result<Vec<u8>, Error>
{   serde_json::to_vec(body).map_err(|e| {
      error!("Failed to encode payload: {}", e);
      Error::Encode(e.to_string())
    })
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8])
  -> Result<T, Error>
{   trace!("Decoding: {}", String::from_utf8_lossy(bytes));
    serde_json::from_slice(bytes).map_err(|e| {
      error!("Response does not match expected shape: {}", e);
      Error::malformed(e.to_string(), bytes)
    })
}
