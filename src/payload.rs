//! Payload construction
//!
//! Renders the template, then shapes the body the way the resolved
//! family expects. Pure: no I/O happens here.

use log::{debug, log_enabled, Level};

use crate::error::Error;
use crate::family::ModelFamily;
use crate::providers;
use crate::request::{GenerationParams, PromptRequest, PromptTemplate};

/// Content type used for both request and response documents
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A serialized, family-shaped request body
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPayload
{   pub model_id: String
  , pub family: ModelFamily
  , pub body: Vec<u8>
}

impl RequestPayload
{   /// Body as a JSON value, for diagnostics
    pub fn to_json(&self) -> Result<serde_json::Value, Error>
    {   serde_json::from_slice(&self.body)
          .map_err(|e| Error::Encode(e.to_string()))
    }
}

/// Build the request body for `model_id`.
///
/// Fails with `UnknownModelFamily` before anything is rendered when the
/// identifier matches no family.
pub fn build_payload(
  model_id: &str
, template: &PromptTemplate
, input: &str
, params: &GenerationParams
) -> Result<RequestPayload, Error>
{   let family = ModelFamily::from_model_id(model_id)?;
    let body = build_family_payload(family, template, input, params)?;
    Ok(RequestPayload
    {   model_id: model_id.to_string()
      , family
      , body
    })
}

/// Build the request body for an already resolved family
pub fn build_family_payload(
  family: ModelFamily
, template: &PromptTemplate
, input: &str
, params: &GenerationParams
) -> Result<Vec<u8>, Error>
{   params.validate()?;
    if !template.has_placeholder()
    {   debug!(
          "Template has no {} placeholder, input ignored",
          template.placeholder()
        );
    }
    let rendered = template.render(input);
    let defaults = family.defaults(params.style);
    debug!("Building {} payload ({:?})", family, params.style);
    let body = providers::request_body(
      family, &rendered, params, &defaults
    )?;
    if log_enabled!(Level::Debug)
    {   let pretty = serde_json::from_slice::<serde_json::Value>(&body)
          .and_then(|value| serde_json::to_string_pretty(&value))
          .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        debug!("Payload:\n{}", pretty);
    }
    Ok(body)
}

/// `build_payload` over a whole request
pub fn build_request_payload(request: &PromptRequest)
  -> Result<RequestPayload, Error>
{   build_payload(
      &request.model_id
    , &request.template
    , &request.input
    , &request.params
    )
}
