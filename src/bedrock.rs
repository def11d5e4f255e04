//! HTTP invoker for the Bedrock runtime

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use futures_util::StreamExt;
use log::{debug, error, info, trace};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::catalog::ModelCatalog;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::event_stream::{EventStreamDecoder, Message};
use crate::invoker::{FragmentReceiver, FragmentSender, InvokeRequest, Invoker};

const EVENT_STREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";

/// Envelope of a streamed `chunk` event
#[derive(Debug, Deserialize)]
struct ChunkEnvelope
{   bytes: String
}

/// Invoker that talks to Bedrock over HTTPS with an API key
#[derive(Debug, Clone)]
pub struct HttpInvoker
{   http_client: reqwest::Client
  , runtime_url: String
  , control_url: String
  , api_key: Option<String>
}

impl HttpInvoker
{   pub fn new(config: &ClientConfig) -> Result<Self, Error>
    {   debug!("Creating HttpInvoker for region {}", config.region);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::InvalidConfiguration(e.to_string())
        })?;
        Ok(HttpInvoker
        {   http_client
          , runtime_url: config.runtime_url()
          , control_url: config.control_url()
          , api_key: config.api_key.clone()
        })
    }

    /// List the on-demand text models of the configured region
    pub async fn list_foundation_models(&self)
      -> Result<ModelCatalog, Error>
    {   debug!("Listing foundation models");
        let response = self
          .authorize(self.http_client
            .get(format!("{}/foundation-models", self.control_url)))
          .send()
          .await
          .map_err(transport)?;
        let body = checked_body(response).await?;
        ModelCatalog::from_listing(&body)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder)
      -> reqwest::RequestBuilder
    {   match &self.api_key
        {   Some(key) => builder.bearer_auth(key)
          , None => builder
        }
    }

    fn model_url(&self, model_id: &str, action: &str) -> String
    {   format!(
          "{}/model/{}/{}",
          self.runtime_url,
          model_id.replace(':', "%3A"),
          action
        )
    }
}

#[async_trait]
impl Invoker for HttpInvoker
{   async fn invoke(&self, request: &InvokeRequest)
      -> Result<Vec<u8>, Error>
    {   debug!("invoke {}", request.model_id);
        let response = self
          .authorize(self.http_client
            .post(self.model_url(&request.model_id, "invoke")))
          .header("Accept", request.accept)
          .header("Content-Type", request.content_type)
          .body(request.body.clone())
          .send()
          .await
          .map_err(transport)?;
        let body = checked_body(response).await?;
        trace!("Response: {}", String::from_utf8_lossy(&body));
        Ok(body)
    }

    async fn invoke_with_response_stream(&self, request: &InvokeRequest)
      -> Result<FragmentReceiver, Error>
    {   debug!("invoke-with-response-stream {}", request.model_id);
        let response = self
          .authorize(self.http_client.post(
            self.model_url(&request.model_id, "invoke-with-response-stream")
          ))
          .header("Accept", EVENT_STREAM_CONTENT_TYPE)
          .header("X-Amzn-Bedrock-Accept", request.accept)
          .header("Content-Type", request.content_type)
          .body(request.body.clone())
          .send()
          .await
          .map_err(transport)?;

        let status = response.status();
        if !status.is_success()
        {   let body = checked_body(response).await;
            return Err(body.err().unwrap_or_else(|| {
              Error::Transport(format!("unexpected status {}", status))
            }));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
          pump_event_stream(response, tx).await
        });
        Ok(rx)
    }
}

/// Decode frames as bytes arrive and forward fragments in order
async fn pump_event_stream(
  response: reqwest::Response
, tx: FragmentSender
)
{   let mut body = Box::pin(response.bytes_stream());
    let mut decoder = EventStreamDecoder::new();
    let mut forwarded = 0usize;

    while let Some(chunk) = body.next().await
    {   match chunk
        {   Ok(bytes) => decoder.push(&bytes)
          , Err(e) => {
              let _ = tx.send(Err(transport(e)));
              return;
            }
        }
        loop
        {   let message = match decoder.next_message()
            {   Ok(Some(message)) => message
              , Ok(None) => break
              , Err(e) => {
                  let _ = tx.send(Err(e));
                  return;
                }
            };
            match fragment_from_message(&message)
            {   Ok(Some(fragment)) => {
                  forwarded += 1;
                  if tx.send(Ok(fragment)).is_err()
                  {   debug!("Fragment receiver dropped");
                      return;
                  }
                }
              , Ok(None) => {}
              , Err(e) => {
                  let _ = tx.send(Err(e));
                  return;
                }
            }
        }
    }

    if decoder.has_partial()
    {   error!("Stream ended inside a frame");
        let _ = tx.send(Err(Error::Transport(
          "event stream ended mid-frame".to_string()
        )));
        return;
    }
    info!("Event stream complete: {} fragments", forwarded);
}

/// Fragment bytes carried by a frame: `Some` for `chunk` events,
/// `None` for other events, an error for exceptions
pub fn fragment_from_message(message: &Message)
  -> Result<Option<Vec<u8>>, Error>
{   match message.header_str(":message-type")
    {   Some("event") => {}
      , Some("exception") | Some("error") => {
          let kind = message.header_str(":exception-type")
            .or_else(|| message.header_str(":error-code"))
            .unwrap_or("unknown");
          let detail = String::from_utf8_lossy(&message.payload);
          error!("Stream exception {}: {}", kind, detail);
          return Err(Error::Transport(format!("{}: {}", kind, detail)));
        }
      , other => {
          debug!("Ignoring frame of type {:?}", other);
          return Ok(None);
        }
    }
    if message.header_str(":event-type") != Some("chunk")
    {   return Ok(None);
    }
    let envelope: ChunkEnvelope = serde_json::from_slice(&message.payload)
      .map_err(|e| Error::malformed(e.to_string(), &message.payload))?;
    base64::engine::general_purpose::STANDARD
      .decode(envelope.bytes.as_bytes())
      .map(Some)
      .map_err(|e| Error::malformed(e.to_string(), &message.payload))
}

async fn checked_body(response: reqwest::Response)
  -> Result<Vec<u8>, Error>
{   let status = response.status();
    let body = response.bytes().await.map_err(transport)?;
    if !status.is_success()
    {   let text = String::from_utf8_lossy(&body);
        error!("Bedrock error {}: {}", status, text);
        return Err(Error::Transport(format!("{}: {}", status, text)));
    }
    Ok(body.to_vec())
}

fn transport(e: reqwest::Error) -> Error
{   error!("HTTP error: {}", e);
    Error::Transport(e.to_string())
}
