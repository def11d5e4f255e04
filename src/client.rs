use std::collections::HashSet;
use log::{debug, info};

use crate::error::Error;
use crate::family::ModelFamily;
use crate::invoker::{InvokeRequest, Invoker};
use crate::normalize::{self, FragmentSink};
use crate::payload::{self, RequestPayload};
use crate::request::PromptRequest;

/// Runs one request end to end: family dispatch, payload
/// construction, the invoker call and normalization.
///
/// Holds no per-request state, so one client can serve concurrent
/// requests.
pub struct PromptClient<I>
{   invoker: I
  , streaming_models: HashSet<String>
}

impl<I: Invoker> PromptClient<I>
{   pub fn new(invoker: I) -> Self
    {   debug!("Creating PromptClient");
        PromptClient
        {   invoker
          , streaming_models: HashSet::new()
        }
    }

    /// Model identifiers that should be called in streaming mode
    pub fn with_streaming_models<T>(mut self, models: T) -> Self
    where
      T: IntoIterator
    , T::Item: Into<String>
    {   self.streaming_models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn invoker(&self) -> &I
    {   &self.invoker
    }

    /// Whether `send` will use the streaming call for this model
    pub fn streams(&self, model_id: &str, family: ModelFamily) -> bool
    {   family.supports_streaming() && self.streaming_models.contains(model_id)
    }

    /// Resolve the family and build the payload without any I/O
    pub fn prepare(&self, request: &PromptRequest)
      -> Result<RequestPayload, Error>
    {   payload::build_request_payload(request)
    }

    /// Send a prompt and return the normalized answer.
    ///
    /// In streaming mode `sink` sees the cumulative text after every
    /// fragment; in blocking mode it is called once with the result.
    pub async fn send<S>(
      &self
    , request: &PromptRequest
    , sink: &mut S
    ) -> Result<String, Error>
    where
      S: FragmentSink + ?Sized
    {   let payload = self.prepare(request)?;
        let family = payload.family;
        let style = request.params.style;
        let streaming = self.streams(&payload.model_id, family);
        info!(
          "Invoking {} ({}, {})",
          payload.model_id,
          family,
          if streaming { "streamed" } else { "blocking" }
        );
        let invoke_request = InvokeRequest::from(payload);

        if streaming
        {   let fragments = self.invoker
              .invoke_with_response_stream(&invoke_request)
              .await?;
            normalize::normalize_fragment_channel(
              family, style, fragments, sink
            ).await
        } else
        {   let document = self.invoker.invoke(&invoke_request).await?;
            let text = normalize::normalize_blocking(family, style, &document)?;
            sink.on_text(&text);
            Ok(text)
        }
    }

    /// `send` without progress reporting
    pub async fn ask(&self, request: &PromptRequest)
      -> Result<String, Error>
    {   self.send(request, &mut normalize::NullSink).await
    }
}
