//! Boundary to the component that performs the actual model call

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Error;
use crate::payload::{RequestPayload, JSON_CONTENT_TYPE};

/// One streamed fragment, or the error that ended the stream
pub type FragmentResult = Result<Vec<u8>, Error>;

/// Finite, non-restartable sequence of fragments in delivery order
pub type FragmentReceiver = mpsc::UnboundedReceiver<FragmentResult>;
pub type FragmentSender = mpsc::UnboundedSender<FragmentResult>;

/// What the invoker needs to send one request
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest
{   pub model_id: String
  , pub body: Vec<u8>
  , pub accept: &'static str
  , pub content_type: &'static str
}

impl From<RequestPayload> for InvokeRequest
{   fn from(payload: RequestPayload) -> Self
    {   InvokeRequest
        {   model_id: payload.model_id
          , body: payload.body
          , accept: JSON_CONTENT_TYPE
          , content_type: JSON_CONTENT_TYPE
        }
    }
}

/// Sends payloads to the model-serving endpoint.
///
/// Failures are reported as `Error::Transport`. Timeouts, retries and
/// cancellation belong to the implementation, not to its callers.
#[async_trait]
pub trait Invoker: Send + Sync
{   /// Blocking call: the complete response document
    async fn invoke(&self, request: &InvokeRequest)
      -> Result<Vec<u8>, Error>;

    /// Streaming call: fragments are delivered in arrival order and
    /// the channel closes when the response is complete
    async fn invoke_with_response_stream(&self, request: &InvokeRequest)
      -> Result<FragmentReceiver, Error>;
}
