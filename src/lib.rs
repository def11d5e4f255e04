pub mod error;
pub mod config;
pub mod request;
pub mod family;
pub mod providers;
pub mod payload;
pub mod normalize;
pub mod invoker;
pub mod event_stream;
pub mod catalog;
pub mod bedrock;
pub mod client;
pub mod conversation;

/*

bedrock-prompt: fill a prompt template, send it to a hosted model,
and get plain text back no matter which family answered.

src/
├── lib.rs            # Re-exports
├── error.rs          # Error type shared by every layer
├── config.rs         # Region table and client configuration
├── request.rs        # Templates and generation parameters
├── family.rs         # Model id -> family dispatch, family defaults
├── providers/        # Wire format per family
├── payload.rs        # Template + params -> family-shaped body
├── normalize.rs      # Document / fragments -> text
├── invoker.rs        # Boundary to the network call
├── event_stream.rs   # Frame decoder for streamed responses
├── bedrock.rs        # reqwest-based invoker
├── catalog.rs        # Foundation model listing
├── client.rs         # One request end to end
└── conversation.rs   # Caller-side chat transcript

*/

pub use error::Error;
pub use config::{ClientConfig, REGIONS};
pub use request::{GenerationParams, PromptRequest, PromptStyle, PromptTemplate};
pub use family::{FamilyDefaults, ModelFamily};
pub use payload::{build_payload, RequestPayload};
pub use normalize::{
  normalize_blocking
, normalize_fragment_channel
, normalize_streaming
, FragmentSink
, StreamNormalizer
};
pub use invoker::{FragmentReceiver, InvokeRequest, Invoker};
pub use catalog::ModelCatalog;
pub use bedrock::HttpInvoker;
pub use client::PromptClient;
pub use conversation::Transcript;

pub type Result<T> = std::result::Result<T, Error>;
