use std::sync::Mutex;

use async_trait::async_trait;
use bedrock_prompt::invoker::FragmentReceiver;
use bedrock_prompt::{
  Error
, GenerationParams
, InvokeRequest
, Invoker
, PromptClient
, PromptRequest
, PromptStyle
, PromptTemplate
};
use tokio::sync::mpsc;

/// Replays canned responses and records every call
#[derive(Default)]
struct ScriptedInvoker
{   document: Vec<u8>
  , fragments: Vec<Result<Vec<u8>, Error>>
  , failure: Option<Error>
  , calls: Mutex<Vec<(String, InvokeRequest)>>
}

impl ScriptedInvoker
{   fn calls(&self) -> Vec<(String, InvokeRequest)>
    {   self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, request: &InvokeRequest) -> Result<(), Error>
    {   self.calls.lock().unwrap().push((kind.to_string(), request.clone()));
        match &self.failure
        {   Some(e) => Err(e.clone())
          , None => Ok(())
        }
    }
}

#[async_trait]
impl Invoker for ScriptedInvoker
{   async fn invoke(&self, request: &InvokeRequest)
      -> Result<Vec<u8>, Error>
    {   self.record("invoke", request)?;
        Ok(self.document.clone())
    }

    async fn invoke_with_response_stream(&self, request: &InvokeRequest)
      -> Result<FragmentReceiver, Error>
    {   self.record("stream", request)?;
        let (tx, rx) = mpsc::unbounded_channel();
        for fragment in &self.fragments
        {   tx.send(fragment.clone()).unwrap();
        }
        Ok(rx)
    }
}

fn request(model_id: &str) -> PromptRequest
{   PromptRequest::new(
      model_id
    , PromptTemplate::new("Answer briefly: $INPUT")
    , "What is Rust?"
    , GenerationParams::new(0.7, 256).unwrap()
    )
}

#[tokio::test]
async fn blocking_call_for_non_streaming_model()
{   let invoker = ScriptedInvoker
    {   document: br#"{"completion":" A systems language."}"#.to_vec()
      , ..Default::default()
    };
    let client = PromptClient::new(invoker);
    let mut seen = Vec::new();
    let answer = client
      .send(&request("anthropic.claude-v2"), &mut |t: &str| seen.push(t.to_string()))
      .await
      .unwrap();

    assert_eq!(answer, "A systems language.");
    assert_eq!(seen, vec!["A systems language."]);

    let calls = client.invoker().calls();
    assert_eq!(calls.len(), 1);
    let (kind, sent) = &calls[0];
    assert_eq!(kind, "invoke");
    assert_eq!(sent.model_id, "anthropic.claude-v2");
    assert_eq!(sent.accept, "application/json");
    assert_eq!(sent.content_type, "application/json");
    let body: serde_json::Value = serde_json::from_slice(&sent.body).unwrap();
    assert_eq!(
      body["prompt"],
      "\n\nHuman: Answer briefly: What is Rust?\n\nAssistant:"
    );
}

#[tokio::test]
async fn streaming_call_for_streaming_model()
{   let invoker = ScriptedInvoker
    {   fragments: vec![
          Ok(br#"{"outputText":"\nFast"}"#.to_vec()),
          Ok(br#"{"outputText":" and safe."}"#.to_vec()),
        ]
      , ..Default::default()
    };
    let client = PromptClient::new(invoker)
      .with_streaming_models(["amazon.titan-text-express-v1"]);
    let mut seen = Vec::new();
    let answer = client
      .send(
        &request("amazon.titan-text-express-v1"),
        &mut |t: &str| seen.push(t.to_string()),
      )
      .await
      .unwrap();

    assert_eq!(answer, "Fast and safe.");
    assert_eq!(seen, vec!["Fast", "Fast and safe."]);
    assert_eq!(client.invoker().calls()[0].0, "stream");
}

#[tokio::test]
async fn jurassic_never_streams()
{   let invoker = ScriptedInvoker
    {   document: br#"{"completions":[{"data":{"text":" ok"}}]}"#.to_vec()
      , ..Default::default()
    };
    let client = PromptClient::new(invoker)
      .with_streaming_models(["ai21.j2-mid-v1"]);
    let answer = client.ask(&request("ai21.j2-mid-v1")).await.unwrap();
    assert_eq!(answer, "ok");
    assert_eq!(client.invoker().calls()[0].0, "invoke");
}

#[tokio::test]
async fn unknown_model_fails_before_invoking()
{   let client = PromptClient::new(ScriptedInvoker::default());
    let result = client.ask(&request("mistral.mistral-7b")).await;
    assert_eq!(
      result,
      Err(Error::UnknownModelFamily("mistral.mistral-7b".to_string()))
    );
    assert!(client.invoker().calls().is_empty());
}

#[tokio::test]
async fn transport_error_is_propagated_unchanged()
{   let failure = Error::Transport("403 Forbidden: bad key".to_string());
    let client = PromptClient::new(ScriptedInvoker
    {   failure: Some(failure.clone())
      , ..Default::default()
    });
    let result = client.ask(&request("meta.llama2-70b-chat-v1")).await;
    assert_eq!(result, Err(failure));
    assert_eq!(client.invoker().calls().len(), 1);
}

#[tokio::test]
async fn conversational_reply_drops_speaker_label()
{   let invoker = ScriptedInvoker
    {   fragments: vec![
          Ok(br#"{"generations":[{"text":"Assistant:"}]}"#.to_vec()),
          Ok(br#"{"generations":[{"text":" Hi!"}]}"#.to_vec()),
        ]
      , ..Default::default()
    };
    let client = PromptClient::new(invoker)
      .with_streaming_models(["cohere.command-text-v14"]);
    let mut chat = request("cohere.command-text-v14");
    chat.params = chat.params.with_style(PromptStyle::Conversational);
    chat.input = "User: hello\n".to_string();

    let answer = client.ask(&chat).await.unwrap();
    assert_eq!(answer, "Hi!");
}

#[test]
fn prepare_builds_payload_without_io()
{   let client = PromptClient::new(ScriptedInvoker::default());
    let payload = client.prepare(&request("meta.llama2-13b-chat-v1")).unwrap();
    let body = payload.to_json().unwrap();
    assert_eq!(body["prompt"], "Answer briefly: What is Rust?");
    assert_eq!(body["max_gen_len"], 256);
    assert!(client.invoker().calls().is_empty());
}
