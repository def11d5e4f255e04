use bedrock_prompt::payload::{build_family_payload, build_payload};
use bedrock_prompt::request::{render, ASK_TEMPLATE, CHAT_TEMPLATE, IMPROVER_TEMPLATE};
use bedrock_prompt::{
  Error
, GenerationParams
, ModelFamily
, PromptStyle
, PromptTemplate
};
use serde_json::Value;

const TITAN: &str = "amazon.titan-text-express-v1";
const CLAUDE: &str = "anthropic.claude-v2";
const COMMAND: &str = "cohere.command-text-v14";
const LLAMA: &str = "meta.llama2-13b-chat-v1";
const JURASSIC: &str = "ai21.j2-ultra-v1";

fn params() -> GenerationParams
{   GenerationParams::new(0.5, 700).unwrap()
}

fn payload_json(model_id: &str, template: &str, input: &str, params: &GenerationParams) -> Value
{   let payload = build_payload(
      model_id, &PromptTemplate::new(template), input, params
    ).unwrap();
    serde_json::from_slice(&payload.body).unwrap()
}

/// Occurrences of `needle` across every string in the document
fn occurrences(value: &Value, needle: &str) -> usize
{   match value
    {   Value::String(s) => s.matches(needle).count()
      , Value::Array(items) => items.iter().map(|v| occurrences(v, needle)).sum()
      , Value::Object(map) => map.values().map(|v| occurrences(v, needle)).sum()
      , _ => 0
    }
}

#[test]
fn render_substitutes_placeholder()
{   assert_eq!(render("$INPUT", "X"), "X");
    assert_eq!(render("pre $INPUT post", "X"), "pre X post");
    assert_eq!(render("no placeholder here", "X"), "no placeholder here");
}

#[test]
fn bundled_templates_take_input()
{   for text in [ASK_TEMPLATE, IMPROVER_TEMPLATE, CHAT_TEMPLATE]
    {   let template = PromptTemplate::new(text);
        assert!(template.has_placeholder(), "{}", text);
        assert!(template.render("Why is the sky blue?").ends_with("\nWhy is the sky blue?"));
    }
}

#[test]
fn custom_placeholder_name()
{   let template = PromptTemplate::with_placeholder("Review: $partner", "partner");
    assert!(template.has_placeholder());
    assert_eq!(template.render("our offering"), "Review: our offering");
}

#[test]
fn every_family_embeds_rendered_prompt_once()
{   let input = "the quick unique brown fox";
    for model in [TITAN, CLAUDE, COMMAND, LLAMA, JURASSIC]
    {   let json = payload_json(model, "Improve: $INPUT", input, &params());
        assert_eq!(
          occurrences(&json, "Improve: the quick unique brown fox"), 1,
          "model {}", model
        );
    }
}

#[test]
fn titan_shape()
{   let json = payload_json(TITAN, "$INPUT", "hello", &params());
    assert_eq!(json["inputText"], "hello");
    let config = &json["textGenerationConfig"];
    assert_eq!(config["maxTokenCount"], 700);
    assert_eq!(config["temperature"].as_f64(), Some(0.5));
    assert_eq!(config["topP"].as_f64(), Some(0.9));
    assert_eq!(config["stopSequences"], serde_json::json!([]));
}

#[test]
fn claude_wraps_prompt_in_turns()
{   let json = payload_json(CLAUDE, "$INPUT", "hi", &params());
    assert_eq!(json["prompt"], "\n\nHuman: hi\n\nAssistant:");
    assert_eq!(json["max_tokens_to_sample"], 700);
    assert_eq!(json["temperature"].as_f64(), Some(0.5));
    assert_eq!(json["top_k"], 250);
    assert_eq!(
      json["top_k"].as_u64(),
      ModelFamily::Claude.defaults(PromptStyle::Completion).top_k.map(u64::from)
    );
    assert_eq!(json["top_p"].as_f64(), Some(1.0));
    assert_eq!(json["stop_sequences"], serde_json::json!(["Human:"]));
}

#[test]
fn command_shape()
{   let json = payload_json(COMMAND, "$INPUT", "hello", &params());
    assert_eq!(json["prompt"], "hello");
    assert_eq!(json["max_tokens"], 700);
    assert_eq!(json["temperature"].as_f64(), Some(0.5));
    assert_eq!(json["p"].as_f64(), Some(0.9));
}

#[test]
fn llama2_shape()
{   let json = payload_json(LLAMA, "$INPUT", "hello", &params());
    assert_eq!(json["prompt"], "hello");
    assert_eq!(json["max_gen_len"], 700);
    assert_eq!(json["temperature"].as_f64(), Some(0.5));
    assert_eq!(json["top_p"].as_f64(), Some(0.9));
}

#[test]
fn jurassic_shape()
{   let json = payload_json(JURASSIC, "$INPUT", "hello", &params());
    assert_eq!(json["prompt"], "hello");
    assert_eq!(json["maxTokens"], 700);
    assert_eq!(json["temperature"].as_f64(), Some(0.5));
    assert_eq!(json["topP"].as_f64(), Some(1.0));
    assert_eq!(json["stopSequences"], serde_json::json!([]));
    for penalty in ["countPenalty", "presencePenalty", "frequencyPenalty"]
    {   assert_eq!(json[penalty]["scale"], 0, "{}", penalty);
    }
}

#[test]
fn conversational_style_adds_user_stop_sequence()
{   let chat = params().with_style(PromptStyle::Conversational);
    let claude = payload_json(CLAUDE, "$INPUT", "hi", &chat);
    assert_eq!(claude["stop_sequences"], serde_json::json!(["Human:", "User:"]));
    let titan = payload_json(TITAN, "$INPUT", "hi", &chat);
    assert_eq!(titan["textGenerationConfig"]["stopSequences"], serde_json::json!(["User:"]));
    let jurassic = payload_json(JURASSIC, "$INPUT", "hi", &chat);
    assert_eq!(jurassic["stopSequences"], serde_json::json!(["User:"]));
}

#[test]
fn unknown_model_is_rejected()
{   let result = build_payload(
      "unknown.model", &PromptTemplate::default(), "x", &params()
    );
    assert_eq!(
      result,
      Err(Error::UnknownModelFamily("unknown.model".to_string()))
    );
}

#[test]
fn invalid_params_are_rejected()
{   assert!(matches!(
      GenerationParams::new(1.5, 10),
      Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
      GenerationParams::new(0.5, 0),
      Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn family_payload_matches_model_payload()
{   let template = PromptTemplate::new("Q: $INPUT");
    let by_family = build_family_payload(
      ModelFamily::Llama2, &template, "why", &params()
    ).unwrap();
    let by_model = build_payload(LLAMA, &template, "why", &params()).unwrap();
    assert_eq!(by_model.family, ModelFamily::Llama2);
    assert_eq!(by_model.body, by_family);
}
