use std::io::Write;

use clap::Parser;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

use bedrock_prompt::config::{is_known_region, ClientConfig, REGIONS};
use bedrock_prompt::conversation::{MemoryPressure, Transcript};
use bedrock_prompt::normalize::FragmentSink;
use bedrock_prompt::request::{ASK_TEMPLATE, CHAT_TEMPLATE, IMPROVER_TEMPLATE};
use bedrock_prompt::{
  Error
, GenerationParams
, HttpInvoker
, ModelCatalog
, PromptClient
, PromptRequest
, PromptStyle
, PromptTemplate
};

#[derive(Debug, Parser)]
#[command(name = "bedrock-prompt", version, about = "Send a templated prompt to a hosted model")]
struct Cli
{   /// Region code
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>
  , /// Foundation model identifier
    #[arg(long = "model-id")]
    model_id: Option<String>
  , /// Prompt template with a $INPUT placeholder
    #[arg(long)]
    template: Option<String>
  , /// Input text; read from stdin when absent
    #[arg(long)]
    body: Option<String>
  , #[arg(long, default_value_t = 0.9)]
    temperature: f32
  , #[arg(long = "max-tokens", default_value_t = 1024)]
    max_tokens: u32
  , /// Answer the input as a question instead of improving it
    #[arg(long, conflicts_with = "template")]
    ask: bool
  , /// Interactive chat instead of a single request
    #[arg(long)]
    chat: bool
  , /// Print the available models and exit
    #[arg(long = "list-models")]
    list_models: bool
}

/// Prints only the part of the cumulative text not yet shown
#[derive(Default)]
struct StdoutSink
{   shown: usize
}

impl FragmentSink for StdoutSink
{   fn on_text(&mut self, cumulative: &str)
    {   if let Some(new) = cumulative.get(self.shown..)
        {   print!("{}", new);
            let _ = std::io::stdout().flush();
            self.shown = cumulative.len();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::init();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(region) = &cli.region
    {   config = config.with_region(region.clone());
    }
    if !is_known_region(&config.region)
    {   let known: Vec<&str> = REGIONS.iter().map(|(_, code)| *code).collect();
        return Err(Error::InvalidConfiguration(format!(
          "unknown region {} (expected one of: {})",
          config.region, known.join(", ")
        )).into());
    }
    info!("In region: {}", config.region);

    let invoker = HttpInvoker::new(&config)?;
    let catalog = invoker.list_foundation_models().await?;

    if cli.list_models
    {   print_catalog(&catalog);
        return Ok(());
    }

    let model_id = select_model(&catalog, cli.model_id.as_deref())?;
    info!("Using model: {}", model_id);

    let params = GenerationParams::new(cli.temperature, cli.max_tokens)?;
    let client = PromptClient::new(invoker)
      .with_streaming_models(catalog.streaming_model_ids().iter().cloned());

    if cli.chat
    {   let template = PromptTemplate::new(
          cli.template.unwrap_or_else(|| CHAT_TEMPLATE.to_string())
        );
        run_chat(&client, &model_id, template, params).await
    } else
    {   let default = if cli.ask { ASK_TEMPLATE } else { IMPROVER_TEMPLATE };
        let template = PromptTemplate::new(
          cli.template.unwrap_or_else(|| default.to_string())
        );
        let body = match cli.body
        {   Some(body) => body
          , None => {
              eprintln!("Enter input: (Ctrl-D on a blank line to end)");
              let mut input = String::new();
              tokio::io::stdin().read_to_string(&mut input).await?;
              input
            }
        };
        let request = PromptRequest::new(model_id, template, body, params);
        client.send(&request, &mut StdoutSink::default()).await?;
        println!();
        Ok(())
    }
}

async fn run_chat(
  client: &PromptClient<HttpInvoker>
, model_id: &str
, template: PromptTemplate
, params: GenerationParams
) -> Result<(), Box<dyn std::error::Error>>
{   let params = params.with_style(PromptStyle::Conversational);
    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
      "Chatting with {}. Type \"{}\" to start over.",
      model_id,
      bedrock_prompt::conversation::NEW_CONVERSATION_KEYWORD
    );
    while let Some(line) = lines.next_line().await?
    {   if Transcript::is_reset_command(&line)
        {   transcript.clear();
            println!("-- new conversation --");
            continue;
        }
        if line.trim().is_empty()
        {   continue;
        }
        transcript.push_user(line);
        let request = PromptRequest::new(
          model_id, template.clone(), transcript.render(), params
        );
        let answer = client.send(&request, &mut StdoutSink::default()).await?;
        println!();
        transcript.push_assistant(answer);

        let tokens = transcript.estimated_tokens();
        match transcript.pressure(params.max_tokens)
        {   MemoryPressure::Low => debug!("Est. tokens in conversation: {}", tokens)
          , MemoryPressure::Elevated => info!("Est. tokens in conversation: {}", tokens)
          , MemoryPressure::Exceeded => warn!(
              "Est. tokens in conversation: {} exceeds {}",
              tokens, params.max_tokens
            )
        }
    }
    Ok(())
}

fn select_model(catalog: &ModelCatalog, wanted: Option<&str>)
  -> Result<String, Error>
{   let wanted = wanted.ok_or_else(|| {
      Error::InvalidConfiguration(
        "--model-id is required (see --list-models)".to_string()
      )
    })?;
    catalog.find(wanted)
      .map(|entry| entry.model_id.clone())
      .ok_or_else(|| {
        Error::InvalidConfiguration(format!(
          "model {} is not available in this region", wanted
        ))
      })
}

fn print_catalog(catalog: &ModelCatalog)
{   for entry in catalog.entries()
    {   println!(
          "{:<40} {} ({}){}",
          entry.model_id,
          entry.name,
          entry.provider.as_deref().unwrap_or("unknown provider"),
          if entry.streaming { " (streaming)" } else { "" }
        );
    }
}
