//! Response normalization
//!
//! Turns a complete response document, or a sequence of streamed
//! fragments, into one plain-text answer. Fragments are applied in the
//! order they arrive; nothing here reorders or buffers them.

use log::{debug, error, trace};
use tokio::sync::mpsc;

use crate::error::Error;
use crate::family::ModelFamily;
use crate::invoker::FragmentReceiver;
use crate::providers;
use crate::request::PromptStyle;

/// Speaker label some models echo at the start of a chat reply
pub const ASSISTANT_PREFIX: &str = "Assistant:";

/// Receives the cumulative text after every fragment
pub trait FragmentSink
{   fn on_text(&mut self, cumulative: &str);
}

impl<F> FragmentSink for F
where
  F: FnMut(&str)
{   fn on_text(&mut self, cumulative: &str)
    {   self(cumulative)
    }
}

/// Sink that discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FragmentSink for NullSink
{   fn on_text(&mut self, _cumulative: &str) {}
}

/// Sink that forwards every cumulative value over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::UnboundedSender<String>);

impl FragmentSink for ChannelSink
{   fn on_text(&mut self, cumulative: &str)
    {   // receiver gone: progress is no longer wanted
        let _ = self.0.send(cumulative.to_string());
    }
}

/// Strip leading whitespace, and for chat replies one `Assistant:`
pub fn strip_leading(text: &str, style: PromptStyle) -> &str
{   let text = text.trim_start();
    match style
    {   PromptStyle::Completion => text
      , PromptStyle::Conversational => text
          .strip_prefix(ASSISTANT_PREFIX)
          .unwrap_or(text)
          .trim_start()
    }
}

/// Normalize a complete response document
pub fn normalize_blocking(
  family: ModelFamily
, style: PromptStyle
, document: &[u8]
) -> Result<String, Error>
{   debug!("Normalizing {} document", family);
    let text = providers::completion_text(family, document)?;
    Ok(strip_leading(&text, style).to_string())
}

/// Incremental accumulator for one streamed response
#[derive(Debug)]
pub struct StreamNormalizer
{   family: ModelFamily
  , style: PromptStyle
  , text: String
  , pending: String
  , leading_done: bool
  , fragments: usize
}

impl StreamNormalizer
{   pub fn new(family: ModelFamily, style: PromptStyle)
      -> Result<Self, Error>
    {   if !family.supports_streaming()
        {   error!("{} has no streaming format", family);
            return Err(Error::StreamingNotSupported(family.to_string()));
        }
        Ok(StreamNormalizer
        {   family
          , style
          , text: String::new()
          , pending: String::new()
          , leading_done: false
          , fragments: 0
        })
    }

    /// Apply the next fragment and return the text so far
    pub fn push(&mut self, fragment: &[u8]) -> Result<&str, Error>
    {   let delta = providers::fragment_text(self.family, fragment)?;
        self.fragments += 1;
        trace!("Fragment {}: {:?}", self.fragments, delta);
        if self.text.is_empty()
        {   self.pending.push_str(&delta);
            if self.leading_done
            {   // the label is dropped at most once per response
                self.text.push_str(self.pending.trim_start());
                self.pending.clear();
            } else if !self.holding_prefix()
            {   let lead = strip_leading(&self.pending, self.style);
                self.text.push_str(lead);
                self.pending.clear();
                self.leading_done = true;
            }
        } else
        {   self.text.push_str(&delta);
        }
        Ok(&self.text)
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str
    {   &self.text
    }

    pub fn fragments(&self) -> usize
    {   self.fragments
    }

    /// Final text once the sequence is exhausted
    pub fn finish(mut self) -> String
    {   if self.text.is_empty() && !self.pending.is_empty()
        {   let lead = strip_leading(&self.pending, self.style);
            self.text.push_str(lead);
        }
        debug!(
          "Stream finished after {} fragments ({} bytes)",
          self.fragments, self.text.len()
        );
        self.text
    }

    // A leading `Assistant:` may be split across fragments, and a
    // whitespace-only start says nothing yet.
    fn holding_prefix(&self) -> bool
    {   if self.style != PromptStyle::Conversational
        {   return false;
        }
        let lead = self.pending.trim_start();
        lead.len() < ASSISTANT_PREFIX.len()
          && ASSISTANT_PREFIX.starts_with(lead)
    }

    // Push the final text to `sink` unless it was the last value shown.
    fn finish_into<S>(self, sink: &mut S) -> String
    where
      S: FragmentSink + ?Sized
    {   let reported = self.text().len();
        let seen = self.fragments();
        let text = self.finish();
        if seen > 0 && text.len() != reported
        {   sink.on_text(&text);
        }
        text
    }
}

/// Normalize a finite sequence of fragments, reporting progress to
/// `sink` after each one. Stops at the first error; progress already
/// reported stays reported.
pub fn normalize_streaming<I, S>(
  family: ModelFamily
, style: PromptStyle
, fragments: I
, sink: &mut S
) -> Result<String, Error>
where
  I: IntoIterator<Item = Result<Vec<u8>, Error>>
, S: FragmentSink + ?Sized
{   let mut normalizer = StreamNormalizer::new(family, style)?;
    for fragment in fragments
    {   let text = normalizer.push(&fragment?)?;
        sink.on_text(text);
    }
    Ok(normalizer.finish_into(sink))
}

/// `normalize_streaming` over fragments pushed through a channel
pub async fn normalize_fragment_channel<S>(
  family: ModelFamily
, style: PromptStyle
, mut fragments: FragmentReceiver
, sink: &mut S
) -> Result<String, Error>
where
  S: FragmentSink + ?Sized
{   let mut normalizer = StreamNormalizer::new(family, style)?;
    while let Some(fragment) = fragments.recv().await
    {   let fragment = fragment.map_err(|e| {
          error!("Stream terminated: {}", e);
          e
        })?;
        let text = normalizer.push(&fragment)?;
        sink.on_text(text);
    }
    Ok(normalizer.finish_into(sink))
}
