//! Foundation model catalog
//!
//! Built from a ListFoundationModels document: only on-demand
//! text-to-text models are kept, in listing order.

use std::collections::HashSet;
use log::debug;
use serde::Deserialize;

use crate::error::Error;

const TEXT_MODALITY: &str = "TEXT";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModelListing
{   pub model_summaries: Vec<ModelSummary>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary
{   pub model_id: String
  , pub model_name: String
  , #[serde(default)]
    pub provider_name: Option<String>
  , #[serde(default)]
    pub input_modalities: Vec<String>
  , #[serde(default)]
    pub output_modalities: Vec<String>
  , #[serde(default)]
    pub response_streaming_supported: Option<bool>
}

/// A selectable model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry
{   pub name: String
  , pub model_id: String
  , pub provider: Option<String>
  , pub streaming: bool
}

#[derive(Debug, Clone, Default)]
pub struct ModelCatalog
{   entries: Vec<CatalogEntry>
  , streaming: HashSet<String>
}

impl ModelCatalog
{   /// Parse and filter a raw listing document
    pub fn from_listing(document: &[u8]) -> Result<Self, Error>
    {   let listing: FoundationModelListing
          = serde_json::from_slice(document)
            .map_err(|e| Error::malformed(e.to_string(), document))?;
        Ok(Self::from_summaries(listing.model_summaries))
    }

    pub fn from_summaries(summaries: Vec<ModelSummary>) -> Self
    {   let mut catalog = ModelCatalog::default();
        for summary in summaries
        {   // versioned ids (`...:0:4k`) are provisioned-throughput only
            if summary.model_id.contains(':')
            {   continue;
            }
            let text_in = summary.input_modalities
              .iter().any(|m| m == TEXT_MODALITY);
            let text_out = summary.output_modalities
              .iter().any(|m| m == TEXT_MODALITY);
            if !(text_in && text_out)
            {   continue;
            }
            let streaming = summary.response_streaming_supported
              .unwrap_or(false);
            if streaming
            {   catalog.streaming.insert(summary.model_id.clone());
            }
            catalog.entries.push(CatalogEntry
            {   name: summary.model_name
              , model_id: summary.model_id
              , provider: summary.provider_name
              , streaming
            });
        }
        debug!(
          "Catalog holds {} models, {} streaming",
          catalog.entries.len(), catalog.streaming.len()
        );
        catalog
    }

    pub fn entries(&self) -> &[CatalogEntry]
    {   &self.entries
    }

    pub fn is_empty(&self) -> bool
    {   self.entries.is_empty()
    }

    pub fn contains(&self, model_id: &str) -> bool
    {   self.entries.iter().any(|e| e.model_id == model_id)
    }

    /// Look up a model by identifier or display name
    pub fn find(&self, id_or_name: &str) -> Option<&CatalogEntry>
    {   self.entries
          .iter()
          .find(|e| e.model_id == id_or_name || e.name == id_or_name)
    }

    pub fn is_streaming(&self, model_id: &str) -> bool
    {   self.streaming.contains(model_id)
    }

    pub fn streaming_model_ids(&self) -> &HashSet<String>
    {   &self.streaming
    }
}
