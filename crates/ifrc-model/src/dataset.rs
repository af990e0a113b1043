//! Publishable units handed to the catalog publisher.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A generated tabular resource attached to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub description: String,
    pub format: String,
    pub path: PathBuf,
    pub row_count: usize,
}

/// Dataset metadata plus the resources written for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub name: String,
    pub title: String,
    pub notes: String,
    pub maintainer: String,
    pub owner_org: String,
    pub data_update_frequency: String,
    pub subnational: bool,
    /// Lowercase ISO3 code, or `world` for global datasets.
    pub locations: Vec<String>,
    pub tags: Vec<String>,
    /// `[start TO end]`, absent when no row carried a usable date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_date: Option<String>,
    pub resources: Vec<ResourceSpec>,
    /// Substitution for `{{#status+name}}` in country chart views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_status: Option<String>,
}

impl DatasetSpec {
    /// Primary data resource; always the first one attached.
    #[must_use]
    pub fn primary_resource(&self) -> Option<&ResourceSpec> {
        self.resources.first()
    }
}

/// External link card shown next to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowcaseSpec {
    pub name: String,
    pub title: String,
    pub notes: String,
    pub url: String,
    pub image_url: String,
    pub tags: Vec<String>,
}

/// Everything the assembler produced for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledDataset {
    pub dataset: DatasetSpec,
    pub showcase: Option<ShowcaseSpec>,
    pub quickchart_resource: Option<ResourceSpec>,
}
