//! Typed configuration for a router pass, validated once before any record
//! is read.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::allow_set::{AllowSet, TableFormat};
use crate::core::error::{DemuxError, Result};
use crate::record::Tag;
use crate::router::{RoutingPolicy, PROGRESS_INTERVAL};
use crate::sink::OutputLayout;

pub const DEFAULT_TAG: &str = "CB";
pub const DEFAULT_EXTENSION: &str = "bam";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    Demultiplex,
    AllowList,
    QualityFilter,
}

/// Options recognised by the router, as assembled by the CLI.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Record attribute to route or filter on.
    pub tag: Option<String>,
    /// Destination directory for per-key sinks.
    pub output_dir: Option<PathBuf>,
    /// Single output for pass-through filters (`-` for stdout).
    pub output: Option<PathBuf>,
    pub extension: String,
    pub filter_undetermined: bool,
    pub allow_set_source: Option<PathBuf>,
    pub allow_format: TableFormat,
    pub progress_interval: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            tag: Some(DEFAULT_TAG.to_string()),
            output_dir: None,
            output: None,
            extension: DEFAULT_EXTENSION.to_string(),
            filter_undetermined: false,
            allow_set_source: None,
            allow_format: TableFormat::default(),
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

/// Everything a router pass needs once configuration has been checked.
#[derive(Debug, Clone)]
pub struct RoutePlan {
    pub policy: RoutingPolicy,
    pub layout: OutputLayout,
    pub progress_interval: u64,
}

impl RouterConfig {
    fn require_tag(&self) -> Result<Tag> {
        match self.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => tag.parse(),
            _ => Err(DemuxError::config("a routing tag must be specified")),
        }
    }

    fn per_key_layout(&self) -> Result<OutputLayout> {
        let dir = self
            .output_dir
            .as_ref()
            .ok_or_else(|| DemuxError::config("an output directory is required to demultiplex"))?;
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(DemuxError::config("output extension must not be empty"));
        }
        if !dir.is_dir() {
            fs::create_dir_all(dir)?;
        }
        Ok(OutputLayout::per_key(dir, extension))
    }

    fn single_layout(&self) -> OutputLayout {
        OutputLayout::Single(self.output.clone().unwrap_or_else(|| PathBuf::from("-")))
    }

    /// Check the options for `mode` and resolve them into a [`RoutePlan`].
    ///
    /// Fails with [`DemuxError::Config`] when a required option is missing or
    /// malformed. The allow-list, when needed, is loaded here.
    pub fn plan(&self, mode: RouteMode) -> Result<RoutePlan> {
        let (policy, layout) = match mode {
            RouteMode::Demultiplex => {
                let tag = self.require_tag()?;
                (RoutingPolicy::Demultiplex { tag }, self.per_key_layout()?)
            }
            RouteMode::AllowList => {
                let tag = self.require_tag()?;
                let source = self.allow_set_source.as_ref().ok_or_else(|| {
                    DemuxError::config("an allow-list table is required for barcode filtering")
                })?;
                let allow = AllowSet::from_path(source, self.allow_format)?;
                if allow.is_empty() {
                    return Err(DemuxError::config(format!(
                        "allow-list {:?} contains no barcodes",
                        source
                    )));
                }
                let policy = RoutingPolicy::AllowList {
                    tag,
                    allow,
                    filter_undetermined: self.filter_undetermined,
                };
                (policy, self.single_layout())
            }
            RouteMode::QualityFilter => (RoutingPolicy::QualityFilter, self.single_layout()),
        };
        info!("Configured {} pass -> {:?}", policy.name(), layout);
        Ok(RoutePlan {
            policy,
            layout,
            progress_interval: self.progress_interval,
        })
    }
}
