use std::{fs, path::Path};

use serde::Deserialize;

use crate::{FlowdraftError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// placement constants
    pub layout: LayoutConfig,
    /// default state node box
    pub node: NodeConfig,
    /// info node label box
    pub info: InfoConfig,
    /// viewport animation and zoom bounds
    pub viewport: ViewportConfig,
    /// id generation
    pub ids: IdsConfig,
    /// when deferred steps run
    pub schedule: SchedulePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// horizontal distance between a parent and its child column
    pub node_spacing: f64,
    /// vertical shift applied when a proposed y cannot be placed
    pub vertical_spacing: f64,
    /// clearance kept above and below every node
    pub buffer: f64,
    /// max x difference for two nodes to share a column
    pub column_tolerance: f64,
    /// number of vertical shifts tried before falling back below the column
    pub max_shift_attempts: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 200.0,
            vertical_spacing: 100.0,
            buffer: 40.0,
            column_tolerance: 5.0,
            max_shift_attempts: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub width: f64,
    /// characters per wrapped line
    pub line_chars: usize,
    pub line_height: f64,
    pub padding: f64,
    pub min_height: f64,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            width: 70.0,
            line_chars: 25,
            line_height: 16.0,
            padding: 16.0,
            min_height: 40.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub center_duration_ms: u64,
    pub zoom_duration_ms: u64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            center_duration_ms: 800,
            zoom_duration_ms: 200,
            zoom_step: 1.2,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdsConfig {
    pub strategy: IdStrategy,
    /// first value handed out by the sequence strategy
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    Sequence,
    Nanoid,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// the host calls `Designer::on_frame` once per rendered frame
    #[default]
    Frame,
    /// deferred steps drain before the triggering call returns
    Immediate,
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| FlowdraftError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.layout.node_spacing <= self.layout.buffer {
            return Err(FlowdraftError::Config(format!(
                "layout.node_spacing ({}) must be larger than layout.buffer ({})",
                self.layout.node_spacing, self.layout.buffer
            )));
        }
        if self.layout.vertical_spacing <= 0.0 {
            return Err(FlowdraftError::Config("layout.vertical_spacing must be positive".into()));
        }
        if self.info.line_chars == 0 {
            return Err(FlowdraftError::Config("info.line_chars must be at least 1".into()));
        }
        if self.viewport.min_zoom <= 0.0 || self.viewport.min_zoom > self.viewport.max_zoom {
            return Err(FlowdraftError::Config(format!(
                "invalid zoom bounds [{}, {}]",
                self.viewport.min_zoom, self.viewport.max_zoom
            )));
        }
        Ok(())
    }
}
