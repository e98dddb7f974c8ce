use std::sync::Arc;

use crate::{
    Config, Designer, Result,
    graph::{HandleConnectivity, NoopHandles},
    utils::{IdGenerator, ids},
    viewport::{CoordinateSpace, VirtualCanvas},
};

pub struct DesignerBuilder {
    config: Config,
    space: Option<Box<dyn CoordinateSpace>>,
    ids: Option<Box<dyn IdGenerator>>,
    handles: Arc<dyn HandleConnectivity>,
}

impl Default for DesignerBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            space: None,
            ids: None,
            handles: Arc::new(NoopHandles),
        }
    }
}

impl DesignerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Canvas the designer places nodes on. Defaults to a 1280x720
    /// [`VirtualCanvas`].
    pub fn coordinate_space(
        mut self,
        space: impl CoordinateSpace + 'static,
    ) -> Self {
        self.space = Some(Box::new(space));
        self
    }

    /// Overrides the id strategy from the config.
    pub fn id_generator(
        mut self,
        ids: impl IdGenerator + 'static,
    ) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn handles(
        mut self,
        handles: Arc<dyn HandleConnectivity>,
    ) -> Self {
        self.handles = handles;
        self
    }

    pub fn build(self) -> Result<Designer> {
        self.config.validate()?;

        let space = self.space.unwrap_or_else(|| Box::new(VirtualCanvas::default()));
        let ids = self.ids.unwrap_or_else(|| ids::from_config(&self.config.ids));
        let designer = Designer::new(self.config, space, ids, self.handles);

        Ok(designer)
    }
}
