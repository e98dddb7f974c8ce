//! Canvas coordinate space and viewport controls.
//!
//! The designer never talks to a rendering library directly. Hosts implement
//! [`CoordinateSpace`] over their canvas; [`VirtualCanvas`] is the headless
//! implementation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    ViewportConfig,
    graph::{Dimensions, Node, Position},
};

/// Pan and zoom of the canvas: `screen = canvas * zoom + (x, y)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// The slice of the canvas library the designer needs.
pub trait CoordinateSpace: Send {
    /// Converts a screen point to canvas coordinates.
    fn screen_to_canvas(
        &self,
        point: Position,
    ) -> Position;

    /// Visible size of the canvas in screen pixels.
    fn screen_size(&self) -> Dimensions;

    fn viewport(&self) -> Viewport;

    /// Moves the viewport, animating over `duration`.
    fn set_viewport(
        &mut self,
        viewport: Viewport,
        duration: Duration,
    );

    /// Canvas position currently under the middle of the screen.
    fn screen_center(&self) -> Position {
        let size = self.screen_size();
        self.screen_to_canvas(Position::new(size.width / 2.0, size.height / 2.0))
    }
}

/// In-memory canvas for headless use and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCanvas {
    size: Dimensions,
    viewport: Viewport,
    last_duration: Option<Duration>,
    transitions: usize,
}

impl VirtualCanvas {
    pub fn new(size: Dimensions) -> Self {
        Self {
            size,
            viewport: Viewport::default(),
            last_duration: None,
            transitions: 0,
        }
    }

    /// Duration of the most recent viewport change.
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Number of viewport changes so far.
    pub fn transitions(&self) -> usize {
        self.transitions
    }
}

impl Default for VirtualCanvas {
    fn default() -> Self {
        Self::new(Dimensions::new(1280.0, 720.0))
    }
}

impl CoordinateSpace for VirtualCanvas {
    fn screen_to_canvas(
        &self,
        point: Position,
    ) -> Position {
        Position::new((point.x - self.viewport.x) / self.viewport.zoom, (point.y - self.viewport.y) / self.viewport.zoom)
    }

    fn screen_size(&self) -> Dimensions {
        self.size
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(
        &mut self,
        viewport: Viewport,
        duration: Duration,
    ) {
        self.viewport = viewport;
        self.last_duration = Some(duration);
        self.transitions += 1;
    }
}

/// Pan/zoom operations on a coordinate space.
#[derive(Debug, Clone)]
pub struct ViewportControls {
    config: ViewportConfig,
}

impl ViewportControls {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
        }
    }

    /// Pans so the middle of `node` sits in the middle of the screen. The
    /// zoom level is kept.
    pub fn center_on(
        &self,
        space: &mut dyn CoordinateSpace,
        node: &Node,
    ) -> Viewport {
        let size = space.screen_size();
        let zoom = space.viewport().zoom;
        let dims = node.dimensions();
        let center_x = node.position.x + dims.width / 2.0;
        let center_y = node.position.y + dims.height / 2.0;

        let viewport = Viewport {
            x: size.width / 2.0 - center_x * zoom,
            y: size.height / 2.0 - center_y * zoom,
            zoom,
        };
        space.set_viewport(viewport, Duration::from_millis(self.config.center_duration_ms));
        viewport
    }

    pub fn zoom_in(
        &self,
        space: &mut dyn CoordinateSpace,
    ) -> Viewport {
        let zoom = space.viewport().zoom * self.config.zoom_step;
        self.zoom_to(space, zoom)
    }

    pub fn zoom_out(
        &self,
        space: &mut dyn CoordinateSpace,
    ) -> Viewport {
        let zoom = space.viewport().zoom / self.config.zoom_step;
        self.zoom_to(space, zoom)
    }

    /// Back to the canvas origin at zoom 1.
    pub fn reset(
        &self,
        space: &mut dyn CoordinateSpace,
    ) -> Viewport {
        let viewport = Viewport::default();
        space.set_viewport(viewport, Duration::from_millis(self.config.zoom_duration_ms));
        viewport
    }

    /// Zooms around the screen center, clamped to the configured bounds.
    fn zoom_to(
        &self,
        space: &mut dyn CoordinateSpace,
        zoom: f64,
    ) -> Viewport {
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let anchor = space.screen_center();
        let size = space.screen_size();

        let viewport = Viewport {
            x: size.width / 2.0 - anchor.x * zoom,
            y: size.height / 2.0 - anchor.y * zoom,
            zoom,
        };
        space.set_viewport(viewport, Duration::from_millis(self.config.zoom_duration_ms));
        viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NewNode, NodeKind, StateData};

    fn node_at(
        x: f64,
        y: f64,
    ) -> Node {
        Node::new(NewNode {
            id: "approval-root-0".into(),
            kind: NodeKind::from("approval"),
            position: Position::new(x, y),
            state_data: StateData::default(),
            dimensions: Dimensions::new(150.0, 60.0),
            parent_state_name: String::new(),
            parent_info_node_id: None,
        })
    }

    #[test]
    fn test_screen_center_follows_viewport() {
        let mut canvas = VirtualCanvas::new(Dimensions::new(800.0, 600.0));
        assert_eq!(canvas.screen_center(), Position::new(400.0, 300.0));

        canvas.set_viewport(
            Viewport {
                x: 100.0,
                y: -50.0,
                zoom: 2.0,
            },
            Duration::ZERO,
        );
        assert_eq!(canvas.screen_center(), Position::new(150.0, 175.0));
    }

    #[test]
    fn test_center_on_node_keeps_zoom() {
        let controls = ViewportControls::new(ViewportConfig::default());
        let mut canvas = VirtualCanvas::new(Dimensions::new(800.0, 600.0));
        canvas.set_viewport(
            Viewport {
                x: 0.0,
                y: 0.0,
                zoom: 2.0,
            },
            Duration::ZERO,
        );

        let viewport = controls.center_on(&mut canvas, &node_at(400.0, 200.0));

        assert_eq!(viewport.zoom, 2.0);
        // node middle (475, 230) lands on the screen middle
        assert_eq!(canvas.screen_center(), Position::new(475.0, 230.0));
        assert_eq!(canvas.last_duration(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn test_zoom_is_clamped_and_keeps_center() {
        let controls = ViewportControls::new(ViewportConfig::default());
        let mut canvas = VirtualCanvas::new(Dimensions::new(800.0, 600.0));
        let before = canvas.screen_center();

        let viewport = controls.zoom_in(&mut canvas);
        assert!((viewport.zoom - 1.2).abs() < 1e-9);
        let after = canvas.screen_center();
        assert!((after.x - before.x).abs() < 1e-9 && (after.y - before.y).abs() < 1e-9);

        for _ in 0..50 {
            controls.zoom_in(&mut canvas);
        }
        assert_eq!(canvas.viewport().zoom, 4.0);

        for _ in 0..100 {
            controls.zoom_out(&mut canvas);
        }
        assert_eq!(canvas.viewport().zoom, 0.1);
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let controls = ViewportControls::new(ViewportConfig::default());
        let mut canvas = VirtualCanvas::default();
        controls.center_on(&mut canvas, &node_at(1000.0, 1000.0));

        assert_eq!(controls.reset(&mut canvas), Viewport::default());
        assert_eq!(canvas.viewport(), Viewport::default());
        assert_eq!(canvas.transitions(), 2);
    }
}
