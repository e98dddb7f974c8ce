//! Free-slot search for newly placed nodes.
//!
//! Two independent checks are used:
//! - gap search only looks at nodes in the same column (x within
//!   `column_tolerance` of the target),
//! - the overlap test looks at every node whose x is closer than
//!   `node_spacing - buffer`.
//!
//! The thresholds differ. A candidate from the gap search is only accepted
//! once the overlap test passes too.

use tracing::debug;

use crate::{
    LayoutConfig,
    graph::{Node, PathDirection},
};

/// Vertical extent of a node already on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    top: f64,
    bottom: f64,
}

/// Placement queries against a snapshot of the canvas.
pub struct Placement<'a> {
    nodes: &'a [Node],
    config: &'a LayoutConfig,
}

impl<'a> Placement<'a> {
    pub fn new(
        nodes: &'a [Node],
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            nodes,
            config,
        }
    }

    /// Returns a y for a box of `height` at column `target_x`, as close to
    /// `proposed_y` as possible without overlapping existing nodes.
    ///
    /// The first node of a column keeps the proposed y.
    pub fn free_y(
        &self,
        target_x: f64,
        proposed_y: f64,
        direction: PathDirection,
        height: f64,
    ) -> f64 {
        let column = self.column(target_x);
        if column.is_empty() {
            return proposed_y;
        }

        let step = match direction {
            PathDirection::Positive => -self.config.vertical_spacing,
            PathDirection::Down => self.config.vertical_spacing,
        };

        let mut y = proposed_y;
        for attempt in 0..self.config.max_shift_attempts {
            if !self.overlaps(target_x, y, height) {
                if attempt > 0 {
                    debug!("placed at y={} after {} shifts", y, attempt);
                }
                return y;
            }

            if let Some(candidate) = self.best_gap(&column, y, direction, height) {
                if !self.overlaps(target_x, candidate, height) {
                    debug!("placed in gap at y={} (proposed {})", candidate, proposed_y);
                    return candidate;
                }
            }

            y += step;
        }

        let fallback = self.clear_of_neighbours(target_x, direction, height);
        debug!("no slot near y={}, falling back to y={}", proposed_y, fallback);
        fallback
    }

    /// True when a box of `height` at `(x, y)` would intersect an existing
    /// node horizontally closer than `node_spacing - buffer`.
    pub fn overlaps(
        &self,
        x: f64,
        y: f64,
        height: f64,
    ) -> bool {
        let reach = self.config.node_spacing - self.config.buffer;

        self.nodes.iter().any(|node| {
            if (node.position.x - x).abs() >= reach {
                return false;
            }
            let (top, bottom) = node.vertical_span();
            y < bottom && top < y + height
        })
    }

    /// Spans of the nodes sharing the target column, sorted top to bottom.
    fn column(
        &self,
        target_x: f64,
    ) -> Vec<Span> {
        let mut spans: Vec<Span> = self
            .nodes
            .iter()
            .filter(|n| (n.position.x - target_x).abs() <= self.config.column_tolerance)
            .map(|n| {
                let (top, bottom) = n.vertical_span();
                Span {
                    top,
                    bottom,
                }
            })
            .collect();

        spans.sort_by(|a, b| a.top.total_cmp(&b.top));
        spans
    }

    /// Candidate y of the free gap closest to `proposed_y`.
    ///
    /// Gaps are the open space above the topmost node, the space between
    /// consecutive nodes wide enough for `height` plus a buffer on each side,
    /// and (downward search only) the open space below the lowest node.
    fn best_gap(
        &self,
        column: &[Span],
        proposed_y: f64,
        direction: PathDirection,
        height: f64,
    ) -> Option<f64> {
        let buffer = self.config.buffer;
        let mut candidates = Vec::with_capacity(column.len() + 1);

        if let Some(first) = column.first() {
            candidates.push(first.top - buffer - height);
        }

        for pair in column.windows(2) {
            let gap = pair[1].top - pair[0].bottom;
            if gap >= height + 2.0 * buffer {
                candidates.push(pair[0].bottom + (gap - height) / 2.0);
            }
        }

        if direction == PathDirection::Down {
            if let Some(last) = column.last() {
                candidates.push(last.bottom + buffer);
            }
        }

        // ties go to the candidate in the search direction
        candidates.into_iter().min_by(|a, b| {
            (a - proposed_y).abs().total_cmp(&(b - proposed_y).abs()).then_with(|| match direction {
                PathDirection::Down => b.total_cmp(a),
                PathDirection::Positive => a.total_cmp(b),
            })
        })
    }

    /// A y beyond every node that could collide with the target column.
    fn clear_of_neighbours(
        &self,
        target_x: f64,
        direction: PathDirection,
        height: f64,
    ) -> f64 {
        let reach = self.config.node_spacing - self.config.buffer;
        let spans = self.nodes.iter().filter(|n| (n.position.x - target_x).abs() < reach).map(|n| n.vertical_span());

        match direction {
            PathDirection::Down => spans.map(|(_, bottom)| bottom).fold(f64::MIN, f64::max) + self.config.buffer,
            PathDirection::Positive => spans.map(|(top, _)| top).fold(f64::MAX, f64::min) - self.config.buffer - height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Dimensions, NewNode, NodeKind, Position, StateData};

    fn node_at(
        id: &str,
        x: f64,
        y: f64,
        height: f64,
    ) -> Node {
        Node::new(NewNode {
            id: id.into(),
            kind: NodeKind::from("approval"),
            position: Position::new(x, y),
            state_data: StateData::default(),
            dimensions: Dimensions::new(150.0, height),
            parent_state_name: String::new(),
            parent_info_node_id: None,
        })
    }

    fn spans_disjoint(nodes: &[Node]) -> bool {
        for (i, a) in nodes.iter().enumerate() {
            for b in nodes.iter().skip(i + 1) {
                if (a.position.x - b.position.x).abs() > 5.0 {
                    continue;
                }
                let (a_top, a_bottom) = a.vertical_span();
                let (b_top, b_bottom) = b.vertical_span();
                if a_top < b_bottom && b_top < a_bottom {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_empty_column_keeps_proposed_y() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 0.0, 0.0, 60.0)];
        let placement = Placement::new(&nodes, &config);
        assert_eq!(placement.free_y(200.0, 0.0, PathDirection::Down, 60.0), 0.0);
    }

    #[test]
    fn test_proposed_y_between_nodes_is_kept_when_free() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 200.0, 0.0, 50.0), node_at("b", 200.0, 150.0, 50.0)];
        let placement = Placement::new(&nodes, &config);

        let y = placement.free_y(200.0, 100.0, PathDirection::Down, 50.0);
        assert!((90.0..=100.0).contains(&y), "got {}", y);
    }

    #[test]
    fn test_collision_moves_below_column_when_searching_down() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 200.0, 0.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        let y = placement.free_y(200.0, 0.0, PathDirection::Down, 60.0);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn test_collision_moves_above_column_when_searching_up() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 200.0, 0.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        let y = placement.free_y(200.0, 0.0, PathDirection::Positive, 60.0);
        assert_eq!(y, -100.0);
    }

    #[test]
    fn test_wide_gap_is_used_when_proposed_y_collides() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 200.0, 0.0, 60.0), node_at("b", 200.0, 400.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        // gap 60..400, box 60 high: centred at 200
        let y = placement.free_y(200.0, 55.0, PathDirection::Down, 60.0);
        assert_eq!(y, 200.0);
    }

    #[test]
    fn test_narrow_gap_is_skipped() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 200.0, 0.0, 60.0), node_at("b", 200.0, 150.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        // 60..150 cannot hold 60 plus a 40 buffer on each side
        let y = placement.free_y(200.0, 100.0, PathDirection::Down, 60.0);
        assert_eq!(y, 250.0);
        assert!(!placement.overlaps(200.0, y, 60.0));
    }

    #[test]
    fn test_overlap_ignores_distant_columns() {
        let config = LayoutConfig::default();
        let nodes = vec![node_at("a", 0.0, 0.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        assert!(placement.overlaps(150.0, 10.0, 60.0));
        assert!(!placement.overlaps(160.0, 10.0, 60.0));
        assert!(!placement.overlaps(0.0, 60.0, 60.0));
    }

    #[test]
    fn test_repeated_placement_never_overlaps() {
        let config = LayoutConfig::default();
        let mut nodes = vec![node_at("root", 0.0, 0.0, 60.0)];

        for i in 0..25 {
            let direction = if i % 3 == 0 { PathDirection::Positive } else { PathDirection::Down };
            let height = 40.0 + (i % 4) as f64 * 16.0;
            let y = Placement::new(&nodes, &config).free_y(200.0, 0.0, direction, height);
            nodes.push(node_at(&format!("n{}", i), 200.0, y, height));
        }

        assert!(spans_disjoint(&nodes));
    }

    #[test]
    fn test_fallback_after_exhausting_shifts() {
        let config = LayoutConfig {
            max_shift_attempts: 1,
            ..Default::default()
        };
        let nodes = vec![node_at("a", 200.0, 0.0, 60.0), node_at("near", 300.0, 100.0, 60.0)];
        let placement = Placement::new(&nodes, &config);

        let y = placement.free_y(200.0, 0.0, PathDirection::Down, 60.0);
        assert_eq!(y, 200.0);
        assert!(!placement.overlaps(200.0, y, 60.0));
    }
}
