//! Drag session state machine.
//!
//! One session per participant per pointer gesture. The machine is purely
//! synchronous — it runs at pointer-move frequency and never touches a cache
//! or the network. Preview is visual state only; nothing is mutated until
//! the drop commits through the mutation dispatcher.
//!
//! Transition legality is structural: a [`DropCommit`] can only be produced
//! from the previewing state, so "drop without preview" is unrepresentable.

mod autoscroll;

pub use autoscroll::{AutoScroll, EDGE_ZONE_PX, MAX_SCROLL_SPEED};

use crate::position::{Anchor, Edge};
use crate::types::{ContainerKey, ItemId};

/// Fraction of an item's extent that maps the pointer to the Before edge
pub const SPLIT_FRACTION: f64 = 0.5;

/// Pointer position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding geometry of a drop target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Stacking direction of a container's items: cards stack vertically inside
/// a list, lists run horizontally across a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// What the pointer is currently over, as reported by the embedder's hit
/// testing.
#[derive(Debug, Clone, PartialEq)]
pub enum Hover {
    /// Over another item; the edge is derived from pointer vs. bounds
    Item {
        container: ContainerKey,
        item: ItemId,
        bounds: Rect,
        axis: Axis,
    },
    /// Over a designated gap whose layout already implies anchor and edge
    Gap {
        container: ContainerKey,
        anchor: Anchor,
        edge: Edge,
    },
    /// Over an empty container's drop zone
    EmptyZone { container: ContainerKey },
}

/// The preview shown while hovering a valid target
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTarget {
    pub container: ContainerKey,
    pub anchor: Anchor,
    pub edge: Edge,
}

/// The committed outcome of a drop — exactly the tuple
/// [`MutationDispatcher::commit`](crate::dispatch::MutationDispatcher::commit)
/// takes.
#[derive(Debug, Clone, PartialEq)]
pub struct DropCommit {
    pub item: ItemId,
    pub source: ContainerKey,
    pub target: ContainerKey,
    pub anchor: Anchor,
    pub edge: Edge,
}

/// Session states. `Dropped`/`Cancelled` are not materialized: both resolve
/// back to `Idle` within the transition that produces them.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: ItemId,
        source: ContainerKey,
    },
    Previewing {
        item: ItemId,
        source: ContainerKey,
        target: PreviewTarget,
    },
}

/// One in-progress pointer-driven reorder gesture
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Current preview, if any
    pub fn preview(&self) -> Option<&PreviewTarget> {
        match &self.state {
            DragState::Previewing { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Pointer-down on a draggable item starts a session. Ignored while a
    /// gesture is already in flight.
    pub fn pointer_down(&mut self, item: ItemId, source: ContainerKey) {
        if let DragState::Idle = self.state {
            tracing::debug!(%item, container = %source, "drag started");
            self.state = DragState::Dragging { item, source };
        }
    }

    /// Pointer movement re-evaluates the preview. Hot path: pure
    /// computation, no allocation beyond the preview itself.
    pub fn pointer_move(&mut self, pointer: Point, hover: Option<Hover>) {
        let (item, source) = match &self.state {
            DragState::Idle => return,
            DragState::Dragging { item, source } | DragState::Previewing { item, source, .. } => {
                (item.clone(), source.clone())
            }
        };

        match hover.and_then(|hover| resolve_target(&item, pointer, hover)) {
            Some(target) => {
                self.state = DragState::Previewing {
                    item,
                    source,
                    target,
                };
            }
            None => {
                self.state = DragState::Dragging { item, source };
            }
        }
    }

    /// Pointer release. Over a valid target this commits and returns the
    /// drop; anywhere else the gesture is cancelled. Either way the session
    /// returns to idle.
    pub fn pointer_up(&mut self) -> Option<DropCommit> {
        match std::mem::take(&mut self.state) {
            DragState::Previewing {
                item,
                source,
                target,
            } => {
                tracing::debug!(%item, target = %target.container, "drop committed");
                Some(DropCommit {
                    item,
                    source,
                    target: target.container,
                    anchor: target.anchor,
                    edge: target.edge,
                })
            }
            _ => None,
        }
    }

    /// Abort the gesture with no side effects.
    pub fn cancel(&mut self) {
        if self.is_active() {
            tracing::debug!("drag cancelled");
        }
        self.state = DragState::Idle;
    }
}

/// Map a hover to a preview target, or `None` when the hover is not a valid
/// target for this dragged item (hovering the dragged item itself).
fn resolve_target(dragged: &ItemId, pointer: Point, hover: Hover) -> Option<PreviewTarget> {
    match hover {
        Hover::Item {
            container,
            item,
            bounds,
            axis,
        } => {
            if &item == dragged {
                return None;
            }
            let edge = split_edge(pointer, bounds, axis);
            Some(PreviewTarget {
                container,
                anchor: Anchor::Item(item),
                edge,
            })
        }
        Hover::Gap {
            container,
            anchor,
            edge,
        } => Some(PreviewTarget {
            container,
            anchor,
            edge,
        }),
        Hover::EmptyZone { container } => Some(PreviewTarget {
            container,
            anchor: Anchor::End,
            edge: Edge::After,
        }),
    }
}

/// A fixed split fraction of the target's extent decides the edge.
fn split_edge(pointer: Point, bounds: Rect, axis: Axis) -> Edge {
    let before = match axis {
        Axis::Vertical => pointer.y < bounds.y + bounds.height * SPLIT_FRACTION,
        Axis::Horizontal => pointer.x < bounds.x + bounds.width * SPLIT_FRACTION,
    };
    if before {
        Edge::Before
    } else {
        Edge::After
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> ContainerKey {
        ContainerKey::list_cards("b", "l1")
    }

    fn other_list() -> ContainerKey {
        ContainerKey::list_cards("b", "l2")
    }

    fn hover_over(item: &str) -> Hover {
        Hover::Item {
            container: list(),
            item: ItemId::from(item),
            bounds: Rect {
                x: 0.0,
                y: 100.0,
                width: 200.0,
                height: 50.0,
            },
            axis: Axis::Vertical,
        }
    }

    fn started() -> DragSession {
        let mut session = DragSession::new();
        session.pointer_down(ItemId::from("a"), list());
        session
    }

    #[test]
    fn test_pointer_down_only_from_idle() {
        let mut session = started();
        session.pointer_down(ItemId::from("b"), other_list());
        match session.state() {
            DragState::Dragging { item, .. } => assert_eq!(item.as_str(), "a"),
            state => panic!("unexpected state: {:?}", state),
        }
    }

    #[test]
    fn test_edge_from_split_fraction() {
        let mut session = started();

        // Upper half of the target => Before
        session.pointer_move(Point { x: 10.0, y: 110.0 }, Some(hover_over("b")));
        assert_eq!(session.preview().unwrap().edge, Edge::Before);

        // Lower half => After
        session.pointer_move(Point { x: 10.0, y: 140.0 }, Some(hover_over("b")));
        assert_eq!(session.preview().unwrap().edge, Edge::After);
    }

    #[test]
    fn test_horizontal_axis_uses_x() {
        let mut session = started();
        let hover = Hover::Item {
            container: ContainerKey::board_lists("b"),
            item: ItemId::from("l2"),
            bounds: Rect {
                x: 300.0,
                y: 0.0,
                width: 260.0,
                height: 800.0,
            },
            axis: Axis::Horizontal,
        };
        session.pointer_move(Point { x: 320.0, y: 400.0 }, Some(hover));
        assert_eq!(session.preview().unwrap().edge, Edge::Before);
    }

    #[test]
    fn test_hover_on_self_is_not_a_target() {
        let mut session = started();
        session.pointer_move(Point { x: 10.0, y: 110.0 }, Some(hover_over("a")));
        assert!(session.preview().is_none());
        assert!(matches!(session.state(), DragState::Dragging { .. }));
    }

    #[test]
    fn test_leaving_targets_reverts_to_dragging() {
        let mut session = started();
        session.pointer_move(Point { x: 10.0, y: 110.0 }, Some(hover_over("b")));
        assert!(session.preview().is_some());

        session.pointer_move(Point { x: 500.0, y: 500.0 }, None);
        assert!(session.preview().is_none());
        assert!(session.is_active());
    }

    #[test]
    fn test_drop_requires_preview() {
        let mut session = started();
        assert!(session.pointer_up().is_none());
        assert_eq!(*session.state(), DragState::Idle);
    }

    #[test]
    fn test_drop_carries_the_commit_tuple() {
        let mut session = started();
        session.pointer_move(Point { x: 10.0, y: 140.0 }, Some(hover_over("b")));

        let commit = session.pointer_up().unwrap();
        assert_eq!(commit.item.as_str(), "a");
        assert_eq!(commit.source, list());
        assert_eq!(commit.target, list());
        assert_eq!(commit.anchor, Anchor::Item(ItemId::from("b")));
        assert_eq!(commit.edge, Edge::After);
        assert_eq!(*session.state(), DragState::Idle);
    }

    #[test]
    fn test_empty_zone_targets_end() {
        let mut session = started();
        session.pointer_move(
            Point::default(),
            Some(Hover::EmptyZone {
                container: other_list(),
            }),
        );
        let commit = session.pointer_up().unwrap();
        assert_eq!(commit.target, other_list());
        assert_eq!(commit.anchor, Anchor::End);
    }

    #[test]
    fn test_cancel_discards_everything() {
        let mut session = started();
        session.pointer_move(Point { x: 10.0, y: 110.0 }, Some(hover_over("b")));
        session.cancel();
        assert_eq!(*session.state(), DragState::Idle);
        assert!(session.pointer_up().is_none());
    }
}
