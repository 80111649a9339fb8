//! Doors and windows attached to wall segments.
//!
//! A fixture is anchored by `wall_segment_id` plus a `wall_parameter` in
//! `[0, 1]`. Its world position and rotation are cached at attach time and
//! only re-derived by [`FixtureStore::resync`].

use crate::geometry;
use crate::walls::{SegmentId, WallGraph};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a door or window.
pub type FixtureId = Uuid;

/// Default door width in pixels.
pub const DOOR_WIDTH: f64 = 40.0;
/// Default window width in pixels.
pub const WINDOW_WIDTH: f64 = 50.0;

/// What kind of opening a fixture is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    Door,
    Window,
}

impl FixtureKind {
    pub fn default_width(self) -> f64 {
        match self {
            FixtureKind::Door => DOOR_WIDTH,
            FixtureKind::Window => WINDOW_WIDTH,
        }
    }
}

/// A door or window hosted by a wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub kind: FixtureKind,
    pub wall_segment_id: SegmentId,
    /// Position along the host segment, 0 = start node, 1 = end node.
    pub wall_parameter: f64,
    /// Cached world-space center.
    pub position: Point,
    /// Cached rotation in degrees, matching the host wall direction.
    pub rotation: f64,
    pub width: f64,
    /// Door swing mirrored to the other side. Always false for windows.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub flipped: bool,
}

/// Partial update for a fixture; `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixtureUpdate {
    pub wall_segment_id: Option<SegmentId>,
    pub wall_parameter: Option<f64>,
    pub position: Option<Point>,
    pub rotation: Option<f64>,
    pub width: Option<f64>,
    pub flipped: Option<bool>,
}

/// Plain serializable form of the fixture store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureState {
    pub fixtures: Vec<Fixture>,
}

/// Owns all doors and windows.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    fixtures: HashMap<FixtureId, Fixture>,
    order: Vec<FixtureId>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fixture with the default width for its kind.
    ///
    /// The segment is not checked; callers pass ids from a wall snap.
    pub fn add_fixture(
        &mut self,
        kind: FixtureKind,
        wall_segment_id: SegmentId,
        wall_parameter: f64,
        position: Point,
        rotation: f64,
    ) -> FixtureId {
        let id = Uuid::new_v4();
        self.fixtures.insert(
            id,
            Fixture {
                id,
                kind,
                wall_segment_id,
                wall_parameter: wall_parameter.clamp(0.0, 1.0),
                position,
                rotation,
                width: kind.default_width(),
                flipped: false,
            },
        );
        self.order.push(id);
        id
    }

    pub fn remove_fixture(&mut self, id: FixtureId) {
        if self.fixtures.remove(&id).is_some() {
            self.order.retain(|&f| f != id);
        }
    }

    pub fn update_fixture(&mut self, id: FixtureId, update: FixtureUpdate) {
        let Some(fixture) = self.fixtures.get_mut(&id) else {
            return;
        };
        if let Some(segment) = update.wall_segment_id {
            fixture.wall_segment_id = segment;
        }
        if let Some(t) = update.wall_parameter {
            fixture.wall_parameter = t.clamp(0.0, 1.0);
        }
        if let Some(position) = update.position {
            fixture.position = position;
        }
        if let Some(rotation) = update.rotation {
            fixture.rotation = rotation;
        }
        if let Some(width) = update.width {
            fixture.width = width;
        }
        if let Some(flipped) = update.flipped {
            fixture.flipped = flipped && fixture.kind == FixtureKind::Door;
        }
    }

    /// Mirror a door's swing. Windows and absent ids are ignored.
    pub fn toggle_flip(&mut self, id: FixtureId) {
        if let Some(fixture) = self.fixtures.get_mut(&id) {
            if fixture.kind == FixtureKind::Door {
                fixture.flipped = !fixture.flipped;
            }
        }
    }

    /// Remove every fixture hosted by `segment_id`. Returns the removed ids.
    pub fn remove_fixtures_for_segment(&mut self, segment_id: SegmentId) -> Vec<FixtureId> {
        let removed: Vec<FixtureId> = self
            .fixtures()
            .filter(|f| f.wall_segment_id == segment_id)
            .map(|f| f.id)
            .collect();
        for id in &removed {
            self.fixtures.remove(id);
        }
        self.order.retain(|id| !removed.contains(id));
        removed
    }

    /// Re-derive cached positions and rotations from the live wall geometry.
    ///
    /// Fixtures whose host segment is gone are left untouched.
    pub fn resync(&mut self, walls: &WallGraph) {
        for fixture in self.fixtures.values_mut() {
            if let Some((start, end)) = walls.segment_endpoints(fixture.wall_segment_id) {
                fixture.position = geometry::point_at_parameter(start, end, fixture.wall_parameter);
                fixture.rotation = geometry::angle_degrees(start, end);
            }
        }
    }

    pub fn get(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(&id)
    }

    /// All fixtures in insertion order.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.order.iter().filter_map(|id| self.fixtures.get(id))
    }

    /// Fixtures of one kind in insertion order.
    pub fn of_kind(&self, kind: FixtureKind) -> impl Iterator<Item = &Fixture> {
        self.fixtures().filter(move |f| f.kind == kind)
    }

    /// Fixtures hosted by a given segment.
    pub fn on_segment(&self, segment_id: SegmentId) -> impl Iterator<Item = &Fixture> {
        self.fixtures().filter(move |f| f.wall_segment_id == segment_id)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn to_state(&self) -> FixtureState {
        FixtureState {
            fixtures: self.fixtures().copied().collect(),
        }
    }

    pub fn from_state(state: &FixtureState) -> Self {
        let mut store = Self::new();
        for fixture in &state.fixtures {
            if store.fixtures.insert(fixture.id, *fixture).is_none() {
                store.order.push(fixture.id);
            }
        }
        store
    }
}
