//! Selection group: the transient container of selected canvas items.
//!
//! The group has its own transform `T(p) = pos + scale * p`. Each member is
//! stored in the group's local frame, so moving or scaling the group moves
//! or scales every member around one shared pivot. Members are IDs plus
//! local geometry; the live items stay in the canvas surface's arena.
//!
//! One gesture runs `Idle → Started → Dragging | Scaling → Idle`.
//! [`SelectionGroup::capture_initial_pose`] starts it and
//! [`SelectionGroup::commit`] ends it. Translate and scale calls outside a
//! gesture are ignored.

use kurbo::{Point, Rect, Size, Vec2};
use mb_core::geometry::{Corner, union_all};
use mb_core::id::CanvasItemId;
use mb_core::item::{CanvasItem, ItemShape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    /// Initial pose captured; no delta applied yet.
    Started,
    Dragging,
    Scaling(Corner),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Member {
    id: CanvasItemId,
    /// Top-left in the group frame.
    origin: Point,
    /// Item scale relative to the group scale.
    scale: f64,
    /// Unscaled content size.
    size: Size,
}

impl Member {
    fn local_rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size * self.scale)
    }
}

/// Group pose captured at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialPose {
    pub pos: Point,
    pub scale: f64,
    /// Group bounds in scene space.
    pub scene_rect: Rect,
}

/// Scene-space pose of one member, as written back on commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberPose {
    pub id: CanvasItemId,
    pub pos: Point,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct SelectionGroup {
    members: Vec<Member>,
    pos: Point,
    scale: f64,
    min_scale: f64,
    phase: GesturePhase,
    initial: Option<InitialPose>,
}

impl SelectionGroup {
    pub fn new(min_scale: f64) -> Self {
        Self {
            members: Vec::new(),
            pos: Point::ZERO,
            scale: 1.0,
            min_scale,
            phase: GesturePhase::Idle,
            initial: None,
        }
    }

    // ─── Membership ──────────────────────────────────────────────────────

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, id: CanvasItemId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Member IDs in the order they were selected.
    pub fn ids(&self) -> Vec<CanvasItemId> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// Add an item, keeping its scene pose. Returns false if it was
    /// already selected.
    pub fn add(&mut self, item: &CanvasItem) -> bool {
        if self.contains(item.id) {
            return false;
        }
        self.members.push(Member {
            id: item.id,
            origin: self.to_local(item.pos),
            scale: item.scale / self.scale,
            size: item.body.local_size(),
        });
        true
    }

    /// Remove a member and return its scene pose.
    pub fn remove(&mut self, id: CanvasItemId) -> Option<MemberPose> {
        let idx = self.members.iter().position(|m| m.id == id)?;
        let pose = self.pose_of(&self.members[idx]);
        self.members.remove(idx);
        Some(pose)
    }

    /// Remove every member, returning their scene poses, and reset the
    /// group transform for the next selection.
    pub fn clear(&mut self) -> Vec<MemberPose> {
        let poses = self.poses();
        self.members.clear();
        self.reset_transform();
        poses
    }

    /// Back to the identity transform. Only meaningful when empty, since
    /// members would otherwise jump.
    pub fn reset_transform(&mut self) {
        debug_assert!(self.members.is_empty());
        self.pos = Point::ZERO;
        self.scale = 1.0;
        self.phase = GesturePhase::Idle;
        self.initial = None;
    }

    /// The unscaled size of a member changed (e.g. its text was edited).
    pub fn update_size(&mut self, id: CanvasItemId, size: Size) {
        if let Some(m) = self.members.iter_mut().find(|m| m.id == id) {
            m.size = size;
        }
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn group_scale(&self) -> f64 {
        self.scale
    }

    fn to_scene(&self, local: Point) -> Point {
        self.pos + local.to_vec2() * self.scale
    }

    fn to_local(&self, scene: Point) -> Point {
        Point::ZERO + (scene - self.pos) / self.scale
    }

    fn pose_of(&self, m: &Member) -> MemberPose {
        MemberPose {
            id: m.id,
            pos: self.to_scene(m.origin),
            scale: m.scale * self.scale,
        }
    }

    /// Scene poses of all members, in selection order.
    pub fn poses(&self) -> Vec<MemberPose> {
        self.members.iter().map(|m| self.pose_of(m)).collect()
    }

    /// Union of member bounds in the group frame.
    pub fn local_bounds(&self) -> Option<Rect> {
        union_all(self.members.iter().map(Member::local_rect))
    }

    /// Union of member bounds in scene space.
    pub fn scene_bounds(&self) -> Option<Rect> {
        let local = self.local_bounds()?;
        Some(Rect::from_points(
            self.to_scene(Point::new(local.x0, local.y0)),
            self.to_scene(Point::new(local.x1, local.y1)),
        ))
    }

    // ─── Gesture ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn initial_pose(&self) -> Option<InitialPose> {
        self.initial
    }

    /// Record the pose that every delta of this gesture is measured from.
    pub fn capture_initial_pose(&mut self) {
        let scene_rect = self.scene_bounds().unwrap_or(Rect::ZERO);
        self.initial = Some(InitialPose {
            pos: self.pos,
            scale: self.scale,
            scene_rect,
        });
        self.phase = GesturePhase::Started;
    }

    /// Move the group to `initial + delta`.
    ///
    /// An axis whose move would push the group outside `bounds` keeps its
    /// previous position; the other axis still moves. Returns true if the
    /// group moved.
    pub fn translate(&mut self, delta: Vec2, bounds: Rect) -> bool {
        let Some(initial) = self.gesture_pose("translate") else {
            return false;
        };
        if self.members.is_empty() {
            return false;
        }
        self.phase = GesturePhase::Dragging;

        let prev = self.pos;
        self.pos = initial.pos + delta;
        if let Some(r) = self.scene_bounds() {
            if r.y0 < bounds.y0 || r.y1 > bounds.y1 {
                self.pos.y = prev.y;
            }
            if r.x0 < bounds.x0 || r.x1 > bounds.x1 {
                self.pos.x = prev.x;
            }
        }
        self.pos != prev
    }

    /// Scale the group from a handle drag of `delta` (scene units since the
    /// press), keeping the handle's pivot fixed.
    ///
    /// The new group scale makes the group as wide as the initial width plus
    /// the signed delta, floored at the minimum scale.
    pub fn scale(&mut self, delta: Vec2, corner: Corner) -> bool {
        let Some(initial) = self.gesture_pose("scale") else {
            return false;
        };
        let Some(local) = self.local_bounds() else {
            return false;
        };
        if local.width() <= 0.0 {
            return false;
        }
        self.phase = GesturePhase::Scaling(corner);

        let signed = corner.signed_delta(delta);
        let desired = (initial.scene_rect.width() + signed.x) / local.width();
        let desired = if desired > self.min_scale {
            desired
        } else {
            self.min_scale
        };

        let pivot = corner.pivot_on(local);
        let before = self.to_scene(pivot);
        self.scale = desired;
        let after = self.to_scene(pivot);
        self.pos += before - after;
        true
    }

    /// End the gesture and hand back the poses to persist.
    pub fn commit(&mut self) -> Vec<MemberPose> {
        self.phase = GesturePhase::Idle;
        self.initial = None;
        self.poses()
    }

    /// End the gesture without keeping its effect.
    pub fn abandon(&mut self) -> Vec<MemberPose> {
        if let Some(initial) = self.initial.take() {
            self.pos = initial.pos;
            self.scale = initial.scale;
        }
        self.phase = GesturePhase::Idle;
        self.poses()
    }

    fn gesture_pose(&self, op: &str) -> Option<InitialPose> {
        if self.phase == GesturePhase::Idle {
            log::debug!("{op} ignored: no gesture in progress");
            return None;
        }
        self.initial
    }
}
