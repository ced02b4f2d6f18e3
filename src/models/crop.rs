// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Crop rectangle data structures and gesture handling.
//!
//! This module defines the draggable, resizable crop rectangle that is drawn
//! over the displayed image. Coordinates are display coordinates with the
//! y axis pointing up: the "bottom" edge sits at `y` and the "top" edge at
//! `y + height`.

use serde::{Deserialize, Serialize};

/// A 2D point in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its minimum corner and its size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x
            && point.x <= self.x + self.width
            && self.y <= point.y
            && point.y <= self.y + self.height
    }
}

/// Named hit-regions of the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleId {
    Move,
    Left,
    Right,
    Bottom,
    Top,
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl HandleId {
    /// Hit-test order. Overlapping regions resolve to the earlier entry.
    pub const ALL: [HandleId; 9] = [
        HandleId::Move,
        HandleId::Left,
        HandleId::Right,
        HandleId::Bottom,
        HandleId::Top,
        HandleId::BottomLeft,
        HandleId::BottomRight,
        HandleId::TopLeft,
        HandleId::TopRight,
    ];

    fn moves_left_edge(self) -> bool {
        matches!(self, HandleId::Left | HandleId::BottomLeft | HandleId::TopLeft)
    }

    fn moves_right_edge(self) -> bool {
        matches!(self, HandleId::Right | HandleId::BottomRight | HandleId::TopRight)
    }

    fn moves_bottom_edge(self) -> bool {
        matches!(
            self,
            HandleId::Bottom | HandleId::BottomLeft | HandleId::BottomRight
        )
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, HandleId::Top | HandleId::TopLeft | HandleId::TopRight)
    }
}

/// A handle and the display-space area it reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub id: HandleId,
    pub bounds: CropRegion,
}

/// What the current pointer gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Moving,
    Resizing(HandleId),
}

/// Draggable and resizable crop selection.
#[derive(Debug, Clone)]
pub struct CropRectangle {
    region: CropRegion,
    drag_state: DragState,
    last_pointer: Point,
    handle_thickness: f64,
    /// Area the rectangle is kept inside after every gesture update.
    bounds: Option<CropRegion>,
}

impl CropRectangle {
    /// Create a crop rectangle with the given initial region.
    pub fn new(region: CropRegion, handle_thickness: f64) -> Self {
        Self {
            region: CropRegion {
                width: region.width.max(0.0),
                height: region.height.max(0.0),
                ..region
            },
            drag_state: DragState::Idle,
            last_pointer: Point::default(),
            handle_thickness,
            bounds: None,
        }
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    #[cfg(test)]
    pub fn last_pointer_position(&self) -> Point {
        self.last_pointer
    }

    /// Set the area the rectangle must stay inside. Takes effect on the next
    /// gesture update.
    pub fn set_bounds(&mut self, bounds: Option<CropRegion>) {
        self.bounds = bounds.map(|b| CropRegion {
            width: b.width.max(0.0),
            height: b.height.max(0.0),
            ..b
        });
    }

    /// Move the rectangle inside the current bounds right away.
    pub fn fit_to_bounds(&mut self) {
        if let Some(bounds) = self.bounds {
            let width = self.region.width.min(bounds.width.max(0.0));
            let height = self.region.height.min(bounds.height.max(0.0));
            self.region = CropRegion {
                x: self.region.x.clamp(bounds.x, (bounds.right() - width).max(bounds.x)),
                y: self.region.y.clamp(bounds.y, (bounds.top() - height).max(bounds.y)),
                width,
                height,
            };
        }
    }

    /// All nine hit-regions, in hit-test order.
    pub fn handles(&self) -> [Handle; 9] {
        let CropRegion {
            x,
            y,
            width: w,
            height: h,
        } = self.region;
        let hs = self.handle_thickness;

        HandleId::ALL.map(|id| {
            let bounds = match id {
                HandleId::Move => CropRegion::new(x, y, w, h),
                HandleId::Left => CropRegion::new(x - hs, y, hs, h),
                HandleId::Right => CropRegion::new(x + w, y, hs, h),
                HandleId::Bottom => CropRegion::new(x, y - hs, w, hs),
                HandleId::Top => CropRegion::new(x, y + h, w, hs),
                HandleId::BottomLeft => CropRegion::new(x - hs, y - hs, hs, hs),
                HandleId::BottomRight => CropRegion::new(x + w, y - hs, hs, hs),
                HandleId::TopLeft => CropRegion::new(x - hs, y + h, hs, hs),
                HandleId::TopRight => CropRegion::new(x + w, y + h, hs, hs),
            };
            Handle { id, bounds }
        })
    }

    /// Return the first handle whose area contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<HandleId> {
        self.handles()
            .iter()
            .find(|handle| handle.bounds.contains(point))
            .map(|handle| handle.id)
    }

    /// Start a gesture. Returns `true` if the press landed on the rectangle
    /// or one of its handles.
    pub fn on_pointer_down(&mut self, point: Point) -> bool {
        match self.hit_test(point) {
            Some(id) => {
                self.drag_state = match id {
                    HandleId::Move => DragState::Moving,
                    handle => DragState::Resizing(handle),
                };
                self.last_pointer = point;
                true
            }
            None => false,
        }
    }

    /// Continue a gesture. Returns `true` if the rectangle changed and the
    /// outline needs to be redrawn.
    pub fn on_pointer_move(&mut self, point: Point) -> bool {
        let dx = point.x - self.last_pointer.x;
        let dy = point.y - self.last_pointer.y;
        self.last_pointer = point;

        let before = self.region;
        match self.drag_state {
            DragState::Idle => return false,
            DragState::Moving => {
                self.region.x += dx;
                self.region.y += dy;
                self.clamp_move();
            }
            DragState::Resizing(handle) => self.resize(handle, dx, dy),
        }

        self.region != before
    }

    /// Finish the current gesture.
    pub fn on_pointer_up(&mut self, _point: Point) {
        self.drag_state = DragState::Idle;
    }

    fn resize(&mut self, handle: HandleId, dx: f64, dy: f64) {
        let mut left = self.region.x;
        let mut right = self.region.right();
        let mut bottom = self.region.y;
        let mut top = self.region.top();

        if handle.moves_left_edge() {
            left = (left + dx).min(right);
        }
        if handle.moves_right_edge() {
            right = (right + dx).max(left);
        }
        if handle.moves_bottom_edge() {
            bottom = (bottom + dy).min(top);
        }
        if handle.moves_top_edge() {
            top = (top + dy).max(bottom);
        }

        if let Some(bounds) = self.bounds {
            left = left.clamp(bounds.x, bounds.right()).min(right.max(bounds.x));
            right = right.clamp(bounds.x, bounds.right()).max(left);
            bottom = bottom.clamp(bounds.y, bounds.top()).min(top.max(bounds.y));
            top = top.clamp(bounds.y, bounds.top()).max(bottom);
        }

        self.region = CropRegion::new(left, bottom, right - left, top - bottom);
    }

    fn clamp_move(&mut self) {
        if let Some(bounds) = self.bounds {
            // A rectangle larger than its bounds pins to the lower-left corner.
            let max_x = (bounds.right() - self.region.width).max(bounds.x);
            let max_y = (bounds.top() - self.region.height).max(bounds.y);
            self.region.x = self.region.x.clamp(bounds.x, max_x);
            self.region.y = self.region.y.clamp(bounds.y, max_y);
        }
    }
}
