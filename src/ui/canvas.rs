// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the rotate and crop screens.
//!
//! The canvas shows the image scaled to fit and, on the crop screen, the crop
//! rectangle on top of it. Pointer positions are converted into y-up display
//! coordinates (origin at the canvas' bottom-left corner) before they reach
//! the crop rectangle.

use crate::models::crop::{CropRectangle, CropRegion, DragState, HandleId, Point};
use crate::util::geometry;

const OUTLINE_WIDTH: f32 = 2.0;
const CROSSHAIR_ARM: f32 = 20.0;

/// Convert a screen position into display coordinates of `canvas`.
pub fn to_display(canvas: egui::Rect, pos: egui::Pos2) -> Point {
    Point::new((pos.x - canvas.min.x) as f64, (canvas.max.y - pos.y) as f64)
}

/// Convert a display-space rectangle of `canvas` into a screen rectangle.
pub fn region_to_screen(canvas: egui::Rect, region: CropRegion) -> egui::Rect {
    egui::Rect::from_min_max(
        egui::pos2(
            canvas.min.x + region.x as f32,
            canvas.max.y - region.top() as f32,
        ),
        egui::pos2(
            canvas.min.x + region.right() as f32,
            canvas.max.y - region.y as f32,
        ),
    )
}

/// Allocate the whole available area and draw the image fitted inside it.
/// Returns the canvas rectangle and where the image sits in display
/// coordinates.
fn draw_image(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    image_size: (u32, u32),
) -> (egui::Rect, egui::Response, CropRegion) {
    let available = ui.available_size();
    let (canvas, response) = ui.allocate_exact_size(available, egui::Sense::drag());

    let display = geometry::centered_display_rect(
        image_size.0,
        image_size.1,
        canvas.width() as f64,
        canvas.height() as f64,
    );

    let painter = ui.painter_at(canvas);
    painter.rect_filled(canvas, 0.0, egui::Color32::from_gray(40));
    if let Some(texture) = texture {
        painter.image(
            texture.id(),
            region_to_screen(canvas, display),
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    (canvas, response, display)
}

/// Rotate screen: the image with a fixed "+" marker at the canvas centre.
pub fn show_rotation(ui: &mut egui::Ui, texture: Option<&egui::TextureHandle>, image_size: (u32, u32)) {
    let (canvas, _response, _display) = draw_image(ui, texture, image_size);

    let center = canvas.center();
    let stroke = egui::Stroke::new(OUTLINE_WIDTH, egui::Color32::WHITE);
    let painter = ui.painter_at(canvas);
    painter.line_segment(
        [
            center - egui::vec2(CROSSHAIR_ARM, 0.0),
            center + egui::vec2(CROSSHAIR_ARM, 0.0),
        ],
        stroke,
    );
    painter.line_segment(
        [
            center - egui::vec2(0.0, CROSSHAIR_ARM),
            center + egui::vec2(0.0, CROSSHAIR_ARM),
        ],
        stroke,
    );
}

/// Crop screen: the image, the crop rectangle and its pointer handling.
/// Returns where the image is displayed, in display coordinates.
///
/// `first_frame` pulls the rectangle inside the image when the screen opens.
pub fn show_crop(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    image_size: (u32, u32),
    crop: &mut CropRectangle,
    first_frame: bool,
) -> CropRegion {
    let (canvas, response, display) = draw_image(ui, texture, image_size);
    crop.set_bounds(Some(display));
    if first_frame {
        crop.fit_to_bounds();
    }

    let (pressed, down, released, pointer) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
            i.pointer.primary_released(),
            i.pointer.latest_pos(),
        )
    });

    if let Some(pos) = pointer {
        let point = to_display(canvas, pos);

        if pressed && response.hovered() {
            if crop.on_pointer_down(point) {
                log::debug!("Crop gesture started: {:?}", crop.drag_state());
            }
        } else if down && crop.drag_state() != DragState::Idle {
            if crop.on_pointer_move(point) {
                ui.ctx().request_repaint();
            }
        }

        if released && crop.drag_state() != DragState::Idle {
            crop.on_pointer_up(point);
            log::debug!("Crop region now {:?}", crop.region());
        }

        let hovered = match crop.drag_state() {
            DragState::Idle if response.hovered() => crop.hit_test(point),
            DragState::Idle => None,
            DragState::Moving => Some(HandleId::Move),
            DragState::Resizing(handle) => Some(handle),
        };
        if let Some(handle) = hovered {
            ui.ctx().set_cursor_icon(cursor_for(handle));
        }
    }

    draw_crop_overlay(ui, canvas, display, crop);
    display
}

fn cursor_for(handle: HandleId) -> egui::CursorIcon {
    match handle {
        HandleId::Move => egui::CursorIcon::Move,
        HandleId::Left | HandleId::Right => egui::CursorIcon::ResizeHorizontal,
        HandleId::Top | HandleId::Bottom => egui::CursorIcon::ResizeVertical,
        // y is flipped on screen, so bottom-left is the lower-left corner.
        HandleId::BottomLeft | HandleId::TopRight => egui::CursorIcon::ResizeNeSw,
        HandleId::TopLeft | HandleId::BottomRight => egui::CursorIcon::ResizeNwSe,
    }
}

/// Dim the image outside the selection, then draw the outline and handles.
fn draw_crop_overlay(ui: &egui::Ui, canvas: egui::Rect, display: CropRegion, crop: &CropRectangle) {
    let image_rect = region_to_screen(canvas, display);
    let selection = region_to_screen(canvas, crop.region());
    let shade = egui::Color32::from_black_alpha(128);

    let painter = ui.painter_at(image_rect);
    let shaded = [
        egui::Rect::from_min_max(image_rect.min, egui::pos2(image_rect.max.x, selection.min.y)),
        egui::Rect::from_min_max(egui::pos2(image_rect.min.x, selection.max.y), image_rect.max),
        egui::Rect::from_min_max(
            egui::pos2(image_rect.min.x, selection.min.y),
            egui::pos2(selection.min.x, selection.max.y),
        ),
        egui::Rect::from_min_max(
            egui::pos2(selection.max.x, selection.min.y),
            egui::pos2(image_rect.max.x, selection.max.y),
        ),
    ];
    for rect in shaded {
        if rect.is_positive() {
            painter.rect_filled(rect, 0.0, shade);
        }
    }

    let painter = ui.painter_at(canvas);
    painter.rect_stroke(
        selection,
        0.0,
        egui::Stroke::new(OUTLINE_WIDTH, egui::Color32::WHITE),
    );

    let active = match crop.drag_state() {
        DragState::Resizing(handle) => Some(handle),
        _ => None,
    };
    for handle in crop.handles().iter().filter(|h| h.id != HandleId::Move) {
        let alpha = if Some(handle.id) == active { 160 } else { 50 };
        painter.rect_filled(
            region_to_screen(canvas, handle.bounds),
            0.0,
            egui::Color32::from_white_alpha(alpha),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(10.0, 50.0), egui::vec2(400.0, 300.0))
    }

    #[test]
    fn test_screen_to_display_flips_y() {
        // Bottom-left corner of the canvas is the display origin.
        assert_eq!(to_display(canvas(), egui::pos2(10.0, 350.0)), Point::new(0.0, 0.0));
        assert_eq!(to_display(canvas(), egui::pos2(110.0, 50.0)), Point::new(100.0, 300.0));
    }

    #[test]
    fn test_region_to_screen() {
        let rect = region_to_screen(canvas(), CropRegion::new(100.0, 100.0, 50.0, 20.0));
        assert_eq!(rect.min, egui::pos2(110.0, 230.0));
        assert_eq!(rect.max, egui::pos2(160.0, 250.0));
    }

    #[test]
    fn test_cursor_for_handles() {
        assert_eq!(cursor_for(HandleId::Move), egui::CursorIcon::Move);
        assert_eq!(cursor_for(HandleId::Left), egui::CursorIcon::ResizeHorizontal);
        assert_eq!(cursor_for(HandleId::Top), egui::CursorIcon::ResizeVertical);
        assert_eq!(cursor_for(HandleId::TopRight), egui::CursorIcon::ResizeNeSw);
    }
}
