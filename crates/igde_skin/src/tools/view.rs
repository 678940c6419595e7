//! Mapping between view pixels and constructed image pixels.

use igde_math::{Point, Point3, TexMatrix2, Vec2};

use crate::config::SkinEditorConfig;

/// Zoom and placement of the constructed image inside the view panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasView {
    /// Zoom in percent
    zoom: i32,
    /// View position of the image's top-left corner
    origin: Point,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self::new(100)
    }
}

impl CanvasView {
    pub fn new(zoom: i32) -> Self {
        Self {
            zoom: zoom.clamp(SkinEditorConfig::MIN_ZOOM, SkinEditorConfig::MAX_ZOOM),
            origin: Point::ZERO,
        }
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Set the zoom, clamped to the supported range. Returns `true` if it changed.
    pub fn set_zoom(&mut self, zoom: i32) -> bool {
        let zoom = zoom.clamp(SkinEditorConfig::MIN_ZOOM, SkinEditorConfig::MAX_ZOOM);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Zoom as a scale factor
    pub fn scale(&self) -> f32 {
        self.zoom as f32 * 0.01
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Center an image of `content_size` in a panel, shifted by the user's pan.
    pub fn center_in(&mut self, panel_size: Point, content_size: Point3, pan: Point) {
        let scale = self.scale();
        let scaled = Point::new(
            (content_size.x as f32 * scale) as i32,
            (content_size.y as f32 * scale) as i32,
        );
        self.origin = (panel_size - scaled) / 2 + pan;
    }

    /// Maps image pixels to view pixels.
    pub fn transform(&self) -> TexMatrix2 {
        let scale = self.scale();
        TexMatrix2::scale(scale, scale) * TexMatrix2::translation(self.origin.to_vec2())
    }

    pub fn to_canvas(&self, position: Vec2) -> Vec2 {
        (position - self.origin.to_vec2()) / self.scale()
    }

    pub fn to_view(&self, position: Vec2) -> Vec2 {
        position * self.scale() + self.origin.to_vec2()
    }

    /// Convert a view pixel distance to image pixels.
    pub fn to_canvas_distance(&self, distance: Vec2) -> Vec2 {
        distance / self.scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = CanvasView::new(5000);
        assert_eq!(view.zoom(), SkinEditorConfig::MAX_ZOOM);
        assert!(view.set_zoom(10));
        assert_eq!(view.zoom(), SkinEditorConfig::MIN_ZOOM);
        assert!(!view.set_zoom(25));
    }

    #[test]
    fn test_center_in_panel() {
        let mut view = CanvasView::new(200);
        view.center_in(Point::new(600, 400), Point3::new(100, 50, 1), Point::new(10, -5));
        assert_eq!(view.origin(), Point::new(210, 145));
    }

    #[test]
    fn test_conversions_match_transform() {
        let mut view = CanvasView::new(150);
        view.set_origin(Point::new(20, 30));
        let canvas = Vec2::new(10.0, 4.0);
        let on_view = view.to_view(canvas);
        assert_relative_eq!(on_view.x, 35.0);
        assert_relative_eq!(on_view.y, 36.0);

        let via_matrix = view.transform() * canvas;
        assert_relative_eq!(via_matrix.x, on_view.x);
        assert_relative_eq!(via_matrix.y, on_view.y);

        let back = view.to_canvas(on_view);
        assert_relative_eq!(back.x, canvas.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, canvas.y, epsilon = 1e-4);
    }
}
