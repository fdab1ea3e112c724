//! Viewport state and the center/fit/zoom math.
//!
//! `scroll` is the model coordinate shown at the canvas's top-left corner;
//! a model point `p` appears at pixel `(p - scroll) * zoom`.

use elk_core::geometry::{Bounds, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scroll: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Model coordinate under a canvas-relative pixel offset.
    pub fn to_model(&self, offset: Point) -> Point {
        Point::new(
            self.scroll.x + offset.x / self.zoom,
            self.scroll.y + offset.y / self.zoom,
        )
    }

    pub fn lerp(&self, to: &Viewport, t: f64) -> Viewport {
        Viewport {
            scroll: self.scroll.lerp(to.scroll, t),
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }

    /// Scroll by a pixel drag delta.
    pub fn dragged(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            scroll: Point::new(
                self.scroll.x - dx / self.zoom,
                self.scroll.y - dy / self.zoom,
            ),
            zoom: self.zoom,
        }
    }

    /// Change zoom keeping the model point under `offset` fixed.
    pub fn zoomed_at(&self, new_zoom: f64, offset: Point) -> Viewport {
        let factor = 1.0 / new_zoom - 1.0 / self.zoom;
        Viewport {
            scroll: Point::new(
                self.scroll.x - factor * offset.x,
                self.scroll.y - factor * offset.y,
            ),
            zoom: new_zoom,
        }
    }
}

/// Center `target` on a canvas of `canvas` pixel size at `zoom`.
pub fn center_on(target: &Bounds, canvas: &Bounds, zoom: f64) -> Viewport {
    let c = target.center();
    Viewport {
        scroll: Point::new(
            c.x - 0.5 * canvas.width / zoom,
            c.y - 0.5 * canvas.height / zoom,
        ),
        zoom,
    }
}

/// Viewport for a center request.
///
/// Zoom is kept when `retain_zoom` is set, otherwise it becomes
/// `zoom_override` or 1.
pub fn center_viewport(
    target: &Bounds,
    canvas: &Bounds,
    current: &Viewport,
    retain_zoom: bool,
    zoom_override: Option<f64>,
) -> Viewport {
    let zoom = if retain_zoom {
        current.zoom
    } else {
        zoom_override.unwrap_or(1.0)
    };
    center_on(target, canvas, zoom)
}

/// Zoom that fits `target` plus `padding` on every side into `canvas`.
///
/// Clamped to `max_zoom` when that is finite. A fit that is not a positive
/// finite number (empty target, unsized canvas) yields 1.
pub fn fit_zoom(target: &Bounds, canvas: &Bounds, padding: f64, max_zoom: f64) -> f64 {
    let zoom = (canvas.width / (target.width + 2.0 * padding))
        .min(canvas.height / (target.height + 2.0 * padding));
    if !zoom.is_finite() || zoom <= 0.0 {
        return 1.0;
    }
    if max_zoom.is_finite() {
        zoom.min(max_zoom)
    } else {
        zoom
    }
}

/// Viewport for a fit request.
pub fn fit_viewport(target: &Bounds, canvas: &Bounds, padding: f64, max_zoom: f64) -> Viewport {
    center_on(target, canvas, fit_zoom(target, canvas, padding, max_zoom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CANVAS: Bounds = Bounds::new(0.0, 0.0, 200.0, 100.0);

    #[test]
    fn fit_picks_limiting_axis() {
        let target = Bounds::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(fit_zoom(&target, &CANVAS, 0.0, f64::INFINITY), 2.0);
        assert_eq!(fit_zoom(&target, &CANVAS, 0.0, 1.5), 1.5);
        // padding shrinks the zoom
        assert_eq!(fit_zoom(&target, &CANVAS, 25.0, f64::INFINITY), 1.0);
    }

    #[test]
    fn fit_on_empty_target_is_one() {
        assert_eq!(fit_zoom(&Bounds::EMPTY, &CANVAS, 0.0, f64::INFINITY), 1.0);
        assert_eq!(fit_zoom(&Bounds::EMPTY, &Bounds::EMPTY, 0.0, 4.0), 1.0);
    }

    #[test]
    fn fit_into_unsized_canvas_is_one() {
        let target = Bounds::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(fit_zoom(&target, &Bounds::EMPTY, 0.0, f64::INFINITY), 1.0);

        // a later retained-zoom center stays finite
        let fitted = fit_viewport(&target, &Bounds::EMPTY, 0.0, f64::INFINITY);
        let centered = center_viewport(&target, &Bounds::EMPTY, &fitted, true, None);
        assert!(centered.scroll.x.is_finite() && centered.scroll.y.is_finite());
    }

    #[test]
    fn fit_centers_target() {
        let vp = fit_viewport(&Bounds::new(0.0, 0.0, 50.0, 50.0), &CANVAS, 0.0, f64::INFINITY);
        assert_eq!(vp.zoom, 2.0);
        // centroid (25,25) lands in the middle of the canvas
        assert_eq!(vp.scroll, Point::new(-25.0, 0.0));
    }

    #[test]
    fn center_keeps_zoom_when_asked() {
        let current = Viewport {
            scroll: Point::new(7.0, 7.0),
            zoom: 1.5,
        };
        let vp = center_viewport(&Bounds::EMPTY, &CANVAS, &current, true, None);
        assert_eq!(vp.zoom, 1.5);
        assert!(vp.scroll.x.is_finite() && vp.scroll.y.is_finite());
        assert_eq!(vp.scroll, Point::new(-100.0 / 1.5, -50.0 / 1.5));

        let reset = center_viewport(&Bounds::EMPTY, &CANVAS, &current, false, None);
        assert_eq!(reset.zoom, 1.0);
        let forced = center_viewport(&Bounds::EMPTY, &CANVAS, &current, false, Some(3.0));
        assert_eq!(forced.zoom, 3.0);
    }

    #[test]
    fn drag_scales_by_zoom() {
        let vp = Viewport {
            scroll: Point::new(10.0, 10.0),
            zoom: 2.0,
        };
        assert_eq!(vp.dragged(20.0, -4.0).scroll, Point::new(0.0, 12.0));
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let vp = Viewport {
            scroll: Point::new(10.0, 20.0),
            zoom: 1.0,
        };
        let offset = Point::new(40.0, 30.0);
        let before = vp.to_model(offset);
        let after = vp.zoomed_at(2.0, offset).to_model(offset);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }
}
