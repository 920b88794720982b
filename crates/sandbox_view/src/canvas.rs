//! Software canvas the sandbox renders each frame into

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::camera::Camera;
use crate::rect::Rect;

/// Grid drawing parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStyle {
    /// Spacing between lines in world units
    pub cell: f32,
    /// Grid is skipped when a cell would be smaller than this on screen
    pub min_screen_cell: f32,
    /// Line color, alpha-blended
    pub color: [u8; 4],
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            cell: 100.0,
            min_screen_cell: 20.0,
            color: [255, 255, 255, 40],
        }
    }
}

/// RGBA frame buffer with the few primitives the sandbox needs
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixels
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the pixels, leaving an empty canvas of the same size
    pub fn take_image(&mut self) -> RgbaImage {
        let (w, h) = self.image.dimensions();
        std::mem::replace(&mut self.image, RgbaImage::new(w, h))
    }

    /// Fill with an opaque color
    pub fn clear(&mut self, rgb: [u8; 3]) {
        let pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        for p in self.image.pixels_mut() {
            *p = pixel;
        }
    }

    /// Draw the world-aligned reference grid as seen through `camera`
    pub fn draw_grid(&mut self, camera: &Camera, style: &GridStyle) -> bool {
        let screen_cell = style.cell * camera.zoom();
        if style.cell <= 0.0 || screen_cell < style.min_screen_cell {
            return false;
        }

        let visible = camera.visible_world_rect();
        let (min, max) = (visible.min(), visible.max());

        let mut x = (min.x / style.cell).floor() * style.cell;
        while x <= max.x {
            let sx = camera.world_to_screen(Vec2::new(x, 0.0)).x.round() as i64;
            self.vertical_line(sx, style.color);
            x += style.cell;
        }

        let mut y = (min.y / style.cell).floor() * style.cell;
        while y <= max.y {
            let sy = camera.world_to_screen(Vec2::new(0.0, y)).y.round() as i64;
            self.horizontal_line(sy, style.color);
            y += style.cell;
        }
        true
    }

    fn vertical_line(&mut self, x: i64, color: [u8; 4]) {
        if x < 0 || x >= self.width() as i64 {
            return;
        }
        for y in 0..self.height() {
            self.blend(x as u32, y, color);
        }
    }

    fn horizontal_line(&mut self, y: i64, color: [u8; 4]) {
        if y < 0 || y >= self.height() as i64 {
            return;
        }
        for x in 0..self.width() {
            self.blend(x, y as u32, color);
        }
    }

    /// Draw a one-pixel line between two view points, clipped to the canvas.
    ///
    /// Returns `false` when the line misses the canvas.
    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: [u8; 4]) -> bool {
        let max = Vec2::new(self.width() as f32 - 1.0, self.height() as f32 - 1.0);
        let Some((a, b)) = clip_line(a, b, Vec2::ZERO, max) else {
            return false;
        };

        let steps = (b - a).abs().max_element().ceil().max(1.0) as u32;
        let step = (b - a) / steps as f32;
        for i in 0..=steps {
            let p = (a + step * i as f32).round();
            self.blend(p.x as u32, p.y as u32, color);
        }
        true
    }

    /// Draw a line between two world points as seen through `camera`
    pub fn draw_world_line(&mut self, camera: &Camera, a: Vec2, b: Vec2, color: [u8; 4]) -> bool {
        self.draw_line(camera.world_to_screen(a), camera.world_to_screen(b), color)
    }

    /// Draw `sprite` stretched onto `target` (screen space, unrotated size)
    /// and rotated by `angle` radians about the target center.
    ///
    /// Returns `false` when nothing was drawn (degenerate size or off-screen).
    pub fn blit_sprite(&mut self, sprite: &RgbaImage, target: Rect, angle: f32) -> bool {
        let (src_w, src_h) = sprite.dimensions();
        if src_w == 0 || src_h == 0 || target.width() < 1.0 || target.height() < 1.0 {
            return false;
        }

        let bounds = target.rotated_bounds(angle);
        let canvas = Rect::from_min_max(
            Vec2::ZERO,
            Vec2::new(self.width() as f32, self.height() as f32),
        );
        if !bounds.intersects(&canvas) {
            return false;
        }

        let scale = Vec2::new(src_w as f32, src_h as f32) / target.size;
        let (sin, cos) = (-angle).sin_cos();
        let half_src = Vec2::new(src_w as f32, src_h as f32) * 0.5;

        let x0 = bounds.min().x.floor().max(0.0) as u32;
        let y0 = bounds.min().y.floor().max(0.0) as u32;
        let x1 = (bounds.max().x.ceil().min(self.width() as f32)) as u32;
        let y1 = (bounds.max().y.ceil().min(self.height() as f32)) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - target.center;
                let local = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
                let src = local * scale + half_src;
                if src.x < 0.0 || src.y < 0.0 {
                    continue;
                }
                let (sx, sy) = (src.x as u32, src.y as u32);
                if sx >= src_w || sy >= src_h {
                    continue;
                }
                let texel = sprite.get_pixel(sx, sy).0;
                self.blend(x, y, texel);
            }
        }
        true
    }

    /// Source-over blend of one pixel
    fn blend(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        if alpha == 255 {
            *dst = Rgba(color);
            return;
        }
        let inv = 255 - alpha;
        for c in 0..3 {
            dst.0[c] = ((color[c] as u32 * alpha + dst.0[c] as u32 * inv) / 255) as u8;
        }
        dst.0[3] = (alpha + dst.0[3] as u32 * inv / 255).min(255) as u8;
    }
}

/// Liang-Barsky clip of the segment `a`-`b` to the box `min`..`max`
fn clip_line(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    if !a.is_finite() || !b.is_finite() || max.x < min.x || max.y < min.y {
        return None;
    }
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-d.x, a.x - min.x),
        (d.x, max.x - a.x),
        (-d.y, a.y - min.y),
        (d.y, max.y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;

    fn red_square(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([255, 0, 0, 255]))
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = Canvas::new(8, 4);
        canvas.clear([30, 30, 40]);
        assert!(canvas.image().pixels().all(|p| p.0 == [30, 30, 40, 255]));
    }

    #[test]
    fn sprite_is_scaled_onto_target() {
        let mut canvas = Canvas::new(100, 100);
        canvas.clear([0, 0, 0]);
        let target = Rect::from_center_size(Vec2::new(50.0, 50.0), Vec2::splat(20.0));
        assert!(canvas.blit_sprite(&red_square(5), target, 0.0));

        assert_eq!(canvas.image().get_pixel(50, 50).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(41, 41).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(38, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn quarter_turn_stands_a_bar_upright() {
        let mut canvas = Canvas::new(100, 100);
        canvas.clear([0, 0, 0]);
        let target = Rect::from_center_size(Vec2::new(50.0, 50.0), Vec2::new(40.0, 4.0));
        canvas.blit_sprite(&red_square(4), target, std::f32::consts::FRAC_PI_2);

        // A wide thin bar turned a quarter becomes a tall thin bar.
        assert_eq!(canvas.image().get_pixel(50, 35).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(35, 50).0, [0, 0, 0, 255]);
    }

    #[test]
    fn off_screen_sprite_draws_nothing() {
        let mut canvas = Canvas::new(10, 10);
        let target = Rect::from_center_size(Vec2::new(-100.0, -100.0), Vec2::splat(5.0));
        assert!(!canvas.blit_sprite(&red_square(2), target, 0.0));
    }

    #[test]
    fn line_is_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(20, 10);
        canvas.clear([0, 0, 0]);
        assert!(canvas.draw_line(Vec2::new(-50.0, 5.0), Vec2::new(50.0, 5.0), [0, 255, 0, 255]));

        for x in 0..20 {
            assert_eq!(canvas.image().get_pixel(x, 5).0, [0, 255, 0, 255]);
        }
        assert_eq!(canvas.image().get_pixel(3, 4).0, [0, 0, 0, 255]);
        assert!(!canvas.draw_line(Vec2::new(-5.0, -5.0), Vec2::new(-1.0, 30.0), [0, 255, 0, 255]));
    }

    #[test]
    fn diagonal_line_has_no_gaps() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear([0, 0, 0]);
        canvas.draw_line(Vec2::ZERO, Vec2::new(9.0, 9.0), [255, 255, 255, 255]);
        for i in 0..10 {
            assert_eq!(canvas.image().get_pixel(i, i).0, [255, 255, 255, 255]);
        }
    }

    #[test]
    fn world_line_follows_the_camera() {
        let mut canvas = Canvas::new(1000, 600);
        canvas.clear([0, 0, 0]);
        let mut camera = Camera::default();
        camera.set_zoom(2.0);
        // World x = 300 lands on view x = 100 at zoom 2 about the center.
        canvas.draw_world_line(&camera, Vec2::new(300.0, 250.0), Vec2::new(300.0, 350.0), [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(100, 300).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(300, 300).0, [0, 0, 0, 255]);
    }

    #[test]
    fn grid_is_skipped_when_cells_are_tiny() {
        let mut canvas = Canvas::new(1000, 600);
        let mut camera = Camera::new(CameraConfig::default().with_zoom_range(0.1, 3.0));
        camera.set_zoom(0.2);
        assert!(canvas.draw_grid(&camera, &GridStyle::default()));
        camera.set_zoom(0.15);
        assert!(!canvas.draw_grid(&camera, &GridStyle::default()));
    }

    #[test]
    fn grid_lines_are_translucent() {
        let mut canvas = Canvas::new(300, 300);
        canvas.clear([0, 0, 0]);
        canvas.draw_grid(&Camera::default(), &GridStyle::default());
        let line = canvas.image().get_pixel(100, 50).0;
        assert!(line[0] > 0 && line[0] < 255);
        assert_eq!(canvas.image().get_pixel(150, 50).0, [0, 0, 0, 255]);
    }
}
