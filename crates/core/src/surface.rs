//! The drawing surface graphs render onto.
//!
//! [`Surface`] is the seam between the plotting core and a concrete
//! backend: an RGBA raster, a browser canvas, or the in-memory [`Recorder`]
//! used by tests and headless consumers. It follows the 2D-canvas model:
//! a current affine frame with a save/restore stack, stroked poly-lines,
//! centered text, and whole-surface snapshots.

use glam::{DAffine2, DVec2};

use crate::color::Srgb;
use crate::config::{Font, Stroke};

/// A 2D drawing target.
pub trait Surface {
    /// A captured copy of the surface's pixels.
    type Snapshot: Clone;

    /// Width in device pixels.
    fn width(&self) -> f64;

    /// Height in device pixels.
    fn height(&self) -> f64;

    /// Pushes the current frame onto the frame stack.
    fn save(&mut self);

    /// Pops the frame stack; a no-op on an empty stack.
    fn restore(&mut self);

    /// Moves the frame origin by `offset` (in current frame units).
    fn translate(&mut self, offset: DVec2);

    /// Rotates the frame by `radians`.
    fn rotate(&mut self, radians: f64);

    /// Scales the frame axes by `factor`.
    fn scale(&mut self, factor: DVec2);

    /// Strokes an open poly-line given in current frame coordinates.
    fn stroke(&mut self, path: &[DVec2], stroke: &Stroke);

    /// Draws `text` centered horizontally and vertically on the frame origin.
    fn fill_text(&mut self, text: &str, font: &Font, color: Srgb);

    /// Copies the current pixels.
    fn capture(&self) -> Self::Snapshot;

    /// Replaces the current pixels with a previous capture.
    fn put(&mut self, snapshot: &Self::Snapshot);
}

/// A tracked frame stack shared by backends that transform points themselves.
#[derive(Debug, Clone)]
pub struct FrameStack {
    current: DAffine2,
    saved: Vec<DAffine2>,
}

impl Default for FrameStack {
    fn default() -> Self {
        Self {
            current: DAffine2::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl FrameStack {
    pub fn current(&self) -> DAffine2 {
        self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        if let Some(frame) = self.saved.pop() {
            self.current = frame;
        }
    }

    pub fn translate(&mut self, offset: DVec2) {
        self.current = self.current * DAffine2::from_translation(offset);
    }

    pub fn rotate(&mut self, radians: f64) {
        self.current = self.current * DAffine2::from_angle(radians);
    }

    pub fn scale(&mut self, factor: DVec2) {
        self.current = self.current * DAffine2::from_scale(factor);
    }

    /// Maps a frame-local point to device coordinates.
    pub fn apply(&self, point: DVec2) -> DVec2 {
        self.current.transform_point2(point)
    }

    /// Maps a frame-local direction to device coordinates.
    pub fn apply_vector(&self, vector: DVec2) -> DVec2 {
        self.current.transform_vector2(vector)
    }
}

/// One recorded drawing operation, in device coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stroke {
        points: Vec<DVec2>,
        stroke: Stroke,
    },
    Text {
        text: String,
        origin: DVec2,
        /// Device-space direction of the text baseline.
        baseline: DVec2,
        font: Font,
        color: Srgb,
    },
}

/// A surface that keeps a log of drawing commands instead of pixels.
///
/// Snapshots are copies of the log, so `put` behaves like a raster restore:
/// everything drawn after the capture disappears.
#[derive(Debug, Clone)]
pub struct Recorder {
    width: f64,
    height: f64,
    frames: FrameStack,
    commands: Vec<Command>,
}

impl Recorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            frames: FrameStack::default(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Every stroked poly-line with its style.
    pub fn strokes(&self) -> impl Iterator<Item = (&[DVec2], &Stroke)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::Stroke { points, stroke } => Some((points.as_slice(), stroke)),
            Command::Text { .. } => None,
        })
    }

    /// Every drawn string.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            Command::Text { text, .. } => Some(text.as_str()),
            Command::Stroke { .. } => None,
        })
    }

    /// Strokes drawn in the given color.
    pub fn strokes_in(&self, color: Srgb) -> usize {
        self.strokes().filter(|(_, s)| s.color == color).count()
    }
}

impl Surface for Recorder {
    type Snapshot = Vec<Command>;

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn save(&mut self) {
        self.frames.save();
    }

    fn restore(&mut self) {
        self.frames.restore();
    }

    fn translate(&mut self, offset: DVec2) {
        self.frames.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.frames.rotate(radians);
    }

    fn scale(&mut self, factor: DVec2) {
        self.frames.scale(factor);
    }

    fn stroke(&mut self, path: &[DVec2], stroke: &Stroke) {
        let points = path.iter().map(|&p| self.frames.apply(p)).collect();
        self.commands.push(Command::Stroke {
            points,
            stroke: *stroke,
        });
    }

    fn fill_text(&mut self, text: &str, font: &Font, color: Srgb) {
        self.commands.push(Command::Text {
            text: text.to_owned(),
            origin: self.frames.apply(DVec2::ZERO),
            baseline: self.frames.apply_vector(DVec2::X),
            font: font.clone(),
            color,
        });
    }

    fn capture(&self) -> Self::Snapshot {
        self.commands.clone()
    }

    fn put(&mut self, snapshot: &Self::Snapshot) {
        self.commands.clone_from(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn stroke_records_device_coordinates() {
        let mut r = Recorder::new(100.0, 80.0);
        r.translate(DVec2::new(0.0, 80.0));
        r.scale(DVec2::new(1.0, -1.0));
        r.stroke(&[DVec2::new(10.0, 10.0)], &Stroke::new(Srgb::WHITE, 1.0));
        let (points, _) = r.strokes().next().unwrap();
        assert!(close(points[0], DVec2::new(10.0, 70.0)));
    }

    #[test]
    fn save_restore_undoes_transforms() {
        let mut r = Recorder::new(100.0, 100.0);
        r.save();
        r.translate(DVec2::new(5.0, 5.0));
        r.rotate(FRAC_PI_2);
        r.restore();
        r.stroke(&[DVec2::new(1.0, 0.0)], &Stroke::new(Srgb::WHITE, 1.0));
        let (points, _) = r.strokes().next().unwrap();
        assert!(close(points[0], DVec2::new(1.0, 0.0)));
    }

    #[test]
    fn rotation_turns_x_into_y() {
        let mut r = Recorder::new(100.0, 100.0);
        r.translate(DVec2::new(10.0, 10.0));
        r.rotate(FRAC_PI_2);
        r.stroke(&[DVec2::new(2.0, 0.0)], &Stroke::new(Srgb::WHITE, 1.0));
        let (points, _) = r.strokes().next().unwrap();
        assert!(close(points[0], DVec2::new(10.0, 12.0)));
    }

    #[test]
    fn restore_on_empty_stack_is_noop() {
        let mut r = Recorder::new(10.0, 10.0);
        r.translate(DVec2::new(3.0, 0.0));
        r.restore();
        r.fill_text("a", &Font::new(10.0, "mono"), Srgb::WHITE);
        match &r.commands()[0] {
            Command::Text { origin, .. } => assert!(close(*origin, DVec2::new(3.0, 0.0))),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn put_discards_later_commands() {
        let mut r = Recorder::new(10.0, 10.0);
        let stroke = Stroke::new(Srgb::WHITE, 1.0);
        r.stroke(&[DVec2::ZERO, DVec2::ONE], &stroke);
        let snapshot = r.capture();
        r.stroke(&[DVec2::ONE, DVec2::ZERO], &stroke);
        assert_eq!(r.commands().len(), 2);
        r.put(&snapshot);
        assert_eq!(r.commands().len(), 1);
    }

    #[test]
    fn strokes_in_counts_by_color() {
        let mut r = Recorder::new(10.0, 10.0);
        r.stroke(&[DVec2::ZERO], &Stroke::new(Srgb::RED, 1.0));
        r.stroke(&[DVec2::ZERO], &Stroke::new(Srgb::WHITE, 1.0));
        r.stroke(&[DVec2::ZERO], &Stroke::new(Srgb::RED, 2.0));
        assert_eq!(r.strokes_in(Srgb::RED), 2);
        assert_eq!(r.texts().count(), 0);
    }
}
