//! Display-list backend. Records every draw call with the transform in
//! effect, so paint output can be inspected without a GPU.

use crate::context::{DrawContext, FontSpec, RasterImage, StateStack};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;

/// One recorded draw call. Colors already carry the global alpha.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear(Color),
    FillPath {
        path: BezPath,
        color: Color,
        transform: Affine,
    },
    StrokePath {
        path: BezPath,
        stroke: Stroke,
        color: Color,
        transform: Affine,
    },
    FillText {
        text: String,
        origin: Point,
        font: FontSpec,
        color: Color,
        transform: Affine,
    },
    DrawImage {
        width: u32,
        height: u32,
        dest: Rect,
        alpha: f64,
        transform: Affine,
    },
}

impl DrawCommand {
    pub fn transform(&self) -> Affine {
        match self {
            DrawCommand::Clear(_) => Affine::IDENTITY,
            DrawCommand::FillPath { transform, .. }
            | DrawCommand::StrokePath { transform, .. }
            | DrawCommand::FillText { transform, .. }
            | DrawCommand::DrawImage { transform, .. } => *transform,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    state: StateStack,
    commands: Vec<DrawCommand>,
    size: (u32, u32),
    reallocations: usize,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of times the backing buffer was resized.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Every string passed to `fill_text`, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Unsaved states left on the stack.
    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform(affine);
    }

    fn set_transform(&mut self, affine: Affine) {
        self.state.set_transform(affine);
    }

    fn current_transform(&self) -> Affine {
        self.state.current().transform
    }

    fn clear(&mut self, color: Color) {
        // A clear starts a new frame.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize_backing(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.reallocations += 1;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.set_alpha(alpha);
    }

    fn global_alpha(&self) -> f64 {
        self.state.current().alpha
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color: self.state.apply_alpha(color),
            transform: self.current_transform(),
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
            color: self.state.apply_alpha(color),
            transform: self.current_transform(),
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            origin,
            font: font.clone(),
            color: self.state.apply_alpha(color),
            transform: self.current_transform(),
        });
    }

    fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        self.commands.push(DrawCommand::DrawImage {
            width: image.width,
            height: image.height,
            dest,
            alpha: self.global_alpha(),
            transform: self.current_transform(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn test_records_transform_per_command() {
        let mut ctx = RecordingContext::new(100, 100);
        let path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
        ctx.save();
        ctx.translate(kurbo::Vec2::new(5.0, 5.0));
        ctx.fill_path(&path, Color::BLACK);
        ctx.restore();
        ctx.fill_path(&path, Color::BLACK);

        let cmds = ctx.commands();
        assert_eq!(cmds[0].transform(), Affine::translate((5.0, 5.0)));
        assert_eq!(cmds[1].transform(), Affine::IDENTITY);
        assert_eq!(ctx.save_depth(), 0);
    }

    #[test]
    fn test_clear_starts_new_frame() {
        let mut ctx = RecordingContext::new(10, 10);
        ctx.fill_text("a", Point::ZERO, &FontSpec::new("sans-serif", 12.0), Color::BLACK);
        ctx.clear(Color::WHITE);
        assert_eq!(ctx.commands().len(), 1);
        assert!(ctx.texts().is_empty());
    }

    #[test]
    fn test_resize_counts_reallocations() {
        let mut ctx = RecordingContext::new(10, 10);
        ctx.resize_backing(20, 20);
        assert_eq!(ctx.backing_size(), (20, 20));
        assert_eq!(ctx.reallocations(), 1);
    }
}
