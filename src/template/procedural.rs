//! Contour templates drawn in memory.
//!
//! Each template is a blank cell with line segments joining the midpoints of
//! the edges whose two corners disagree. Saddle codes 5 and 10 get two
//! segments, each cutting off one of the set corners.

use crate::grid::CONTOUR_CONFIG_COUNT;
use crate::image::{PixelBuffer, Rgb};
use crate::template::TemplateSource;
use crate::util::{IsolineError, IsolineResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Segments drawn for each configuration code (tl=8, tr=4, br=2, bl=1).
fn segments(code: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match code {
        1 | 14 => &[(Left, Bottom)],
        2 | 13 => &[(Bottom, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Top, Right)],
        5 => &[(Top, Right), (Bottom, Left)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Top)],
        10 => &[(Left, Top), (Right, Bottom)],
        _ => &[],
    }
}

/// Built-in template source for any cell size.
#[derive(Clone, Copy, Debug)]
pub struct ProceduralTemplates {
    step: usize,
    background: Rgb,
    line: Rgb,
}

impl ProceduralTemplates {
    /// Black lines on a white background.
    pub fn new(step: usize) -> Self {
        Self {
            step,
            background: Rgb::WHITE,
            line: Rgb::BLACK,
        }
    }

    pub fn with_colors(mut self, background: Rgb, line: Rgb) -> Self {
        self.background = background;
        self.line = line;
        self
    }

    fn midpoint(&self, edge: Edge) -> (f32, f32) {
        let far = (self.step - 1) as f32;
        let mid = far * 0.5;
        match edge {
            Edge::Top => (mid, 0.0),
            Edge::Right => (far, mid),
            Edge::Bottom => (mid, far),
            Edge::Left => (0.0, mid),
        }
    }

    fn draw(&self, img: &mut PixelBuffer, from: (f32, f32), to: (f32, f32)) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).round().max(1.0) as usize;
        let width = img.width();
        for k in 0..=steps {
            let t = k as f32 / steps as f32;
            let x = (from.0 + dx * t).round() as usize;
            let y = (from.1 + dy * t).round() as usize;
            img.data_mut()[y * width + x] = self.line;
        }
    }
}

impl TemplateSource for ProceduralTemplates {
    fn load(&self, index: usize) -> IsolineResult<PixelBuffer> {
        if index >= CONTOUR_CONFIG_COUNT {
            return Err(IsolineError::TemplateIndex { index });
        }
        let mut img = PixelBuffer::filled(self.step, self.step, self.background)?;
        for &(a, b) in segments(index as u8) {
            self.draw(&mut img, self.midpoint(a), self.midpoint(b));
        }
        Ok(img)
    }
}
