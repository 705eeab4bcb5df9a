use crate::{
    core::{Color, Viewport},
    error::{FirstlightError, FirstlightResult},
};
use vello_cpu::kurbo::{Affine, Circle, Shape};

/// RGBA8 readback of a surface.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// A filled circle to draw in one pass. Alpha rides in `color.a`.
#[derive(Clone, Copy, Debug)]
pub struct Disc {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
}

/// The pixel buffer a particle renderer exclusively owns.
///
/// Premultiplied RGBA8, sized to the viewport; recreated on resize so
/// frames never land in a stale-sized buffer.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

fn viewport_u16(viewport: Viewport) -> FirstlightResult<(u16, u16)> {
    let width: u16 = viewport
        .width
        .try_into()
        .map_err(|_| FirstlightError::render("surface width exceeds u16"))?;
    let height: u16 = viewport
        .height
        .try_into()
        .map_err(|_| FirstlightError::render("surface height exceeds u16"))?;
    Ok((width, height))
}

impl Surface {
    pub fn new(viewport: Viewport) -> FirstlightResult<Self> {
        let (width, height) = viewport_u16(viewport)?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Matches the buffer to a new viewport size. Returns whether the
    /// buffer was recreated; contents after a resize are transparent.
    pub fn resize(&mut self, viewport: Viewport) -> FirstlightResult<bool> {
        let (width, height) = viewport_u16(viewport)?;
        if width == self.width && height == self.height {
            return Ok(false);
        }
        self.width = width;
        self.height = height;
        self.pixmap = vello_cpu::Pixmap::new(width, height);
        Ok(true)
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Fills the whole buffer with `color` (premultiplied).
    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba8_premul();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn clear_transparent(&mut self) {
        self.clear(Color::TRANSPARENT);
    }

    /// Draws filled circles over the current contents.
    pub fn draw_discs(&mut self, discs: impl IntoIterator<Item = Disc>) {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_transform(Affine::IDENTITY);
        for disc in discs {
            let [r, g, b, a] = disc.color.to_rgba8();
            if a == 0 {
                continue;
            }
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            let path = Circle::new((disc.x, disc.y), disc.radius).to_path(0.1);
            ctx.fill_path(&path);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub fn to_frame(&self) -> FrameRgba {
        FrameRgba {
            width: self.width(),
            height: self.height(),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}
