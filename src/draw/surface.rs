//! The raster surface portrayals are painted onto.

use super::error::RenderError;
use std::fs::File;
use std::path::Path;

/// Largest surface edge accepted, in pixels.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

/// An ARGB32 Cairo image surface together with its drawing context.
///
/// Owned exclusively by the renderer; nothing else draws on it.
pub struct Surface {
    surface: cairo::ImageSurface,
    ctx: cairo::Context,
}

impl Surface {
    /// Creates a transparent surface of `width`×`height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > MAX_SURFACE_EDGE || height > MAX_SURFACE_EDGE {
            return Err(RenderError::InvalidSize { width, height });
        }
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
        let ctx = cairo::Context::new(&surface)?;
        Ok(Self { surface, ctx })
    }

    pub fn context(&self) -> &cairo::Context {
        &self.ctx
    }

    pub fn image(&self) -> &cairo::ImageSurface {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.surface.height() as u32
    }

    /// Erases every pixel to transparent and drops any pending path.
    pub fn clear(&self) -> Result<(), RenderError> {
        self.ctx.save()?;
        self.ctx.set_operator(cairo::Operator::Clear);
        self.ctx.paint()?;
        self.ctx.restore()?;
        self.ctx.new_path();
        Ok(())
    }

    /// Replaces the context if a failed drawing call left it in an error state.
    ///
    /// Cairo errors are sticky: once a context fails, every later call on it is
    /// a no-op. A fresh context keeps one bad record from blanking the rest.
    pub fn recover(&mut self) -> Result<(), RenderError> {
        if let Err(err) = self.ctx.status() {
            log::warn!("Drawing context entered error state ({}), recreating it", err);
            self.ctx = cairo::Context::new(&self.surface)?;
        }
        Ok(())
    }

    /// Reads one pixel as premultiplied `[r, g, b, a]`.
    ///
    /// Returns `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = y as usize * self.surface.stride() as usize + x as usize * 4;
        let mut pixel = None;
        self.surface
            .with_data(|data| {
                let bytes: [u8; 4] = data[offset..offset + 4].try_into().unwrap_or([0; 4]);
                let argb = u32::from_ne_bytes(bytes);
                pixel = Some([
                    (argb >> 16) as u8,
                    (argb >> 8) as u8,
                    argb as u8,
                    (argb >> 24) as u8,
                ]);
            })
            .ok()?;
        pixel
    }

    /// Returns true if any pixel is not fully transparent.
    pub fn has_ink(&self) -> bool {
        let mut inked = false;
        let _ = self.surface.with_data(|data| {
            inked = data.iter().any(|byte| *byte != 0);
        });
        inked
    }

    /// Writes the surface to `path` as PNG.
    pub fn write_png(&self, path: &Path) -> Result<(), RenderError> {
        let mut file = File::create(path).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.surface.write_to_png(&mut file)?;
        Ok(())
    }
}
