//! Mapping from the simulation's logical space to device pixels.

/// Logical extent of the simulated space.
///
/// The space is y-up; the device surface it maps onto is y-down. Both spans
/// must be positive. Zero or negative spans are not rejected and produce
/// non-finite device coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns true when both axes have a positive, finite span.
    pub fn is_valid(&self) -> bool {
        let (sx, sy) = (self.span_x(), self.span_y());
        sx.is_finite() && sy.is_finite() && sx > 0.0 && sy > 0.0
    }

    /// Reflects a logical y coordinate about the mid-height of the space.
    ///
    /// Portrayals are flipped with this once, before alignment offsets and
    /// mapping, so that logical y grows upward on the y-down surface.
    /// Applying it twice yields the original value.
    pub fn invert_y(&self, y: f64) -> f64 {
        self.min_y + self.max_y - y
    }
}

/// Affine map from logical coordinates to device pixel coordinates.
///
/// Each axis is scaled independently, so a logical circle becomes a device
/// ellipse whenever the logical aspect ratio differs from the surface's.
/// No rounding is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    bounds: Bounds,
    width: u32,
    height: u32,
}

impl CoordinateMapper {
    pub fn new(bounds: Bounds, width: u32, height: u32) -> Self {
        Self {
            bounds,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels per logical unit along x.
    pub fn scale_x(&self) -> f64 {
        self.width as f64 / self.bounds.span_x()
    }

    /// Pixels per logical unit along y.
    pub fn scale_y(&self) -> f64 {
        self.height as f64 / self.bounds.span_y()
    }

    // Dividing before multiplying keeps the boundaries exact:
    // min maps to 0 and max maps to the full surface size.
    pub fn to_device_x(&self, x: f64) -> f64 {
        (x - self.bounds.min_x) / self.bounds.span_x() * self.width as f64
    }

    pub fn to_device_y(&self, y: f64) -> f64 {
        (y - self.bounds.min_y) / self.bounds.span_y() * self.height as f64
    }

    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (self.to_device_x(x), self.to_device_y(y))
    }

    /// Maps a horizontal logical size; never offset by `min_x`.
    pub fn to_device_extent_x(&self, w: f64) -> f64 {
        w / self.bounds.span_x() * self.width as f64
    }

    /// Maps a vertical logical size; never offset by `min_y`.
    pub fn to_device_extent_y(&self, h: f64) -> f64 {
        h / self.bounds.span_y() * self.height as f64
    }
}
