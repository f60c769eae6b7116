//! Page geometry and overlay placement

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Get the value in millimeters
    pub fn mm(&self) -> f64 {
        self.0
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Clockwise page rotation as stored in a page's `/Rotate` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Normalize a `/Rotate` value; anything that is not a multiple of 90 is ignored
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Quarter,
            180 => Rotation::Half,
            270 => Rotation::ThreeQuarter,
            _ => Rotation::None,
        }
    }

    fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }
}

/// A page's visible area (MediaBox, narrowed by any CropBox) plus its display rotation
///
/// Overlay content is laid out in "visible" coordinates: origin at the
/// bottom-left of the page as a viewer shows it, with the y axis pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
    pub rotation: Rotation,
}

impl PageBox {
    /// US Letter (8.5" × 11"), used when a page carries no usable MediaBox
    pub fn letter() -> Self {
        Self {
            llx: 0.0,
            lly: 0.0,
            urx: 612.0,
            ury: 792.0,
            rotation: Rotation::None,
        }
    }

    /// Build from MediaBox corners; corners may be given in any order
    pub fn new(rect: [f32; 4], rotation: Rotation) -> Self {
        Self {
            llx: rect[0].min(rect[2]),
            lly: rect[1].min(rect[3]),
            urx: rect[0].max(rect[2]),
            ury: rect[1].max(rect[3]),
            rotation,
        }
    }

    /// The part of this box that lies inside `crop`, keeping the rotation
    ///
    /// Returns `self` unchanged when the two boxes do not overlap.
    pub fn clipped_to(self, crop: [f32; 4]) -> Self {
        let crop = PageBox::new(crop, self.rotation);
        let clipped = Self {
            llx: self.llx.max(crop.llx),
            lly: self.lly.max(crop.lly),
            urx: self.urx.min(crop.urx),
            ury: self.ury.min(crop.ury),
            rotation: self.rotation,
        };
        if clipped.width() > 0.0 && clipped.height() > 0.0 {
            clipped
        } else {
            self
        }
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }

    /// Width and height of the page as displayed
    pub fn visible_size(&self) -> (f32, f32) {
        if self.rotation.swaps_axes() {
            (self.height(), self.width())
        } else {
            (self.width(), self.height())
        }
    }

    /// `cm` matrix mapping visible coordinates into the page's user space
    pub fn visible_to_user(&self) -> [f32; 6] {
        let (w, h) = (self.width(), self.height());
        let [a, b, c, d, e, f] = match self.rotation {
            Rotation::None => [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            Rotation::Quarter => [0.0, 1.0, -1.0, 0.0, w, 0.0],
            Rotation::Half => [-1.0, 0.0, 0.0, -1.0, w, h],
            Rotation::ThreeQuarter => [0.0, -1.0, 1.0, 0.0, 0.0, h],
        };
        [a, b, c, d, e + self.llx, f + self.lly]
    }
}

/// Left edge that horizontally centers a run of `text_width` on the page
pub fn centered_x(visible_width: f32, text_width: f32) -> f32 {
    (visible_width - text_width) / 2.0
}
