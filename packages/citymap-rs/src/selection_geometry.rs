//! Maps a rectangle drawn over the displayed map back onto source image pixels.
use tracing::warn;

/// A point in display or image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl SelectionRect {
    /// Builds the normalized rectangle spanned by two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// `(x1, y1, x2, y2)` rounded half up, as sent to the pixel fragment call.
    pub fn to_pixel_corners(&self) -> (i32, i32, i32, i32) {
        (
            round_half_up(self.left),
            round_half_up(self.top),
            round_half_up(self.right),
            round_half_up(self.bottom),
        )
    }
}

fn round_half_up(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(v))
}

/// Affine transform from image space to display space.
///
/// `x' = sx * x + kx * y + tx`, `y' = ky * x + sy * y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DisplayTransform {
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            kx: 0.0,
            tx: 0.0,
            ky: 0.0,
            sy: 1.0,
            ty: 0.0,
        }
    }

    pub const fn scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Self {
            sx,
            kx: 0.0,
            tx,
            ky: 0.0,
            sy,
            ty,
        }
    }

    /// Uniform scale that fits the image inside the view, centred, with
    /// letterboxing on the unused axis. `None` when any dimension is zero.
    pub fn fit_center(image_w: u32, image_h: u32, view_w: u32, view_h: u32) -> Option<Self> {
        if image_w == 0 || image_h == 0 || view_w == 0 || view_h == 0 {
            return None;
        }
        let (iw, ih) = (image_w as f32, image_h as f32);
        let (vw, vh) = (view_w as f32, view_h as f32);
        let scale = (vw / iw).min(vh / ih);
        let dx = (vw - iw * scale) / 2.0;
        let dy = (vh - ih * scale) / 2.0;
        Some(Self::scale_translate(scale, scale, dx, dy))
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point {
            x: self.sx * p.x + self.kx * p.y + self.tx,
            y: self.ky * p.x + self.sy * p.y + self.ty,
        }
    }

    /// The inverse transform, or `None` when this one is singular.
    pub fn invert(&self) -> Option<Self> {
        let det = self.sx * self.sy - self.kx * self.ky;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self {
            sx: self.sy / det,
            kx: -self.kx / det,
            tx: (self.kx * self.ty - self.sy * self.tx) / det,
            ky: -self.ky / det,
            sy: self.sx / det,
            ty: (self.ky * self.tx - self.sx * self.ty) / det,
        })
    }
}

/// How the current image is presented: its size and the image-to-display transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    pub transform: DisplayTransform,
}

impl ImageFrame {
    pub fn new(width: u32, height: u32, transform: DisplayTransform) -> Self {
        Self {
            width,
            height,
            transform,
        }
    }

    /// Frame for an image shown with [`DisplayTransform::fit_center`].
    pub fn fit_center(width: u32, height: u32, view_w: u32, view_h: u32) -> Option<Self> {
        DisplayTransform::fit_center(width, height, view_w, view_h)
            .map(|transform| Self::new(width, height, transform))
    }
}

/// Converts a display-space rectangle into image pixels, clamped to the image.
///
/// Without a usable frame the input is returned unchanged.
pub fn map_display_rect_to_image_rect(rect: SelectionRect, frame: Option<&ImageFrame>) -> SelectionRect {
    let Some(frame) = frame else {
        warn!("no image frame; using display rectangle as is");
        return rect;
    };
    if frame.width == 0 || frame.height == 0 {
        warn!(width = frame.width, height = frame.height, "invalid image size; using display rectangle as is");
        return rect;
    }
    let Some(inverse) = frame.transform.invert() else {
        warn!("display transform is not invertible; using display rectangle as is");
        return rect;
    };

    let a = inverse.map_point(Point::new(rect.left, rect.top));
    let b = inverse.map_point(Point::new(rect.right, rect.bottom));
    let (w, h) = (frame.width as f32, frame.height as f32);

    SelectionRect::from_corners(
        Point::new(clamp(a.x, 0.0, w), clamp(a.y, 0.0, h)),
        Point::new(clamp(b.x, 0.0, w), clamp(b.y, 0.0, h)),
    )
}

/// Two-tap rectangle selection: the first tap anchors a corner, the second
/// completes the rectangle, and every further tap moves the end corner while
/// the anchor stays put. Only `reset` starts over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TwoTapSelection {
    #[default]
    Empty,
    FirstCorner(Point),
    Complete(Point, Point),
}

impl TwoTapSelection {
    pub fn tap(&mut self, point: Point) {
        *self = match *self {
            TwoTapSelection::Empty => TwoTapSelection::FirstCorner(point),
            TwoTapSelection::FirstCorner(first) | TwoTapSelection::Complete(first, _) => {
                TwoTapSelection::Complete(first, point)
            }
        };
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, TwoTapSelection::Complete(..))
    }

    /// The normalized display rectangle once both corners exist.
    pub fn rect(&self) -> Option<SelectionRect> {
        match *self {
            TwoTapSelection::Complete(a, b) => Some(SelectionRect::from_corners(a, b)),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = TwoTapSelection::Empty;
    }
}
