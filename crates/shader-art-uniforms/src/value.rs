use std::fmt;

/// Named component of a vector uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    W,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::W];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::W => "w",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current value of one bound uniform, as held in the parameter store.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// `float` and `int` uniforms. Int values may turn fractional through
    /// a generic numeric control; they are floored on upload.
    Number(f64),
    /// `#rrggbb` string, kept verbatim so a color control can edit it.
    Color(String),
    Vec2 { x: f64, y: f64 },
    Vec3 { x: f64, y: f64, z: f64 },
    Vec4 { x: f64, y: f64, z: f64, w: f64 },
}

impl UniformValue {
    /// Builds the vector variant with `components.len()` axes (2, 3 or 4).
    pub fn vector(components: &[f64]) -> Option<Self> {
        match *components {
            [x, y] => Some(Self::Vec2 { x, y }),
            [x, y, z] => Some(Self::Vec3 { x, y, z }),
            [x, y, z, w] => Some(Self::Vec4 { x, y, z, w }),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Color(hex) => Some(hex),
            _ => None,
        }
    }

    /// Axes of a vector value, empty for scalars and colors.
    pub fn axes(&self) -> &'static [Axis] {
        match self {
            Self::Vec2 { .. } => &Axis::ALL[..2],
            Self::Vec3 { .. } => &Axis::ALL[..3],
            Self::Vec4 { .. } => &Axis::ALL,
            _ => &[],
        }
    }

    pub fn axis(&self, axis: Axis) -> Option<f64> {
        match (self, axis) {
            (Self::Vec2 { x, .. } | Self::Vec3 { x, .. } | Self::Vec4 { x, .. }, Axis::X) => Some(*x),
            (Self::Vec2 { y, .. } | Self::Vec3 { y, .. } | Self::Vec4 { y, .. }, Axis::Y) => Some(*y),
            (Self::Vec3 { z, .. } | Self::Vec4 { z, .. }, Axis::Z) => Some(*z),
            (Self::Vec4 { w, .. }, Axis::W) => Some(*w),
            _ => None,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> Option<&mut f64> {
        match (self, axis) {
            (Self::Vec2 { x, .. } | Self::Vec3 { x, .. } | Self::Vec4 { x, .. }, Axis::X) => Some(x),
            (Self::Vec2 { y, .. } | Self::Vec3 { y, .. } | Self::Vec4 { y, .. }, Axis::Y) => Some(y),
            (Self::Vec3 { z, .. } | Self::Vec4 { z, .. }, Axis::Z) => Some(z),
            (Self::Vec4 { w, .. }, Axis::W) => Some(w),
            _ => None,
        }
    }
}

impl fmt::Display for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Color(hex) => f.write_str(hex),
            _ => {
                f.write_str("{")?;
                for (i, &axis) in self.axes().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{axis}: {}", self.axis(axis).unwrap_or_default())?;
                }
                f.write_str("}")
            }
        }
    }
}
