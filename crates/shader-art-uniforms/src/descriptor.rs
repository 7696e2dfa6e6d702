use std::fmt;
use std::str::FromStr;

use shader_art_markup::Element;

use crate::number::{parse_float, parse_int};
use crate::value::UniformValue;

/// Tag name of a uniform declaration.
pub const UNIFORM_TAG: &str = "uniform";

// ── UniformType ───────────────────────────────────────────────────────────

/// The closed set of uniform types a declaration may name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    Float,
    Int,
    Color,
    Vec2,
    Vec3,
    Vec4,
}

impl UniformType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Color => "color",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    /// Number of vector components, `None` for scalars and colors.
    pub fn vector_len(self) -> Option<usize> {
        match self {
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `type` attribute outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUniformType(pub String);

impl fmt::Display for UnknownUniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown uniform type {:?}", self.0)
    }
}

impl std::error::Error for UnknownUniformType {}

impl FromStr for UniformType {
    type Err = UnknownUniformType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float" => Ok(Self::Float),
            "int" => Ok(Self::Int),
            "color" => Ok(Self::Color),
            "vec2" => Ok(Self::Vec2),
            "vec3" => Ok(Self::Vec3),
            "vec4" => Ok(Self::Vec4),
            other => Err(UnknownUniformType(other.to_string())),
        }
    }
}

// ── UniformDescriptor ─────────────────────────────────────────────────────

/// One `<uniform>` declaration, read once from markup.
///
/// ```html
/// <uniform type="float" name="speed" value="0.5" min="0" max="2" step="0.1" />
/// <uniform type="vec2" name="offset" value="1,2" no-gui />
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor {
    pub name: String,
    pub ty: UniformType,
    pub value: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub step: Option<String>,
    /// `no-gui` present: upload the value but create no control.
    pub no_gui: bool,
}

impl UniformDescriptor {
    /// Reads a declaration from a `<uniform>` element.
    ///
    /// Returns `None` when `name` or `type` is absent or empty, or when the
    /// type is not one of the supported set. Such declarations are skipped,
    /// not reported.
    pub fn from_element(el: &Element) -> Option<Self> {
        let name = el.attr("name").filter(|s| !s.is_empty())?;
        let ty = el.attr("type").filter(|s| !s.is_empty())?;
        let ty = match ty.parse::<UniformType>() {
            Ok(ty) => ty,
            Err(e) => {
                log::debug!("skipping uniform '{name}': {e}");
                return None;
            }
        };
        let text = |attr: &str| el.attr(attr).map(str::to_string);
        Some(Self {
            name: name.to_string(),
            ty,
            value: text("value"),
            min: text("min"),
            max: text("max"),
            step: text("step"),
            no_gui: el.has_attr("no-gui"),
        })
    }

    /// All well-formed declarations among the direct children of `host`,
    /// in document order.
    pub fn collect(host: &Element) -> Vec<Self> {
        host.children_tagged(UNIFORM_TAG).filter_map(Self::from_element).collect()
    }

    /// The initial value, with unparsable input degraded to the type's default.
    pub fn initial_value(&self) -> UniformValue {
        let raw = self.value.as_deref().unwrap_or("");
        match self.ty {
            UniformType::Float => UniformValue::Number(parse_float(raw).unwrap_or(0.0)),
            UniformType::Int => UniformValue::Number(parse_int(raw).unwrap_or(0) as f64),
            UniformType::Color => UniformValue::Color(
                self.value.clone().filter(|v| !v.is_empty()).unwrap_or_else(|| "#000000".to_string()),
            ),
            UniformType::Vec2 | UniformType::Vec3 | UniformType::Vec4 => {
                let len = self.ty.vector_len().unwrap_or(2);
                let mut parts = raw.split(',');
                let components: Vec<f64> = (0..len)
                    .map(|_| parts.next().and_then(parse_float).unwrap_or(0.0))
                    .collect();
                UniformValue::vector(&components).unwrap_or(UniformValue::Vec2 { x: 0.0, y: 0.0 })
            }
        }
    }

    /// `(min, max)` when both bounds parse.
    pub fn range(&self) -> Option<(f64, f64)> {
        let min = self.min.as_deref().and_then(parse_float)?;
        let max = self.max.as_deref().and_then(parse_float)?;
        Some((min, max))
    }

    /// The declared step if it parses to a positive number, else `default`.
    pub fn step_or(&self, default: f64) -> f64 {
        self.step
            .as_deref()
            .and_then(parse_float)
            .filter(|s| *s > 0.0)
            .unwrap_or(default)
    }
}
