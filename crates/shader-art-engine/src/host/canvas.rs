use shader_art_markup::Element;

/// Drawing surface size requested by a host element.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    /// The HTML canvas default of 300×150.
    fn default() -> Self {
        Self { width: 300, height: 150 }
    }
}

impl Canvas {
    /// Reads `width` / `height` from the host element, falling back to the
    /// defaults for absent or unparsable values.
    pub fn for_host(host: &Element) -> Self {
        let default = Self::default();
        let dim = |name: &str, fallback: u32| {
            host.attr(name)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(fallback)
        };
        Self {
            width: dim("width", default.width),
            height: dim("height", default.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_from_attributes() {
        let host = Element::new("shader-art").with_attr("width", "640").with_attr("height", "nope");
        assert_eq!(Canvas::for_host(&host), Canvas { width: 640, height: 150 });
    }
}
