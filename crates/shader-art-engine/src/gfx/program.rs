use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(u32);

/// Opaque handle to one uniform inside one program.
///
/// A location only addresses the program it was looked up from; once the
/// host links a new program, every location from the old one is stale and
/// uploads through it are ignored.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub(crate) program: ProgramId,
    pub(crate) index: usize,
}

impl UniformLocation {
    pub fn program(&self) -> ProgramId {
        self.program
    }
}

// ── UniformKind ───────────────────────────────────────────────────────────

/// GLSL type of a reflected uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    /// Samplers, matrices, arrays, structs: declared, but not backed by block storage.
    Opaque(String),
}

impl UniformKind {
    pub fn from_glsl(ty: &str) -> Self {
        match ty {
            "float" => Self::Float,
            "int" => Self::Int,
            "bool" => Self::Bool,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "ivec2" => Self::IVec2,
            "ivec3" => Self::IVec3,
            "ivec4" => Self::IVec4,
            other => Self::Opaque(other.to_string()),
        }
    }

    /// Number of scalar components; 0 for opaque kinds.
    pub fn components(&self) -> usize {
        match self {
            Self::Float | Self::Int | Self::Bool => 1,
            Self::Vec2 | Self::IVec2 => 2,
            Self::Vec3 | Self::IVec3 => 3,
            Self::Vec4 | Self::IVec4 => 4,
            Self::Opaque(_) => 0,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::Bool | Self::IVec2 | Self::IVec3 | Self::IVec4)
    }

    /// std140 `(size, alignment)` in bytes.
    fn std140(&self) -> Option<(usize, usize)> {
        match self.components() {
            0 => None,
            1 => Some((4, 4)),
            2 => Some((8, 8)),
            3 => Some((12, 16)),
            _ => Some((16, 16)),
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "float",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::IVec2 => "ivec2",
            Self::IVec3 => "ivec3",
            Self::IVec4 => "ivec4",
            Self::Opaque(ty) => ty.as_str(),
        };
        f.write_str(name)
    }
}

/// One reflected `uniform` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformInfo {
    pub name: String,
    pub kind: UniformKind,
    /// Byte offset in the std140 block; `None` for opaque kinds.
    pub offset: Option<usize>,
}

// ── Program ───────────────────────────────────────────────────────────────

/// A linked pair of shader sources, reduced to what uniform binding needs:
/// the declared uniforms and their std140 layout.
///
/// Compilation to GPU code is not done here; the sources are only scanned.
#[derive(Debug, Clone)]
pub struct Program {
    id: ProgramId,
    uniforms: Vec<UniformInfo>,
    block_size: usize,
}

impl Program {
    /// Reflects the `uniform` declarations of both stages. A name declared in
    /// both stages is one uniform; on a type conflict the vertex declaration wins.
    pub fn link(vertex: &str, fragment: &str) -> Self {
        let mut uniforms: Vec<UniformInfo> = Vec::new();
        for (name, kind) in scan_uniforms(vertex).into_iter().chain(scan_uniforms(fragment)) {
            if let Some(existing) = uniforms.iter().find(|u| u.name == name) {
                if existing.kind != kind {
                    log::warn!(
                        "uniform '{name}' declared as both {} and {kind}; keeping {}",
                        existing.kind, existing.kind
                    );
                }
                continue;
            }
            uniforms.push(UniformInfo { name, kind, offset: None });
        }

        let mut cursor = 0;
        for u in &mut uniforms {
            if let Some((size, align)) = u.kind.std140() {
                let offset = align_up(cursor, align);
                u.offset = Some(offset);
                cursor = offset + size;
            }
        }
        // Uniform buffers must be non-empty and are bound in 16-byte units.
        let block_size = align_up(cursor, 16).max(16);

        let id = ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed));
        log::debug!("linked program {:?}: {} uniforms, {} byte block", id, uniforms.len(), block_size);
        Self { id, uniforms, block_size }
    }

    pub fn empty() -> Self {
        Self::link("", "")
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn uniforms(&self) -> &[UniformInfo] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Size of the std140 block in bytes, rounded up to 16.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Location of a declared uniform, or `None` if the program does not declare it.
    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .position(|u| u.name == name)
            .map(|index| UniformLocation { program: self.id, index })
    }

    pub(crate) fn info_at(&self, location: &UniformLocation) -> Option<&UniformInfo> {
        if location.program != self.id {
            return None;
        }
        self.uniforms.get(location.index)
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

// ── GLSL scanning ─────────────────────────────────────────────────────────

const PRECISION_QUALIFIERS: &[&str] = &["lowp", "mediump", "highp"];

/// Finds `uniform [precision] <type> <name>[, <name>]*` declarations.
///
/// Interface blocks (`uniform Name { ... }`) are skipped. Array declarators
/// (`name[4]`) are reported as opaque.
fn scan_uniforms(src: &str) -> Vec<(String, UniformKind)> {
    let code = strip_comments(src);
    let mut out = Vec::new();
    for stmt in code.split([';', '{', '}']) {
        let mut words = stmt.split_whitespace();
        if words.next() != Some("uniform") {
            continue;
        }
        let mut ty = words.next();
        while ty.is_some_and(|w| PRECISION_QUALIFIERS.contains(&w)) {
            ty = words.next();
        }
        let Some(ty) = ty else { continue };
        let declarators: String = words.collect::<Vec<_>>().join(" ");
        for decl in declarators.split(',') {
            let decl = decl.trim();
            let (name, is_array) = match decl.find('[') {
                Some(i) => (decl[..i].trim(), true),
                None => (decl, false),
            };
            if !is_identifier(name) {
                continue;
            }
            let kind = if is_array {
                UniformKind::Opaque(format!("{ty}[]"))
            } else {
                UniformKind::from_glsl(ty)
            };
            out.push((name.to_string(), kind));
        }
    }
    out
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        match (line, block) {
            (Some(l), b) if b.is_none_or(|b| l < b) => {
                out.push_str(&rest[..l]);
                rest = rest[l..].find('\n').map_or("", |nl| &rest[l + nl..]);
            }
            (_, Some(b)) => {
                out.push_str(&rest[..b]);
                out.push(' ');
                rest = rest[b + 2..].find("*/").map_or("", |end| &rest[b + 2 + end + 2..]);
            }
            _ => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAG: &str = r#"
        precision highp float;
        uniform vec2 resolution;
        uniform float time; // seconds
        /* uniform float hidden; */
        uniform highp vec3 tint, glow;
        uniform sampler2D image;
        uniform float weights[4];
        unifrom texture2D typo;
        void main() {
            gl_FragColor = vec4(tint, 1.0);
        }
    "#;

    #[test]
    fn reflects_declarations_in_order() {
        let p = Program::link("", FRAG);
        let names: Vec<_> = p.uniforms().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["resolution", "time", "tint", "glow", "image", "weights"]);
        assert_eq!(p.uniform("tint").unwrap().kind, UniformKind::Vec3);
        assert_eq!(p.uniform("image").unwrap().kind, UniformKind::Opaque("sampler2D".into()));
        assert_eq!(p.uniform("weights").unwrap().kind, UniformKind::Opaque("float[]".into()));
        assert!(p.uniform("hidden").is_none());
        assert!(p.uniform("typo").is_none());
    }

    #[test]
    fn std140_offsets() {
        let p = Program::link("", FRAG);
        // vec2 @0, float @8, vec3 @16, vec3 @32
        assert_eq!(p.uniform("resolution").unwrap().offset, Some(0));
        assert_eq!(p.uniform("time").unwrap().offset, Some(8));
        assert_eq!(p.uniform("tint").unwrap().offset, Some(16));
        assert_eq!(p.uniform("glow").unwrap().offset, Some(32));
        assert_eq!(p.uniform("image").unwrap().offset, None);
        assert_eq!(p.block_size(), 48);
    }

    #[test]
    fn empty_program_has_minimum_block() {
        let p = Program::empty();
        assert!(p.uniforms().is_empty());
        assert_eq!(p.block_size(), 16);
        assert!(p.location("anything").is_none());
    }

    #[test]
    fn stages_share_uniforms() {
        let p = Program::link("uniform float t;", "uniform float t; uniform int n;");
        assert_eq!(p.uniforms().len(), 2);
        assert_eq!(p.uniform("n").unwrap().kind, UniformKind::Int);
    }

    #[test]
    fn locations_are_scoped_to_their_program() {
        let a = Program::link("", "uniform float t;");
        let b = Program::link("", "uniform float t;");
        let loc = a.location("t").unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.info_at(&loc).is_some());
        assert!(b.info_at(&loc).is_none());
    }
}
