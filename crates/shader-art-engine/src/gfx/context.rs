use super::program::{Program, UniformLocation};

/// Upload contract between plugins and whatever owns the uniform storage.
///
/// Mirrors the WebGL uniform calls: a location is looked up once per program
/// and each upload takes `Option<&UniformLocation>`. Uploading through `None`
/// is a silent no-op, so callers never need to check whether the shader
/// actually declares a uniform.
///
/// Methods take `&self`; implementations use interior mutability so one
/// context can be shared (`Rc<dyn GraphicsContext>`) between the plugin that
/// performs the initial upload and the change callbacks that re-upload later.
pub trait GraphicsContext {
    /// Location of `name` in `program`, or `None` if it is not declared.
    fn uniform_location(&self, program: &Program, name: &str) -> Option<UniformLocation> {
        program.location(name)
    }

    fn uniform1f(&self, location: Option<&UniformLocation>, x: f32);

    fn uniform1i(&self, location: Option<&UniformLocation>, x: i32);

    fn uniform2fv(&self, location: Option<&UniformLocation>, v: [f32; 2]);

    fn uniform3fv(&self, location: Option<&UniformLocation>, v: [f32; 3]);

    fn uniform4fv(&self, location: Option<&UniformLocation>, v: [f32; 4]);
}
