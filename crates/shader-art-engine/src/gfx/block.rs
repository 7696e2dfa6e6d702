use std::cell::{Cell, RefCell};

use super::context::GraphicsContext;
use super::program::{Program, UniformKind, UniformLocation};

/// CPU-side std140 staging for the uniforms of one program.
///
/// Every accepted upload is written at the uniform's block offset and marks
/// the block dirty. Uploads that do not fit the declared type (for example
/// `uniform1i` into a `vec3`) are rejected with a warning and leave the block
/// untouched, the same way a GL driver raises `INVALID_OPERATION` and drops
/// the call.
#[derive(Debug)]
pub struct UniformBlock {
    program: Program,
    bytes: RefCell<Vec<u8>>,
    dirty: Cell<bool>,
    uploads: Cell<usize>,
}

impl UniformBlock {
    /// Creates a zeroed block laid out for `program`.
    pub fn new(program: &Program) -> Self {
        Self {
            program: program.clone(),
            bytes: RefCell::new(vec![0; program.block_size()]),
            dirty: Cell::new(false),
            uploads: Cell::new(0),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Copy of the current block contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes.borrow().clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Returns whether the block changed since the last call, and clears the flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    /// Number of uploads accepted so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.get()
    }

    /// Reads back a float uniform (`float`, `vecN`) by name.
    pub fn read_f32s(&self, name: &str) -> Option<Vec<f32>> {
        let info = self.program.uniform(name)?;
        if info.kind.is_integer() {
            return None;
        }
        let offset = info.offset?;
        let len = info.kind.components() * 4;
        let bytes = self.bytes.borrow();
        Some(
            bytes[offset..offset + len]
                .chunks_exact(4)
                .map(bytemuck::pod_read_unaligned::<f32>)
                .collect(),
        )
    }

    /// Reads back an `int` or `bool` uniform by name.
    pub fn read_i32(&self, name: &str) -> Option<i32> {
        let info = self.program.uniform(name)?;
        if !matches!(info.kind, UniformKind::Int | UniformKind::Bool) {
            return None;
        }
        let offset = info.offset?;
        let bytes = self.bytes.borrow();
        Some(bytemuck::pod_read_unaligned(&bytes[offset..offset + 4]))
    }

    /// Resolves `location` to a block offset if `call` may write to it.
    fn resolve(
        &self,
        location: Option<&UniformLocation>,
        call: &str,
        accepts: fn(&UniformKind) -> bool,
    ) -> Option<usize> {
        let location = location?;
        let Some(info) = self.program.info_at(location) else {
            log::trace!("{call}: location from another program ignored");
            return None;
        };
        if !accepts(&info.kind) {
            log::warn!("{call} does not match uniform '{}' of type {}", info.name, info.kind);
            return None;
        }
        // Opaque kinds accept the call but have nowhere to store it.
        info.offset
    }

    fn write(&self, offset: usize, data: &[u8]) {
        self.bytes.borrow_mut()[offset..offset + data.len()].copy_from_slice(data);
        self.dirty.set(true);
        self.uploads.set(self.uploads.get() + 1);
    }
}

impl GraphicsContext for UniformBlock {
    fn uniform_location(&self, program: &Program, name: &str) -> Option<UniformLocation> {
        if program.id() != self.program.id() {
            log::warn!("location of '{name}' requested for a program this block was not created for");
        }
        program.location(name)
    }

    fn uniform1f(&self, location: Option<&UniformLocation>, x: f32) {
        if let Some(offset) = self.resolve(location, "uniform1f", |k| *k == UniformKind::Float) {
            self.write(offset, bytemuck::bytes_of(&x));
        }
    }

    fn uniform1i(&self, location: Option<&UniformLocation>, x: i32) {
        let accepts = |k: &UniformKind| matches!(k, UniformKind::Int | UniformKind::Bool | UniformKind::Opaque(_));
        let Some(offset) = self.resolve(location, "uniform1i", accepts) else { return };
        let kind_is_bool = location
            .and_then(|l| self.program.info_at(l))
            .is_some_and(|info| info.kind == UniformKind::Bool);
        let value = if kind_is_bool { (x != 0) as i32 } else { x };
        self.write(offset, bytemuck::bytes_of(&value));
    }

    fn uniform2fv(&self, location: Option<&UniformLocation>, v: [f32; 2]) {
        if let Some(offset) = self.resolve(location, "uniform2fv", |k| *k == UniformKind::Vec2) {
            self.write(offset, bytemuck::cast_slice(&v));
        }
    }

    fn uniform3fv(&self, location: Option<&UniformLocation>, v: [f32; 3]) {
        if let Some(offset) = self.resolve(location, "uniform3fv", |k| *k == UniformKind::Vec3) {
            self.write(offset, bytemuck::cast_slice(&v));
        }
    }

    fn uniform4fv(&self, location: Option<&UniformLocation>, v: [f32; 4]) {
        if let Some(offset) = self.resolve(location, "uniform4fv", |k| *k == UniformKind::Vec4) {
            self.write(offset, bytemuck::cast_slice(&v));
        }
    }
}
