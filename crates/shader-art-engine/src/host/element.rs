use std::rc::Rc;

use anyhow::{Context, Result};
use shader_art_markup::{Element, parse_str};

use super::canvas::Canvas;
use super::plugin::{PluginReady, ShaderArtPlugin};
use crate::gfx::{GraphicsContext, Program};

/// Produces a fresh plugin instance for every connection.
pub type PluginFactory = Box<dyn Fn() -> Box<dyn ShaderArtPlugin>>;

/// A `<shader-art>` host element.
///
/// Follows a builder pattern: register plugin factories, then [`connect`]
/// with a graphics-context factory. Dropping a connected host disconnects it.
///
/// ```rust,ignore
/// let mut art = ShaderArt::from_markup(src)?
///     .plugin(|| Box::new(UniformBinder::new(DebugPanelFactory::new())));
/// art.connect(|program| Ok(Rc::new(UniformBlock::new(program)) as Rc<dyn GraphicsContext>))?;
/// ```
///
/// [`connect`]: Self::connect
pub struct ShaderArt {
    element: Element,
    plugins: Vec<PluginFactory>,

    // Live only between `connect` and `disconnect`.
    canvas: Option<Canvas>,
    gl: Option<Rc<dyn GraphicsContext>>,
    program: Option<Program>,
    active_plugins: Vec<Box<dyn ShaderArtPlugin>>,
    initialized: bool,
}

impl ShaderArt {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            plugins: Vec::new(),
            canvas: None,
            gl: None,
            program: None,
            active_plugins: Vec::new(),
            initialized: false,
        }
    }

    /// Parses `src` and hosts its first `<shader-art>` element.
    pub fn from_markup(src: &str) -> Result<Self> {
        let doc = parse_str(src).context("failed to parse host markup")?;
        let element = doc
            .first("shader-art")
            .context("markup contains no <shader-art> element")?
            .clone();
        Ok(Self::new(element))
    }

    /// Register a plugin factory. Plugins are set up in registration order.
    pub fn plugin<P, F>(mut self, factory: F) -> Self
    where
        P: ShaderArtPlugin + 'static,
        F: Fn() -> P + 'static,
    {
        self.plugins.push(Box::new(move || Box::new(factory()) as Box<dyn ShaderArtPlugin>));
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn gl(&self) -> Option<&Rc<dyn GraphicsContext>> {
        self.gl.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.gl.is_some()
    }

    /// True once every plugin's deferred setup has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn active_plugins(&self) -> &[Box<dyn ShaderArtPlugin>] {
        &self.active_plugins
    }

    /// Text of the first direct `<script type="...">` child with the given type.
    pub fn shader_source(&self, kind: &str) -> String {
        self.element
            .children_tagged("script")
            .find(|s| s.attr("type") == Some(kind))
            .map(|s| s.text())
            .unwrap_or_default()
    }

    /// Links the program, creates the graphics context and sets up every
    /// registered plugin. Connecting an already connected host does nothing.
    pub fn connect<F>(&mut self, make_context: F) -> Result<()>
    where
        F: FnOnce(&Program) -> Result<Rc<dyn GraphicsContext>>,
    {
        if self.is_connected() {
            return Ok(());
        }

        let canvas = Canvas::for_host(&self.element);
        let program = Program::link(&self.shader_source("vert"), &self.shader_source("frag"));
        let gl = make_context(&program).context("failed to create graphics context")?;

        let mut pending: Vec<PluginReady> = Vec::new();
        for factory in &self.plugins {
            let mut instance = factory();
            log::debug!("setting up plugin {}", instance.name());
            if let Some(ready) = instance.setup(&self.element, &gl, &program, &canvas) {
                pending.push(ready);
            }
            self.active_plugins.push(instance);
        }

        self.canvas = Some(canvas);
        self.program = Some(program);
        self.gl = Some(gl);

        for ready in pending {
            pollster::block_on(ready);
        }
        self.initialized = true;
        log::debug!("shader-art connected with {} plugins", self.active_plugins.len());
        Ok(())
    }

    /// Disposes every active plugin and releases the graphics resources.
    /// Does nothing when the host is not connected.
    pub fn disconnect(&mut self) {
        if !self.is_connected() {
            return;
        }
        for plugin in &mut self.active_plugins {
            plugin.dispose();
        }
        self.active_plugins.clear();
        self.gl = None;
        self.program = None;
        self.canvas = None;
        self.initialized = false;
        log::debug!("shader-art disconnected");
    }
}

impl Drop for ShaderArt {
    fn drop(&mut self) {
        self.disconnect();
    }
}
