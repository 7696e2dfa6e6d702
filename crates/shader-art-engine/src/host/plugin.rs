use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use shader_art_markup::Element;

use super::canvas::Canvas;
use crate::gfx::{GraphicsContext, Program};

/// Deferred completion returned from [`ShaderArtPlugin::setup`].
///
/// The host awaits every one of these before it reports itself initialized.
pub type PluginReady = Pin<Box<dyn Future<Output = ()>>>;

/// Contract between the host element and one plugin instance.
pub trait ShaderArtPlugin {
    /// Stable plugin name, used for diagnostics.
    fn name(&self) -> &str;

    /// Called once per connection, after the program is linked.
    ///
    /// Return `Some` when part of the setup completes later; `None` means
    /// the plugin is ready when this call returns.
    fn setup(
        &mut self,
        host: &Element,
        gl: &Rc<dyn GraphicsContext>,
        program: &Program,
        canvas: &Canvas,
    ) -> Option<PluginReady>;

    /// Releases everything `setup` created. Must be safe to call when `setup`
    /// never ran, and more than once.
    fn dispose(&mut self);
}
