//! The `<shader-art>` host element and its plugin contract.
//!
//! The host owns instantiation and ordering: it links the program, creates
//! the graphics context, and then runs every registered plugin's `setup`.
//! Plugins never register themselves.

mod canvas;
mod element;
mod plugin;

pub use canvas::Canvas;
pub use element::{PluginFactory, ShaderArt};
pub use plugin::{PluginReady, ShaderArtPlugin};
