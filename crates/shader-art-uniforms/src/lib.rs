//! Binds `<uniform>` declarations on a `<shader-art>` host to program
//! uniforms, with a live debug control for each.
//!
//! ```html
//! <shader-art>
//!   <uniform type="float" name="speed" value="0.5" min="0" max="2" />
//!   <uniform type="color" name="tint" value="#ff8800" />
//!   <uniform type="vec2" name="offset" value="0,0" no-gui />
//! </shader-art>
//! ```
//!
//! [`UniformBinder`] is a [`ShaderArtPlugin`]: the host calls `setup` once
//! the program is linked and `dispose` on disconnect. Every declaration is
//! parsed into the shared [`ParameterStore`], uploaded once, and given a
//! control on a panel obtained from a [`PanelFactory`]. Control edits write
//! the store and re-upload through the same graphics context.
//!
//! ```rust,ignore
//! let factory = DebugPanelFactory::new();
//! let mut art = ShaderArt::from_markup(src)?
//!     .plugin({
//!         let factory = factory.clone();
//!         move || UniformBinder::new(factory.clone())
//!     });
//! art.connect(|program| Ok(Rc::new(UniformBlock::new(program)) as Rc<dyn GraphicsContext>))?;
//! factory.last().unwrap().set_number("speed", None, 1.5);
//! ```
//!
//! [`ShaderArtPlugin`]: shader_art_engine::host::ShaderArtPlugin

pub mod binder;
pub mod color;
pub mod descriptor;
pub mod number;
pub mod panel;
pub mod store;
pub mod value;

pub use binder::{BinderConfig, UniformBinder};
pub use descriptor::{UniformDescriptor, UniformType};
pub use panel::{ControlGroup, ControlKind, ControlPanel, DebugPanel, DebugPanelFactory, PanelFactory};
pub use store::{ParameterStore, SharedStore};
pub use value::{Axis, UniformValue};

#[cfg(test)]
mod host_tests {
    use std::rc::Rc;

    use shader_art_engine::gfx::{GraphicsContext, UniformBlock};
    use shader_art_engine::host::ShaderArt;

    use super::*;

    const MARKUP: &str = r##"
        <shader-art autoplay>
            <script type="vert">
                attribute vec4 position;
                void main() { gl_Position = position; }
            </script>
            <script type="frag">
                precision highp float;
                uniform float speed;
                uniform vec3 tint;
                void main() { gl_FragColor = vec4(tint * speed, 1.0); }
            </script>
            <uniform type="float" name="speed" value="0.5" min="0" max="2" />
            <uniform type="color" name="tint" value="#ff0000" />
        </shader-art>
    "##;

    #[test]
    fn binder_runs_inside_a_connected_host() {
        let factory = DebugPanelFactory::new();
        let plugin_factory = factory.clone();
        let mut art = ShaderArt::from_markup(MARKUP)
            .unwrap()
            .plugin(move || UniformBinder::new(plugin_factory.clone()));

        let mut block: Option<Rc<UniformBlock>> = None;
        art.connect(|program| {
            let b = Rc::new(UniformBlock::new(program));
            block = Some(Rc::clone(&b));
            Ok(b as Rc<dyn GraphicsContext>)
        })
        .unwrap();
        let block = block.unwrap();

        assert!(art.is_initialized());
        assert_eq!(art.active_plugins()[0].name(), "UniformPlugin");
        assert_eq!(block.read_f32s("speed"), Some(vec![0.5]));
        assert_eq!(block.read_f32s("tint"), Some(vec![1.0, 0.0, 0.0]));

        let panel = factory.last().unwrap();
        assert!(panel.set_number("speed", None, 1.25));
        assert_eq!(block.read_f32s("speed"), Some(vec![1.25]));

        art.disconnect();
        assert_eq!(panel.destroy_count(), 1);
        assert!(!panel.set_number("speed", None, 2.0));
        assert_eq!(block.read_f32s("speed"), Some(vec![1.25]));
    }
}
