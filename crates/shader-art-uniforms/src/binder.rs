use std::rc::{Rc, Weak};

use shader_art_engine::gfx::{GraphicsContext, Program, UniformLocation};
use shader_art_engine::host::{Canvas, PluginReady, ShaderArtPlugin};
use shader_art_markup::Element;

use crate::color::hex_to_rgb;
use crate::descriptor::{UniformDescriptor, UniformType};
use crate::panel::{Binding, ControlKind, ControlPanel, OnChange, PanelFactory};
use crate::store::{ParameterStore, SharedStore};
use crate::value::UniformValue;

/// Tunables for control creation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinderConfig {
    /// Step of `float` controls and of every vector axis when `step` is unset.
    pub float_step: f64,
    /// Step of `int` controls when `step` is unset.
    pub int_step: f64,
    /// Expand vector folders as they are created.
    pub open_folders: bool,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self { float_step: 0.01, int_step: 1.0, open_folders: true }
    }
}

/// Live state of one binding session, from `setup` to `dispose`.
struct Session {
    store: SharedStore,
    panel: Box<dyn ControlPanel>,
}

/// Binds the `<uniform>` children of a shader host to program uniforms.
///
/// On setup every declaration is parsed into the parameter store, uploaded
/// once, and, unless marked `no-gui`, given a control whose edits re-upload
/// the value. Dispose destroys the panel and drops the store; callbacks only
/// hold a weak reference to it, so any that outlive the session do nothing.
pub struct UniformBinder<F: PanelFactory> {
    factory: F,
    config: BinderConfig,
    session: Option<Session>,
}

impl<F: PanelFactory> UniformBinder<F> {
    pub const NAME: &'static str = "UniformPlugin";

    pub fn new(factory: F) -> Self {
        Self::with_config(factory, BinderConfig::default())
    }

    pub fn with_config(factory: F, config: BinderConfig) -> Self {
        Self { factory, config, session: None }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// The parameter store of the live session.
    pub fn params(&self) -> Option<&SharedStore> {
        self.session.as_ref().map(|s| &s.store)
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// Runs one binding pass over `host`, replacing any previous session.
    pub fn bind(&mut self, host: &Element, gl: &Rc<dyn GraphicsContext>, program: &Program) {
        self.end_session();

        let store = ParameterStore::shared();
        let mut panel = self.factory.create();

        for desc in UniformDescriptor::collect(host) {
            let value = desc.initial_value();
            if !store.borrow_mut().insert(desc.name.as_str(), value.clone()) {
                log::warn!("uniform '{}' declared twice; keeping the first declaration", desc.name);
                continue;
            }

            let location = gl.uniform_location(program, &desc.name);
            upload(gl.as_ref(), location.as_ref(), desc.ty, &value);
            log::debug!("bound uniform '{}' ({}) = {value}", desc.name, desc.ty);

            if desc.no_gui {
                continue;
            }
            let on_change = change_callback(&store, gl, location, &desc);
            self.add_controls(panel.as_mut(), &store, &desc, &value, on_change);
        }

        log::debug!("uniform session started with {} uniforms", store.borrow().len());
        self.session = Some(Session { store, panel });
    }

    fn add_controls(
        &self,
        panel: &mut dyn ControlPanel,
        store: &SharedStore,
        desc: &UniformDescriptor,
        value: &UniformValue,
        on_change: OnChange,
    ) {
        match desc.ty {
            UniformType::Float | UniformType::Int => {
                let default_step = match desc.ty {
                    UniformType::Int => self.config.int_step,
                    _ => self.config.float_step,
                };
                let kind = ControlKind::Number { range: desc.range(), step: desc.step_or(default_step) };
                let id = panel.add(Binding::new(store, desc.name.as_str(), None), kind);
                panel.on_change(id, on_change);
            }
            UniformType::Color => {
                let id = panel.add(Binding::new(store, desc.name.as_str(), None), ControlKind::Color);
                panel.on_change(id, on_change);
            }
            UniformType::Vec2 | UniformType::Vec3 | UniformType::Vec4 => {
                let mut folder = panel.add_folder(&desc.name);
                let kind = ControlKind::Number { range: None, step: self.config.float_step };
                for &axis in value.axes() {
                    let id = folder.add(Binding::new(store, desc.name.as_str(), Some(axis)), kind);
                    folder.on_change(id, Rc::clone(&on_change));
                }
                if self.config.open_folders {
                    folder.open();
                }
            }
        }
    }

    fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.panel.destroy();
            log::debug!("uniform session ended");
        }
    }
}

impl<F: PanelFactory> ShaderArtPlugin for UniformBinder<F> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn setup(
        &mut self,
        host: &Element,
        gl: &Rc<dyn GraphicsContext>,
        program: &Program,
        _canvas: &Canvas,
    ) -> Option<PluginReady> {
        self.bind(host, gl, program);
        None
    }

    fn dispose(&mut self) {
        self.end_session();
    }
}

impl<F: PanelFactory> Drop for UniformBinder<F> {
    fn drop(&mut self) {
        self.end_session();
    }
}

/// Re-reads the store entry and uploads it. One callback per uniform; every
/// axis control of a vector shares it.
fn change_callback(
    store: &SharedStore,
    gl: &Rc<dyn GraphicsContext>,
    location: Option<UniformLocation>,
    desc: &UniformDescriptor,
) -> OnChange {
    let store: Weak<_> = Rc::downgrade(store);
    let gl = Rc::clone(gl);
    let name = desc.name.clone();
    let ty = desc.ty;
    Rc::new(move || {
        let Some(store) = store.upgrade() else { return };
        let Some(value) = store.borrow().get(&name).cloned() else { return };
        upload(gl.as_ref(), location.as_ref(), ty, &value);
    })
}

/// Issues exactly one upload call for `value`.
fn upload(gl: &dyn GraphicsContext, location: Option<&UniformLocation>, ty: UniformType, value: &UniformValue) {
    log::trace!("upload {ty} {value}");
    match (ty, value) {
        (UniformType::Float, UniformValue::Number(v)) => gl.uniform1f(location, *v as f32),
        (UniformType::Int, UniformValue::Number(v)) => gl.uniform1i(location, v.floor() as i32),
        (UniformType::Color, UniformValue::Color(hex)) => gl.uniform3fv(location, hex_to_rgb(hex)),
        (UniformType::Vec2, UniformValue::Vec2 { x, y }) => gl.uniform2fv(location, [*x as f32, *y as f32]),
        (UniformType::Vec3, UniformValue::Vec3 { x, y, z }) => {
            gl.uniform3fv(location, [*x as f32, *y as f32, *z as f32])
        }
        (UniformType::Vec4, UniformValue::Vec4 { x, y, z, w }) => {
            gl.uniform4fv(location, [*x as f32, *y as f32, *z as f32, *w as f32])
        }
        (ty, value) => log::warn!("value {value} does not fit uniform type {ty}"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use shader_art_engine::gfx::UniformBlock;
    use shader_art_markup::parse_str;

    use super::*;
    use crate::panel::{DebugPanel, DebugPanelFactory};
    use crate::value::Axis;

    const FRAG: &str = "
        precision mediump float;
        uniform float testFloat;
        uniform int testInt;
        uniform vec3 testColor;
        uniform vec2 testVec2;
        uniform vec3 testVec3;
        uniform vec4 testVec4;
    ";

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        F1(f32),
        I1(i32),
        V2([f32; 2]),
        V3([f32; 3]),
        V4([f32; 4]),
    }

    /// Records every upload together with its location.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(Option<UniformLocation>, Call)>>,
    }

    impl Recorder {
        fn calls_to(&self, location: Option<UniformLocation>) -> Vec<Call> {
            self.calls.borrow().iter().filter(|(l, _)| *l == location).map(|(_, c)| c.clone()).collect()
        }

        fn len(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl GraphicsContext for Recorder {
        fn uniform1f(&self, location: Option<&UniformLocation>, x: f32) {
            self.calls.borrow_mut().push((location.copied(), Call::F1(x)));
        }

        fn uniform1i(&self, location: Option<&UniformLocation>, x: i32) {
            self.calls.borrow_mut().push((location.copied(), Call::I1(x)));
        }

        fn uniform2fv(&self, location: Option<&UniformLocation>, v: [f32; 2]) {
            self.calls.borrow_mut().push((location.copied(), Call::V2(v)));
        }

        fn uniform3fv(&self, location: Option<&UniformLocation>, v: [f32; 3]) {
            self.calls.borrow_mut().push((location.copied(), Call::V3(v)));
        }

        fn uniform4fv(&self, location: Option<&UniformLocation>, v: [f32; 4]) {
            self.calls.borrow_mut().push((location.copied(), Call::V4(v)));
        }
    }

    struct Fixture {
        host: Element,
        program: Program,
        recorder: Rc<Recorder>,
        gl: Rc<dyn GraphicsContext>,
        factory: DebugPanelFactory,
        binder: UniformBinder<DebugPanelFactory>,
    }

    impl Fixture {
        fn new(uniforms: &str) -> Self {
            let doc = parse_str(&format!("<shader-art>{uniforms}</shader-art>")).unwrap();
            let host = doc.first("shader-art").unwrap().clone();
            let recorder = Rc::new(Recorder::default());
            let gl: Rc<dyn GraphicsContext> = recorder.clone();
            let factory = DebugPanelFactory::new();
            let binder = UniformBinder::new(factory.clone());
            Self { host, program: Program::link("", FRAG), recorder, gl, factory, binder }
        }

        fn setup(&mut self) -> Option<PluginReady> {
            self.binder.setup(&self.host, &self.gl, &self.program, &Canvas::default())
        }

        fn panel(&self) -> DebugPanel {
            self.factory.last().unwrap()
        }

        fn param(&self, name: &str) -> Option<UniformValue> {
            self.binder.params()?.borrow().get(name).cloned()
        }

        fn calls(&self, name: &str) -> Vec<Call> {
            self.recorder.calls_to(self.program.location(name))
        }
    }

    const ALL_SIX: &str = r##"
        <uniform type="float" name="testFloat" value="123." />
        <uniform type="int" name="testInt" value="16" />
        <uniform type="color" name="testColor" value="#ff00ff" />
        <uniform type="vec2" name="testVec2" value="1,2" />
        <uniform type="vec3" name="testVec3" value="1,2,3" />
        <uniform type="vec4" name="testVec4" value="1,2,3,4" />
    "##;

    #[test]
    fn end_to_end_six_uniforms() {
        let mut fx = Fixture::new(ALL_SIX);
        assert!(fx.setup().is_none());

        let store = fx.binder.params().unwrap().borrow().clone();
        let names: Vec<_> = store.names().collect();
        assert_eq!(names, ["testFloat", "testInt", "testColor", "testVec2", "testVec3", "testVec4"]);
        assert_eq!(fx.param("testFloat"), Some(UniformValue::Number(123.0)));
        assert_eq!(fx.param("testInt"), Some(UniformValue::Number(16.0)));
        assert_eq!(fx.param("testColor"), Some(UniformValue::Color("#ff00ff".into())));
        assert_eq!(fx.param("testVec2"), Some(UniformValue::Vec2 { x: 1.0, y: 2.0 }));
        assert_eq!(fx.param("testVec3"), Some(UniformValue::Vec3 { x: 1.0, y: 2.0, z: 3.0 }));
        assert_eq!(fx.param("testVec4"), Some(UniformValue::Vec4 { x: 1.0, y: 2.0, z: 3.0, w: 4.0 }));

        // one root control per scalar/color, one folder plus one control per axis per vector
        let panel = fx.panel();
        let controls = panel.controls();
        assert_eq!(controls.iter().filter(|c| c.folder.is_none()).count(), 3);
        let folders: Vec<_> = panel.folders().into_iter().map(|f| (f.label, f.open)).collect();
        assert_eq!(
            folders,
            [("testVec2".to_string(), true), ("testVec3".to_string(), true), ("testVec4".to_string(), true)]
        );
        assert_eq!(controls.len(), 3 + 2 + 3 + 4);
        assert!(controls.iter().all(|c| c.listeners == 1));

        // initial uploads, one per uniform
        assert_eq!(fx.recorder.len(), 6);
        assert_eq!(fx.calls("testFloat"), [Call::F1(123.0)]);
        assert_eq!(fx.calls("testInt"), [Call::I1(16)]);
        assert_eq!(fx.calls("testColor"), [Call::V3([1.0, 0.0, 1.0])]);
        assert_eq!(fx.calls("testVec2"), [Call::V2([1.0, 2.0])]);
        assert_eq!(fx.calls("testVec3"), [Call::V3([1.0, 2.0, 3.0])]);
        assert_eq!(fx.calls("testVec4"), [Call::V4([1.0, 2.0, 3.0, 4.0])]);
    }

    #[test]
    fn edits_reupload_exactly_once() {
        let mut fx = Fixture::new(ALL_SIX);
        fx.setup();
        let panel = fx.panel();

        assert!(panel.set_number("testFloat", None, 0.5));
        assert!(panel.set_color("testColor", "#000000"));
        assert!(panel.set_number("testVec3", Some(Axis::Z), 9.0));

        assert_eq!(fx.recorder.len(), 6 + 3);
        assert_eq!(fx.calls("testFloat"), [Call::F1(123.0), Call::F1(0.5)]);
        assert_eq!(fx.calls("testColor"), [Call::V3([1.0, 0.0, 1.0]), Call::V3([0.0, 0.0, 0.0])]);
        assert_eq!(fx.calls("testVec3").last(), Some(&Call::V3([1.0, 2.0, 9.0])));
        assert_eq!(fx.param("testVec3"), Some(UniformValue::Vec3 { x: 1.0, y: 2.0, z: 9.0 }));
    }

    #[test]
    fn int_edits_use_integer_path_and_floor() {
        let mut fx = Fixture::new(r#"<uniform type="int" name="testInt" value="16" />"#);
        fx.setup();
        assert!(fx.panel().set_number("testInt", None, 2.7));
        assert!(fx.panel().set_number("testInt", None, -0.5));
        assert_eq!(fx.calls("testInt"), [Call::I1(16), Call::I1(2), Call::I1(-1)]);
        assert!(fx.recorder.calls.borrow().iter().all(|(_, c)| matches!(c, Call::I1(_))));
    }

    #[test]
    fn malformed_color_uploads_black() {
        let mut fx = Fixture::new(r##"<uniform type="color" name="testColor" value="#FF00FF" />"##);
        fx.setup();
        assert_eq!(fx.param("testColor"), Some(UniformValue::Color("#FF00FF".into())));
        assert_eq!(fx.calls("testColor"), [Call::V3([0.0, 0.0, 0.0])]);
    }

    #[test]
    fn no_gui_uploads_without_controls() {
        let mut fx = Fixture::new(
            r#"
            <uniform type="float" name="testFloat" value="1" no-gui />
            <uniform type="vec2" name="testVec2" value="1,2" no-gui />
            "#,
        );
        fx.setup();
        let panel = fx.panel();
        assert!(panel.controls().is_empty());
        assert!(panel.folders().is_empty());
        assert_eq!(fx.calls("testFloat"), [Call::F1(1.0)]);
        assert_eq!(fx.calls("testVec2"), [Call::V2([1.0, 2.0])]);
        assert_eq!(fx.param("testVec2"), Some(UniformValue::Vec2 { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn incomplete_declarations_are_skipped() {
        let mut fx = Fixture::new(
            r#"
            <uniform type="float" value="1" />
            <uniform name="testFloat" value="1" />
            <uniform name="testInt" type="" />
            <uniform name="testVec2" type="mat2" />
            <div><uniform type="float" name="nested" /></div>
            "#,
        );
        fx.setup();
        assert!(fx.binder.params().unwrap().borrow().is_empty());
        assert!(fx.panel().controls().is_empty());
        assert_eq!(fx.recorder.len(), 0);
    }

    #[test]
    fn range_and_step_registration() {
        let mut fx = Fixture::new(
            r#"
            <uniform type="float" name="testFloat" min="0" max="200" step="0.5" />
            <uniform type="int" name="testInt" min="0" />
            <uniform type="float" name="loose" min="a" max="1" />
            "#,
        );
        fx.setup();
        let kinds: Vec<_> = fx.panel().controls().into_iter().map(|c| (c.key, c.kind)).collect();
        assert_eq!(
            kinds,
            [
                ("testFloat".to_string(), ControlKind::Number { range: Some((0.0, 200.0)), step: 0.5 }),
                ("testInt".to_string(), ControlKind::Number { range: None, step: 1.0 }),
                ("loose".to_string(), ControlKind::Number { range: None, step: 0.01 }),
            ]
        );
        // bounded control clamps edits
        assert!(fx.panel().set_number("testFloat", None, 500.0));
        assert_eq!(fx.param("testFloat"), Some(UniformValue::Number(200.0)));
    }

    #[test]
    fn missing_location_is_silent() {
        let mut fx = Fixture::new(r#"<uniform type="float" name="undeclared" value="2" />"#);
        fx.setup();
        assert_eq!(fx.param("undeclared"), Some(UniformValue::Number(2.0)));
        assert_eq!(fx.recorder.calls_to(None), [Call::F1(2.0)]);
    }

    #[test]
    fn duplicate_names_keep_the_first() {
        let mut fx = Fixture::new(
            r#"
            <uniform type="float" name="testFloat" value="1" />
            <uniform type="float" name="testFloat" value="2" />
            "#,
        );
        fx.setup();
        assert_eq!(fx.param("testFloat"), Some(UniformValue::Number(1.0)));
        assert_eq!(fx.panel().controls().len(), 1);
        assert_eq!(fx.calls("testFloat"), [Call::F1(1.0)]);
    }

    #[test]
    fn dispose_before_setup_is_a_no_op() {
        let mut fx = Fixture::new(ALL_SIX);
        fx.binder.dispose();
        assert!(fx.factory.panels().is_empty());
        assert!(fx.binder.params().is_none());
    }

    #[test]
    fn dispose_destroys_the_panel_exactly_once() {
        let mut fx = Fixture::new(ALL_SIX);
        fx.setup();
        let panel = fx.panel();
        fx.binder.dispose();
        fx.binder.dispose();
        assert_eq!(panel.destroy_count(), 1);
        assert!(fx.binder.params().is_none());
        assert!(!fx.binder.is_bound());

        // edits after dispose reach nothing
        let uploads = fx.recorder.len();
        assert!(!panel.set_number("testFloat", None, 1.0));
        assert_eq!(fx.recorder.len(), uploads);
    }

    #[test]
    fn setup_again_starts_a_fresh_session() {
        let mut fx = Fixture::new(ALL_SIX);
        fx.setup();
        let first = fx.panel();
        fx.binder.params().unwrap().borrow_mut().set_number("testFloat", 7.0);

        fx.setup();
        assert_eq!(first.destroy_count(), 1);
        assert_eq!(fx.factory.panels().len(), 2);
        assert_eq!(fx.param("testFloat"), Some(UniformValue::Number(123.0)));
        assert!(!fx.panel().is_destroyed());
    }

    #[test]
    fn callbacks_outliving_the_store_do_nothing() {
        let store = ParameterStore::shared();
        store.borrow_mut().insert("testFloat", UniformValue::Number(1.0));
        let recorder = Rc::new(Recorder::default());
        let gl: Rc<dyn GraphicsContext> = recorder.clone();
        let program = Program::link("", FRAG);
        let desc = UniformDescriptor::from_element(
            &Element::new("uniform").with_attr("name", "testFloat").with_attr("type", "float"),
        )
        .unwrap();

        let callback = change_callback(&store, &gl, program.location("testFloat"), &desc);
        callback();
        drop(store);
        callback();
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn writes_through_to_a_uniform_block() {
        let mut fx = Fixture::new(ALL_SIX);
        let block = Rc::new(UniformBlock::new(&fx.program));
        fx.gl = block.clone();
        fx.setup();

        assert_eq!(block.read_f32s("testFloat"), Some(vec![123.0]));
        assert_eq!(block.read_i32("testInt"), Some(16));
        assert_eq!(block.read_f32s("testColor"), Some(vec![1.0, 0.0, 1.0]));
        assert_eq!(block.read_f32s("testVec4"), Some(vec![1.0, 2.0, 3.0, 4.0]));

        assert!(fx.panel().set_number("testVec2", Some(Axis::X), 4.0));
        assert_eq!(block.read_f32s("testVec2"), Some(vec![4.0, 2.0]));
        assert_eq!(block.upload_count(), 7);
    }

    #[test]
    fn custom_steps() {
        let config = BinderConfig { float_step: 0.1, int_step: 5.0, open_folders: false };
        let mut fx = Fixture::new(
            r#"
            <uniform type="float" name="testFloat" />
            <uniform type="int" name="testInt" />
            <uniform type="vec2" name="testVec2" step="3" />
            "#,
        );
        fx.binder = UniformBinder::with_config(fx.factory.clone(), config);
        fx.setup();
        let steps: Vec<_> = fx
            .panel()
            .controls()
            .into_iter()
            .map(|c| match c.kind {
                ControlKind::Number { step, .. } => step,
                ControlKind::Color => 0.0,
            })
            .collect();
        assert_eq!(steps, [0.1, 5.0, 0.1, 0.1]);
        assert!(fx.panel().folders().iter().all(|f| !f.open));
    }

    #[test]
    fn plugin_name() {
        let fx = Fixture::new("");
        assert_eq!(fx.binder.name(), "UniformPlugin");
    }
}
