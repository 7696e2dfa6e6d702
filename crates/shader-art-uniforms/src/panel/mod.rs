//! Control-panel seam between the binder and whatever renders the controls.
//!
//! The binder only talks to these traits. [`DebugPanel`] is the in-tree
//! implementation: a retained, headless model of the panel that a UI layer
//! can draw and that tests drive directly.

mod debug;

use std::fmt;
use std::rc::Rc;

pub use debug::{ControlInfo, DebugFolder, DebugPanel, DebugPanelFactory, FolderInfo};

use crate::store::SharedStore;
use crate::value::{Axis, UniformValue};

/// Change listener. Shared so one callback can serve every axis of a vector.
pub type OnChange = Rc<dyn Fn()>;

/// Handle to a control inside the panel that created it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ControlId(pub usize);

/// What a control edits: one store entry, or one axis of a vector entry.
#[derive(Clone)]
pub struct Binding {
    pub store: SharedStore,
    pub key: String,
    pub axis: Option<Axis>,
}

impl Binding {
    pub fn new(store: &SharedStore, key: impl Into<String>, axis: Option<Axis>) -> Self {
        Self { store: Rc::clone(store), key: key.into(), axis }
    }

    /// Current numeric value behind the control.
    pub fn number(&self) -> Option<f64> {
        let store = self.store.borrow();
        let value = store.get(&self.key)?;
        match self.axis {
            Some(axis) => value.axis(axis),
            None => value.as_number(),
        }
    }

    pub fn color(&self) -> Option<String> {
        self.store.borrow().get(&self.key).and_then(UniformValue::as_color).map(str::to_string)
    }

    /// Writes a number through to the store. Returns `false` if the entry
    /// is gone or has a different shape.
    pub fn set_number(&self, value: f64) -> bool {
        let mut store = self.store.borrow_mut();
        match self.axis {
            Some(axis) => store.set_axis(&self.key, axis, value),
            None => store.set_number(&self.key, value),
        }
    }

    pub fn set_color(&self, hex: &str) -> bool {
        self.store.borrow_mut().set_color(&self.key, hex)
    }

    /// Display label: the axis name inside a vector folder, the key otherwise.
    pub fn label(&self) -> &str {
        self.axis.map_or(self.key.as_str(), |axis| axis.as_str())
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("key", &self.key).field("axis", &self.axis).finish()
    }
}

/// Widget shape for a bound value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlKind {
    /// Numeric input; a slider when `range` is set.
    Number { range: Option<(f64, f64)>, step: f64 },
    /// Color swatch editing a `#rrggbb` string.
    Color,
}

/// Registration surface shared by the panel root and its folders.
pub trait ControlGroup {
    /// Adds a control bound to `binding`.
    fn add(&mut self, binding: Binding, kind: ControlKind) -> ControlId;

    /// Adds a nested folder with the same registration methods.
    fn add_folder(&mut self, label: &str) -> Box<dyn ControlGroup>;

    /// Expands this group.
    fn open(&mut self);

    /// Registers a listener fired after every edit of control `id`.
    fn on_change(&mut self, id: ControlId, callback: OnChange);
}

/// A top-level panel.
pub trait ControlPanel: ControlGroup {
    /// Tears down every control and folder. Listeners are dropped and later
    /// edits are ignored.
    fn destroy(&mut self);
}

/// Creates one panel per binding session.
pub trait PanelFactory {
    fn create(&self) -> Box<dyn ControlPanel>;
}
