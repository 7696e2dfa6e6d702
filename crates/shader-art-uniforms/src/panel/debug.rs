use std::cell::RefCell;
use std::rc::Rc;

use super::{Binding, ControlGroup, ControlId, ControlKind, ControlPanel, OnChange, PanelFactory};
use crate::value::Axis;

struct Control {
    binding: Binding,
    kind: ControlKind,
    folder: Option<usize>,
    listeners: Vec<OnChange>,
}

struct Folder {
    label: String,
    parent: Option<usize>,
    open: bool,
}

#[derive(Default)]
struct PanelState {
    controls: Vec<Control>,
    folders: Vec<Folder>,
    destroyed: bool,
    destroy_count: usize,
}

impl PanelState {
    fn add(&mut self, folder: Option<usize>, binding: Binding, kind: ControlKind) -> ControlId {
        log::trace!("panel: add {:?} control for '{}'", kind, binding.key);
        self.controls.push(Control { binding, kind, folder, listeners: Vec::new() });
        ControlId(self.controls.len() - 1)
    }

    fn add_folder(&mut self, parent: Option<usize>, label: &str) -> usize {
        self.folders.push(Folder { label: label.to_string(), parent, open: false });
        self.folders.len() - 1
    }

    fn on_change(&mut self, id: ControlId, callback: OnChange) {
        match self.controls.get_mut(id.0) {
            Some(control) => control.listeners.push(callback),
            None => log::warn!("panel: listener for unknown control {id:?} dropped"),
        }
    }
}

/// Snapshot of one control, for rendering and inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInfo {
    pub id: ControlId,
    pub key: String,
    pub axis: Option<Axis>,
    pub label: String,
    pub kind: ControlKind,
    /// Current bound value as the widget would display it.
    pub value: String,
    /// Label of the enclosing folder, `None` at the panel root.
    pub folder: Option<String>,
    pub listeners: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInfo {
    pub label: String,
    pub parent: Option<String>,
    pub open: bool,
}

// ── DebugPanel ────────────────────────────────────────────────────────────

/// Retained, headless control panel.
///
/// Cloning yields another handle to the same panel, so a test or a UI layer
/// can keep one while the binder owns the boxed panel. Edits go through
/// [`set_number`](Self::set_number) and [`set_color`](Self::set_color), which
/// behave like a user moving a widget: the value is written to the bound
/// store entry, then the control's listeners run.
#[derive(Clone, Default)]
pub struct DebugPanel {
    state: Rc<RefCell<PanelState>>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> Vec<ControlInfo> {
        let state = self.state.borrow();
        state
            .controls
            .iter()
            .enumerate()
            .map(|(i, c)| ControlInfo {
                id: ControlId(i),
                key: c.binding.key.clone(),
                axis: c.binding.axis,
                label: c.binding.label().to_string(),
                kind: c.kind,
                value: Self::display_value(&c.binding, c.kind),
                folder: c.folder.map(|f| state.folders[f].label.clone()),
                listeners: c.listeners.len(),
            })
            .collect()
    }

    pub fn folders(&self) -> Vec<FolderInfo> {
        let state = self.state.borrow();
        state
            .folders
            .iter()
            .map(|f| FolderInfo {
                label: f.label.clone(),
                parent: f.parent.map(|p| state.folders[p].label.clone()),
                open: f.open,
            })
            .collect()
    }

    /// The control bound to `key` (and `axis`, inside a vector folder).
    pub fn find(&self, key: &str, axis: Option<Axis>) -> Option<ControlId> {
        self.state
            .borrow()
            .controls
            .iter()
            .position(|c| c.binding.key == key && c.binding.axis == axis)
            .map(ControlId)
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    /// How many times [`ControlPanel::destroy`] ran against a live panel.
    pub fn destroy_count(&self) -> usize {
        self.state.borrow().destroy_count
    }

    /// Simulates a numeric edit. The value is clamped to the control's range.
    /// Returns `false` when no numeric control matches.
    pub fn set_number(&self, key: &str, axis: Option<Axis>, value: f64) -> bool {
        let Some((binding, kind, listeners)) = self.lookup(key, axis) else {
            return false;
        };
        let ControlKind::Number { range, .. } = kind else {
            return false;
        };
        let value = range.map_or(value, |(min, max)| value.max(min).min(max));
        Self::commit(binding.set_number(value), &listeners)
    }

    /// Simulates picking a color. Returns `false` when no color control matches.
    pub fn set_color(&self, key: &str, hex: &str) -> bool {
        let Some((binding, ControlKind::Color, listeners)) = self.lookup(key, None) else {
            return false;
        };
        Self::commit(binding.set_color(hex), &listeners)
    }

    /// Clones what an edit needs so no panel borrow is held while listeners run.
    fn lookup(&self, key: &str, axis: Option<Axis>) -> Option<(Binding, ControlKind, Vec<OnChange>)> {
        let state = self.state.borrow();
        if state.destroyed {
            return None;
        }
        let control = state
            .controls
            .iter()
            .find(|c| c.binding.key == key && c.binding.axis == axis)?;
        Some((control.binding.clone(), control.kind, control.listeners.clone()))
    }

    fn display_value(binding: &Binding, kind: ControlKind) -> String {
        let value = match kind {
            ControlKind::Number { .. } => binding.number().map(|v| v.to_string()),
            ControlKind::Color => binding.color(),
        };
        value.unwrap_or_else(|| "-".to_string())
    }

    fn commit(written: bool, listeners: &[OnChange]) -> bool {
        if written {
            for listener in listeners {
                listener();
            }
        }
        written
    }
}

impl ControlGroup for DebugPanel {
    fn add(&mut self, binding: Binding, kind: ControlKind) -> ControlId {
        self.state.borrow_mut().add(None, binding, kind)
    }

    fn add_folder(&mut self, label: &str) -> Box<dyn ControlGroup> {
        let index = self.state.borrow_mut().add_folder(None, label);
        Box::new(DebugFolder { state: Rc::clone(&self.state), index })
    }

    /// The root is always expanded.
    fn open(&mut self) {}

    fn on_change(&mut self, id: ControlId, callback: OnChange) {
        self.state.borrow_mut().on_change(id, callback);
    }
}

impl ControlPanel for DebugPanel {
    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return;
        }
        // Dropping the controls drops their bindings and listeners.
        state.controls.clear();
        state.folders.clear();
        state.destroyed = true;
        state.destroy_count += 1;
        log::debug!("panel destroyed");
    }
}

/// A folder inside a [`DebugPanel`].
pub struct DebugFolder {
    state: Rc<RefCell<PanelState>>,
    index: usize,
}

impl ControlGroup for DebugFolder {
    fn add(&mut self, binding: Binding, kind: ControlKind) -> ControlId {
        self.state.borrow_mut().add(Some(self.index), binding, kind)
    }

    fn add_folder(&mut self, label: &str) -> Box<dyn ControlGroup> {
        let index = self.state.borrow_mut().add_folder(Some(self.index), label);
        Box::new(DebugFolder { state: Rc::clone(&self.state), index })
    }

    fn open(&mut self) {
        if let Some(folder) = self.state.borrow_mut().folders.get_mut(self.index) {
            folder.open = true;
        }
    }

    fn on_change(&mut self, id: ControlId, callback: OnChange) {
        self.state.borrow_mut().on_change(id, callback);
    }
}

// ── DebugPanelFactory ─────────────────────────────────────────────────────

/// Creates [`DebugPanel`]s and keeps a handle to each one.
#[derive(Clone, Default)]
pub struct DebugPanelFactory {
    created: Rc<RefCell<Vec<DebugPanel>>>,
}

impl DebugPanelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every panel created so far, oldest first.
    pub fn panels(&self) -> Vec<DebugPanel> {
        self.created.borrow().clone()
    }

    /// The most recently created panel.
    pub fn last(&self) -> Option<DebugPanel> {
        self.created.borrow().last().cloned()
    }
}

impl PanelFactory for DebugPanelFactory {
    fn create(&self) -> Box<dyn ControlPanel> {
        let panel = DebugPanel::new();
        self.created.borrow_mut().push(panel.clone());
        Box::new(panel)
    }
}
