use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{Axis, UniformValue};

/// Shared between the binder, the panel controls and their callbacks.
pub type SharedStore = Rc<RefCell<ParameterStore>>;

/// Uniform name → current value, iterated in insertion order.
///
/// The store is the single source of truth for bound values: controls edit
/// it and change callbacks read it back before uploading.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParameterStore {
    values: HashMap<String, UniformValue>,
    order: Vec<String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Inserts a value. Returns `false` and leaves the store unchanged if
    /// `name` is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: UniformValue) -> bool {
        let name = name.into();
        if self.values.contains_key(&name) {
            return false;
        }
        self.order.push(name.clone());
        self.values.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut UniformValue> {
        self.values.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.order.clear();
    }

    /// Replaces a numeric value. Returns `false` if `name` is missing or not numeric.
    pub fn set_number(&mut self, name: &str, value: f64) -> bool {
        match self.values.get_mut(name) {
            Some(UniformValue::Number(v)) => {
                *v = value;
                true
            }
            _ => false,
        }
    }

    /// Replaces a color value. Returns `false` if `name` is missing or not a color.
    pub fn set_color(&mut self, name: &str, hex: impl Into<String>) -> bool {
        match self.values.get_mut(name) {
            Some(UniformValue::Color(c)) => {
                *c = hex.into();
                true
            }
            _ => false,
        }
    }

    /// Replaces one axis of a vector value in place. Returns `false` if
    /// `name` is missing or has no such axis.
    pub fn set_axis(&mut self, name: &str, axis: Axis, value: f64) -> bool {
        match self.values.get_mut(name).and_then(|v| v.axis_mut(axis)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
