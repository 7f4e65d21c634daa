use indexmap::IndexMap;

use crate::symbol::Function;

/// One level of the scope chain: variable bindings plus the functions
/// declared at this level.
struct Frame<V> {
  vars: IndexMap<String, V>,
  funcs: IndexMap<String, Function>,
}

impl<V> Frame<V> {
  fn new() -> Self {
    Frame {
      vars: IndexMap::new(),
      funcs: IndexMap::new(),
    }
  }
}

/// A chain of frames with innermost-out lookup. The binder walks it with
/// types, the evaluator with values; the shape is the same.
pub struct Scope<V> {
  frames: Vec<Frame<V>>,
}

impl<V> Scope<V> {
  /// A scope with its global frame already in place.
  pub fn new() -> Self {
    Scope {
      frames: vec![Frame::new()],
    }
  }

  pub fn push(&mut self) {
    self.frames.push(Frame::new());
  }

  pub fn pop(&mut self) {
    self.frames.pop();
    assert!(!self.frames.is_empty(), "scope stack underflow");
  }

  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  pub fn get(&self, name: &str) -> Option<&V> {
    self.frames.iter().rev().find_map(|f| f.vars.get(name))
  }

  fn get_mut(&mut self, name: &str) -> Option<&mut V> {
    self.frames.iter_mut().rev().find_map(|f| f.vars.get_mut(name))
  }

  /// True if the innermost frame already declares `name`.
  pub fn declared_here(&self, name: &str) -> bool {
    self.frames.last().unwrap().vars.contains_key(name)
  }

  /// Bind `name` in the innermost frame, shadowing any outer binding.
  pub fn declare(&mut self, name: impl Into<String>, value: V) {
    self.frames.last_mut().unwrap().vars.insert(name.into(), value);
  }

  /// Overwrite `name` in the innermost frame that declares it; if none does,
  /// bind it in the innermost frame.
  pub fn assign(&mut self, name: &str, value: V) {
    match self.get_mut(name) {
      Some(slot) => *slot = value,
      None => self.declare(name, value),
    }
  }

  pub fn declare_function(&mut self, func: Function) {
    self
      .frames
      .last_mut()
      .unwrap()
      .funcs
      .insert(func.name.clone(), func);
  }

  pub fn function(&self, name: &str) -> Option<&Function> {
    self.frames.iter().rev().find_map(|f| f.funcs.get(name))
  }
}

impl<V> Default for Scope<V> {
  fn default() -> Self {
    Self::new()
  }
}
