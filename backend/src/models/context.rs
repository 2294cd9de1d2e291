//! Shared event context
//!
//! A `Context` is the state carrier handed to an event's action. Cloning a
//! `Context` does NOT copy its contents: every clone refers to the same
//! underlying map, so an action and the continuation events it schedules all
//! observe each other's writes.
//!
//! # Thread Safety
//!
//! Contexts are deliberately `!Send`. The kernel runs everything on one
//! logical thread and ordering comes from virtual time alone, so no locking is
//! performed. Do not hold a borrow from [`Context::with`] or
//! [`Context::with_mut`] across a call that runs other events.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, mutable `string -> value` map passed by reference through event chains
///
/// # Example
/// ```
/// use event_sim_core_rs::Context;
///
/// let ctx = Context::new();
/// let alias = ctx.clone();
/// alias.insert("interrupted", true);
///
/// assert_eq!(ctx.get_bool("interrupted"), Some(true));
/// assert!(ctx.shares_state_with(&alias));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Rc<RefCell<Map<String, Value>>>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().get(key).cloned()
    }

    /// Get a boolean flag, `None` if missing or not a boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.inner.borrow().get(key).and_then(Value::as_bool)
    }

    /// Store `value` under `key`, returning the previous value
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.borrow_mut().insert(key.into(), value.into())
    }

    /// Remove `key`, returning its value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.borrow_mut().remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Read the whole map in place
    pub fn with<T>(&self, f: impl FnOnce(&Map<String, Value>) -> T) -> T {
        f(&self.inner.borrow())
    }

    /// Mutate the whole map in place
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut Map<String, Value>) -> T) -> T {
        f(&mut self.inner.borrow_mut())
    }

    /// Detached copy of the current contents
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.borrow().clone()
    }

    /// Returns `true` if both handles refer to the same underlying map
    pub fn shares_state_with(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(map)),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map: Map<String, Value> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from(map)
    }
}

/// Contexts compare by contents, not by identity
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.shares_state_with(other) || *self.inner.borrow() == *other.inner.borrow()
    }
}
