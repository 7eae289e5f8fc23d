//! Form state container and the export canonicalization used for share links.

use configurator_schema::FormState;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ConfiguratorResult;

/// Reduced, renamed state handed to the block through the share link.
pub type ExportShape = BTreeMap<String, String>;

/// Change listener. Receives the full state after every change.
pub type Listener = Arc<dyn Fn(&FormState) -> ConfiguratorResult<()> + Send + Sync>;

/// A change that has been applied to the container but not yet announced.
///
/// Carries a snapshot of the new state and the listeners to tell, so it can be
/// dispatched after whatever lock guards the container is released.
pub struct Notification {
    state: FormState,
    listeners: Vec<Listener>,
}

impl Notification {
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Run every listener against the snapshot, in registration order. All
    /// listeners run; the first error is returned.
    pub fn dispatch(self) -> ConfiguratorResult<()> {
        let mut first_err = None;
        for listener in &self.listeners {
            if let Err(e) = listener(&self.state) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Holds the live [`FormState`] and notifies listeners when it changes.
///
/// Listeners run synchronously, in registration order, on the thread that made
/// the change. The `stage_*` methods apply a change and hand back the
/// [`Notification`] instead of running it.
#[derive(Default)]
pub struct StateContainer {
    state: FormState,
    listeners: Vec<Listener>,
}

impl StateContainer {
    pub fn new(initial: FormState) -> Self {
        Self {
            state: initial,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Update one field. `prop` is lowercased before lookup.
    ///
    /// Only keys already present (declared by the schema) can be set. Returns
    /// whether the state changed; listeners run only on a change.
    pub fn set(&mut self, prop: &str, value: impl Into<String>) -> ConfiguratorResult<bool> {
        dispatch_staged(self.stage_set(prop, value))
    }

    /// Swap in a whole new state, notifying if it differs.
    pub fn replace(&mut self, state: FormState) -> ConfiguratorResult<bool> {
        dispatch_staged(self.stage_replace(state))
    }

    /// Like [`StateContainer::set`], but returns the pending notification.
    pub fn stage_set(&mut self, prop: &str, value: impl Into<String>) -> Option<Notification> {
        let key = prop.to_lowercase();
        let value = value.into();
        match self.state.get_mut(&key) {
            None => {
                tracing::warn!("ignoring edit of undeclared field '{}'", key);
                None
            }
            Some(current) if *current == value => None,
            Some(current) => {
                *current = value;
                Some(self.pending())
            }
        }
    }

    /// Like [`StateContainer::replace`], but returns the pending notification.
    pub fn stage_replace(&mut self, state: FormState) -> Option<Notification> {
        if self.state == state {
            return None;
        }
        self.state = state;
        Some(self.pending())
    }

    /// Run every listener against the current state.
    pub fn notify(&self) -> ConfiguratorResult<()> {
        self.pending().dispatch()
    }

    fn pending(&self) -> Notification {
        Notification {
            state: self.state.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

/// Dispatch a staged change. Returns whether there was one.
pub fn dispatch_staged(staged: Option<Notification>) -> ConfiguratorResult<bool> {
    match staged {
        Some(notification) => {
            notification.dispatch()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Initial state at mount: schema defaults, then previously saved values, then
/// values carried by a shared link. Only keys the schema declares are taken
/// from either source; a shared link wins over saved state.
pub fn initial_state(
    defaults: &FormState,
    persisted: Option<&FormState>,
    shared: Option<&FormState>,
) -> FormState {
    let mut state = defaults.clone();
    for source in [persisted, shared].into_iter().flatten() {
        for (key, value) in state.iter_mut() {
            if let Some(incoming) = source.get(key) {
                value.clone_from(incoming);
            }
        }
    }
    state
}

/// Turns raw form state into the shape the block reads from its link.
pub trait Canonicalize: Send + Sync {
    fn canonicalize(&self, state: &FormState) -> ConfiguratorResult<ExportShape>;

    /// Best-effort inverse: form state keys for a decoded export shape.
    /// Values dropped by canonicalization are not recovered.
    fn restore(&self, shape: &ExportShape) -> FormState {
        shape.clone()
    }
}

/// Drops empty values and renames keys.
///
/// Rename chains (`a -> b`, `b -> c`) are cut at construction so that applying
/// the reform to its own output changes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateReform {
    renames: BTreeMap<String, String>,
}

impl StateReform {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        let chained: Vec<String> = renames
            .iter()
            .filter(|(from, to)| from != to && renames.contains_key(*to))
            .map(|(from, _)| from.clone())
            .collect();
        let mut renames = renames;
        for from in chained {
            tracing::warn!("dropping chained rename of '{}'", from);
            renames.remove(&from);
        }
        Self { renames }
    }
}

impl Canonicalize for StateReform {
    fn canonicalize(&self, state: &FormState) -> ConfiguratorResult<ExportShape> {
        Ok(state
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| {
                let key = self.renames.get(key).unwrap_or(key);
                (key.clone(), value.clone())
            })
            .collect())
    }

    fn restore(&self, shape: &ExportShape) -> FormState {
        let mut inverse: BTreeMap<&str, &str> = BTreeMap::new();
        for (from, to) in &self.renames {
            inverse.entry(to.as_str()).or_insert(from.as_str());
        }
        shape
            .iter()
            .map(|(key, value)| {
                let key = inverse.get(key.as_str()).copied().unwrap_or(key.as_str());
                (key.to_string(), value.clone())
            })
            .collect()
    }
}
