//! Resolution and rebound listeners.

use std::sync::Arc;

use crate::constructor::TypeTable;
use crate::container::{Container, ResolverContext};
use crate::internal::Map;
use crate::registration::AnyArc;

/// Listener fired while an abstract is being resolved.
pub type CallbackFn = Arc<dyn Fn(&AnyArc, &mut ResolverContext<'_>) + Send + Sync>;

/// Listener fired with the fresh instance after a binding is replaced.
pub type ReboundFn = Arc<dyn Fn(&Container, &AnyArc) + Send + Sync>;

#[derive(Default)]
pub(crate) struct CallbackRegistry {
    global_resolving: Vec<CallbackFn>,
    resolving: Vec<(String, Vec<CallbackFn>)>,
    global_after: Vec<CallbackFn>,
    after: Vec<(String, Vec<CallbackFn>)>,
    rebound: Map<String, Vec<ReboundFn>>,
}

/// Which tier a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Resolving,
    AfterResolving,
}

fn push_typed(list: &mut Vec<(String, Vec<CallbackFn>)>, key: String, callback: CallbackFn) {
    match list.iter_mut().find(|(k, _)| *k == key) {
        Some((_, callbacks)) => callbacks.push(callback),
        None => list.push((key, vec![callback])),
    }
}

impl CallbackRegistry {
    pub(crate) fn add(&mut self, phase: Phase, key: Option<String>, callback: CallbackFn) {
        match (phase, key) {
            (Phase::Resolving, None) => self.global_resolving.push(callback),
            (Phase::Resolving, Some(key)) => push_typed(&mut self.resolving, key, callback),
            (Phase::AfterResolving, None) => self.global_after.push(callback),
            (Phase::AfterResolving, Some(key)) => push_typed(&mut self.after, key, callback),
        }
    }

    pub(crate) fn add_rebound(&mut self, key: String, callback: ReboundFn) {
        self.rebound.entry(key).or_default().push(callback);
    }

    pub(crate) fn rebound_for(&self, key: &str) -> Vec<ReboundFn> {
        self.rebound.get(key).cloned().unwrap_or_default()
    }

    /// Listeners matching one resolution, in firing order: global resolving,
    /// typed resolving, global after-resolving, typed after-resolving.
    ///
    /// A typed listener matches on the canonical abstract or when the
    /// instance is an instance of the registered type.
    pub(crate) fn matching(&self, key: &str, instance: &AnyArc, types: &TypeTable) -> Vec<CallbackFn> {
        let typed = |list: &[(String, Vec<CallbackFn>)]| -> Vec<CallbackFn> {
            list.iter()
                .filter(|(ty, _)| ty == key || types.is_instance_of(instance, ty))
                .flat_map(|(_, callbacks)| callbacks.iter().cloned())
                .collect()
        };

        let mut out = self.global_resolving.clone();
        out.extend(typed(&self.resolving));
        out.extend(self.global_after.iter().cloned());
        out.extend(typed(&self.after));
        out
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.global_resolving.is_empty()
            && self.resolving.is_empty()
            && self.global_after.is_empty()
            && self.after.is_empty()
    }
}
