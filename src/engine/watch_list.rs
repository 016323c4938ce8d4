use super::demon::DemonId;
use super::domain_events::DomainEvent;
use super::domain_events::DomainEvents;
use crate::containers::KeyedVec;
use crate::variables::IntVar;

/// Per-variable, per-event lists of the demons to wake.
///
/// Demons attach while constraints are posted, before search starts, so the
/// lists themselves are not reversible state.
#[derive(Debug, Default)]
pub(crate) struct WatchList {
    watchers: KeyedVec<IntVar, Watcher>,
}

#[derive(Debug, Default)]
struct Watcher {
    lower_bound: Vec<DemonId>,
    upper_bound: Vec<DemonId>,
    assign: Vec<DemonId>,
    removal: Vec<DemonId>,
}

impl WatchList {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(Watcher::default());
    }

    pub(crate) fn watch(&mut self, var: IntVar, events: DomainEvents, demon: DemonId) {
        let watcher = &mut self.watchers[var];
        for event in events.get() {
            let list = match event {
                DomainEvent::Assign => &mut watcher.assign,
                DomainEvent::LowerBound => &mut watcher.lower_bound,
                DomainEvent::UpperBound => &mut watcher.upper_bound,
                DomainEvent::Removal => &mut watcher.removal,
            };
            if !list.contains(&demon) {
                list.push(demon);
            }
        }
    }

    pub(crate) fn affected(&self, var: IntVar, event: DomainEvent) -> &[DemonId] {
        let watcher = &self.watchers[var];
        match event {
            DomainEvent::Assign => &watcher.assign,
            DomainEvent::LowerBound => &watcher.lower_bound,
            DomainEvent::UpperBound => &watcher.upper_bound,
            DomainEvent::Removal => &watcher.removal,
        }
    }
}
