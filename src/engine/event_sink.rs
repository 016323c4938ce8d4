use enumset::EnumSet;

use super::domain_events::DomainEvent;
use crate::containers::KeyedVec;
use crate::variables::IntVar;

/// Collects the domain events raised while propagating or applying a
/// decision. An event is recorded at most once per variable until the sink
/// is drained.
#[derive(Debug, Default)]
pub(crate) struct EventSink {
    present: KeyedVec<IntVar, EnumSet<DomainEvent>>,
    events: Vec<(DomainEvent, IntVar)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(&mut self, event: DomainEvent, var: IntVar) {
        let present = &mut self.present[var];

        if present.insert(event) {
            self.events.push((event, var));
        }
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (DomainEvent, IntVar)> + '_ {
        self.events.drain(..).inspect(|&(event, var)| {
            let _ = self.present[var].remove(event);
        })
    }

    pub(crate) fn clear(&mut self) {
        while let Some((event, var)) = self.events.pop() {
            let _ = self.present[var].remove(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn duplicate_events_are_recorded_once() {
        let mut sink = EventSink::default();
        sink.grow();

        let var = IntVar::create_from_index(0);
        sink.event_occurred(DomainEvent::LowerBound, var);
        sink.event_occurred(DomainEvent::LowerBound, var);
        sink.event_occurred(DomainEvent::UpperBound, var);

        let drained = sink.drain().collect::<Vec<_>>();
        assert_eq!(
            vec![
                (DomainEvent::LowerBound, var),
                (DomainEvent::UpperBound, var)
            ],
            drained
        );
    }

    #[test]
    fn draining_resets_the_presence_flags() {
        let mut sink = EventSink::default();
        sink.grow();

        let var = IntVar::create_from_index(0);
        sink.event_occurred(DomainEvent::Assign, var);
        let _ = sink.drain().collect::<Vec<_>>();

        sink.event_occurred(DomainEvent::Assign, var);
        assert_eq!(1, sink.drain().count());
    }
}
