use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// The kinds of events a domain mutation can raise.
#[derive(Debug, EnumSetType)]
pub enum DomainEvent {
    /// The domain collapsed to a single value.
    Assign,
    /// The lower bound was tightened.
    LowerBound,
    /// The upper bound was tightened.
    UpperBound,
    /// A value strictly inside the bounds was removed.
    Removal,
}

/// A registration mask for demons. The masks compose the raw events into
/// the three classic registration levels: bound, range, and any domain
/// change.
#[derive(Debug, Copy, Clone)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// Wake only when the variable becomes bound.
    pub const BOUND: DomainEvents =
        DomainEvents::create(enum_set!(DomainEvent::Assign));
    /// Wake when either bound moves.
    pub const RANGE: DomainEvents = DomainEvents::create(enum_set!(
        DomainEvent::LowerBound | DomainEvent::UpperBound
    ));
    /// Wake on any domain change.
    pub const ANY: DomainEvents = DomainEvents::create(enum_set!(
        DomainEvent::Assign
            | DomainEvent::LowerBound
            | DomainEvent::UpperBound
            | DomainEvent::Removal
    ));

    pub(crate) const fn create(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub(crate) fn get(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}
