//! Domain layer: wizard aggregates, attribute reconciliation, and events

/// Attribute rows, typed EAV conversion, multi-value flattening
pub mod attributes;

/// Wizard domain events
pub mod events;

/// The attribute reconciliation aggregate
pub mod reconciliation;

/// Wizard steps, context, and status
pub mod wizard;
