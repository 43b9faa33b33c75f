//! Catalog domain: records, value objects and change events
pub mod aggregates;
pub mod events;
pub mod value_objects;
