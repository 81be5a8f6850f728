//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (parley-infra) implements. The core crate never depends on any specific
//! storage technology.
//!
//! Every method is one durable unit of work: a single statement or a single
//! transaction, with no partial writes observable.

pub mod message;
pub mod subscription;
pub mod usage;
