//! Domain core for the internship-management portal.
//!
//! Holds the entity models, the persistence collaborator trait ([`store::Store`]),
//! and the two workflow services built on top of it:
//!
//! - [`registration`] -- self-service registration intake with admin
//!   approve/reject and the pending-login gate.
//! - [`lifecycle`] -- the intern lifecycle manager: merged attendance/progress
//!   views, fan-out project creation from task lists, credential rotation, and
//!   archival into immutable [`models::past_intern::PastIntern`] snapshots.
//!
//! Everything here is written once against [`store::Store`]; the concrete
//! backends (Postgres, in-memory) live in `internhub-db`.

pub mod error;
pub mod lifecycle;
pub mod merge;
pub mod models;
pub mod registration;
pub mod roles;
pub mod store;
pub mod tasks;
pub mod types;
