//! Pending-registration workflow.
//!
//! Self-service registrations land in a holding pool; an admin approves
//! (copying the record into the identity store) or rejects (deleting it).
//! Login is gated: a credential pair matching a pending record is always
//! rejected with `Forbidden` before any password check, which is a deliberate
//! UX distinction from "wrong password" (`Unauthorized`).

use crate::error::{CoreError, CoreResult};
use crate::models::{Identity, NewIdentity, NewPendingStudent, PendingStudent};
use crate::roles::ROLE_STUDENT;
use crate::store::Store;
use crate::types::DbId;

/// Queue a registration request.
///
/// Fails with `Conflict` if the email or username is already held by an
/// active identity or another pending record. The two existence checks are
/// independent queries and are not atomic with the insert; a concurrent
/// registration race is ultimately caught by the store's uniqueness
/// constraints, which surface as `Conflict` from the insert itself.
pub async fn register(store: &dyn Store, new: NewPendingStudent) -> CoreResult<PendingStudent> {
    if store.identity_exists(&new.email, &new.username).await? {
        return Err(CoreError::Conflict(
            "Email or username is already in use by an active account".to_string(),
        ));
    }
    if store.pending_exists(&new.email, &new.username).await? {
        return Err(CoreError::Conflict(
            "A registration request is already pending for this email or username".to_string(),
        ));
    }

    let pending = store.insert_pending(new).await?;
    tracing::info!(pending_id = pending.id, "Registration request queued");
    Ok(pending)
}

/// Approve a pending registration, creating the identity.
///
/// The identity is created first and the pending row deleted second; if the
/// delete fails, a retried approve is absorbed by the identity store's
/// uniqueness constraints rather than creating a duplicate.
pub async fn approve(store: &dyn Store, pending_id: DbId) -> CoreResult<Identity> {
    let pending = store
        .pending(pending_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PendingStudent",
            id: pending_id,
        })?;

    let identity = store
        .insert_identity(NewIdentity {
            name: pending.name,
            email: pending.email,
            username: Some(pending.username),
            // Already hashed at registration time; copied verbatim.
            password_hash: Some(pending.password_hash),
            role: ROLE_STUDENT.to_string(),
            contact_number: pending.contact_number,
            program: pending.program,
            university: pending.university,
            graduation_year: pending.graduation_year,
            bio: pending.bio,
            resume_link: None,
            profile_picture: None,
            attributes: Default::default(),
            employment: None,
        })
        .await?;

    store.delete_pending(pending_id).await?;
    tracing::info!(
        pending_id,
        identity_id = identity.id,
        "Registration approved"
    );
    Ok(identity)
}

/// Reject (delete) a pending registration. No other side effect.
pub async fn reject(store: &dyn Store, pending_id: DbId) -> CoreResult<()> {
    if !store.delete_pending(pending_id).await? {
        return Err(CoreError::NotFound {
            entity: "PendingStudent",
            id: pending_id,
        });
    }
    tracing::info!(pending_id, "Registration rejected");
    Ok(())
}

/// Resolve the identity a login attempt targets, applying the pending gate.
///
/// The caller verifies the password against the returned identity's hash and
/// records the login on success. Order matters: the pending check runs before
/// any identity lookup so a pending user always sees `Forbidden`.
pub async fn login_candidate(store: &dyn Store, identifier: &str) -> CoreResult<Identity> {
    if store.pending_by_identifier(identifier).await?.is_some() {
        return Err(CoreError::Forbidden(
            "Registration is pending admin approval; login is not possible yet".to_string(),
        ));
    }

    let identity = store
        .identity_by_login(identifier)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid credentials".to_string()))?;

    if !identity.is_active || identity.password_hash.is_none() {
        return Err(CoreError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(identity)
}
