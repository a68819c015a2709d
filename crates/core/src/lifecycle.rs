//! Intern lifecycle manager.
//!
//! Presents the unified "current intern" view over identities carrying an
//! employment sub-record, fans task lists out into projects, rotates
//! credentials, and performs the archive transition into an immutable
//! [`PastIntern`] snapshot.

use crate::error::{CoreError, CoreResult};
use crate::merge::{merge_attendance, merge_progress, or_not_available};
use crate::models::{
    AttendanceEntry, AttendanceSource, Employment, FeedbackEntry, Identity, IdentityPatch,
    NewAttendance, NewIdentity, NewPastIntern, NewProgressUpdate, NewProject, PastIntern,
    PastInternStats, ProgressUpdate, Project, ProjectSnapshot, ProjectStatus,
};
use crate::store::Store;
use crate::tasks::new_task_names;
use crate::types::{DbId, Timestamp};

use serde::Serialize;

/// Default internship duration in months when none is supplied.
pub const DEFAULT_DURATION_MONTHS: i32 = 3;

/// Merged read view of a current intern.
///
/// Attendance and progress are merged across their parallel source lists and
/// ordered newest first. Missing optional fields surface the
/// "Not available" sentinel so consumers can rely on field presence.
#[derive(Debug, Clone, Serialize)]
pub struct InternView {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub university: String,
    pub progress_pct: i32,
    pub duration_months: i32,
    pub status: String,
    pub joining_date: Timestamp,
    pub tasks: Vec<String>,
    pub assigned_projects: Vec<DbId>,
    pub attendance: Vec<AttendanceEntry>,
    pub progress_updates: Vec<ProgressUpdate>,
}

/// Input for creating an intern engagement.
#[derive(Debug, Clone)]
pub struct CreateIntern {
    pub name: String,
    pub email: String,
    pub duration_months: Option<i32>,
    pub university: Option<String>,
    /// Link the engagement to an existing identity instead of creating one.
    pub student_id: Option<DbId>,
    pub username: Option<String>,
    /// Hashed by the caller; plaintext never reaches the core.
    pub password_hash: Option<String>,
    /// Normalized task names (see [`crate::tasks::TaskInput`]).
    pub tasks: Vec<String>,
}

/// Input for updating an intern engagement. Only non-`None` fields apply.
#[derive(Debug, Clone, Default)]
pub struct UpdateIntern {
    pub name: Option<String>,
    pub email: Option<String>,
    pub joining_date: Option<Timestamp>,
    pub duration_months: Option<i32>,
    pub university: Option<String>,
    /// Replacement task list. Projects are created only for names not
    /// already present; dropping a name never deletes its project.
    pub tasks: Option<Vec<String>>,
}

/// Build the merged view for one identity.
fn view_of(identity: &Identity) -> CoreResult<InternView> {
    let employment = identity
        .employment
        .as_ref()
        .ok_or_else(|| CoreError::Internal("identity has no employment record".to_string()))?;

    // The two parallel attendance lists are stored interleaved; partition by
    // source before handing them to the shared merge.
    let (admin, self_reported): (Vec<AttendanceEntry>, Vec<AttendanceEntry>) = identity
        .attendance
        .iter()
        .cloned()
        .partition(|entry| entry.source == AttendanceSource::Admin);

    Ok(InternView {
        id: identity.id,
        name: identity.name.clone(),
        email: identity.email.clone(),
        username: or_not_available(identity.username.as_deref()),
        university: or_not_available(identity.university.as_deref()),
        progress_pct: employment.progress_pct,
        duration_months: employment.duration_months,
        status: employment.status.clone(),
        joining_date: employment.joining_date,
        tasks: employment.tasks.clone(),
        assigned_projects: identity.assigned_projects.clone(),
        attendance: merge_attendance(&admin, &self_reported),
        progress_updates: merge_progress(&identity.progress_updates, &[]),
    })
}

/// All current (non-archived) interns as merged views.
pub async fn list_interns(store: &dyn Store) -> CoreResult<Vec<InternView>> {
    let identities = store.list_identities(None).await?;
    identities
        .iter()
        .filter(|identity| identity.is_current_intern())
        .map(view_of)
        .collect()
}

/// Merged view of a single current intern.
pub async fn intern_view(store: &dyn Store, id: DbId) -> CoreResult<InternView> {
    let identity = resolve_intern(store, id).await?;
    view_of(&identity)
}

async fn resolve_intern(store: &dyn Store, id: DbId) -> CoreResult<Identity> {
    let identity = store.identity(id).await?.ok_or(CoreError::NotFound {
        entity: "Intern",
        id,
    })?;
    if !identity.is_current_intern() {
        return Err(CoreError::NotFound {
            entity: "Intern",
            id,
        });
    }
    Ok(identity)
}

/// Create an intern engagement, provisioning or linking an identity and
/// fanning the task list out into one project per task name.
///
/// Project fan-out is best effort: a failed creation is logged and skipped
/// rather than rolling back the ones already created. Assignment uses the
/// store's atomic set-union append, so concurrent creates cannot lose a
/// project reference.
pub async fn create_intern(
    store: &dyn Store,
    now: Timestamp,
    input: CreateIntern,
) -> CoreResult<InternView> {
    if let Some(username) = &input.username {
        if let Some(existing) = store.identity_by_username(username).await? {
            if input.student_id != Some(existing.id) {
                return Err(CoreError::Conflict("Username already exists".to_string()));
            }
        }
    }

    let duration = input.duration_months.unwrap_or(DEFAULT_DURATION_MONTHS);
    let employment = Employment::starting_now(now, duration, input.tasks.clone());

    let identity = match input.student_id {
        Some(student_id) => {
            // Link the engagement to an existing account.
            store
                .update_identity(
                    student_id,
                    IdentityPatch {
                        username: input.username.clone(),
                        password_hash: input.password_hash.clone(),
                        university: input.university.clone(),
                        employment: Some(employment),
                        ..IdentityPatch::default()
                    },
                )
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Identity",
                    id: student_id,
                })?
        }
        None => {
            store
                .insert_identity(NewIdentity {
                    name: input.name.clone(),
                    email: input.email.clone(),
                    username: input.username.clone(),
                    password_hash: input.password_hash.clone(),
                    role: crate::roles::ROLE_STUDENT.to_string(),
                    university: input.university.clone(),
                    employment: Some(employment),
                    ..NewIdentity::student(&input.name, &input.email)
                })
                .await?
        }
    };

    fan_out_projects(store, &identity.id, &input.name, &input.tasks).await;

    intern_view(store, identity.id).await
}

/// Update an intern's profile and task list.
///
/// Task diffing: only names absent from the existing list produce projects;
/// the second application of an identical list creates nothing.
pub async fn update_intern(
    store: &dyn Store,
    id: DbId,
    input: UpdateIntern,
) -> CoreResult<InternView> {
    let identity = resolve_intern(store, id).await?;
    let mut employment = identity
        .employment
        .clone()
        .ok_or_else(|| CoreError::Internal("identity has no employment record".to_string()))?;

    let mut created_for: Vec<String> = Vec::new();
    if let Some(incoming) = &input.tasks {
        created_for = new_task_names(&employment.tasks, incoming);
        employment.tasks = incoming.clone();
    }
    if let Some(joining_date) = input.joining_date {
        employment.joining_date = joining_date;
    }
    if let Some(duration) = input.duration_months {
        employment.duration_months = duration;
    }

    let display_name = input.name.clone().unwrap_or_else(|| identity.name.clone());

    store
        .update_identity(
            id,
            IdentityPatch {
                name: input.name,
                email: input.email,
                university: input.university,
                employment: Some(employment),
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Intern",
            id,
        })?;

    fan_out_projects(store, &id, &display_name, &created_for).await;

    intern_view(store, id).await
}

/// Create one `Not Started` project per task name, assigned to the identity.
async fn fan_out_projects(store: &dyn Store, identity_id: &DbId, name: &str, tasks: &[String]) {
    for task in tasks {
        let result = store
            .insert_project(NewProject {
                title: task.clone(),
                description: format!("Task assigned to {name}: {task}"),
                assigned_to: vec![*identity_id],
                end_date: None,
                tasks: Vec::new(),
                created_by: "admin".to_string(),
            })
            .await;
        match result {
            Ok(project) => {
                tracing::debug!(project_id = project.id, task = %task, "Project created for task");
            }
            Err(error) => {
                tracing::warn!(%error, task = %task, "Project creation failed during fan-out");
            }
        }
    }
}

/// Rotate an intern's login credentials.
///
/// Fails with `Conflict` when the new username is already held by a
/// different identity, and with `Validation` when a password-only rotation
/// targets an intern that has no login provisioned.
pub async fn update_credentials(
    store: &dyn Store,
    id: DbId,
    username: Option<String>,
    password_hash: Option<String>,
) -> CoreResult<()> {
    if username.is_none() && password_hash.is_none() {
        return Err(CoreError::Validation(
            "A username or password is required".to_string(),
        ));
    }

    let identity = resolve_intern(store, id).await?;

    if let Some(new_username) = &username {
        if let Some(existing) = store.identity_by_username(new_username).await? {
            if existing.id != id {
                return Err(CoreError::Conflict("Username already exists".to_string()));
            }
        }
    } else if identity.username.is_none() {
        return Err(CoreError::Validation(
            "No login account is provisioned for this intern; supply a username".to_string(),
        ));
    }

    store
        .update_identity(
            id,
            IdentityPatch {
                username,
                password_hash,
                ..IdentityPatch::default()
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Intern",
            id,
        })?;

    Ok(())
}

/// Record an attendance entry for an intern.
pub async fn record_attendance(
    store: &dyn Store,
    id: DbId,
    entry: NewAttendance,
    source: AttendanceSource,
) -> CoreResult<AttendanceEntry> {
    resolve_intern(store, id).await?;
    store.append_attendance(id, entry, source).await
}

/// Completion percentage: one progress update counts toward one task,
/// capped at 100.
fn progress_pct(update_count: usize, task_count: usize) -> Option<i32> {
    if task_count == 0 {
        return None;
    }
    let pct = ((update_count as f64 / task_count as f64) * 100.0).round() as i32;
    Some(pct.min(100))
}

/// Append a general progress update and recompute the completion percentage.
pub async fn submit_progress(
    store: &dyn Store,
    id: DbId,
    content: String,
) -> CoreResult<(ProgressUpdate, i32)> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Progress content is required".to_string(),
        ));
    }

    let identity = resolve_intern(store, id).await?;
    let update = store
        .append_progress(
            id,
            NewProgressUpdate {
                content,
                timestamp: None,
            },
        )
        .await?;

    let pct = recompute_progress(store, &identity, 1).await?;
    Ok((update, pct))
}

/// Recompute and persist the completion percentage after `added` new updates.
async fn recompute_progress(
    store: &dyn Store,
    identity: &Identity,
    added: usize,
) -> CoreResult<i32> {
    let mut employment = identity
        .employment
        .clone()
        .ok_or_else(|| CoreError::Internal("identity has no employment record".to_string()))?;

    let update_count = identity.progress_updates.len() + added;
    if let Some(pct) = progress_pct(update_count, employment.tasks.len()) {
        employment.progress_pct = pct;
        store
            .update_identity(
                identity.id,
                IdentityPatch {
                    employment: Some(employment.clone()),
                    ..IdentityPatch::default()
                },
            )
            .await?;
    }
    Ok(employment.progress_pct)
}

/// Submit a progress update against a specific project.
///
/// Side effects beyond the append, in order:
/// 1. a project in `Not Started` auto-transitions to `In Progress`
/// 2. a feedback entry referencing the student is attached to the project
/// 3. the project's `last_modified` is refreshed
///
/// The caller must be assigned to the project unless `allow_unassigned`
/// (admin callers) is set.
pub async fn submit_project_progress(
    store: &dyn Store,
    identity_id: DbId,
    project_id: DbId,
    content: String,
    allow_unassigned: bool,
) -> CoreResult<(ProgressUpdate, Project)> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Progress content is required".to_string(),
        ));
    }

    let identity = store
        .identity(identity_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Identity",
            id: identity_id,
        })?;

    let project = store
        .project(project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        })?;

    if !allow_unassigned && !project.assigned_to.contains(&identity_id) {
        return Err(CoreError::Forbidden(
            "Not assigned to this project".to_string(),
        ));
    }

    let update = store
        .append_progress(
            identity_id,
            NewProgressUpdate {
                content: content.clone(),
                timestamp: None,
            },
        )
        .await?;

    // Auto-transition: submitting progress against a fresh project starts it.
    if project.status == ProjectStatus::NotStarted {
        store
            .update_project(
                project_id,
                crate::models::ProjectPatch {
                    status: Some(ProjectStatus::InProgress),
                    ..Default::default()
                },
            )
            .await?;
    }

    let project = store
        .append_project_feedback(
            project_id,
            FeedbackEntry {
                comment: format!(
                    "Student {} submitted progress update: {content}",
                    identity.name
                ),
                date: chrono::Utc::now(),
                from: identity.name.clone(),
            },
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        })?;

    if identity.is_current_intern() {
        recompute_progress(store, &identity, 1).await?;
    }

    Ok((update, project))
}

/// Archive an intern into a terminal [`PastIntern`] snapshot.
///
/// Steps, ordered for idempotent re-entry:
/// 1. snapshot the assigned projects' `{title, description, status}`
/// 2. insert the snapshot keyed by the source identity id -- a retry after a
///    partial failure returns the already-stored snapshot untouched
/// 3. unassign the intern from each project (or delete the projects outright
///    when `cascade_delete` is set -- opt-in, since deleting a project shared
///    with another intern would destroy their data)
/// 4. deactivate the identity (side-effect free when already inactive)
pub async fn archive_intern(
    store: &dyn Store,
    id: DbId,
    cascade_delete: bool,
) -> CoreResult<PastIntern> {
    let identity = resolve_intern(store, id).await?;
    let view = view_of(&identity)?;
    let employment = identity
        .employment
        .as_ref()
        .ok_or_else(|| CoreError::Internal("identity has no employment record".to_string()))?;

    let projects = store.projects_for_identity(id).await?;
    let deleted_projects: Vec<ProjectSnapshot> = projects
        .iter()
        .map(|project| ProjectSnapshot {
            title: project.title.clone(),
            description: project.description.clone(),
            status: project.status,
        })
        .collect();

    let snapshot = store
        .insert_past_intern(NewPastIntern {
            source_intern_id: id,
            name: view.name,
            email: view.email,
            joining_date: employment.joining_date,
            end_date: employment.end_date,
            duration_months: employment.duration_months,
            progress_pct: employment.progress_pct,
            tasks: employment.tasks.clone(),
            attendance: view.attendance,
            progress_updates: view.progress_updates,
            status: employment.status.clone(),
            deleted_at: chrono::Utc::now(),
            deleted_projects,
        })
        .await?;

    for project in &projects {
        if cascade_delete {
            store.delete_project(project.id).await?;
        } else {
            store.unassign_project(project.id, id).await?;
        }
    }

    store.deactivate_identity(id).await?;
    tracing::info!(
        intern_id = id,
        past_intern_id = snapshot.id,
        projects = projects.len(),
        cascade_delete,
        "Intern archived"
    );

    Ok(snapshot)
}

/// All archival snapshots, newest first.
pub async fn past_interns(store: &dyn Store) -> CoreResult<Vec<PastIntern>> {
    store.list_past_interns().await
}

/// One archival snapshot plus its derived stats.
pub async fn past_intern_detail(
    store: &dyn Store,
    id: DbId,
) -> CoreResult<(PastIntern, PastInternStats)> {
    let snapshot = store.past_intern(id).await?.ok_or(CoreError::NotFound {
        entity: "PastIntern",
        id,
    })?;
    let stats = PastInternStats::for_snapshot(&snapshot);
    Ok((snapshot, stats))
}
