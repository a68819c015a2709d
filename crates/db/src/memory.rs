//! Document-style in-memory store.
//!
//! Whole entity records are kept in process-local maps, mirroring the
//! document-database deployment variant. Doubles as the test backend for the
//! workflow and HTTP suites. Locks are never held across an await point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use internhub_core::error::{CoreError, CoreResult};
use internhub_core::models::{
    AttendanceEntry, AttendanceSource, FeedbackEntry, Identity, IdentityPatch, NewAttendance,
    NewIdentity, NewPastIntern, NewPendingStudent, NewProgressUpdate, NewProject, PastIntern,
    PendingStudent, ProgressUpdate, Project, ProjectPatch, ProjectStatus,
};
use internhub_core::store::Store;
use internhub_core::types::{DbId, Timestamp};

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    identities: RwLock<HashMap<DbId, Identity>>,
    projects: RwLock<HashMap<DbId, Project>>,
    pending: RwLock<HashMap<DbId, PendingStudent>>,
    past_interns: RwLock<HashMap<DbId, PastIntern>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    fn next_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Sort newest first by id (insertion order is creation order here).
fn newest_first<T, F: Fn(&T) -> DbId>(mut items: Vec<T>, id_of: F) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(id_of(item)));
    items
}

#[async_trait]
impl Store for MemoryStore {
    // --- Identities -------------------------------------------------------

    async fn insert_identity(&self, new: NewIdentity) -> CoreResult<Identity> {
        let mut identities = self.identities.write().unwrap();

        // The uniqueness backstop the relational backend gets from its
        // constraints.
        let taken = identities.values().any(|existing| {
            existing.email == new.email
                || (new.username.is_some() && existing.username == new.username)
        });
        if taken {
            return Err(CoreError::Conflict(
                "Email or username already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let identity = Identity {
            id: self.next_id(),
            name: new.name,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            contact_number: new.contact_number,
            program: new.program,
            university: new.university,
            graduation_year: new.graduation_year,
            bio: new.bio,
            resume_link: new.resume_link,
            profile_picture: new.profile_picture,
            attributes: new.attributes,
            employment: new.employment,
            assigned_projects: Vec::new(),
            attendance: Vec::new(),
            progress_updates: Vec::new(),
            notification_settings: Default::default(),
            security_settings: Default::default(),
            is_active: true,
            created_at: now,
            last_active: now,
            last_login: None,
        };
        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn identity(&self, id: DbId) -> CoreResult<Option<Identity>> {
        Ok(self.identities.read().unwrap().get(&id).cloned())
    }

    async fn identity_by_username(&self, username: &str) -> CoreResult<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .unwrap()
            .values()
            .find(|identity| identity.username.as_deref() == Some(username))
            .cloned())
    }

    async fn identity_by_login(&self, identifier: &str) -> CoreResult<Option<Identity>> {
        Ok(self
            .identities
            .read()
            .unwrap()
            .values()
            .find(|identity| {
                identity.username.as_deref() == Some(identifier) || identity.email == identifier
            })
            .cloned())
    }

    async fn identity_exists(&self, email: &str, username: &str) -> CoreResult<bool> {
        Ok(self
            .identities
            .read()
            .unwrap()
            .values()
            .any(|identity| identity.email == email || identity.username.as_deref() == Some(username)))
    }

    async fn list_identities(&self, role: Option<&str>) -> CoreResult<Vec<Identity>> {
        let identities: Vec<Identity> = self
            .identities
            .read()
            .unwrap()
            .values()
            .filter(|identity| role.map_or(true, |r| identity.role == r))
            .cloned()
            .collect();
        Ok(newest_first(identities, |identity| identity.id))
    }

    async fn update_identity(
        &self,
        id: DbId,
        patch: IdentityPatch,
    ) -> CoreResult<Option<Identity>> {
        let mut identities = self.identities.write().unwrap();

        if let Some(username) = &patch.username {
            let taken = identities
                .values()
                .any(|other| other.id != id && other.username.as_deref() == Some(username));
            if taken {
                return Err(CoreError::Conflict("Username already exists".to_string()));
            }
        }

        if let Some(email) = &patch.email {
            let taken = identities
                .values()
                .any(|other| other.id != id && other.email == *email);
            if taken {
                return Err(CoreError::Conflict("Email already exists".to_string()));
            }
        }

        let Some(identity) = identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            identity.name = name;
        }
        if let Some(email) = patch.email {
            identity.email = email;
        }
        if let Some(username) = patch.username {
            identity.username = Some(username);
        }
        if let Some(hash) = patch.password_hash {
            identity.password_hash = Some(hash);
        }
        if let Some(contact_number) = patch.contact_number {
            identity.contact_number = Some(contact_number);
        }
        if let Some(program) = patch.program {
            identity.program = Some(program);
        }
        if let Some(university) = patch.university {
            identity.university = Some(university);
        }
        if let Some(graduation_year) = patch.graduation_year {
            identity.graduation_year = Some(graduation_year);
        }
        if let Some(bio) = patch.bio {
            identity.bio = Some(bio);
        }
        if let Some(resume_link) = patch.resume_link {
            identity.resume_link = Some(resume_link);
        }
        if let Some(profile_picture) = patch.profile_picture {
            identity.profile_picture = Some(profile_picture);
        }
        if let Some(attributes) = patch.attributes {
            identity.attributes = attributes;
        }
        if let Some(employment) = patch.employment {
            identity.employment = Some(employment);
        }
        if let Some(settings) = patch.notification_settings {
            identity.notification_settings = settings;
        }
        if let Some(settings) = patch.security_settings {
            identity.security_settings = settings;
        }
        Ok(Some(identity.clone()))
    }

    async fn deactivate_identity(&self, id: DbId) -> CoreResult<bool> {
        let mut identities = self.identities.write().unwrap();
        match identities.get_mut(&id) {
            Some(identity) if identity.is_active => {
                identity.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_login(&self, id: DbId) -> CoreResult<()> {
        let mut identities = self.identities.write().unwrap();
        if let Some(identity) = identities.get_mut(&id) {
            let now = Utc::now();
            identity.last_active = now;
            identity.last_login = Some(now);
        }
        Ok(())
    }

    async fn append_attendance(
        &self,
        identity_id: DbId,
        entry: NewAttendance,
        source: AttendanceSource,
    ) -> CoreResult<AttendanceEntry> {
        let id = self.next_id();
        let mut identities = self.identities.write().unwrap();
        let identity = identities
            .get_mut(&identity_id)
            .ok_or(CoreError::NotFound {
                entity: "Identity",
                id: identity_id,
            })?;
        let stored = AttendanceEntry {
            id,
            date: entry.date.unwrap_or_else(Utc::now),
            status: entry.status,
            source,
            time_in: entry.time_in,
            time_out: entry.time_out,
            notes: entry.notes,
        };
        identity.attendance.push(stored.clone());
        Ok(stored)
    }

    async fn append_progress(
        &self,
        identity_id: DbId,
        update: NewProgressUpdate,
    ) -> CoreResult<ProgressUpdate> {
        let id = self.next_id();
        let mut identities = self.identities.write().unwrap();
        let identity = identities
            .get_mut(&identity_id)
            .ok_or(CoreError::NotFound {
                entity: "Identity",
                id: identity_id,
            })?;
        let stored = ProgressUpdate {
            id,
            content: update.content,
            timestamp: update.timestamp.unwrap_or_else(Utc::now),
            feedback: None,
            feedback_date: None,
            has_admin_feedback: false,
        };
        identity.progress_updates.push(stored.clone());
        Ok(stored)
    }

    async fn find_progress_update(
        &self,
        update_id: DbId,
    ) -> CoreResult<Option<(DbId, ProgressUpdate)>> {
        let identities = self.identities.read().unwrap();
        for identity in identities.values() {
            if let Some(update) = identity
                .progress_updates
                .iter()
                .find(|update| update.id == update_id)
            {
                return Ok(Some((identity.id, update.clone())));
            }
        }
        Ok(None)
    }

    async fn set_progress_feedback(
        &self,
        update_id: DbId,
        feedback: &str,
        at: Timestamp,
    ) -> CoreResult<Option<ProgressUpdate>> {
        let mut identities = self.identities.write().unwrap();
        for identity in identities.values_mut() {
            if let Some(update) = identity
                .progress_updates
                .iter_mut()
                .find(|update| update.id == update_id)
            {
                update.feedback = Some(feedback.to_string());
                update.feedback_date = Some(at);
                update.has_admin_feedback = true;
                return Ok(Some(update.clone()));
            }
        }
        Ok(None)
    }

    // --- Projects ---------------------------------------------------------

    async fn insert_project(&self, new: NewProject) -> CoreResult<Project> {
        let id = self.next_id();
        let now = Utc::now();
        let mut assigned_to = new.assigned_to;
        assigned_to.dedup();

        let project = Project {
            id,
            title: new.title,
            description: new.description,
            status: ProjectStatus::NotStarted,
            start_date: now,
            end_date: new.end_date,
            assigned_to: assigned_to.clone(),
            created_by: new.created_by,
            tasks: new.tasks,
            feedback: Vec::new(),
            last_modified: now,
        };

        self.projects.write().unwrap().insert(id, project.clone());

        // Mirror the assignment on each identity's project list.
        let mut identities = self.identities.write().unwrap();
        for identity_id in &assigned_to {
            if let Some(identity) = identities.get_mut(identity_id) {
                if !identity.assigned_projects.contains(&id) {
                    identity.assigned_projects.push(id);
                }
            } else {
                tracing::warn!(identity_id, project_id = id, "Assignee does not exist");
            }
        }

        Ok(project)
    }

    async fn project(&self, id: DbId) -> CoreResult<Option<Project>> {
        Ok(self.projects.read().unwrap().get(&id).cloned())
    }

    async fn list_projects(&self) -> CoreResult<Vec<Project>> {
        let projects: Vec<Project> = self.projects.read().unwrap().values().cloned().collect();
        Ok(newest_first(projects, |project| project.id))
    }

    async fn projects_for_identity(&self, identity_id: DbId) -> CoreResult<Vec<Project>> {
        let assigned = match self.identities.read().unwrap().get(&identity_id) {
            Some(identity) => identity.assigned_projects.clone(),
            None => return Ok(Vec::new()),
        };
        let projects = self.projects.read().unwrap();
        Ok(assigned
            .iter()
            .filter_map(|project_id| projects.get(project_id).cloned())
            .collect())
    }

    async fn update_project(&self, id: DbId, patch: ProjectPatch) -> CoreResult<Option<Project>> {
        let mut projects = self.projects.write().unwrap();
        let Some(project) = projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(end_date) = patch.end_date {
            project.end_date = Some(end_date);
        }
        if let Some(tasks) = patch.tasks {
            project.tasks = tasks;
        }
        project.last_modified = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn append_project_feedback(
        &self,
        id: DbId,
        entry: FeedbackEntry,
    ) -> CoreResult<Option<Project>> {
        let mut projects = self.projects.write().unwrap();
        let Some(project) = projects.get_mut(&id) else {
            return Ok(None);
        };
        project.feedback.push(entry);
        project.last_modified = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> CoreResult<bool> {
        let removed = self.projects.write().unwrap().remove(&id);
        if removed.is_none() {
            return Ok(false);
        }
        let mut identities = self.identities.write().unwrap();
        for identity in identities.values_mut() {
            identity.assigned_projects.retain(|project_id| *project_id != id);
        }
        Ok(true)
    }

    async fn assign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()> {
        {
            let mut projects = self.projects.write().unwrap();
            let project = projects.get_mut(&project_id).ok_or(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            })?;
            if !project.assigned_to.contains(&identity_id) {
                project.assigned_to.push(identity_id);
                project.last_modified = Utc::now();
            }
        }
        let mut identities = self.identities.write().unwrap();
        let identity = identities
            .get_mut(&identity_id)
            .ok_or(CoreError::NotFound {
                entity: "Identity",
                id: identity_id,
            })?;
        if !identity.assigned_projects.contains(&project_id) {
            identity.assigned_projects.push(project_id);
        }
        Ok(())
    }

    async fn unassign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()> {
        if let Some(project) = self.projects.write().unwrap().get_mut(&project_id) {
            project.assigned_to.retain(|id| *id != identity_id);
        }
        if let Some(identity) = self.identities.write().unwrap().get_mut(&identity_id) {
            identity
                .assigned_projects
                .retain(|id| *id != project_id);
        }
        Ok(())
    }

    // --- Pending registrations -------------------------------------------

    async fn insert_pending(&self, new: NewPendingStudent) -> CoreResult<PendingStudent> {
        let mut pending = self.pending.write().unwrap();
        let taken = pending
            .values()
            .any(|existing| existing.email == new.email || existing.username == new.username);
        if taken {
            return Err(CoreError::Conflict(
                "Email or username already has a pending registration".to_string(),
            ));
        }

        let record = PendingStudent {
            id: self.next_id(),
            name: new.name,
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            contact_number: new.contact_number,
            program: new.program,
            university: new.university,
            graduation_year: new.graduation_year,
            bio: new.bio,
            notification_settings: Default::default(),
            security_settings: Default::default(),
            created_at: Utc::now(),
        };
        pending.insert(record.id, record.clone());
        Ok(record)
    }

    async fn pending(&self, id: DbId) -> CoreResult<Option<PendingStudent>> {
        Ok(self.pending.read().unwrap().get(&id).cloned())
    }

    async fn pending_by_identifier(&self, identifier: &str) -> CoreResult<Option<PendingStudent>> {
        Ok(self
            .pending
            .read()
            .unwrap()
            .values()
            .find(|record| record.username == identifier || record.email == identifier)
            .cloned())
    }

    async fn pending_exists(&self, email: &str, username: &str) -> CoreResult<bool> {
        Ok(self
            .pending
            .read()
            .unwrap()
            .values()
            .any(|record| record.email == email || record.username == username))
    }

    async fn list_pending(&self) -> CoreResult<Vec<PendingStudent>> {
        let records: Vec<PendingStudent> =
            self.pending.read().unwrap().values().cloned().collect();
        Ok(newest_first(records, |record| record.id))
    }

    async fn delete_pending(&self, id: DbId) -> CoreResult<bool> {
        Ok(self.pending.write().unwrap().remove(&id).is_some())
    }

    // --- Past interns -----------------------------------------------------

    async fn insert_past_intern(&self, snapshot: NewPastIntern) -> CoreResult<PastIntern> {
        let mut past = self.past_interns.write().unwrap();
        if let Some(existing) = past
            .values()
            .find(|record| record.source_intern_id == snapshot.source_intern_id)
        {
            // Archive retry: the stored snapshot wins, never overwritten.
            return Ok(existing.clone());
        }
        let record = snapshot.into_past_intern(self.next_id());
        past.insert(record.id, record.clone());
        Ok(record)
    }

    async fn past_intern(&self, id: DbId) -> CoreResult<Option<PastIntern>> {
        Ok(self.past_interns.read().unwrap().get(&id).cloned())
    }

    async fn list_past_interns(&self) -> CoreResult<Vec<PastIntern>> {
        let records: Vec<PastIntern> =
            self.past_interns.read().unwrap().values().cloned().collect();
        Ok(newest_first(records, |record| record.id))
    }
}
