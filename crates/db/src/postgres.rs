//! Relational store over sqlx/PostgreSQL.
//!
//! Attendance entries, progress updates and project assignments live in child
//! tables; appends are plain inserts, so they are atomic without any
//! read-modify-write. JSON-shaped fields with no relational use (profile
//! attributes, task lists, settings, archived snapshots) are kept as JSONB
//! columns.
//!
//! Reads hydrate the child rows per entity. At portal scale the lists are
//! small, so the per-entity queries are fine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use internhub_core::error::{CoreError, CoreResult};
use internhub_core::models::{
    AttendanceEntry, AttendanceSource, AttendanceStatus, Employment, FeedbackEntry, Identity,
    IdentityPatch, NewAttendance, NewIdentity, NewPastIntern, NewPendingStudent,
    NewProgressUpdate, NewProject, NotificationSettings, PastIntern, PendingStudent,
    ProgressUpdate, Project, ProjectPatch, ProjectSnapshot, ProjectStatus, ProjectTask,
    SecuritySettings,
};
use internhub_core::store::Store;
use internhub_core::types::{DbId, Timestamp};

/// Column lists shared across queries to avoid repetition.
const IDENTITY_COLUMNS: &str = "id, name, email, username, password_hash, role, contact_number, \
     program, university, graduation_year, bio, resume_link, profile_picture, attributes, \
     employment_status, joining_date, end_date, duration_months, progress_pct, project_rating, \
     tasks, notification_settings, security_settings, is_active, created_at, last_active, \
     last_login";

const ATTENDANCE_COLUMNS: &str = "id, identity_id, date, status, source, time_in, time_out, notes";

const PROGRESS_COLUMNS: &str =
    "id, identity_id, content, submitted_at, feedback, feedback_date, has_admin_feedback";

const PROJECT_COLUMNS: &str =
    "id, title, description, status, start_date, end_date, created_by, tasks, feedback, \
     last_modified";

const PENDING_COLUMNS: &str = "id, name, email, username, password_hash, contact_number, program, \
     university, graduation_year, bio, notification_settings, security_settings, created_at";

const PAST_INTERN_COLUMNS: &str = "id, source_intern_id, name, email, joining_date, end_date, \
     duration_months, progress_pct, tasks, attendance, progress_updates, status, deleted_at, \
     deleted_projects";

/// Map a sqlx error onto the domain taxonomy. Unique violations become
/// conflicts (the constraints backstop the racy existence checks); everything
/// else is internal.
fn map_db_err(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return CoreError::Conflict("A record with that unique value already exists".into());
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}

/// Parse a stored enum string, treating an unknown value as data corruption.
fn parse_stored<T>(raw: &str) -> CoreResult<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(CoreError::Internal)
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: DbId,
    name: String,
    email: String,
    username: Option<String>,
    password_hash: Option<String>,
    role: String,
    contact_number: Option<String>,
    program: Option<String>,
    university: Option<String>,
    graduation_year: Option<i32>,
    bio: Option<String>,
    resume_link: Option<String>,
    profile_picture: Option<String>,
    attributes: Json<BTreeMap<String, String>>,
    employment_status: Option<String>,
    joining_date: Option<Timestamp>,
    end_date: Option<Timestamp>,
    duration_months: Option<i32>,
    progress_pct: i32,
    project_rating: i32,
    tasks: Json<Vec<String>>,
    notification_settings: Json<NotificationSettings>,
    security_settings: Json<SecuritySettings>,
    is_active: bool,
    created_at: Timestamp,
    last_active: Timestamp,
    last_login: Option<Timestamp>,
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: DbId,
    #[allow(dead_code)]
    identity_id: DbId,
    date: Timestamp,
    status: String,
    source: String,
    time_in: Option<String>,
    time_out: Option<String>,
    notes: Option<String>,
}

impl AttendanceRow {
    fn into_entry(self) -> CoreResult<AttendanceEntry> {
        Ok(AttendanceEntry {
            id: self.id,
            date: self.date,
            status: parse_stored::<AttendanceStatus>(&self.status)?,
            source: parse_stored::<AttendanceSource>(&self.source)?,
            time_in: self.time_in,
            time_out: self.time_out,
            notes: self.notes,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProgressRow {
    id: DbId,
    identity_id: DbId,
    content: String,
    submitted_at: Timestamp,
    feedback: Option<String>,
    feedback_date: Option<Timestamp>,
    has_admin_feedback: bool,
}

impl ProgressRow {
    fn into_update(self) -> ProgressUpdate {
        ProgressUpdate {
            id: self.id,
            content: self.content,
            timestamp: self.submitted_at,
            feedback: self.feedback,
            feedback_date: self.feedback_date,
            has_admin_feedback: self.has_admin_feedback,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: DbId,
    title: String,
    description: String,
    status: String,
    start_date: Timestamp,
    end_date: Option<Timestamp>,
    created_by: String,
    tasks: Json<Vec<ProjectTask>>,
    feedback: Json<Vec<FeedbackEntry>>,
    last_modified: Timestamp,
}

impl ProjectRow {
    fn into_project(self, assigned_to: Vec<DbId>) -> CoreResult<Project> {
        Ok(Project {
            id: self.id,
            title: self.title,
            description: self.description,
            status: parse_stored::<ProjectStatus>(&self.status)?,
            start_date: self.start_date,
            end_date: self.end_date,
            assigned_to,
            created_by: self.created_by,
            tasks: self.tasks.0,
            feedback: self.feedback.0,
            last_modified: self.last_modified,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PendingRow {
    id: DbId,
    name: String,
    email: String,
    username: String,
    password_hash: String,
    contact_number: Option<String>,
    program: Option<String>,
    university: Option<String>,
    graduation_year: Option<i32>,
    bio: Option<String>,
    notification_settings: Json<NotificationSettings>,
    security_settings: Json<SecuritySettings>,
    created_at: Timestamp,
}

impl PendingRow {
    fn into_pending(self) -> PendingStudent {
        PendingStudent {
            id: self.id,
            name: self.name,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            contact_number: self.contact_number,
            program: self.program,
            university: self.university,
            graduation_year: self.graduation_year,
            bio: self.bio,
            notification_settings: self.notification_settings.0,
            security_settings: self.security_settings.0,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PastInternRow {
    id: DbId,
    source_intern_id: DbId,
    name: String,
    email: String,
    joining_date: Timestamp,
    end_date: Option<Timestamp>,
    duration_months: i32,
    progress_pct: i32,
    tasks: Json<Vec<String>>,
    attendance: Json<Vec<AttendanceEntry>>,
    progress_updates: Json<Vec<ProgressUpdate>>,
    status: String,
    deleted_at: Timestamp,
    deleted_projects: Json<Vec<ProjectSnapshot>>,
}

impl PastInternRow {
    fn into_past_intern(self) -> PastIntern {
        PastIntern {
            id: self.id,
            source_intern_id: self.source_intern_id,
            name: self.name,
            email: self.email,
            joining_date: self.joining_date,
            end_date: self.end_date,
            duration_months: self.duration_months,
            progress_pct: self.progress_pct,
            tasks: self.tasks.0,
            attendance: self.attendance.0,
            progress_updates: self.progress_updates.0,
            status: self.status,
            deleted_at: self.deleted_at,
            deleted_projects: self.deleted_projects.0,
        }
    }
}

/// Relational [`Store`] implementation.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach the child sequences (attendance, progress, assignments) to a
    /// bare identity row.
    async fn hydrate_identity(&self, row: IdentityRow) -> CoreResult<Identity> {
        let attendance_query =
            format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_entries WHERE identity_id = $1 ORDER BY id");
        let attendance_rows = sqlx::query_as::<_, AttendanceRow>(&attendance_query)
            .bind(row.id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        let attendance = attendance_rows
            .into_iter()
            .map(AttendanceRow::into_entry)
            .collect::<CoreResult<Vec<_>>>()?;

        let progress_query =
            format!("SELECT {PROGRESS_COLUMNS} FROM progress_updates WHERE identity_id = $1 ORDER BY id");
        let progress_updates = sqlx::query_as::<_, ProgressRow>(&progress_query)
            .bind(row.id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(ProgressRow::into_update)
            .collect();

        let assigned_projects: Vec<DbId> = sqlx::query_scalar(
            "SELECT project_id FROM project_assignments
             WHERE identity_id = $1
             ORDER BY assigned_at, project_id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        let employment = match row.employment_status {
            Some(status) => {
                let joining_date = row.joining_date.ok_or_else(|| {
                    CoreError::Internal(format!(
                        "Identity {} has an employment status but no joining date",
                        row.id
                    ))
                })?;
                Some(Employment {
                    joining_date,
                    end_date: row.end_date,
                    duration_months: row.duration_months.unwrap_or(0),
                    progress_pct: row.progress_pct,
                    project_rating: row.project_rating,
                    status,
                    tasks: row.tasks.0,
                })
            }
            None => None,
        };

        Ok(Identity {
            id: row.id,
            name: row.name,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role,
            contact_number: row.contact_number,
            program: row.program,
            university: row.university,
            graduation_year: row.graduation_year,
            bio: row.bio,
            resume_link: row.resume_link,
            profile_picture: row.profile_picture,
            attributes: row.attributes.0,
            employment,
            assigned_projects,
            attendance,
            progress_updates,
            notification_settings: row.notification_settings.0,
            security_settings: row.security_settings.0,
            is_active: row.is_active,
            created_at: row.created_at,
            last_active: row.last_active,
            last_login: row.last_login,
        })
    }

    async fn hydrate_identity_opt(&self, row: Option<IdentityRow>) -> CoreResult<Option<Identity>> {
        match row {
            Some(row) => Ok(Some(self.hydrate_identity(row).await?)),
            None => Ok(None),
        }
    }

    async fn project_assignees(&self, project_id: DbId) -> CoreResult<Vec<DbId>> {
        sqlx::query_scalar(
            "SELECT identity_id FROM project_assignments
             WHERE project_id = $1
             ORDER BY assigned_at, identity_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn hydrate_project(&self, row: ProjectRow) -> CoreResult<Project> {
        let assignees = self.project_assignees(row.id).await?;
        row.into_project(assignees)
    }
}

#[async_trait]
impl Store for PgStore {
    // --- Identities -------------------------------------------------------

    async fn insert_identity(&self, new: NewIdentity) -> CoreResult<Identity> {
        let employment = new.employment;
        let tasks = employment
            .as_ref()
            .map(|e| e.tasks.clone())
            .unwrap_or_default();
        let query = format!(
            "INSERT INTO identities (name, email, username, password_hash, role, contact_number,
                program, university, graduation_year, bio, resume_link, profile_picture,
                attributes, employment_status, joining_date, end_date, duration_months,
                progress_pct, project_rating, tasks)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20)
             RETURNING {IDENTITY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(&new.role)
            .bind(&new.contact_number)
            .bind(&new.program)
            .bind(&new.university)
            .bind(new.graduation_year)
            .bind(&new.bio)
            .bind(&new.resume_link)
            .bind(&new.profile_picture)
            .bind(Json(&new.attributes))
            .bind(employment.as_ref().map(|e| e.status.clone()))
            .bind(employment.as_ref().map(|e| e.joining_date))
            .bind(employment.as_ref().and_then(|e| e.end_date))
            .bind(employment.as_ref().map(|e| e.duration_months))
            .bind(employment.as_ref().map_or(0, |e| e.progress_pct))
            .bind(employment.as_ref().map_or(0, |e| e.project_rating))
            .bind(Json(&tasks))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        self.hydrate_identity(row).await
    }

    async fn identity(&self, id: DbId) -> CoreResult<Option<Identity>> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        self.hydrate_identity_opt(row).await
    }

    async fn identity_by_username(&self, username: &str) -> CoreResult<Option<Identity>> {
        let query = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        self.hydrate_identity_opt(row).await
    }

    async fn identity_by_login(&self, identifier: &str) -> CoreResult<Option<Identity>> {
        let query = format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = $1 OR email = $1"
        );
        let row = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        self.hydrate_identity_opt(row).await
    }

    async fn identity_exists(&self, email: &str, username: &str) -> CoreResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM identities WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn list_identities(&self, role: Option<&str>) -> CoreResult<Vec<Identity>> {
        let rows = match role {
            Some(role) => {
                let query = format!(
                    "SELECT {IDENTITY_COLUMNS} FROM identities WHERE role = $1 ORDER BY id DESC"
                );
                sqlx::query_as::<_, IdentityRow>(&query)
                    .bind(role)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!("SELECT {IDENTITY_COLUMNS} FROM identities ORDER BY id DESC");
                sqlx::query_as::<_, IdentityRow>(&query).fetch_all(&self.pool).await
            }
        }
        .map_err(map_db_err)?;

        let mut identities = Vec::with_capacity(rows.len());
        for row in rows {
            identities.push(self.hydrate_identity(row).await?);
        }
        Ok(identities)
    }

    async fn update_identity(
        &self,
        id: DbId,
        patch: IdentityPatch,
    ) -> CoreResult<Option<Identity>> {
        // The employment sub-record is patched as a group, which COALESCE
        // per-column cannot express. Read-modify-write under a row lock.
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let query = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1 FOR UPDATE");
        let Some(mut row) = sqlx::query_as::<_, IdentityRow>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(email) = patch.email {
            row.email = email;
        }
        if let Some(username) = patch.username {
            row.username = Some(username);
        }
        if let Some(hash) = patch.password_hash {
            row.password_hash = Some(hash);
        }
        if let Some(contact_number) = patch.contact_number {
            row.contact_number = Some(contact_number);
        }
        if let Some(program) = patch.program {
            row.program = Some(program);
        }
        if let Some(university) = patch.university {
            row.university = Some(university);
        }
        if let Some(graduation_year) = patch.graduation_year {
            row.graduation_year = Some(graduation_year);
        }
        if let Some(bio) = patch.bio {
            row.bio = Some(bio);
        }
        if let Some(resume_link) = patch.resume_link {
            row.resume_link = Some(resume_link);
        }
        if let Some(profile_picture) = patch.profile_picture {
            row.profile_picture = Some(profile_picture);
        }
        if let Some(attributes) = patch.attributes {
            row.attributes = Json(attributes);
        }
        if let Some(employment) = patch.employment {
            row.employment_status = Some(employment.status);
            row.joining_date = Some(employment.joining_date);
            row.end_date = employment.end_date;
            row.duration_months = Some(employment.duration_months);
            row.progress_pct = employment.progress_pct;
            row.project_rating = employment.project_rating;
            row.tasks = Json(employment.tasks);
        }
        if let Some(settings) = patch.notification_settings {
            row.notification_settings = Json(settings);
        }
        if let Some(settings) = patch.security_settings {
            row.security_settings = Json(settings);
        }

        sqlx::query(
            "UPDATE identities SET
                name = $2, email = $3, username = $4, password_hash = $5, contact_number = $6,
                program = $7, university = $8, graduation_year = $9, bio = $10, resume_link = $11,
                profile_picture = $12, attributes = $13, employment_status = $14,
                joining_date = $15, end_date = $16, duration_months = $17, progress_pct = $18,
                project_rating = $19, tasks = $20, notification_settings = $21,
                security_settings = $22
             WHERE id = $1",
        )
        .bind(id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.username)
        .bind(&row.password_hash)
        .bind(&row.contact_number)
        .bind(&row.program)
        .bind(&row.university)
        .bind(row.graduation_year)
        .bind(&row.bio)
        .bind(&row.resume_link)
        .bind(&row.profile_picture)
        .bind(&row.attributes)
        .bind(&row.employment_status)
        .bind(row.joining_date)
        .bind(row.end_date)
        .bind(row.duration_months)
        .bind(row.progress_pct)
        .bind(row.project_rating)
        .bind(&row.tasks)
        .bind(&row.notification_settings)
        .bind(&row.security_settings)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(Some(self.hydrate_identity(row).await?))
    }

    async fn deactivate_identity(&self, id: DbId) -> CoreResult<bool> {
        let result =
            sqlx::query("UPDATE identities SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_login(&self, id: DbId) -> CoreResult<()> {
        sqlx::query("UPDATE identities SET last_active = NOW(), last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn append_attendance(
        &self,
        identity_id: DbId,
        entry: NewAttendance,
        source: AttendanceSource,
    ) -> CoreResult<AttendanceEntry> {
        let query = format!(
            "INSERT INTO attendance_entries (identity_id, date, status, source, time_in, time_out,
                notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AttendanceRow>(&query)
            .bind(identity_id)
            .bind(entry.date.unwrap_or_else(Utc::now))
            .bind(entry.status.as_str())
            .bind(source.as_str())
            .bind(&entry.time_in)
            .bind(&entry.time_out)
            .bind(&entry.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                    CoreError::NotFound {
                        entity: "Identity",
                        id: identity_id,
                    }
                }
                _ => map_db_err(err),
            })?;
        row.into_entry()
    }

    async fn append_progress(
        &self,
        identity_id: DbId,
        update: NewProgressUpdate,
    ) -> CoreResult<ProgressUpdate> {
        let query = format!(
            "INSERT INTO progress_updates (identity_id, content, submitted_at)
             VALUES ($1, $2, $3)
             RETURNING {PROGRESS_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProgressRow>(&query)
            .bind(identity_id)
            .bind(&update.content)
            .bind(update.timestamp.unwrap_or_else(Utc::now))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                    CoreError::NotFound {
                        entity: "Identity",
                        id: identity_id,
                    }
                }
                _ => map_db_err(err),
            })?;
        Ok(row.into_update())
    }

    async fn find_progress_update(
        &self,
        update_id: DbId,
    ) -> CoreResult<Option<(DbId, ProgressUpdate)>> {
        let query = format!("SELECT {PROGRESS_COLUMNS} FROM progress_updates WHERE id = $1");
        let row = sqlx::query_as::<_, ProgressRow>(&query)
            .bind(update_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(|row| (row.identity_id, row.into_update())))
    }

    async fn set_progress_feedback(
        &self,
        update_id: DbId,
        feedback: &str,
        at: Timestamp,
    ) -> CoreResult<Option<ProgressUpdate>> {
        let query = format!(
            "UPDATE progress_updates
             SET feedback = $2, feedback_date = $3, has_admin_feedback = true
             WHERE id = $1
             RETURNING {PROGRESS_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProgressRow>(&query)
            .bind(update_id)
            .bind(feedback)
            .bind(at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(ProgressRow::into_update))
    }

    // --- Projects ---------------------------------------------------------

    async fn insert_project(&self, new: NewProject) -> CoreResult<Project> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let query = format!(
            "INSERT INTO projects (title, description, status, end_date, created_by, tasks)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&new.title)
            .bind(&new.description)
            .bind(ProjectStatus::NotStarted.as_str())
            .bind(new.end_date)
            .bind(&new.created_by)
            .bind(Json(&new.tasks))
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_err)?;

        // Assign only the ids that resolve; a bad assignee must not sink the
        // whole create.
        let known: Vec<DbId> = sqlx::query_scalar("SELECT id FROM identities WHERE id = ANY($1)")
            .bind(&new.assigned_to)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_db_err)?;
        for identity_id in &new.assigned_to {
            if !known.contains(identity_id) {
                tracing::warn!(identity_id, project_id = row.id, "Assignee does not exist");
                continue;
            }
            sqlx::query(
                "INSERT INTO project_assignments (project_id, identity_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(row.id)
            .bind(identity_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;
        self.hydrate_project(row).await
    }

    async fn project(&self, id: DbId) -> CoreResult<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_projects(&self) -> CoreResult<Vec<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY id DESC");
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(self.hydrate_project(row).await?);
        }
        Ok(projects)
    }

    async fn projects_for_identity(&self, identity_id: DbId) -> CoreResult<Vec<Project>> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             JOIN project_assignments ON project_assignments.project_id = projects.id
             WHERE project_assignments.identity_id = $1
             ORDER BY project_assignments.assigned_at, projects.id"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(identity_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(self.hydrate_project(row).await?);
        }
        Ok(projects)
    }

    async fn update_project(&self, id: DbId, patch: ProjectPatch) -> CoreResult<Option<Project>> {
        let query = format!(
            "UPDATE projects SET
                status = COALESCE($2, status),
                end_date = COALESCE($3, end_date),
                tasks = COALESCE($4, tasks),
                last_modified = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.end_date)
            .bind(patch.tasks.map(Json))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn append_project_feedback(
        &self,
        id: DbId,
        entry: FeedbackEntry,
    ) -> CoreResult<Option<Project>> {
        // jsonb array || object appends the object as one element.
        let query = format!(
            "UPDATE projects SET feedback = feedback || $2, last_modified = NOW()
             WHERE id = $1
             RETURNING {PROJECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(Json(&entry))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        match row {
            Some(row) => Ok(Some(self.hydrate_project(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_project(&self, id: DbId) -> CoreResult<bool> {
        // Assignments go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()> {
        let project_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_err)?;
        if !project_exists {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            });
        }
        let identity_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM identities WHERE id = $1)")
                .bind(identity_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_err)?;
        if !identity_exists {
            return Err(CoreError::NotFound {
                entity: "Identity",
                id: identity_id,
            });
        }
        sqlx::query(
            "INSERT INTO project_assignments (project_id, identity_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(identity_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn unassign_project(&self, project_id: DbId, identity_id: DbId) -> CoreResult<()> {
        sqlx::query(
            "DELETE FROM project_assignments WHERE project_id = $1 AND identity_id = $2",
        )
        .bind(project_id)
        .bind(identity_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    // --- Pending registrations -------------------------------------------

    async fn insert_pending(&self, new: NewPendingStudent) -> CoreResult<PendingStudent> {
        let query = format!(
            "INSERT INTO pending_students (name, email, username, password_hash, contact_number,
                program, university, graduation_year, bio)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {PENDING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PendingRow>(&query)
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(&new.contact_number)
            .bind(&new.program)
            .bind(&new.university)
            .bind(new.graduation_year)
            .bind(&new.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.into_pending())
    }

    async fn pending(&self, id: DbId) -> CoreResult<Option<PendingStudent>> {
        let query = format!("SELECT {PENDING_COLUMNS} FROM pending_students WHERE id = $1");
        let row = sqlx::query_as::<_, PendingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(PendingRow::into_pending))
    }

    async fn pending_by_identifier(&self, identifier: &str) -> CoreResult<Option<PendingStudent>> {
        let query = format!(
            "SELECT {PENDING_COLUMNS} FROM pending_students WHERE username = $1 OR email = $1"
        );
        let row = sqlx::query_as::<_, PendingRow>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(PendingRow::into_pending))
    }

    async fn pending_exists(&self, email: &str, username: &str) -> CoreResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pending_students WHERE email = $1 OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn list_pending(&self) -> CoreResult<Vec<PendingStudent>> {
        let query = format!("SELECT {PENDING_COLUMNS} FROM pending_students ORDER BY id DESC");
        let rows = sqlx::query_as::<_, PendingRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(PendingRow::into_pending).collect())
    }

    async fn delete_pending(&self, id: DbId) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM pending_students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    // --- Past interns -----------------------------------------------------

    async fn insert_past_intern(&self, snapshot: NewPastIntern) -> CoreResult<PastIntern> {
        let insert = format!(
            "INSERT INTO past_interns (source_intern_id, name, email, joining_date, end_date,
                duration_months, progress_pct, tasks, attendance, progress_updates, status,
                deleted_at, deleted_projects)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             ON CONFLICT (source_intern_id) DO NOTHING
             RETURNING {PAST_INTERN_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, PastInternRow>(&insert)
            .bind(snapshot.source_intern_id)
            .bind(&snapshot.name)
            .bind(&snapshot.email)
            .bind(snapshot.joining_date)
            .bind(snapshot.end_date)
            .bind(snapshot.duration_months)
            .bind(snapshot.progress_pct)
            .bind(Json(&snapshot.tasks))
            .bind(Json(&snapshot.attendance))
            .bind(Json(&snapshot.progress_updates))
            .bind(&snapshot.status)
            .bind(snapshot.deleted_at)
            .bind(Json(&snapshot.deleted_projects))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;

        if let Some(row) = inserted {
            return Ok(row.into_past_intern());
        }

        // Archive retry: the stored snapshot wins, never overwritten.
        let select = format!(
            "SELECT {PAST_INTERN_COLUMNS} FROM past_interns WHERE source_intern_id = $1"
        );
        let row = sqlx::query_as::<_, PastInternRow>(&select)
            .bind(snapshot.source_intern_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.into_past_intern())
    }

    async fn past_intern(&self, id: DbId) -> CoreResult<Option<PastIntern>> {
        let query = format!("SELECT {PAST_INTERN_COLUMNS} FROM past_interns WHERE id = $1");
        let row = sqlx::query_as::<_, PastInternRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(PastInternRow::into_past_intern))
    }

    async fn list_past_interns(&self) -> CoreResult<Vec<PastIntern>> {
        let query = format!("SELECT {PAST_INTERN_COLUMNS} FROM past_interns ORDER BY id DESC");
        let rows = sqlx::query_as::<_, PastInternRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(PastInternRow::into_past_intern).collect())
    }
}
