use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{CharityProject, NewCharityProject, ProjectUpdate},
    traits::FundingError,
};

/// Inserts a new, open project with nothing invested. This is not atomic. Embed the call inside a transaction if you
/// need atomicity, and pass `&mut tx` as the connection argument.
///
/// A name that is already taken results in [`FundingError::DuplicateName`].
pub async fn insert_project(
    project: NewCharityProject,
    create_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<CharityProject, FundingError> {
    let name = project.name.clone();
    let project: CharityProject = sqlx::query_as(
        r#"
            INSERT INTO charity_projects (name, description, full_amount, invested_amount, fully_invested, create_date)
            VALUES ($1, $2, $3, 0, FALSE, $4)
            RETURNING *;
        "#,
    )
    .bind(project.name)
    .bind(project.description)
    .bind(project.full_amount)
    .bind(create_date)
    .fetch_one(conn)
    .await
    .map_err(|e| map_name_clash(e, name))?;
    debug!("🗃️ Project #{} '{}' inserted", project.id, project.name);
    Ok(project)
}

pub async fn fetch_project(id: i64, conn: &mut SqliteConnection) -> Result<Option<CharityProject>, FundingError> {
    let project =
        sqlx::query_as("SELECT * FROM charity_projects WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(project)
}

/// Returns all projects, in queue order.
pub async fn fetch_projects(conn: &mut SqliteConnection) -> Result<Vec<CharityProject>, FundingError> {
    let projects =
        sqlx::query_as("SELECT * FROM charity_projects ORDER BY create_date ASC, id ASC").fetch_all(conn).await?;
    Ok(projects)
}

/// Checks whether a project with exactly this name exists (the comparison is case-sensitive). If it does, its `id`
/// is returned.
pub async fn project_id_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<i64>, FundingError> {
    let id = sqlx::query_scalar("SELECT id FROM charity_projects WHERE name = $1")
        .bind(name)
        .fetch_optional(conn)
        .await?;
    Ok(id)
}

/// Applies the update, but only if the project is still open and the new target (if any) does not drop below the
/// amount already invested. Returns `None` if no row matched, i.e. the project does not exist or one of the guards
/// failed. Callers re-read the project to find out which.
///
/// The update must not be empty.
pub(crate) async fn update_project(
    id: i64,
    update: &ProjectUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<CharityProject>, FundingError> {
    if update.is_empty() {
        return Err(FundingError::ValidationError("There are no fields to update".into()));
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE charity_projects SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = &update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name.clone());
    }
    if let Some(description) = &update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description.clone());
    }
    if let Some(full_amount) = update.full_amount {
        set_clause.push("full_amount = ");
        set_clause.push_bind_unseparated(full_amount);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" AND fully_invested = FALSE");
    if let Some(full_amount) = update.full_amount {
        builder.push(" AND invested_amount <= ");
        builder.push_bind(full_amount);
    }
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let row = builder.build().fetch_optional(conn).await.map_err(|e| match &update.name {
        Some(name) => map_name_clash(e, name.clone()),
        None => FundingError::from(e),
    })?;
    let project = row.map(|row: SqliteRow| CharityProject::from_row(&row)).transpose()?;
    trace!("🗃️ Result of update_project: {project:?}");
    Ok(project)
}

/// Deletes the project, provided it has not received any money. Returns `None` if no row matched.
pub(crate) async fn delete_project(id: i64, conn: &mut SqliteConnection) -> Result<Option<CharityProject>, FundingError> {
    let project = sqlx::query_as(
        "DELETE FROM charity_projects WHERE id = $1 AND fully_invested = FALSE AND invested_amount = 0 RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(project)
}

fn map_name_clash(e: sqlx::Error, name: String) -> FundingError {
    match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => FundingError::DuplicateName(name),
        _ => FundingError::from(e),
    }
}
