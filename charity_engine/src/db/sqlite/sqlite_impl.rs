//! `SqliteDatabase` is a concrete implementation of a charity fund backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`CharityDatabase`] trait.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{donations, funding, new_pool, projects, SqliteOpenQueue};
use crate::{
    allocation::{allocate, Allocation},
    config::EngineConfig,
    db_types::{CharityProject, Donation, FundingKind, NewCharityProject, NewDonation, ProjectUpdate},
    traits::{CharityDatabase, FundingError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CharityDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn project_id_by_name(&self, name: &str) -> Result<Option<i64>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        projects::project_id_by_name(name, &mut conn).await
    }

    async fn fetch_project(&self, id: i64) -> Result<Option<CharityProject>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        projects::fetch_project(id, &mut conn).await
    }

    async fn fetch_projects(&self) -> Result<Vec<CharityProject>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        projects::fetch_projects(&mut conn).await
    }

    async fn fetch_donation(&self, id: i64) -> Result<Option<Donation>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        donations::fetch_donation(id, &mut conn).await
    }

    async fn fetch_donations(&self) -> Result<Vec<Donation>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        donations::fetch_donations(&mut conn).await
    }

    async fn fetch_donations_for_user(&self, user_id: i64) -> Result<Vec<Donation>, FundingError> {
        let mut conn = self.pool.acquire().await?;
        donations::fetch_donations_for_user(user_id, &mut conn).await
    }

    async fn process_new_project(
        &self,
        project: NewCharityProject,
    ) -> Result<(CharityProject, Allocation), FundingError> {
        let mut tx = self.pool.begin().await?;
        // Write first, so that this transaction holds the write lock before it looks at the open queue
        let inserted = projects::insert_project(project, Utc::now(), &mut tx).await?;
        let id = inserted.id;
        // Only read the clock once the lock is ours. Runs that committed while we waited must be strictly older.
        let now = Utc::now();
        funding::stamp_create_date(FundingKind::Project, id, now, &mut tx).await?;
        let mut state = inserted.funding;
        state.create_date = now;
        let allocation = {
            let mut queue = SqliteOpenQueue::new(&mut tx);
            allocate(&mut queue, FundingKind::Project, &mut state, now).await?
        };
        if !allocation.is_empty() {
            funding::save_funding(FundingKind::Project, id, &state, &mut tx).await?;
        }
        let project = projects::fetch_project(id, &mut tx).await?.ok_or_else(|| {
            error!("🗃️ Project #{id} was not found straight after inserting it. This should not happen.");
            FundingError::ProjectNotFound(id)
        })?;
        tx.commit().await?;
        debug!(
            "🗃️ Project #{id} stored with {} of {} invested from {} donations",
            project.funding.invested_amount,
            project.funding.full_amount,
            allocation.transfers.len()
        );
        Ok((project, allocation))
    }

    async fn process_new_donation(&self, donation: NewDonation) -> Result<(Donation, Allocation), FundingError> {
        let mut tx = self.pool.begin().await?;
        // Write first, so that this transaction holds the write lock before it looks at the open queue
        let inserted = donations::insert_donation(donation, Utc::now(), &mut tx).await?;
        let id = inserted.id;
        // Only read the clock once the lock is ours. Runs that committed while we waited must be strictly older.
        let now = Utc::now();
        funding::stamp_create_date(FundingKind::Donation, id, now, &mut tx).await?;
        let mut state = inserted.funding;
        state.create_date = now;
        let allocation = {
            let mut queue = SqliteOpenQueue::new(&mut tx);
            allocate(&mut queue, FundingKind::Donation, &mut state, now).await?
        };
        if !allocation.is_empty() {
            funding::save_funding(FundingKind::Donation, id, &state, &mut tx).await?;
        }
        let donation = donations::fetch_donation(id, &mut tx).await?.ok_or_else(|| {
            FundingError::DatabaseError(format!("Donation #{id} was not found straight after inserting it"))
        })?;
        tx.commit().await?;
        debug!(
            "🗃️ Donation #{id} stored with {} of {} invested into {} projects",
            donation.funding.invested_amount,
            donation.funding.full_amount,
            allocation.transfers.len()
        );
        Ok((donation, allocation))
    }

    async fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<CharityProject, FundingError> {
        let mut tx = self.pool.begin().await?;
        if update.is_empty() {
            let project = projects::fetch_project(id, &mut tx).await?.ok_or(FundingError::ProjectNotFound(id))?;
            update.check_against(&project)?;
            debug!("🗃️ No fields to update for project #{id}. Update request skipped.");
            return Ok(project);
        }
        let mut project = match projects::update_project(id, &update, &mut tx).await? {
            Some(project) => project,
            None => {
                let existing = projects::fetch_project(id, &mut tx).await?.ok_or(FundingError::ProjectNotFound(id))?;
                update.check_against(&existing)?;
                warn!("🗃️ Project #{id} passes every update guard, yet the guarded update did not match it.");
                return Err(FundingError::DatabaseError(format!("Project #{id} could not be updated")));
            },
        };
        if project.funding.close_if_complete(Utc::now()) {
            funding::save_funding(FundingKind::Project, id, &project.funding, &mut tx).await?;
            info!("🗃️ Project #{id} is fully invested now that its target is {}", project.funding.full_amount);
        }
        tx.commit().await?;
        debug!("🗃️ Project #{id} updated");
        Ok(project)
    }

    async fn delete_project(&self, id: i64) -> Result<CharityProject, FundingError> {
        let mut tx = self.pool.begin().await?;
        let project = match projects::delete_project(id, &mut tx).await? {
            Some(project) => project,
            None => {
                let existing = projects::fetch_project(id, &mut tx).await?.ok_or(FundingError::ProjectNotFound(id))?;
                existing.check_deletable()?;
                warn!("🗃️ Project #{id} passes the deletion guard, yet the guarded delete did not match it.");
                return Err(FundingError::DatabaseError(format!("Project #{id} could not be deleted")));
            },
        };
        tx.commit().await?;
        info!("🗃️ Project #{id} '{}' deleted", project.name);
        Ok(project)
    }

    async fn close(&mut self) -> Result<(), FundingError> {
        self.pool.close().await;
        Ok(())
    }
}

impl SqliteDatabase {
    /// Creates a new database API object from the given configuration, running migrations if the configuration asks
    /// for it.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, FundingError> {
        let pool = new_pool(&config.database_url, config.max_connections, config.busy_timeout).await?;
        let db = Self { url: config.database_url.clone(), pool };
        if config.auto_migrate {
            db.migrate().await?;
        }
        Ok(db)
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections, EngineConfig::default().busy_timeout).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), FundingError> {
        migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| FundingError::DatabaseError(format!("Error running migrations: {e}")))?;
        info!("🗃️ Migrations complete for {}", self.url);
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
