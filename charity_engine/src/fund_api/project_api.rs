use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CharityProject, NewCharityProject, ProjectUpdate},
    traits::{CharityDatabase, FundingError},
};

/// `ProjectApi` is the administrative API for charity projects.
pub struct ProjectApi<B> {
    db: B,
}

impl<B> Debug for ProjectApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProjectApi")
    }
}

impl<B> ProjectApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> ProjectApi<B>
where B: CharityDatabase
{
    /// Opens a new project.
    ///
    /// The project is immediately funded from any open donations, oldest first. The returned record reflects the
    /// outcome of that allocation run.
    pub async fn create_project(&self, project: NewCharityProject) -> Result<CharityProject, FundingError> {
        project.validate()?;
        if self.db.project_id_by_name(&project.name).await?.is_some() {
            debug!("🔄️📁️ A project named '{}' already exists", project.name);
            return Err(FundingError::DuplicateName(project.name));
        }
        let (project, allocation) = self.db.process_new_project(project).await?;
        info!(
            "🔄️📁️ Project #{} '{}' opened. {} of {} raised from {} donations",
            project.id,
            project.name,
            allocation.total(),
            project.funding.full_amount,
            allocation.transfers.len()
        );
        Ok(project)
    }

    /// Changes the name, description or target amount of an open project.
    ///
    /// ## Failure modes:
    /// - [`FundingError::ValidationError`] if a supplied field is empty or not positive.
    /// - [`FundingError::ProjectNotFound`] if the project does not exist.
    /// - [`FundingError::ImmutableClosedEntity`] if the project is fully invested, whatever the fields.
    /// - [`FundingError::DuplicateName`] if any project, including this one, already has the new name.
    /// - [`FundingError::InvalidAmountFloor`] if the new target is below the amount already invested.
    pub async fn update_project(&self, id: i64, update: ProjectUpdate) -> Result<CharityProject, FundingError> {
        update.validate()?;
        let project = self.db.fetch_project(id).await?.ok_or(FundingError::ProjectNotFound(id))?;
        if project.is_closed() {
            warn!("🔄️📁️ Refusing to modify project #{id}, which is already fully invested");
            return Err(FundingError::ImmutableClosedEntity(id));
        }
        if let Some(name) = &update.name {
            if let Some(owner) = self.db.project_id_by_name(name).await? {
                debug!("🔄️📁️ Project #{owner} already uses the name '{name}'");
                return Err(FundingError::DuplicateName(name.clone()));
            }
        }
        update.check_against(&project)?;
        let project = self.db.update_project(id, update).await?;
        debug!("🔄️📁️ Project #{id} updated");
        Ok(project)
    }

    /// Removes a project that has not received any money yet. Returns the removed record.
    pub async fn delete_project(&self, id: i64) -> Result<CharityProject, FundingError> {
        let project = self.db.fetch_project(id).await?.ok_or(FundingError::ProjectNotFound(id))?;
        project.check_deletable()?;
        let project = self.db.delete_project(id).await?;
        info!("🔄️📁️ Project #{id} '{}' removed", project.name);
        Ok(project)
    }

    pub async fn project(&self, id: i64) -> Result<Option<CharityProject>, FundingError> {
        self.db.fetch_project(id).await
    }

    pub async fn projects(&self) -> Result<Vec<CharityProject>, FundingError> {
        self.db.fetch_projects().await
    }
}
