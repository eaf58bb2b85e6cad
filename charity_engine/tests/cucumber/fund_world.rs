use charity_engine::{
    db_types::{CharityProject, Donation},
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    CharityDatabase,
    DonationApi,
    FundingError,
    ProjectApi,
    SqliteDatabase,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct FundWorld {
    pub system: Option<FundSystem>,
    pub last_error: Option<FundingError>,
}

#[derive(Debug)]
pub struct FundSystem {
    pub db_path: String,
    pub projects: ProjectApi<SqliteDatabase>,
    pub donations: DonationApi<SqliteDatabase>,
}

impl FundWorld {
    pub fn projects(&self) -> &ProjectApi<SqliteDatabase> {
        &self.system.as_ref().expect("Fund system not initialised").projects
    }

    pub fn donations(&self) -> &DonationApi<SqliteDatabase> {
        &self.system.as_ref().expect("Fund system not initialised").donations
    }

    pub async fn project_named(&self, name: &str) -> CharityProject {
        let db = self.projects().db();
        let id = db
            .project_id_by_name(name)
            .await
            .expect("Error looking up project")
            .unwrap_or_else(|| panic!("Project '{name}' does not exist"));
        db.fetch_project(id).await.expect("Error fetching project").expect("Project vanished")
    }

    pub async fn donation(&self, id: i64) -> Donation {
        self.donations()
            .donation(id)
            .await
            .expect("Error fetching donation")
            .unwrap_or_else(|| panic!("Donation #{id} does not exist"))
    }

    /// Remembers the outcome of a call that is expected to fail.
    pub fn record_failure<T: std::fmt::Debug>(&mut self, result: Result<T, FundingError>) {
        match result {
            Ok(v) => panic!("Expected the request to fail, but it succeeded with {v:?}"),
            Err(e) => {
                debug!("Request failed as expected: {e}");
                self.last_error = Some(e);
            },
        }
    }
}

impl FundSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        create_database(&url).await;
        run_migrations(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let projects = ProjectApi::new(db.clone());
        let donations = DonationApi::new(db);
        Self { db_path: url, projects, donations }
    }
}
