use charity_common::Amount;
use charity_engine::{
    db_types::{NewCharityProject, NewDonation, ProjectUpdate},
    FundingError,
};
use cucumber::{then, when};

use crate::cucumber::FundWorld;

fn description_for(name: &str) -> String {
    format!("Everything the '{name}' project needs")
}

fn error_name(e: &FundingError) -> &'static str {
    match e {
        FundingError::DatabaseError(_) => "DatabaseError",
        FundingError::DuplicateName(_) => "DuplicateName",
        FundingError::ProjectNotFound(_) => "NotFound",
        FundingError::InvalidAmountFloor { .. } => "InvalidAmountFloor",
        FundingError::ImmutableClosedEntity(_) => "ImmutableClosedEntity",
        FundingError::NonDeletable(_) => "NonDeletable",
        FundingError::ValidationError(_) => "ValidationError",
    }
}

//----------------------------------------------   Projects   ----------------------------------------------------
#[when(expr = "I open the project {string} with a target of {int}")]
async fn open_project(world: &mut FundWorld, name: String, target: i64) {
    let project = NewCharityProject::new(name.clone(), description_for(&name), Amount::from(target));
    world.projects().create_project(project).await.expect("Error opening project");
}

#[when(expr = "I try to open the project {string} with a target of {int}")]
async fn try_open_project(world: &mut FundWorld, name: String, target: i64) {
    let project = NewCharityProject::new(name.clone(), description_for(&name), Amount::from(target));
    let result = world.projects().create_project(project).await;
    world.record_failure(result);
}

#[when(expr = "I change the target of project {string} to {int}")]
async fn change_target(world: &mut FundWorld, name: String, target: i64) {
    let id = world.project_named(&name).await.id;
    let update = ProjectUpdate::default().with_full_amount(Amount::from(target));
    world.projects().update_project(id, update).await.expect("Error updating project");
}

#[when(expr = "I try to change the target of project {string} to {int}")]
async fn try_change_target(world: &mut FundWorld, name: String, target: i64) {
    let id = world.project_named(&name).await.id;
    let update = ProjectUpdate::default().with_full_amount(Amount::from(target));
    let result = world.projects().update_project(id, update).await;
    world.record_failure(result);
}

#[when(expr = "I rename project {string} to {string}")]
async fn rename_project(world: &mut FundWorld, name: String, new_name: String) {
    let id = world.project_named(&name).await.id;
    let update = ProjectUpdate::default().with_name(new_name);
    world.projects().update_project(id, update).await.expect("Error renaming project");
}

#[when(expr = "I try to rename project {string} to {string}")]
async fn try_rename_project(world: &mut FundWorld, name: String, new_name: String) {
    let id = world.project_named(&name).await.id;
    let update = ProjectUpdate::default().with_name(new_name);
    let result = world.projects().update_project(id, update).await;
    world.record_failure(result);
}

#[when(expr = "I try to change the description of project {string} to {string}")]
async fn try_change_description(world: &mut FundWorld, name: String, description: String) {
    let id = world.project_named(&name).await.id;
    let update = ProjectUpdate::default().with_description(description);
    let result = world.projects().update_project(id, update).await;
    world.record_failure(result);
}

#[when(expr = "I delete project {string}")]
async fn delete_project(world: &mut FundWorld, name: String) {
    let id = world.project_named(&name).await.id;
    let deleted = world.projects().delete_project(id).await.expect("Error deleting project");
    assert_eq!(deleted.name, name);
}

#[when(expr = "I try to delete project {string}")]
async fn try_delete_project(world: &mut FundWorld, name: String) {
    let id = world.project_named(&name).await.id;
    let result = world.projects().delete_project(id).await;
    world.record_failure(result);
}

#[when(expr = "I try to delete project number {int}")]
async fn try_delete_project_by_id(world: &mut FundWorld, id: i64) {
    let result = world.projects().delete_project(id).await;
    world.record_failure(result);
}

//----------------------------------------------   Donations  ----------------------------------------------------
#[when(expr = "user {int} donates {int}")]
async fn user_donates(world: &mut FundWorld, user_id: i64, amount: i64) {
    let donation = NewDonation::new(Amount::from(amount)).with_user_id(user_id);
    world.donations().create_donation(donation).await.expect("Error recording donation");
}

#[when(expr = "an anonymous donor gives {int} with the comment {string}")]
async fn anonymous_donation(world: &mut FundWorld, amount: i64, comment: String) {
    let donation = NewDonation::new(Amount::from(amount)).with_comment(comment);
    world.donations().create_donation(donation).await.expect("Error recording donation");
}

#[when(expr = "user {int} tries to donate {int}")]
async fn user_tries_to_donate(world: &mut FundWorld, user_id: i64, amount: i64) {
    let donation = NewDonation::new(Amount::from(amount)).with_user_id(user_id);
    let result = world.donations().create_donation(donation).await;
    world.record_failure(result);
}

//----------------------------------------------   Checks     ----------------------------------------------------
#[then(expr = "project {string} has {int} of {int} invested")]
async fn project_invested(world: &mut FundWorld, name: String, invested: i64, full: i64) {
    let project = world.project_named(&name).await;
    assert_eq!(project.funding.invested_amount, Amount::from(invested), "Invested amount is incorrect");
    assert_eq!(project.funding.full_amount, Amount::from(full), "Full amount is incorrect");
}

#[then(expr = "project {string} is {word}")]
async fn project_state(world: &mut FundWorld, name: String, state: String) {
    let project = world.project_named(&name).await;
    match state.as_str() {
        "open" => {
            assert!(!project.funding.fully_invested, "Project should be open");
            assert!(project.funding.close_date.is_none(), "Open project has a close date");
        },
        "closed" => {
            assert!(project.funding.fully_invested, "Project should be fully invested");
            assert!(project.funding.close_date.is_some(), "Closed project has no close date");
        },
        _ => panic!("Unknown project state {state}"),
    }
}

#[then(expr = "donation #{int} has {int} of {int} invested")]
async fn donation_invested(world: &mut FundWorld, id: i64, invested: i64, full: i64) {
    let donation = world.donation(id).await;
    assert_eq!(donation.funding.invested_amount, Amount::from(invested), "Invested amount is incorrect");
    assert_eq!(donation.funding.full_amount, Amount::from(full), "Full amount is incorrect");
}

#[then(expr = "donation #{int} is {word}")]
async fn donation_state(world: &mut FundWorld, id: i64, state: String) {
    let donation = world.donation(id).await;
    match state.as_str() {
        "open" => {
            assert!(!donation.funding.fully_invested, "Donation should be open");
            assert!(donation.funding.close_date.is_none(), "Open donation has a close date");
        },
        "closed" => {
            assert!(donation.funding.fully_invested, "Donation should be fully invested");
            assert!(donation.funding.close_date.is_some(), "Closed donation has no close date");
        },
        _ => panic!("Unknown donation state {state}"),
    }
}

#[then(expr = "project {string} and donation #{int} closed at the same moment")]
async fn closed_together(world: &mut FundWorld, name: String, id: i64) {
    let project = world.project_named(&name).await;
    let donation = world.donation(id).await;
    assert!(project.funding.close_date.is_some());
    assert_eq!(project.funding.close_date, donation.funding.close_date);
}

#[then(expr = "the request fails with {word}")]
async fn request_failed(world: &mut FundWorld, expected: String) {
    let err = world.last_error.take().expect("No request has failed");
    assert_eq!(error_name(&err), expected, "Unexpected error: {err}");
}

#[then(expr = "there are {int} projects")]
async fn project_count(world: &mut FundWorld, count: usize) {
    let projects = world.projects().projects().await.expect("Error fetching projects");
    assert_eq!(projects.len(), count);
}

#[then(expr = "user {int} has made {int} donations totalling {int}")]
async fn user_donations(world: &mut FundWorld, user_id: i64, count: usize, total: i64) {
    let donations = world.donations().donations_for_user(user_id).await.expect("Error fetching donations");
    assert_eq!(donations.len(), count);
    let sum: Amount = donations.iter().map(|d| d.full_amount).sum();
    assert_eq!(sum, Amount::from(total));
}

#[then("every record is consistent")]
async fn all_consistent(world: &mut FundWorld) {
    let projects = world.projects().projects().await.expect("Error fetching projects");
    let donations = world.donations().donations().await.expect("Error fetching donations");
    for p in &projects {
        assert!(p.funding.is_consistent(), "Project #{} is inconsistent: {:?}", p.id, p.funding);
    }
    for d in &donations {
        assert!(d.funding.is_consistent(), "Donation #{} is inconsistent: {:?}", d.id, d.funding);
    }
    let into_projects: Amount = projects.iter().map(|p| p.funding.invested_amount).sum();
    let from_donations: Amount = donations.iter().map(|d| d.funding.invested_amount).sum();
    assert_eq!(into_projects, from_donations, "Money was created or destroyed");
}
