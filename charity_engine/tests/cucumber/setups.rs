use cucumber::given;

use crate::cucumber::{FundSystem, FundWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut FundWorld) {
    let system = FundSystem::new().await;
    world.system = Some(system);
}
