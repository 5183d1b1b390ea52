use cucumber::given;

use crate::cucumber::{recon_world::ReconSystem, ReconWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut ReconWorld) {
    let system = ReconSystem::new().await;
    world.system = Some(system);
}
