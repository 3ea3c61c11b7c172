pub mod parse;
pub mod plan;
pub mod rounds;
pub mod status;

use std::path::Path;

use anyhow::Context;
use usher_config::UsherConfig;
use usher_store::Store;

/// Open the persisted store for a session under the configured state dir,
/// honoring the `storage.trail` toggle.
pub fn open_store(config: &UsherConfig, session: &str) -> anyhow::Result<Store> {
    Store::open_with_trail(
        Path::new(&config.storage.state_dir),
        session,
        config.storage.trail,
    )
    .with_context(|| format!("failed to open session '{session}'"))
}
