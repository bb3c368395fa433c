pub mod cutover;
pub mod extractor;
pub mod freshness;
pub mod installer;
pub mod layout;
pub mod retention;

pub use cutover::CutoverManager;
pub use freshness::{FreshnessChecker, FreshnessStatus};
pub use installer::ArtifactInstaller;
pub use layout::DeployLayout;
pub use retention::{CleanupOutcome, CleanupPlan, RetentionManager};
