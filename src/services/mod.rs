pub mod progress;
pub mod relay_service;
pub mod schedule;

pub use progress::AdvanceOutcome;
pub use relay_service::{Enrollment, RelayService};
pub use schedule::ScheduleBuildResult;
