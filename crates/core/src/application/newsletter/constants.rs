// Newsletter scheduler constants (no magic values)
use std::time::Duration;

/// Interval between ticks (once per minute)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// How long `SchedulerHandle::stop` waits for the in-flight job to commit
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
