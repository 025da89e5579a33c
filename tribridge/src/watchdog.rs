/// The task watchdog of the keyboard task
pub trait Watchdog {
    /// Reset the watchdog timer
    fn feed(&mut self);
}

/// For boards without a task watchdog
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn feed(&mut self) {}
}
