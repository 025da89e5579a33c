/// Restarts the keyboard so a new transport mode takes effect
pub trait Restart {
    fn restart(&mut self);
}

/// Restart through the system reset of the core.
///
/// Boards on other architectures implement [`Restart`] with their own reset.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemReset;

impl Restart for SystemReset {
    fn restart(&mut self) {
        reboot_keyboard();
    }
}

pub fn reboot_keyboard() {
    warn!("Rebooting keyboard!");
    // For cortex-m:
    #[cfg(all(
        target_arch = "arm",
        target_os = "none",
        any(target_abi = "eabi", target_abi = "eabihf")
    ))]
    cortex_m::peripheral::SCB::sys_reset();
}
