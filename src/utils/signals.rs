use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Exit status used when the suite was interrupted and reported no code of its own
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Install a handler for SIGINT, SIGTERM and SIGHUP that only records the interrupt.
///
/// A terminal Ctrl-C also reaches the test suite through the process group; a
/// signal aimed at the runner alone is forwarded by the session. Either way the
/// runner keeps going so the start-up hook guard gets dropped normally.
pub fn install_interrupt_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, std::sync::atomic::Ordering::SeqCst);
    })?;
    Ok(flag)
}
