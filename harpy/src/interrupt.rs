use harpy_engine::signal::CancellationSignal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// How often the watcher looks at the flag the handler raises.
const POLL: Duration = Duration::from_millis(10);

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signum: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    // Further ^C are ignored while the workers wind down.
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_IGN);
    }
}

/// Routes SIGINT to `signal`.
///
/// The handler only raises a flag; a watcher thread turns the flag into `signal.set()`. The
/// watcher exits as soon as the signal is set, whoever set it.
pub fn forward(signal: Arc<CancellationSignal>) -> io::Result<JoinHandle<()>> {
    let previous = unsafe {
        libc::signal(
            libc::SIGINT,
            on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t,
        )
    };
    if previous == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }

    thread::Builder::new()
        .name("Interrupt".into())
        .spawn(move || watch(&signal))
}

fn watch(signal: &CancellationSignal) {
    loop {
        if INTERRUPTED.load(Ordering::SeqCst) {
            info!("interrupted");
            signal.set();
            return;
        }
        if signal.wait(POLL) {
            return;
        }
    }
}
