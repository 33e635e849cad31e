use std::io;
use std::mem;
use tracing::debug;

/// Moves the cursor home and clears the screen and the scrollback.
pub const CLS: &str = "\x1b[H\x1b[2J\x1b[3J";

/// Used when the terminal cannot tell us its size.
pub const DEFAULT_WIDTH: usize = 80;

/// Whether stdin, stdout and stderr are all terminals.
pub fn is_interactive() -> bool {
    [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO]
        .iter()
        .all(|&fd| unsafe { libc::isatty(fd) } == 1)
}

/// Whether we are the foreground process group of the terminal on stdout.
pub fn is_foreground() -> bool {
    let foreground = unsafe { libc::tcgetpgrp(libc::STDOUT_FILENO) };
    foreground != -1 && foreground == unsafe { libc::getpgrp() }
}

pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Column count of the terminal on stdout.
pub fn width() -> usize {
    let mut size: libc::winsize = unsafe { mem::zeroed() };
    match unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) } {
        0 if size.ws_col > 0 => size.ws_col as usize,
        _ => DEFAULT_WIDTH,
    }
}

/// Keeps the terminal on stdin from echoing keystrokes while alive.
///
/// Echo is switched back on when the guard is dropped. Both directions are best-effort; a
/// stdin that is not a terminal is left alone.
pub struct Echo {
    _private: (),
}

impl Echo {
    pub fn disable() -> Echo {
        if let Err(err) = set_echo(false) {
            debug!(error = %err, "could not disable echo");
        }
        Echo { _private: () }
    }
}

impl Drop for Echo {
    fn drop(&mut self) {
        if let Err(err) = set_echo(true) {
            debug!(error = %err, "could not enable echo");
        }
    }
}

fn set_echo(on: bool) -> io::Result<()> {
    let mut attributes: libc::termios = unsafe { mem::zeroed() };
    if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &mut attributes) } == -1 {
        return Err(io::Error::last_os_error());
    }
    if on {
        attributes.c_lflag |= libc::ECHO;
    } else {
        attributes.c_lflag &= !libc::ECHO;
    }
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &attributes) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
