use crate::terminal::CLS;
use std::io::{self, Write};

pub const LOGO: [&str; 3] = [
    r"|_  _  _ _   ",
    r"| |(_|| |_)\/",
    r"        |  / ",
];

/// Draws one frame: a cleared screen, the logo, one line per scent, then the active modes
/// and the last request sent.
pub fn draw<W, I>(out: &mut W, lines: I, modes: &str, sent: &str) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = String>,
{
    writeln!(out, "{}", CLS)?;
    for line in LOGO.iter() {
        writeln!(out, "{}", line)?;
    }
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "{}>\t{}", modes, sent)?;
    out.flush()
}
