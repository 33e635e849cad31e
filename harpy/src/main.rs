mod cli;
mod devices;
mod interrupt;
mod screen;
mod terminal;

use afpacket::BoundSocket;
use cli::Options;
use harpy_engine::manufacturer::Manufacturers;
use harpy_engine::sender::Sender;
use harpy_engine::sniffer::Sniffer;
use harpy_engine::{transport, Error, Result, Shared};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, warn, Level};

/// Pause between two redraws of the screen.
const WAIT_PRINT: Duration = Duration::from_secs(1);

/// Manufacturer cache, relative to the home directory.
const CACHE_FILE: &str = ".oui.json";

fn main() {
    if !terminal::is_interactive() || !terminal::is_foreground() {
        return;
    }

    let devices = devices::available();
    let mut app = cli::app(&devices);
    if !terminal::is_root() {
        let _ = app.print_help();
        println!();
        return;
    }
    let options = match Options::from_matches(&app.get_matches()) {
        Ok(options) => options,
        Err(err) => err.exit(),
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(match options.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .init();

    match run(&options) {
        Ok(interrupts) => {
            for interrupt in interrupts {
                println!("{}", interrupt);
            }
        }
        Err(err) => {
            eprintln!("harpy: {}", err);
            process::exit(1);
        }
    }
}

/// Runs the workers until interrupted, redrawing the screen every [`WAIT_PRINT`]. Returns the
/// failures that stopped a worker, formatted as `[worker, error]`.
fn run(options: &Options) -> Result<Vec<String>> {
    let shared = Shared::new();
    let watcher =
        interrupt::forward(Arc::clone(&shared.signal)).map_err(startup("handle SIGINT"))?;
    let _echo = terminal::Echo::disable();

    let socket = match transport::open(&options.device) {
        Ok(socket) => Arc::new(socket),
        Err(err) => {
            shared.signal.set();
            let _ = watcher.join();
            return Err(err);
        }
    };
    let manufacturers = Arc::new(manufacturers(options.database.as_deref()));

    let sniffer = Arc::new(Sniffer::new(
        Arc::clone(&socket),
        options.range,
        manufacturers,
        options.sniffer_config(),
        shared.clone(),
    ));

    let mut workers = vec![watcher];
    let started = start(&sniffer, &socket, options, &shared, &mut workers);
    if started.is_ok() {
        let modes = options.modes();
        let stdout = io::stdout();
        while !shared.signal.wait(WAIT_PRINT) {
            let lines = sniffer.lines(terminal::width());
            if let Err(err) = screen::draw(&mut stdout.lock(), lines, &modes, &shared.sent.get()) {
                warn!(error = %err, "could not draw");
            }
        }
    } else {
        shared.signal.set();
    }

    for worker in workers {
        let name = worker.thread().name().unwrap_or("worker").to_string();
        if worker.join().is_err() {
            error!(worker = %name, "worker panicked");
        }
    }
    started?;

    Ok(shared
        .interrupts
        .drain()
        .into_iter()
        .map(|interrupt| match interrupt {
            Error::Transport { worker, source } => format!("[{}, {}]", worker, source),
            other => format!("[harpy, {}]", other),
        })
        .collect())
}

fn start(
    sniffer: &Arc<Sniffer<BoundSocket>>,
    socket: &Arc<BoundSocket>,
    options: &Options,
    shared: &Shared,
    workers: &mut Vec<JoinHandle<()>>,
) -> Result<()> {
    let worker = Arc::clone(sniffer);
    workers.push(spawn(Sniffer::<BoundSocket>::NAME, move || worker.run())?);

    if !options.passive {
        let sender = Sender::new(
            Arc::clone(socket),
            &options.range,
            options.sender_config()?,
            shared.clone(),
        )?;
        workers.push(spawn(Sender::<BoundSocket>::NAME, move || sender.run())?);
    }
    Ok(())
}

fn spawn<F>(name: &'static str, f: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.into())
        .spawn(f)
        .map_err(startup(name))
}

fn startup(context: &str) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::Startup {
        context: context.to_string(),
        source,
    }
}

fn cache_path() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(CACHE_FILE)
}

/// Loads the manufacturer cache, after rebuilding it from `csv` if one was given. A failed
/// rebuild leaves the old cache in place.
fn manufacturers(csv: Option<&Path>) -> Manufacturers {
    let cache = cache_path();
    if let Some(csv) = csv {
        let imported = File::open(csv)
            .map_err(Error::from)
            .and_then(|file| Manufacturers::from_csv(BufReader::new(file)))
            .and_then(|db| db.dump(&cache).map(|_| db.len()));
        match imported {
            Ok(count) => info!(path = %cache.display(), count, "manufacturer database updated"),
            Err(err) => warn!(csv = %csv.display(), error = %err, "manufacturer database not updated"),
        }
    }
    Manufacturers::load(&cache)
}
