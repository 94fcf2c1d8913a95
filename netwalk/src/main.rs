//! NetWalk command line entry point.
//!
//! Reads targets from the input document, crawls each one, and writes the
//! inferred topology plus the event log to the output document.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use log::{LevelFilter, error, info, warn};
use netwalk::{
    CrawlConfig, CrawlSession, Crawler, HostKeyPolicy, InputDocument, OuiDatabase, PlatformRegistry, SshRunner,
};

/// Crawl ALU OmniSwitch / 7705 SAR networks over SSH and map their topology
#[derive(Parser, Debug)]
#[command(name = "netwalk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input XML document with targets, credentials and members
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output XML document
    #[arg(short = 'o', long = "output", default_value = "output.xml")]
    output: PathBuf,

    /// Log verbosity: 0 warn, 1 info, 2 debug, 3 and up trace
    #[arg(short = 'd', long = "debug", default_value = "0")]
    debug: u8,

    /// Also print log lines to stderr
    #[arg(short = 'p', long = "print")]
    print: bool,

    /// Log file
    #[arg(short = 'l', long = "logfile", default_value = "nw.log")]
    logfile: PathBuf,

    /// Entrypoints handled concurrently within a crawl round
    #[arg(long = "parallel", default_value = "1")]
    parallel: usize,

    /// Overall crawl budget in seconds
    #[arg(long = "deadline")]
    deadline: Option<u64>,

    /// IEEE oui.txt style manufacturer database
    #[arg(long = "oui")]
    oui: Option<PathBuf>,

    /// known_hosts file used to verify devices
    #[arg(long = "known-hosts")]
    known_hosts: Option<PathBuf>,

    /// Refuse devices missing from known_hosts instead of learning them
    #[arg(long = "strict-host-keys")]
    strict_host_keys: bool,
}

/// Log sink writing to the log file and optionally to stderr.
struct Tee {
    file: File,
    print: bool,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.print {
            io::stderr().write_all(buf)?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn level(debug: u8) -> LevelFilter {
    match debug {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.logfile)
        .with_context(|| format!("cannot open log file {}", args.logfile.display()))?;
    env_logger::Builder::new()
        .filter_level(level(args.debug))
        .target(env_logger::Target::Pipe(Box::new(Tee {
            file,
            print: args.print,
        })))
        .try_init()
        .context("cannot install logger")?;
    Ok(())
}

fn crawl_config(args: &Args) -> CrawlConfig {
    let mut config = CrawlConfig::default().with_parallelism(args.parallel);
    if let Some(secs) = args.deadline {
        config = config.with_deadline(Duration::from_secs(secs));
    }
    if let Some(path) = &args.known_hosts {
        config = config.with_known_hosts(path.clone());
    }
    if let Some(path) = &args.oui {
        config = config.with_oui_database(path.clone());
    }
    config
}

async fn run(args: Args) -> anyhow::Result<()> {
    let session = Arc::new(CrawlSession::new());
    let config = crawl_config(&args);

    let input = InputDocument::load(&args.input, &session, config.default_ssh_port)
        .with_context(|| format!("cannot use input document {}", args.input.display()))?;
    info!(
        "loaded {} targets and {} members from {}",
        input.targets.len(),
        input.members.len(),
        args.input.display()
    );

    let policy = if args.strict_host_keys {
        HostKeyPolicy::Strict
    } else {
        HostKeyPolicy::AcceptNew
    };
    let runner = SshRunner::new(config.known_hosts_path.clone())
        .context("cannot set up SSH")?
        .with_host_key_policy(policy);
    let oui = match OuiDatabase::load(&config.oui_database) {
        Ok(db) => Some(db),
        Err(e) => {
            warn!("{}; leaf hostnames will be raw MACs", e);
            None
        }
    };
    let registry = PlatformRegistry::builtin().context("cannot build platform tables")?;

    let mut crawler = Crawler::new(runner, config, registry, session.clone());
    if let Some(db) = oui {
        crawler = crawler.with_oui(db);
    }

    let mut results = Vec::with_capacity(input.targets.len());
    for target in input.targets {
        info!("crawling target {}", target.id);
        results.push(crawler.burrow(target, input.members.clone()).await);
    }

    netwalk::document::write_file(&args.output, &results, &session.events())
        .with_context(|| format!("cannot write output document {}", args.output.display()))?;
    info!("wrote {}", args.output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("netwalk: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("netwalk: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
