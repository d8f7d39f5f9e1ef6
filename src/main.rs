use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::{Builder, Env};
use log::info;

use vellum::config::Config;
use vellum::generate::Generator;
use vellum::path::PathResolver;
use vellum::publish::ContentStore;

/// Generates the blog described by a `vellum.yaml` project file.
#[derive(Parser)]
#[command(name = "vellum", version, about)]
struct Args {
    /// The project file. Searched for in the working directory and its
    /// ancestors when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Don't publish the index page.
    #[arg(long)]
    no_publish: bool,

    /// Log more detail (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    Builder::from_env(Env::default().filter_or("RUST_LOG", level))
        .format(|buf, record| writeln!(buf, "{:>5} {}", record.level(), record.args()))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::from_project_file(path)?,
        None => Config::from_directory(&std::env::current_dir()?)?,
    };

    let store = match (&config.publish, args.no_publish) {
        (Some(publish), false) => Some((ContentStore::new(&publish.store), publish.gateway.clone())),
        _ => None,
    };

    let mut generator = Generator::new(&config, PathResolver::system());
    if let Some((store, gateway)) = &store {
        generator = generator.with_publisher(store, gateway.clone());
    }
    let report = generator.generate()?;

    info!(
        "generated {} posts into {}",
        report.posts,
        config.public_directory.display()
    );
    if let Some(published) = &report.published {
        println!("published index.html to {}", published.url);
    }
    Ok(())
}
