use embedzip_format::{ExtractOptions, FailurePolicy, PackOptions};
use structopt::StructOpt;

mod cli;
mod commands;
mod error;

use cli::{CliOpts, Commands};

fn policy(keep_going: bool) -> FailurePolicy {
    if keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    }
}

fn main() {
    let opts = CliOpts::from_iter(wild::args_os());

    let level = match opts.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = match opts.cmd {
        Commands::Pack {
            chunk_size,
            compression,
            source,
            output,
        } => commands::pack(
            source,
            output,
            PackOptions {
                chunk_size,
                compression,
            },
        ),
        Commands::List { json, chunks } => commands::list(chunks, json),
        Commands::Extract {
            keep_going,
            serial,
            chunks,
            dest,
        } => commands::extract(
            chunks,
            dest,
            ExtractOptions {
                policy: policy(keep_going),
                parallel: !serial,
            },
        ),
        Commands::Unzip {
            keep_going,
            zipfile,
            dest,
        } => commands::unzip(
            zipfile,
            dest,
            ExtractOptions {
                policy: policy(keep_going),
                parallel: false,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:?}", anyhow::Error::from(e));
        std::process::exit(1);
    }
}
