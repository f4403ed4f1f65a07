use std::num::NonZeroUsize;
use std::path::PathBuf;

use embedzip_format::Compression;
use structopt::clap::AppSettings::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(
        name = "pack",
        about = "Pack a directory into numbered chunk files and a mod.rs that embeds them"
    )]
    Pack {
        #[structopt(
            long,
            default_value = "1048576",
            help = "Upper bound on the size of each chunk, in bytes"
        )]
        chunk_size: NonZeroUsize,

        #[structopt(
            short = "C",
            long,
            default_value = "deflate",
            possible_values = Compression::available_variants(),
            help = "Compression to be used for each file"
        )]
        compression: Compression,

        #[structopt(parse(from_os_str), help = "Directory to pack")]
        source: PathBuf,

        #[structopt(
            parse(from_os_str),
            help = "Output directory, replaced as a whole when packing succeeds"
        )]
        output: PathBuf,
    },

    #[structopt(name = "list", visible_alias = "l", about = "List the entries of packed chunks")]
    List {
        #[structopt(long, help = "Print entries as JSON")]
        json: bool,

        #[structopt(parse(from_os_str), help = "Directory holding chunk0.bin, chunk1.bin, ...")]
        chunks: PathBuf,
    },

    #[structopt(
        name = "extract",
        visible_alias = "x",
        about = "Extract packed chunks into a directory"
    )]
    Extract {
        #[structopt(long, help = "Skip entries that fail instead of stopping at the first")]
        keep_going: bool,

        #[structopt(long, help = "Write files one at a time")]
        serial: bool,

        #[structopt(parse(from_os_str), help = "Directory holding chunk0.bin, chunk1.bin, ...")]
        chunks: PathBuf,

        #[structopt(parse(from_os_str), help = "Destination directory")]
        dest: PathBuf,
    },

    #[structopt(name = "unzip", about = "Safely extract a plain zip file")]
    Unzip {
        #[structopt(long, help = "Skip entries that fail instead of stopping at the first")]
        keep_going: bool,

        #[structopt(parse(from_os_str), help = "Path to the .zip file")]
        zipfile: PathBuf,

        #[structopt(parse(from_os_str), help = "Destination directory")]
        dest: PathBuf,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "embedzip",
    about = "Pack directory trees into zip chunks for embedding, and extract them safely.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands]
)]
pub struct CliOpts {
    #[structopt(
        short,
        long,
        parse(from_occurrences),
        global = true,
        help = "Show verbose output (-vv for trace)"
    )]
    pub verbose: u8,

    #[structopt(subcommand)]
    pub cmd: Commands,
}
