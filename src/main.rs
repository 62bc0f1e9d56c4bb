use clap::Parser;
use std::path::PathBuf;

use twinpress::{Result, Site, SiteConfig, SourceKind};

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Regenerate the whole output directory from scratch.
    Build {
        #[arg(long = "root", default_value = ".")]
        root: String,
        #[arg(long = "config")]
        config: Option<String>,
        #[arg(long = "out")]
        out: Option<String>,
        #[arg(long = "kind")]
        kind: Option<SourceKind>,
    },
}

fn main() -> Result<()> {
    let opt = Cli::parse();
    pretty_env_logger::init();
    match opt.cmd {
        Command::Build {
            root,
            config,
            out,
            kind,
        } => {
            let root = PathBuf::from(root);
            let mut config = match config {
                Some(config) => SiteConfig::read(config)?,
                None => SiteConfig::read_or_default(root.join("config.toml"))?,
            };
            if let Some(out) = out {
                config.output_root = PathBuf::from(out);
            }
            if let Some(kind) = kind {
                config.kind = kind;
            }
            let site = Site::new(config.rooted_at(&root))?;
            site.build()
        }
    }
}
