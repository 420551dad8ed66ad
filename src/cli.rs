use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mangadav", about = "Browse a remote manga library as a read-only directory tree", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the children of a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Write the content of a page
    Cat {
        path: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show what a path resolves to
    Stat { path: String },
    /// List a directory recursively
    Tree {
        #[arg(default_value = "/")]
        path: String,

        /// Maximum number of levels to descend
        #[arg(short, long)]
        depth: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["mangadav", "tree", "/Alpha", "-d", "1", "-vv", "-c", "x.toml"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(args.command, Commands::Tree { ref path, depth: Some(1) } if path == "/Alpha"));
    }
}
