mod appdata;
mod cache;
mod error;
mod heading;
mod index;
mod pipeline;
mod render;

use std::env;
use std::process;

use error::Error;
use pipeline::Options;

const VERSION: &str = env!("CARGO_PKG_VERSION");

enum Cli {
    Run(Options),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Cli, Error> {
    let mut headings = false;
    let mut positional: Vec<String> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-v" | "--version" => return Ok(Cli::Version),
            "--headings" => headings = true,
            flag if flag.starts_with('-') => {
                return Err(Error::UnknownOption(flag.to_string()))
            }
            value => positional.push(value.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let vault = positional.next().ok_or(Error::MissingVaultPath)?;
    let tag_folder = positional.next().unwrap_or_else(|| "Tags".to_string());
    let minimum = match positional.next() {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::InvalidThreshold(raw.clone()))?,
        None => 1,
    };

    Ok(Cli::Run(Options {
        vault,
        tag_folder,
        minimum,
        headings,
    }))
}

fn print_help() {
    println!("tagfiles {}", VERSION);
    println!("Generate per-tag backlink files for an Obsidian-style markdown vault");
    println!();
    println!("USAGE:");
    println!("    tagfiles [OPTIONS] <VAULT> [TAG-FOLDER] [MINIMUM]");
    println!();
    println!("ARGUMENTS:");
    println!("    <VAULT>          Path to the vault root (supports ~ expansion)");
    println!("    [TAG-FOLDER]     Subfolder to write tag files into (default: Tags)");
    println!("    [MINIMUM]        Minimum tagged notes for a tag to get a file (default: 1)");
    println!();
    println!("OPTIONS:");
    println!("    --headings       Resolve the nearest heading above each tag and");
    println!("                     emit #heading anchors in the generated links");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    tagfiles ~/notes                 Write tag files under ~/notes/Tags");
    println!("    tagfiles ~/notes Meta 3          Only tags with at least 3 notes");
    println!("    tagfiles --headings ~/notes      Include heading context anchors");
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Cli::Help) => {
            print_help();
            return;
        }
        Ok(Cli::Version) => {
            println!("tagfiles {}", VERSION);
            return;
        }
        Ok(Cli::Run(options)) => options,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = pipeline::run(&options).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let cli = parse_args(&args(&["~/notes"])).unwrap();
        match cli {
            Cli::Run(options) => {
                assert_eq!(options.vault, "~/notes");
                assert_eq!(options.tag_folder, "Tags");
                assert_eq!(options.minimum, 1);
                assert!(!options.headings);
            }
            _ => panic!("expected a run"),
        }
    }

    #[test]
    fn test_parse_all_positionals_and_flag() {
        let cli = parse_args(&args(&["--headings", "/vault", "Meta", "3"])).unwrap();
        match cli {
            Cli::Run(options) => {
                assert_eq!(options.vault, "/vault");
                assert_eq!(options.tag_folder, "Meta");
                assert_eq!(options.minimum, 3);
                assert!(options.headings);
            }
            _ => panic!("expected a run"),
        }
    }

    #[test]
    fn test_parse_missing_vault() {
        assert!(matches!(
            parse_args(&args(&[])),
            Err(Error::MissingVaultPath)
        ));
    }

    #[test]
    fn test_parse_bad_threshold() {
        assert!(matches!(
            parse_args(&args(&["/vault", "Tags", "lots"])),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_parse_unknown_option() {
        assert!(matches!(
            parse_args(&args(&["--frobnicate", "/vault"])),
            Err(Error::UnknownOption(_))
        ));
    }

    #[test]
    fn test_parse_help_wins() {
        assert!(matches!(parse_args(&args(&["--help"])), Ok(Cli::Help)));
    }
}
