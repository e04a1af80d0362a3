//! Command-line argument parsing for edcmd.
//!
//! This module provides the `Cli` struct which encapsulates all command-line
//! options and methods for parsing them.

use std::path::PathBuf;

/// Command-line interface configuration.
#[derive(Debug, Default)]
pub struct Cli {
    /// File(s) to filter through the script
    pub files: Vec<PathBuf>,

    /// Edit scripts to execute (-e flag, repeatable)
    pub expression: Vec<String>,

    /// Script file path (-f flag)
    pub script_file: Option<PathBuf>,

    /// Edit files in-place instead of writing to stdout
    pub in_place: bool,
}

impl Cli {
    /// Parse command-line arguments.
    ///
    /// Returns a `Cli` struct populated with parsed arguments.
    /// Returns an error if required values are missing.
    pub fn parse() -> Result<Self, Box<dyn std::error::Error>> {
        let mut cli = Self::default();
        let mut args = std::env::args().skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-i" | "--in-place" => cli.in_place = true,
                "-e" | "--expression" => {
                    if let Some(expr) = args.next() {
                        cli.expression.push(expr);
                    } else {
                        return Err("--expression requires a value".into());
                    }
                }
                "-f" | "--file" => {
                    if let Some(path) = args.next() {
                        cli.script_file = Some(PathBuf::from(path));
                    } else {
                        return Err("--file requires a value".into());
                    }
                }
                "-h" | "--help" => {
                    println!("edcmd - a sam-style edit command filter");
                    println!();
                    println!("Usage: edcmd [OPTIONS] [SCRIPT] [FILES...]");
                    println!();
                    println!("Reads each file (or stdin), runs the edit script against it,");
                    println!("and writes the result to stdout.");
                    println!();
                    println!("Options:");
                    println!("  -h, --help        Show this help message");
                    println!("  -e, --expression  Add script to commands");
                    println!("  -f, --file        Add script file");
                    println!("  -i, --in-place    Edit files in place");
                    std::process::exit(0);
                }
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(format!("Unknown flag: {}. Use --help for usage.", arg).into());
                }
                _ => {
                    // Positional arguments are files (or the script itself,
                    // when no -e/-f was given; the runner decides)
                    cli.files.push(PathBuf::from(arg));
                }
            }
        }

        Ok(cli)
    }
}
