//! Filter mode: run an edit script over files or stdin.

use std::fs::File;
use std::io::{self, Read, Write};

use edcmd::core::{editcmd, RopeBuffer, TextBuffer};

use crate::cli::Cli;

use super::validate_file_path;

/// Run in filter mode: each input buffer goes through the script once, with
/// dot starting at the top of the buffer, and the result is written to
/// stdout (or back to the file with `-i`).
pub fn run_filter_mode(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut script = String::new();
    for expr in &cli.expression {
        script.push_str(expr);
        script.push('\n');
    }
    if let Some(script_path) = &cli.script_file {
        let validated_path = validate_file_path(script_path)?;
        let mut file_script = String::new();
        File::open(&validated_path)?.read_to_string(&mut file_script)?;
        script.push_str(&file_script);
    }

    let input_files = if script.is_empty() {
        if let Some(first_arg) = cli.files.first() {
            script = first_arg.to_string_lossy().into_owned();
            &cli.files[1..]
        } else {
            return Err(
                "No edit script provided. Use -e, -f, or provide the script as the first argument."
                    .into(),
            );
        }
    } else {
        &cli.files[..]
    };

    if input_files.is_empty() {
        let mut input = String::new();
        io::stdin().lock().read_to_string(&mut input)?;
        let output = apply_script(&input, &script)?;
        io::stdout().lock().write_all(output.as_bytes())?;
    } else {
        for file_path in input_files {
            let validated_path = validate_file_path(file_path)?;
            let mut input = String::new();
            File::open(&validated_path)?.read_to_string(&mut input)?;
            let output = apply_script(&input, &script)?;

            if cli.in_place {
                use tempfile::NamedTempFile;

                let parent = validated_path
                    .parent()
                    .ok_or_else(|| -> Box<dyn std::error::Error> { "Invalid file path".into() })?;

                let mut temp_file = NamedTempFile::new_in(parent)?;
                temp_file.write_all(output.as_bytes())?;
                temp_file.flush()?;
                temp_file.as_file().sync_all()?;
                temp_file.persist(validated_path)?;
            } else {
                io::stdout().lock().write_all(output.as_bytes())?;
            }
        }
    }

    Ok(())
}

/// Run one script over one buffer snapshot.
fn apply_script(input: &str, script: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut buf = RopeBuffer::from_string(input);
    editcmd(&mut buf, script)?;
    Ok(buf.contents())
}
