//! Apply command implementation
//!
//! Loads the configuration file, runs the requested edit batches in their
//! fixed order (removals, updates, additions, list extensions, insertions,
//! then the optional merge) and writes the file back only if something
//! changed. With `--debug` the result goes to stdout instead.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use relayer::orchestrator::{EditSet, Relayer};
use relayer::output::{status_line, OutputConfig};

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Configuration file to edit (.yml and .yaml are interchangeable)
    #[arg(short, long, value_name = "PATH", env = "RELAYER_CONFIG")]
    pub config: PathBuf,

    /// Print the edited document instead of writing it
    #[arg(short, long)]
    pub debug: bool,

    /// Add or overwrite a value, creating missing keys
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub add: Vec<String>,

    /// Update an existing value
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub update: Vec<String>,

    /// Remove a key or list position
    #[arg(short, long, value_name = "KEY")]
    pub rm: Vec<String>,

    /// Extend a list with one or more values
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub extend_list: Vec<String>,

    /// Insert a value into a list
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub insert: Vec<String>,

    /// Remove a list element by value, given as KEY[ELEMENT]
    #[arg(short = 'l', long, value_name = "KEY[ELEMENT]")]
    pub rm_list_element: Vec<String>,

    /// Deep-merge another document into the configuration
    #[arg(short = 'f', long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Skip removals whose target does not exist
    #[arg(long)]
    pub ignore_not_found: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl ApplyArgs {
    fn edit_set(&self) -> EditSet {
        EditSet {
            remove: self.rm.clone(),
            remove_list_element: self.rm_list_element.clone(),
            update: self.update.clone(),
            add: self.add.clone(),
            extend_list: self.extend_list.clone(),
            insert: self.insert.clone(),
            merge_from: self.from_file.clone(),
            ignore_not_found: self.ignore_not_found,
        }
    }
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, color: &str) -> Result<()> {
    let output = OutputConfig::from_env_and_flag(color);
    let edits = args.edit_set();

    let relayer = Relayer::new(&args.config).debug(args.debug);
    let outcome = relayer
        .relay(&edits)
        .with_context(|| format!("Failed to edit {}", args.config.display()))?;

    if !args.quiet && !args.debug {
        println!("{}", status_line(&output, outcome.changed, &outcome.config_path));
    }

    Ok(())
}
