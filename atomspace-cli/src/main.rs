/*!
  Binary for the CLI of the atomspace: atomese
*/

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod cli;
pub mod error;

use std::{io::stdout, time::Instant};

use atomspace::{
    finalize_opencog,
    io::{load_file, write_sorted, write_sorted_file_with},
    set_default_atomspace,
    types::Type,
    AtomSpace,
};
use clap::Parser;
use cli::{CliApp, Reporting};
use colored::Colorize;
use error::CliError;

fn print_finished_message(atomspace: &AtomSpace, files: usize, millis: u128) {
    println!(
        "Loaded {} atoms from {} files in {}{}.",
        atomspace.size().to_string().green().bold(),
        files.to_string().green().bold(),
        millis.to_string().green().bold(),
        "ms".green().bold(),
    );
    println!("   {0: <7} {1:>8}", "Nodes:", atomspace.num_nodes());
    println!("   {0: <7} {1:>8}", "Links:", atomspace.num_links());
}

fn run(cli: &CliApp) -> Result<(), CliError> {
    if cli.types {
        println!("{}", Type::Value.tree_string());
    }

    let start = Instant::now();
    let atomspace = AtomSpace::named("atomese", Vec::new());
    set_default_atomspace(&atomspace);

    if let Some(dump) = &cli.output.dump {
        if dump.exists() && !cli.output.overwrite {
            return Err(CliError::OutputExists {
                filename: dump.clone(),
            });
        }
    }

    for file in &cli.files {
        let loaded = load_file(&atomspace, file)?;
        log::info!("{} top-level atoms in {}", loaded.len(), file.display());
    }

    if cli.read_only {
        atomspace.set_read_only(true);
    }

    let millis = start.elapsed().as_millis();

    if cli.output.print {
        write_sorted(stdout().lock(), &atomspace)?;
    }

    if let Some(dump) = &cli.output.dump {
        let written = write_sorted_file_with(dump, &atomspace, cli.output.overwrite)?;
        log::info!("wrote {written} atoms to {}", dump.display());
    }

    match cli.reporting.resolve(cli.output.print) {
        Reporting::None | Reporting::Auto => {}
        Reporting::Short => print_finished_message(&atomspace, cli.files.len(), millis),
        Reporting::Json => println!("{}", atomspace.stats().to_json()?),
    }

    Ok(())
}

fn main() {
    let cli = cli::CliApp::parse();

    cli.logging.initialize_logging();
    log::info!("Version: {}", clap::crate_version!());
    log::debug!("Atomese files: {:?}", cli.files);

    let result = run(&cli);
    finalize_opencog();

    result.unwrap_or_else(|err| {
        log::error!("{} {err}", "error:".red().bold());
        std::process::exit(1)
    })
}
