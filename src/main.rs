use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use color_eyre::Help;
use treesort_runner::{cli, cli::Cli, validate, JobRecord};

fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (validate, run)
    match args.command {
        cli::Command::Validate(args) => {
            let record = JobRecord::read(&args.job)?;
            let config = validate(&record)
                .wrap_err_with(|| format!("Invalid job description: {:?}", &args.job))
                .suggestion("Check the job description field named above.")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        cli::Command::Run(args) => _ = treesort_runner::run(&args)?,
    }

    Ok(())
}
