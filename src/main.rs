use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use covpost::cli;
use covpost::options::Options;

/// covpost — report line coverage to Coveralls.
#[derive(Parser)]
#[command(name = "covpost", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the payload from a coverage file and upload it.
    Upload {
        /// Path to the exported coverage file (lcov or cobertura).
        file: PathBuf,

        /// Override format detection (cobertura, lcov).
        #[arg(long)]
        format: Option<String>,

        /// Job identifier reported as service_job_id.
        #[arg(long)]
        job_id: Option<String>,

        /// CI service name reported as service_name.
        #[arg(long)]
        service_name: Option<String>,

        /// Upload endpoint (default: the Coveralls jobs API).
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the payload JSON without uploading.
    Json {
        /// Path to the exported coverage file.
        file: PathBuf,

        /// Override format detection (cobertura, lcov).
        #[arg(long)]
        format: Option<String>,

        /// Job identifier reported as service_job_id.
        #[arg(long)]
        job_id: Option<String>,

        /// CI service name reported as service_name.
        #[arg(long)]
        service_name: Option<String>,
    },

    /// Upload a Travis CI job: reads the job id from TRAVIS_JOB_ID.
    Travis {
        /// Path to the exported coverage file.
        file: PathBuf,

        /// Upload endpoint (default: the Coveralls jobs API).
        #[arg(long)]
        url: Option<String>,
    },
}

fn options_from(
    job_id: Option<String>,
    service_name: Option<String>,
    url: Option<String>,
) -> Options {
    Options {
        service_job_id: job_id,
        service_name,
        url,
        ..Default::default()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let out = match cli.command {
        Commands::Upload {
            file,
            format,
            job_id,
            service_name,
            url,
        } => cli::cmd_upload(
            &file,
            &options_from(job_id, service_name, url),
            format.as_deref(),
        )?,
        Commands::Json {
            file,
            format,
            job_id,
            service_name,
        } => cli::cmd_json(
            &file,
            &options_from(job_id, service_name, None),
            format.as_deref(),
        )?,
        Commands::Travis { file, url } => {
            cli::cmd_travis(&file, options_from(None, None, url))?
        }
    };

    print!("{}", out);
    Ok(())
}
