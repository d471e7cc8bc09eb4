use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use medreport::config::{self, ReportConfig};
use medreport::report::{ReportComposer, UploadStatus};

/// Compose a patient's clinical-visit report as a PDF.
#[derive(Parser, Debug)]
#[command(name = "medreport", version, about)]
struct Cli {
    /// Patient id in the records service.
    patient_id: String,

    /// Directory for the generated PDF.
    #[arg(long, env = "MEDREPORT_EXPORT_DIR")]
    out: Option<PathBuf>,

    /// Write the local copy only.
    #[arg(long)]
    no_upload: bool,
}

fn main() -> ExitCode {
    medreport::init_tracing();
    let cli = Cli::parse();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let mut config = ReportConfig::from_env();
    if let Some(out) = cli.out {
        config.export_dir = out;
    }

    let composer = match ReportComposer::from_config(&config, !cli.no_upload) {
        Ok(composer) => composer,
        Err(e) => {
            tracing::error!(error = %e, "Cannot set up report services");
            return ExitCode::FAILURE;
        }
    };

    match composer.generate_report(&cli.patient_id, &config.export_dir) {
        Ok(outcome) => {
            if let UploadStatus::Failed(e) = &outcome.upload {
                tracing::warn!(error = %e, "Upload failed; report is only available locally");
            }
            println!("{}", outcome.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Report generation failed");
            ExitCode::FAILURE
        }
    }
}
