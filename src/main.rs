use anyhow::{Context, Result};
use clap::{crate_version, App, AppSettings, Arg, SubCommand};
use folio::build::build_site;
use folio::config::Config;
use folio::serve::serve;
use folio::site::Site;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = App::new("folio")
        .version(crate_version!())
        .about("Serves or builds a portfolio site from project and buzzword definitions")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .help("Directory in which to start searching for folio.yaml (default: .)"),
        )
        .subcommand(
            SubCommand::with_name("serve")
                .about("Serves the site over HTTP")
                .arg(
                    Arg::with_name("address")
                        .long("address")
                        .short("a")
                        .takes_value(true)
                        .help("Address to bind, overriding folio.yaml"),
                ),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes every page of the site to a directory")
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("Output directory (default: ./_output)"),
                ),
        )
        .get_matches();

    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let config = Config::from_directory(project)?;

    // Load everything before binding or writing anything.
    let site = Site::load(&config)?;

    match matches.subcommand() {
        ("serve", Some(args)) => {
            let address = args.value_of("address").unwrap_or(&config.address);
            serve(Arc::new(site), address).await
        }
        ("build", Some(args)) => {
            let output = PathBuf::from(args.value_of("output").unwrap_or("./_output"));
            let written = build_site(&site, &output)
                .with_context(|| format!("Building site into '{}'", output.display()))?;
            tracing::info!(pages = written, output = %output.display(), "built site");
            Ok(())
        }
        _ => unreachable!("a subcommand is required"),
    }
}
