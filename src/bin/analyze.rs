use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wca::config::Config;
use wca::driver::Driver;
use wca::error::AnalysisError;
use wca::host::Host;
use wca::trend::Report;

/// Worst-case resource search over a symbolic-execution host.
#[derive(Parser)]
#[command(name = "analyze")]
struct Cli {
    /// Path to the TOML configuration file.
    configfile: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            let code = err
                .downcast_ref::<AnalysisError>()
                .map(AnalysisError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.configfile)?;
    wca::init_logging(&config.log_level);
    wca::install_ctrlc_abort();

    let mut host = NotConfiguredHost;
    let mut driver = Driver::new(&config, &mut host);
    let series = driver.run()?;

    let horizon = config.prediction_horizon(series.len());
    let report = Report::build(
        &series,
        horizon,
        config.polynomial_degree(),
        config.req.max_input_size,
        config.req.max_res,
    );

    if config.verbose {
        let chart_path = config.output_dir.join("chart.png");
        if let Err(e) = report.render_chart(&chart_path) {
            log::warn!("chart rendering failed: {e}");
        }
    }
    println!("{}", report.to_text());

    Ok(())
}

/// No symbolic-execution backend ships with this crate (§6: out of scope,
/// reached only through the `Host` trait). Real deployments link a host
/// implementation in place of this stub.
struct NotConfiguredHost;

impl Host for NotConfiguredHost {
    fn explore(&mut self, _input_size: u64, _observer: &mut dyn wca::host::Observer) -> Result<(), String> {
        Err("no symbolic-execution host is linked into this binary".to_string())
    }
}
