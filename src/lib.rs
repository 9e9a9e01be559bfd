//! Policy-guided worst-case resource search over a symbolic-execution host.
//!
//! The two phases — exhaustive policy generation at a small input size,
//! then a policy-guided heuristic sweep across the requested range — are
//! orchestrated by [`driver::Driver`]. Everything it depends on is exposed
//! as a module here: [`decision`] and [`path`] are the data model,
//! [`policy`] is the trie and its two observers, [`host`] is the narrow
//! boundary to the symbolic-execution backend, [`trend`] fits and renders
//! the resulting series, and [`config`]/[`error`] are the ambient
//! configuration and error taxonomy.

pub mod config;
pub mod decision;
pub mod driver;
pub mod error;
pub mod host;
pub mod path;
pub mod policy;
pub mod trend;

/// Initializes the `log`/`env_logger` backend at the configured filter
/// level. Called once, at the very start of `main`.
pub fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// A progress bar over the phase-2 sweep, one tick per input size.
pub fn progress(len: u64) -> indicatif::ProgressBar {
    let bar = indicatif::ProgressBar::new(len);
    bar.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
        )
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    bar
}

/// Installs a Ctrl-C handler that exits the process immediately, so an
/// in-flight phase is abandoned rather than allowed to persist a partial
/// policy. Runs on a dedicated single-threaded runtime since the rest of
/// the crate is synchronous.
pub fn install_ctrlc_abort() {
    std::thread::spawn(|| {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(_) => return,
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("interrupted, aborting before any partial policy is persisted");
                std::process::exit(130);
            }
        });
    });
}
