//! controller-e2e - ephemeral environment driver
//!
//! Sets up a test namespace with the controller running, checks the
//! deployment, and tears the namespace down again.
//!
//! ## Usage
//!
//! ```bash
//! controller-e2e --kubeconfig $HOME/.kube/config \
//!     --controller-image quay.io/coreos/kube-etcd-controller:dev
//! ```

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{error, info};

use controller_e2e::cli::Args;
use controller_e2e::config::EnvConfig;
use controller_e2e::utils::{init_logger, LogLevel};
use controller_e2e::{Environment, FrameworkConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::parse(&args.log_level).unwrap_or(LogLevel::Info)
    };
    init_logger(level);

    let config = load_config(&args)?;

    let env = Environment::setup(&config)
        .await
        .context("e2e setup failed")?;
    info!("Environment ready in namespace {}", env.namespace());

    let checked = verify_controller(&env, &config.controller_image).await;
    if let Err(e) = &checked {
        error!("Controller check failed: {e:#}");
    }

    env.teardown().await.context("e2e teardown failed")?;

    checked
}

fn load_config(args: &Args) -> Result<FrameworkConfig> {
    let mut config = match &args.config {
        Some(path) => FrameworkConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FrameworkConfig::default(),
    };

    EnvConfig::load().apply(&mut config);
    args.apply(&mut config);

    Ok(config)
}

/// The namespace holds exactly the controller, running the requested image
async fn verify_controller(env: &Environment, image: &str) -> Result<()> {
    let workloads = env.workloads().await?;

    ensure!(
        workloads.len() == 1,
        "expected 1 workload in {}, found {}",
        env.namespace(),
        workloads.len()
    );
    ensure!(
        workloads.iter().all(|w| w.runs_image(image)),
        "workload in {} does not run {}",
        env.namespace(),
        image
    );

    info!("Controller running {} in {}", image, env.namespace());
    Ok(())
}
