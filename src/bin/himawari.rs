use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use himawari::WallpaperSink as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "himawari", version)]
struct Cli {
    /// Configuration JSON.
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the latest snapshot once and apply it.
    Run(RunArgs),
    /// Stay resident and run every `update_interval_minutes`.
    Watch(RunArgs),
    /// Restore the system default wallpaper.
    Restore,
    /// Install a launchd agent that runs `run` periodically.
    Install(InstallArgs),
    /// Unload and remove the launchd agent.
    Uninstall,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Save the canvas but leave the desktop untouched.
    #[arg(long, default_value_t = false)]
    no_apply: bool,
}

#[derive(Parser, Debug)]
struct InstallArgs {
    /// Print the agent plist instead of installing it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(&cli.config, args),
        Command::Watch(args) => cmd_watch(&cli.config, args),
        Command::Restore => cmd_restore(),
        Command::Install(args) => cmd_install(&cli.config, args),
        Command::Uninstall => cmd_uninstall(),
    }
}

fn load_config(path: &std::path::Path) -> anyhow::Result<himawari::Config> {
    himawari::Config::from_path(path)
        .with_context(|| format!("load config '{}'", path.display()))
}

fn make_sink(no_apply: bool) -> Box<dyn himawari::WallpaperSink> {
    if no_apply {
        Box::new(himawari::NullSink)
    } else {
        Box::new(himawari::DesktopSink::new())
    }
}

fn cmd_run(config_path: &std::path::Path, args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let transport = himawari::HttpTransport::new(config.request_timeout())?;
    let mut sink = make_sink(args.no_apply);

    let report = himawari::run_once(&config, &transport, sink.as_mut(), chrono::Utc::now())?;
    tracing::info!(
        snapshot = %report.snapshot,
        pruned = report.pruned.len(),
        "run complete"
    );
    println!("{}", report.path.display());
    Ok(())
}

fn cmd_watch(config_path: &std::path::Path, args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let transport = himawari::HttpTransport::new(config.request_timeout())?;
    let mut sink = make_sink(args.no_apply);
    let interval = Duration::from_secs(u64::from(config.update_interval_minutes()) * 60);

    loop {
        match himawari::run_once(&config, &transport, sink.as_mut(), chrono::Utc::now()) {
            Ok(report) => {
                tracing::info!(path = %report.path.display(), snapshot = %report.snapshot, "wallpaper refreshed");
            }
            Err(e) => {
                tracing::error!(error = %e, "run failed, keeping previous wallpaper");
            }
        }
        std::thread::sleep(interval);
    }
}

fn cmd_restore() -> anyhow::Result<()> {
    himawari::DesktopSink::new().restore_default()?;
    Ok(())
}

fn cmd_install(config_path: &std::path::Path, args: InstallArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let config_abs = std::path::absolute(config_path)
        .with_context(|| format!("resolve '{}'", config_path.display()))?;
    let exe = std::env::current_exe().context("locate current executable")?;

    let agent = himawari::LaunchAgent::for_current_user(
        vec![
            exe.to_string_lossy().into_owned(),
            "--config".to_string(),
            config_abs.to_string_lossy().into_owned(),
            "run".to_string(),
        ],
        config.update_interval_minutes(),
    )?;

    if args.dry_run {
        print!("{}", agent.render_plist());
        return Ok(());
    }
    agent.install()?;
    eprintln!("installed {}", agent.plist_path.display());
    Ok(())
}

fn cmd_uninstall() -> anyhow::Result<()> {
    let agent = himawari::LaunchAgent::for_current_user(Vec::new(), 0)?;
    if agent.uninstall()? {
        eprintln!("removed {}", agent.plist_path.display());
    } else {
        eprintln!("launch agent not installed");
    }
    Ok(())
}
