//! Tandem - headless harness for the mirrored editor core.
//!
//! # Usage
//!
//! ```bash
//! tandem session.json
//! tandem --watch notes.txt --followers 2
//! tandem --watch notes.txt --delay-ms 250
//! ```
//!
//! With a script file, the harness replays the steps deterministically and
//! prints the resulting trace. With `--watch`, file changes are debounced
//! through the scheduler and reloaded into a lead editor whose followers
//! share its document.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use tandem::config::{
    Settings, clear_settings, global_config_path, load_settings, local_override_path,
    save_settings,
};
use tandem::editor::Editor;
use tandem::perf;
use tandem::scheduler::{DelayJobRunner, Job};
use tandem::script::{ScriptRunner, load_script};
use tandem::watcher::FileWatcher;

/// How often the watch loop polls for fs events and due jobs.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Headless harness for the tandem editor core
#[derive(Parser, Debug)]
#[command(name = "tandem", version, about, long_about = None)]
struct Cli {
    /// Script file to replay (JSON step list)
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Watch a file and mirror debounced reloads into follower instances
    #[arg(short, long, value_name = "FILE")]
    watch: Option<PathBuf>,

    /// Debounce window in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Number of follower instances in watch mode
    #[arg(long, value_name = "N")]
    followers: Option<usize>,

    /// Write debug events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Save current flags as defaults in the global config
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let cli_settings = Settings {
        delay_ms: cli.delay_ms,
        followers: cli.followers,
        debug_log: cli.debug_log.clone(),
    };

    if cli.clear {
        clear_settings(&global_path)?;
    }
    if cli.save {
        save_settings(&global_path, &cli_settings)?;
    }

    let file_settings = if cli.clear {
        Settings::default()
    } else {
        let global_settings = load_settings(&global_path)?;
        let local_settings = load_settings(&local_override_path())?;
        global_settings.union(&local_settings)
    };
    let settings = file_settings.union(&cli_settings);

    perf::set_enabled(cli.perf);
    perf::set_debug_log_path(settings.debug_log.as_deref())?;
    let delay = settings.effective_delay();

    if let Some(script_path) = cli.script.as_deref() {
        let _scope = perf::scope("harness.replay");
        let steps = load_script(script_path)?;
        let mut runner = ScriptRunner::new(delay);
        runner.run(&steps)?;
        for line in runner.trace() {
            println!("{line}");
        }
        return Ok(());
    }

    if let Some(watch_path) = cli.watch.as_deref() {
        return watch_loop(watch_path, delay, settings.effective_followers());
    }

    anyhow::bail!("nothing to do: pass a script file or --watch <FILE>")
}

/// Run the live watch loop: fs changes are debounced through the scheduler
/// and reloaded into the lead editor; followers share its document.
fn watch_loop(path: &Path, delay: Duration, follower_count: usize) -> Result<()> {
    let lead = Editor::new();
    let initial = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    lead.set_text(&initial);

    let followers: Vec<Editor> = (0..follower_count)
        .map(|_| {
            let follower = Editor::new();
            follower.follow(&lead, false);
            follower.set_shared_reference(&lead);
            follower
        })
        .collect();

    let mut watcher = FileWatcher::new(path)
        .with_context(|| format!("Failed to watch {}", path.display()))?;
    let mut runner = DelayJobRunner::new(delay);

    println!(
        "watching {} with {} follower(s), {}ms debounce",
        watcher.target_path().display(),
        followers.len(),
        delay.as_millis()
    );

    loop {
        std::thread::sleep(WATCH_POLL_INTERVAL);
        let now = Instant::now();

        if watcher.take_changed() {
            perf::log_event("watcher.change", watcher.target_path().display().to_string());
            let lead = lead.clone();
            let reload_path = path.to_path_buf();
            runner.request(
                Job::new("reload", move || {
                    let content = std::fs::read_to_string(&reload_path)
                        .with_context(|| format!("Failed to read {}", reload_path.display()))?;
                    lead.set_text(&content);
                    Ok(())
                }),
                now,
            );
        }

        if runner.run_due(now)? {
            let revision = lead.document().borrow().revision();
            println!(
                "reloaded rev={revision} ({} follower(s) in sync)",
                followers.len()
            );
        }
    }
}
