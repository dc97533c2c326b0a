use retype::clipboard::{ClipboardSource, FileSource, read_nonempty};
use retype::config::Config;
use retype::console::Console;
use retype::error::TypingError;
use retype::normalize::normalize;
use retype::stats::RunReport;
use retype::timing::{Clock, RecordingClock, SystemClock, TimingMode, TimingProfile};
use retype::typing::{
    AutoIndent, CancelFlag, InputSynthesizer, SimulatedEditor, StrategyKind, TypingProcessor,
    TypingSession,
};

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// Type the clipboard into an editor that auto-indents and auto-closes
#[derive(Parser, Debug)]
#[command(name = "retype", version, about)]
struct Cli {
    /// Timing preset (skips the menu)
    #[arg(short, long, value_enum)]
    mode: Option<TimingMode>,

    /// How auto-indent is wiped after each newline
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Start without asking for confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Seconds to wait before typing
    #[arg(long)]
    countdown: Option<u64>,

    /// The editor does not auto-close brackets and quotes
    #[arg(long)]
    no_auto_close: bool,

    /// Config file (default: ./retype.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the text from a file instead of the clipboard
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Type into a simulated editor and print the result
    #[arg(long)]
    dry_run: bool,

    /// Seed for the typing jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

/// Everything a run needs once the prompts are done
struct RunSettings {
    profile: TimingProfile,
    strategy: StrategyKind,
    auto_close: bool,
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let mut console = Console::stdio();
    console.banner()?;

    let mut source: Box<dyn ClipboardSource> = match &cli.file {
        Some(path) => Box::new(FileSource::new(path)),
        None => open_clipboard()?,
    };
    console.reading_from(if cli.file.is_some() { "file" } else { "clipboard" })?;
    let text = match read_nonempty(source.as_mut()) {
        Ok(text) => normalize(&text),
        Err(e) => {
            console.failed(&e, 0, 0)?;
            return Ok(ExitCode::from(e.exit_code()));
        }
    };

    console.preview(&text, config.preview_chars)?;

    let interactive = config.confirm && !cli.yes;
    let mode = match cli.mode.or(config.mode) {
        Some(mode) => mode,
        None if interactive => console.select_mode()?,
        None => TimingMode::default(),
    };

    if interactive && !console.confirm("Proceed with typing?")? {
        console.cancelled()?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings = RunSettings {
        profile: mode.profile(),
        strategy: cli.strategy.unwrap_or(config.strategy),
        auto_close: config.auto_close && !cli.no_auto_close,
        seed: cli.seed,
    };
    log::info!(
        "mode={} strategy={} auto_close={}",
        mode,
        settings.strategy,
        settings.auto_close
    );

    let cancel = CancelFlag::default();
    let flag = CancelFlag::clone(&cancel);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    #[cfg(feature = "abort-hotkey")]
    retype::typing::start_abort_listener(CancelFlag::clone(&cancel));

    let total = text.chars().count();
    let outcome = if cli.dry_run {
        dry_run(&text, &settings, cancel, &mut console)?
    } else {
        let countdown = cli.countdown.unwrap_or(config.countdown_secs);
        console.countdown(countdown, &SystemClock)?;
        let mut synth = open_synthesizer()?;
        let started = Instant::now();
        let (result, typed) =
            type_text(&text, synth.as_mut(), &SystemClock, &settings, cancel, &mut console);
        (
            result.map(|mut report| {
                report.elapsed = started.elapsed();
                report
            }),
            typed,
        )
    };

    match outcome {
        (Ok(report), _) => {
            console.finished(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        (Err(e), typed) => {
            console.failed(&e, typed, total)?;
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

/// Type into a simulated editor that mirrors indentation and auto-closes
/// pairs, without waiting on the real clock.
fn dry_run<R: BufRead, W: Write>(
    text: &str,
    settings: &RunSettings,
    cancel: CancelFlag,
    console: &mut Console<R, W>,
) -> anyhow::Result<(Result<RunReport, TypingError>, usize)> {
    let mut host = SimulatedEditor::new(AutoIndent::Mirror).with_auto_close(settings.auto_close);
    let clock = RecordingClock::new();
    let (result, typed) = type_text(text, &mut host, &clock, settings, cancel, console);
    let result = result.map(|mut report| {
        report.elapsed = clock.elapsed();
        report
    });

    let estimate = result.is_ok().then(|| clock.elapsed());
    console.dry_run_result(text, &host.text(), estimate)?;
    Ok((result, typed))
}

fn type_text<R: BufRead, W: Write>(
    text: &str,
    synth: &mut dyn InputSynthesizer,
    clock: &dyn Clock,
    settings: &RunSettings,
    cancel: CancelFlag,
    console: &mut Console<R, W>,
) -> (Result<RunReport, TypingError>, usize) {
    let rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let total = text.chars().count();
    let mut processor = TypingProcessor::new(&settings.profile, settings.strategy.build(), rng)
        .with_auto_close(settings.auto_close);
    let mut session = TypingSession::new(cancel);

    let result = processor.run(text, synth, clock, &mut session, |typed| {
        console.track_progress(typed, total);
    });
    if let Some(e) = console.take_progress_error() {
        log::warn!("progress display failed: {}", e);
    }
    (result, session.offset())
}

#[cfg(feature = "desktop")]
fn open_clipboard() -> Result<Box<dyn ClipboardSource>, TypingError> {
    Ok(Box::new(retype::clipboard::SystemClipboard::new()?))
}

#[cfg(not(feature = "desktop"))]
fn open_clipboard() -> Result<Box<dyn ClipboardSource>, TypingError> {
    Err(TypingError::Clipboard(
        "built without clipboard support, pass --file".into(),
    ))
}

#[cfg(feature = "desktop")]
fn open_synthesizer() -> Result<Box<dyn InputSynthesizer>, TypingError> {
    Ok(Box::new(retype::typing::EnigoSynthesizer::new()?))
}

#[cfg(not(feature = "desktop"))]
fn open_synthesizer() -> Result<Box<dyn InputSynthesizer>, TypingError> {
    Err(TypingError::Synthesis(
        "built without keyboard support, use --dry-run".into(),
    ))
}
