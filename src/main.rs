use std::{error::Error, process, sync::Arc, time::Duration};

use clap::{command, Parser, ValueHint};
use log::{debug, error, info, warn, LevelFilter};

use pandora_radio::{
    config::Config,
    credentials::Secrets,
    error::ErrorKind,
    gateway::Gateway,
    library::Library,
    station::SortOrder,
    track::AudioQuality,
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Secrets file
    ///
    /// Ensure that this file is kept secure and not shared publicly, as it
    /// contains the credentials of your Pandora account.
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath, default_value_t = String::from("secrets.toml"))]
    secrets_file: String,

    /// Station to play
    ///
    /// Pulls tracks from the station with this id. Without it, only the
    /// station list is shown.
    #[arg(long, value_name = "ID")]
    station: Option<String>,

    /// Number of tracks to pull from the station
    #[arg(short, long, default_value_t = 10)]
    tracks: usize,

    /// Station list order: "date" or "a-z"
    #[arg(long, default_value_t = SortOrder::default())]
    sort_order: SortOrder,

    /// Preferred audio quality: "low", "medium" or "high"
    #[arg(long, default_value_t = AudioQuality::default())]
    quality: AudioQuality,

    /// Also list genre categories and their stations
    #[arg(long, default_value_t = false)]
    genres: bool,

    /// Check that the audio of every pulled track is reachable
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Abort remote calls after this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            // Quiet and verbose are mutually exclusive, and `verbose` is 0
            // by default. So this arm means: quiet mode.
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module(module_path!(), level);
        logger.filter_module("pandora_radio", level);
    }

    logger.init();
}

/// Loads the secrets file, pointing at the example on a missing file.
fn load_secrets(secrets_file: &str) -> pandora_radio::error::Result<Secrets> {
    let secrets = Secrets::from_file(secrets_file);

    if let Err(ref e) = secrets {
        if e.kind == ErrorKind::NotFound {
            info!("copy secrets.toml.example to {secrets_file} and fill in your credentials");
        }
    }

    secrets
}

/// Logs in, retrying with jitter for as long as the service is unreachable or
/// too slow to answer.
async fn login(library: &Library<Gateway>, secrets: &Secrets) -> Result<(), Box<dyn Error>> {
    loop {
        match library.login(&secrets.credentials).await {
            Ok(()) => break Ok(()),
            Err(e) if e.is_transport() && e.kind != ErrorKind::Cancelled => {
                // Sleep with jitter to prevent thundering herds.
                let duration = Duration::from_millis(fastrand::u64(5_000..6_000));
                warn!("{e}; retrying in {:.1}s", duration.as_secs_f32());
                tokio::time::sleep(duration).await;
            }
            Err(e) => break Err(e.into()),
        }
    }
}

/// Shows the station list and pulls tracks as requested.
async fn browse(library: &Library<Gateway>, args: &Args) -> Result<(), Box<dyn Error>> {
    for station in library.stations().await? {
        println!("{:>20}  {}", station.id, station.name);
    }

    if args.genres {
        for category in library.genre_categories().await? {
            println!("\n{category}");
            for station in library.genre_stations(&category).await? {
                println!("{:>20}  {}", station.token, station.name);
            }
        }
    }

    let Some(ref station_id) = args.station else {
        return Ok(());
    };

    for _ in 0..args.tracks {
        let Some(track) = library.next_track(station_id).await? else {
            info!("station has no more tracks");
            break;
        };

        let bitrate = track
            .bitrate(args.quality)
            .map_or_else(|| String::from("?"), |bitrate| bitrate.to_string());
        println!("{}  {track} [{bitrate} kbps]", track.uri());

        if args.check && !library.client().check_playable(&track).await {
            warn!("{track}: audio is not reachable");
        }
    }

    Ok(())
}

/// Main application flow.
///
/// # Errors
///
/// This function returns an error when an error occurs. This could be due to
/// invalid credentials or an unrecoverable network error.
async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let secrets = load_secrets(&args.secrets_file)?;

    let mut config = Config::new();
    config.partner = secrets.partner.clone();
    config.sort_order = args.sort_order;
    config.audio_quality = args.quality;
    config.timeout = args.timeout.map(Duration::from_secs);

    let gateway = Gateway::new(&config)?;
    let library = Library::new(&config, Arc::new(gateway));
    let cancel = library.client().cancellation_token();

    let work = async {
        login(&library, &secrets).await?;
        browse(&library, &args).await
    };

    tokio::select! {
        // Prioritize shutdown signals.
        biased;

        _ = tokio::signal::ctrl_c() => {
            info!("shutting down gracefully");
            cancel.cancel();
            Ok(())
        }

        result = work => result,
    }
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and starts the main application flow.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");

    if let Err(e) = run(args).await {
        error!("{e}");
        process::exit(1);
    }
}
