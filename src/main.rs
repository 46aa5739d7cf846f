use motionrs::{common::*, config::Config, logging, model, runner};

/// Evaluates a pretrained human motion predictor on the SRNN test seeds.
#[derive(FromArgs)]
struct Args {
    /// the config file.
    #[argh(option, default = "PathBuf::from(\"config.json5\")")]
    config: PathBuf,
    /// the action to evaluate, "all" or "all_srnn".
    #[argh(option)]
    action: Option<String>,
    /// the checkpoint number to load.
    #[argh(option)]
    load_model: Option<usize>,
    /// the time step at which the error is reported.
    #[argh(option)]
    horizon_test_step: Option<usize>,
    /// the output archive.
    #[argh(option)]
    output_file: Option<PathBuf>,
    /// write the log to this file instead of stderr.
    #[argh(option)]
    log_file: Option<PathBuf>,
    /// evaluate the zero-velocity baseline instead of a model.
    #[argh(switch)]
    zero_velocity: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(action) = self.action {
            config.action = action;
        }
        if let Some(load_model) = self.load_model {
            config.load_model = load_model;
        }
        if let Some(horizon_test_step) = self.horizon_test_step {
            config.horizon_test_step = horizon_test_step;
        }
        if let Some(output_file) = self.output_file {
            config.output_file = output_file;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = Some(log_file);
        }
        if self.zero_velocity {
            config.predictor = model::PredictorKind::ZeroVelocity;
        }
        config
    }
}

fn main() -> Fallible<()> {
    // Parse arguments
    let args: Args = argh::from_env();

    // load config
    let config = Config::open(&args.config)?;
    let config = args.apply(config);

    logging::init(&config)?;

    debug!("{:?}", config);

    // Detect device
    let device = config.device();
    info!("Using device {:?}", device);

    // init experiment dir
    let experiment_dir = config.experiment_dir();
    info!("Train dir: {}", experiment_dir.display());
    fs::create_dir_all(&experiment_dir)?;

    // Load model
    info!("Creating a model with {} units", config.size);
    let predictor = model::build_predictor(config.predictor, &config.model_file(), device)?;
    info!("Model created");

    runner::run(&config, predictor.as_ref(), device)?;

    Ok(())
}
