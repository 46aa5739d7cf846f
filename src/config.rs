use crate::{common::*, model::PredictorKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub learning_rate: f64,
    pub iterations: usize,
    pub size: usize,
    pub seq_length_out: usize,
    pub horizon_test_step: usize,
    pub data_dir: PathBuf,
    pub train_dir: PathBuf,
    pub action: String,
    pub load_model: usize,
    pub model_file: Option<PathBuf>,
    pub one_hot: bool,
    pub output_file: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub predictor: PredictorKind,
    #[serde(
        serialize_with = "serialize_device",
        deserialize_with = "deserialize_device"
    )]
    pub device: Option<Device>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            learning_rate: 1e-5,
            iterations: 100_000,
            size: 512,
            seq_length_out: 10,
            horizon_test_step: 25,
            data_dir: PathBuf::from("./data/h3.6m/dataset"),
            train_dir: PathBuf::from("./experiments"),
            action: "all".into(),
            load_model: 0,
            model_file: None,
            one_hot: true,
            output_file: PathBuf::from("samples.npz"),
            log_level: "info".into(),
            log_file: None,
            predictor: PredictorKind::Scripted,
            device: None,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn open<P>(path: P) -> Fallible<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = json5::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// The directory the training run saved its checkpoints into.
    pub fn experiment_dir(&self) -> PathBuf {
        self.train_dir
            .join(&self.action)
            .join(format!("out_{}", self.seq_length_out))
            .join(format!("iterations_{}", self.iterations))
            .join(format!("size_{}", self.size))
            .join(format!("lr_{}", format_learning_rate(self.learning_rate)))
    }

    pub fn model_file(&self) -> PathBuf {
        match &self.model_file {
            Some(path) => path.clone(),
            None => self
                .experiment_dir()
                .join(format!("model_{}", self.load_model)),
        }
    }

    pub fn device(&self) -> Device {
        self.device.unwrap_or_else(Device::cuda_if_available)
    }
}

/// Renders a learning rate the same way the training scripts name their
/// directories, e.g. `1e-05` and `0.001`.
fn format_learning_rate(lr: f64) -> String {
    let magnitude = lr.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", lr);
        match text.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => text,
        }
    } else if lr.fract() == 0.0 {
        format!("{:.1}", lr)
    } else {
        format!("{}", lr)
    }
}

fn serialize_device<S>(device: &Option<Device>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = device.map(|device| match device {
        Device::Cpu => "cpu".into(),
        Device::Cuda(n) => format!("cuda({})", n),
    });
    text.serialize(serializer)
}

fn deserialize_device<'de, D>(deserializer: D) -> Result<Option<Device>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = match Option::<String>::deserialize(deserializer)? {
        Some(name) => name,
        None => return Ok(None),
    };

    let device = match name.as_str() {
        "cpu" => Device::Cpu,
        "auto" => return Ok(None),
        _ => {
            let prefix = "cuda(";
            let suffix = ")";
            if name.starts_with(prefix) && name.ends_with(suffix) {
                let number: usize = name[(prefix.len())..(name.len() - suffix.len())]
                    .parse()
                    .map_err(|_err| D::Error::custom(format!("invalid device name {}", name)))?;
                Device::Cuda(number)
            } else {
                return Err(D::Error::custom(format!("invalid device name {}", name)));
            }
        }
    };

    Ok(Some(device))
}
