use crate::common::*;

/// Identifies one recorded sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceKey {
    pub subject: usize,
    pub action: String,
    pub subaction: usize,
}

impl SequenceKey {
    pub fn new<S>(subject: usize, action: S, subaction: usize) -> Self
    where
        S: Into<String>,
    {
        Self {
            subject,
            action: action.into(),
            subaction,
        }
    }
}

impl Display for SequenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}/{}_{}", self.subject, self.action, self.subaction)
    }
}

/// Downsampled sequences keyed by subject, action and subaction.
pub type MotionSet = HashMap<SequenceKey, Array2<f64>>;

/// Per-dimension statistics of the training data.
#[derive(Debug, Clone, PartialEq)]
pub struct NormStats {
    pub mean: Array1<f64>,
    /// standard deviation, with near-constant dimensions replaced by 1
    pub std: Array1<f64>,
    pub dims_to_ignore: Vec<usize>,
    pub dims_to_use: Vec<usize>,
}

impl NormStats {
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

#[derive(Debug, Clone)]
pub struct MotionData {
    pub train: MotionSet,
    pub test: MotionSet,
    pub stats: NormStats,
}
