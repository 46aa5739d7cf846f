use crate::common::*;

/// Collects named arrays and writes them into a single `.npz` archive.
///
/// Keys are slash-separated paths such as `expmap/gt/walking_0`.
#[derive(Debug, Default)]
pub struct SampleWriter {
    entries: BTreeMap<String, Tensor>,
}

impl SampleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert_sequence<S>(&mut self, name: S, array: &Array2<f64>) -> Fallible<()>
    where
        S: Into<String>,
    {
        let (n_rows, n_cols) = array.dim();
        let values = array.iter().copied().collect_vec();
        let tensor = Tensor::of_slice(&values).view([n_rows as i64, n_cols as i64]);
        self.insert(name.into(), tensor)
    }

    pub fn insert_curve<S>(&mut self, name: S, array: &Array1<f64>) -> Fallible<()>
    where
        S: Into<String>,
    {
        let values = array.to_vec();
        self.insert(name.into(), Tensor::of_slice(&values))
    }

    fn insert(&mut self, name: String, tensor: Tensor) -> Fallible<()> {
        ensure!(
            !self.entries.contains_key(&name),
            r#"the entry "{}" is already stored"#,
            name
        );
        self.entries.insert(name, tensor);
        Ok(())
    }

    /// Stores the ground truth and prediction of every SRNN sequence of an
    /// action.
    pub fn insert_samples(
        &mut self,
        action: &str,
        gt_expmap: &[Array2<f64>],
        pred_expmap: &[Array2<f64>],
    ) -> Fallible<()> {
        ensure!(
            gt_expmap.len() == pred_expmap.len(),
            "get {} ground-truth sequences, but {} predictions",
            gt_expmap.len(),
            pred_expmap.len()
        );

        for (index, (gt, pred)) in gt_expmap.iter().zip(pred_expmap).enumerate() {
            self.insert_sequence(format!("expmap/gt/{}_{}", action, index), gt)?;
            self.insert_sequence(format!("expmap/preds/{}_{}", action, index), pred)?;
        }
        Ok(())
    }

    pub fn insert_errors(&mut self, action: &str, errors: &Array1<f64>) -> Fallible<()> {
        self.insert_curve(format!("mean_{}_error", action), errors)
    }

    pub fn write<P>(&self, path: P) -> Fallible<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let entries = self
            .entries
            .iter()
            .map(|(name, tensor)| (name.as_str(), tensor))
            .collect_vec();
        Tensor::write_npz(&entries, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Removes an output file left by a previous run.
pub fn remove_stale<P>(path: P) -> Fallible<()>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale output {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::from(err).context(format!("failed to remove {}", path.display()))),
    }
}
