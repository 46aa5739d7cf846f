use crate::{
    common::*,
    convert,
    data::{MotionSet, NormStats},
    dataset, params, utils,
};

/// Denormalized ground-truth continuations of the SRNN seeds, per action.
///
/// With `to_euler` the joints are converted to Euler angles, which is the
/// space errors are measured in. Otherwise they stay exponential maps.
pub fn srnn_ground_truth(
    actions: &[String],
    test_set: &MotionSet,
    stats: &NormStats,
    subject: usize,
    one_hot: bool,
    to_euler: bool,
) -> Fallible<HashMap<String, Vec<Array2<f64>>>> {
    actions
        .iter()
        .map(|action| -> Fallible<(String, Vec<Array2<f64>>)> {
            let batch = dataset::get_batch_srnn(
                test_set,
                action,
                subject,
                params::SOURCE_SEQ_LEN,
                params::TARGET_SEQ_LEN,
            )?;

            let sequences = batch
                .decoder_outputs
                .outer_iter()
                .map(|sequence| -> Fallible<Array2<f64>> {
                    let mut denormed = utils::unnormalize_data(sequence, stats, actions, one_hot)?;
                    if to_euler {
                        convert::pose_to_euler(&mut denormed)?;
                    }
                    Ok(denormed)
                })
                .collect::<Fallible<Vec<_>>>()?;

            Ok((action.clone(), sequences))
        })
        .collect()
}

/// Mean Euclidean error in Euler-angle space at every prediction step.
///
/// Predictions are given as exponential maps and converted here. The root
/// position and orientation are excluded, as are dimensions that stay
/// constant over the ground-truth sequence.
pub fn evaluate_batch(pred_expmap: &[Array2<f64>], gt_euler: &[Array2<f64>]) -> Fallible<Array1<f64>> {
    ensure!(
        pred_expmap.len() == gt_euler.len(),
        "get {} predicted sequences, but {} ground-truth sequences",
        pred_expmap.len(),
        gt_euler.len()
    );
    ensure!(!gt_euler.is_empty(), "no sequence to evaluate");

    let errors = pred_expmap
        .par_iter()
        .zip(gt_euler.par_iter())
        .map(|(pred, gt)| sequence_error(pred, gt))
        .collect::<Fallible<Vec<_>>>()?;

    let views = errors.iter().map(|error| error.view()).collect_vec();
    let mean = ndarray::stack(Axis(0), &views)?
        .mean_axis(Axis(0))
        .ok_or_else(|| format_err!("no sequence to evaluate"))?;
    Ok(mean)
}

fn sequence_error(pred: &Array2<f64>, gt: &Array2<f64>) -> Fallible<Array1<f64>> {
    ensure!(
        pred.dim() == gt.dim(),
        "prediction has shape {:?}, but ground truth has shape {:?}",
        pred.dim(),
        gt.dim()
    );

    let mut pred = pred.clone();
    convert::pose_to_euler(&mut pred)?;

    let mut gt = gt.clone();
    gt.slice_mut(s![.., ..6]).fill(0.0);

    let dims_to_use = gt
        .std_axis(Axis(0), 0.0)
        .iter()
        .enumerate()
        .filter(|(_, &deviation)| deviation > params::STD_EPSILON)
        .map(|(dim, _)| dim)
        .collect_vec();

    let diff = gt.select(Axis(1), &dims_to_use) - pred.select(Axis(1), &dims_to_use);
    let error = diff
        .mapv(|value| value * value)
        .sum_axis(Axis(1))
        .mapv(f64::sqrt);
    Ok(error)
}

/// Mean squared error between raw predictions and normalized targets.
pub fn srnn_loss(pred: &Tensor, target: &Tensor) -> f64 {
    let diff = pred - target;
    (&diff * &diff).mean(Kind::Float).double_value(&[])
}

/// Errors at the customary millisecond horizons that the curve covers.
pub fn horizon_summary(errors: &Array1<f64>) -> Vec<(usize, f64)> {
    params::SUMMARY_HORIZONS_MS
        .iter()
        .map(|&millis| (millis, millis / params::FRAME_MILLIS - 1))
        .filter(|&(_, step)| step < errors.len())
        .map(|(millis, step)| (millis, errors[step]))
        .collect()
}

pub fn format_summary(summary: &[(usize, f64)]) -> String {
    summary
        .iter()
        .map(|(millis, error)| format!("{}ms: {:.3}", millis, error))
        .join(" | ")
}
