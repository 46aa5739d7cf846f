use crate::{common::*, data::NormStats};

/// Restores normalized frames to the full pose layout.
///
/// The one-hot block is dropped, the used dimensions are scattered back to
/// their original columns and de-standardized. Ignored dimensions come back as
/// their training mean.
pub fn unnormalize_data(
    normalized: ArrayView2<f64>,
    stats: &NormStats,
    actions: &[String],
    one_hot: bool,
) -> Fallible<Array2<f64>> {
    let n_frames = normalized.nrows();
    let pose_width = if one_hot {
        ensure!(
            normalized.ncols() >= actions.len(),
            "expect a one-hot block of {} columns, but only {} columns exist",
            actions.len(),
            normalized.ncols()
        );
        normalized.ncols() - actions.len()
    } else {
        normalized.ncols()
    };
    ensure!(
        pose_width == stats.dims_to_use.len(),
        "expect {} normalized dimensions, but get {}",
        stats.dims_to_use.len(),
        pose_width
    );

    let mut restored = Array2::zeros((n_frames, stats.dim()));
    for (src, &dst) in stats.dims_to_use.iter().enumerate() {
        restored.column_mut(dst).assign(&normalized.column(src));
    }

    let restored = restored * &stats.std + &stats.mean;
    Ok(restored)
}

/// Denormalizes a `[batch, seq, dim]` batch of predictions, one sequence at a
/// time.
pub fn revert_output_format(
    poses: &Array3<f64>,
    stats: &NormStats,
    actions: &[String],
    one_hot: bool,
) -> Fallible<Vec<Array2<f64>>> {
    poses
        .outer_iter()
        .map(|sequence| unnormalize_data(sequence, stats, actions, one_hot))
        .collect()
}

pub fn array_to_tensor(array: &Array3<f64>, device: Device) -> Tensor {
    let (d0, d1, d2) = array.dim();
    let values = array.iter().map(|&value| value as f32).collect_vec();
    Tensor::of_slice(&values)
        .view([d0 as i64, d1 as i64, d2 as i64])
        .to_device(device)
}

pub fn tensor_to_array3(tensor: &Tensor) -> Fallible<Array3<f64>> {
    let (d0, d1, d2) = tensor.size3()?;
    let values = Vec::<f64>::from(
        &tensor
            .to_device(Device::Cpu)
            .to_kind(Kind::Double)
            .contiguous(),
    );
    let array = Array3::from_shape_vec((d0 as usize, d1 as usize, d2 as usize), values)?;
    Ok(array)
}
