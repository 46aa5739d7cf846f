use crate::{
    actions,
    common::*,
    config::Config,
    dataset, evaluation,
    model::MotionPredictor,
    output::{self, SampleWriter},
    params, utils,
};

/// Runs the SRNN evaluation of every configured action and writes the samples
/// archive. Returns the error curve of each action.
pub fn run(
    config: &Config,
    predictor: &dyn MotionPredictor,
    device: Device,
) -> Fallible<BTreeMap<String, Array1<f64>>> {
    let horizon = config.horizon_test_step;
    ensure!(
        horizon < params::TARGET_SEQ_LEN,
        "horizon_test_step must be less than {}, but get {}",
        params::TARGET_SEQ_LEN,
        horizon
    );

    let actions = actions::define_actions(&config.action)?;
    let one_hot = config.one_hot;
    let subject = params::TEST_SUBJECT;

    // load all the data
    let data = dataset::read_all_data(
        &actions,
        params::SOURCE_SEQ_LEN,
        config.seq_length_out,
        &config.data_dir,
        one_hot,
    )?;

    // ground truth is needed as exponential maps for saving and as Euler
    // angles for errors
    let gts_expmap =
        evaluation::srnn_ground_truth(&actions, &data.test, &data.stats, subject, one_hot, false)?;
    let gts_euler =
        evaluation::srnn_ground_truth(&actions, &data.test, &data.stats, subject, one_hot, true)?;

    output::remove_stale(&config.output_file)?;
    let mut writer = SampleWriter::new();
    let mut curves = BTreeMap::new();

    for action in &actions {
        info!("Action {}", action);

        let batch = dataset::get_batch_srnn(
            &data.test,
            action,
            subject,
            params::SOURCE_SEQ_LEN,
            params::TARGET_SEQ_LEN,
        )?;
        let inputs = batch.to_tensors(device);

        let poses = predictor.predict(&inputs.encoder_inputs, &inputs.decoder_inputs)?;
        debug!("prediction shape {:?}", poses.size());
        debug!(
            "SRNN loss on action {}: {}",
            action,
            evaluation::srnn_loss(&poses, &inputs.decoder_outputs.to_device(poses.device()))
        );

        let poses = utils::tensor_to_array3(&poses)?;
        let pred_expmap = utils::revert_output_format(&poses, &data.stats, &actions, one_hot)?;

        writer.insert_samples(action, &gts_expmap[action], &pred_expmap)?;

        let errors = evaluation::evaluate_batch(&pred_expmap, &gts_euler[action])?;
        info!(
            "Mean error for test data along the horizon on action {}: {}",
            action, errors
        );
        info!(
            "Mean error for test data at horizon {} on action {}: {}",
            horizon, action, errors[horizon]
        );
        info!(
            "{}: {}",
            action,
            evaluation::format_summary(&evaluation::horizon_summary(&errors))
        );

        writer.insert_errors(action, &errors)?;
        curves.insert(action.clone(), errors);
    }

    writer.write(&config.output_file)?;
    info!(
        "Saved {} entries to {}",
        writer.len(),
        config.output_file.display()
    );

    Ok(curves)
}
