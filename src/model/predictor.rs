use super::PredictorKind;
use crate::common::*;

/// A sequence model that continues a seed sequence.
///
/// Inputs are batch-major: `encoder_inputs` is `[batch, source_len - 1, dim]`
/// and `decoder_inputs` is `[batch, target_len, dim]`, its first frame being the
/// last observed pose. The prediction has the shape of `decoder_inputs`.
pub trait MotionPredictor {
    fn predict(&self, encoder_inputs: &Tensor, decoder_inputs: &Tensor) -> Fallible<Tensor>;
}

/// Pretrained model exported as a TorchScript module.
pub struct ScriptedPredictor {
    module: CModule,
    device: Device,
}

impl ScriptedPredictor {
    pub fn load<P>(path: P, device: Device) -> Fallible<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        ensure!(path.is_file(), "model file {} does not exist", path.display());

        let mut module = CModule::load_on_device(path, device)
            .with_context(|| format!("failed to load model {}", path.display()))?;
        module.set_eval();

        Ok(Self { module, device })
    }
}

impl MotionPredictor for ScriptedPredictor {
    fn predict(&self, encoder_inputs: &Tensor, decoder_inputs: &Tensor) -> Fallible<Tensor> {
        let encoder_inputs = encoder_inputs.to_device(self.device);
        let decoder_inputs = decoder_inputs.to_device(self.device);

        let output =
            tch::no_grad(|| self.module.forward_ts(&[&encoder_inputs, &decoder_inputs]))?;

        ensure!(
            output.size() == decoder_inputs.size(),
            "model output has shape {:?}, but expect {:?}",
            output.size(),
            decoder_inputs.size()
        );
        Ok(output)
    }
}

/// Baseline that holds the last observed pose for the whole horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroVelocity;

impl MotionPredictor for ZeroVelocity {
    fn predict(&self, _encoder_inputs: &Tensor, decoder_inputs: &Tensor) -> Fallible<Tensor> {
        let (_batch_size, target_len, _dim) = decoder_inputs.size3()?;
        ensure!(target_len > 0, "decoder inputs are empty");

        let last_pose = decoder_inputs.narrow(1, 0, 1);
        Ok(last_pose.repeat(&[1, target_len, 1]))
    }
}

pub fn build_predictor(
    kind: PredictorKind,
    model_file: &Path,
    device: Device,
) -> Fallible<Box<dyn MotionPredictor>> {
    let predictor: Box<dyn MotionPredictor> = match kind {
        PredictorKind::Scripted => {
            info!("Loading model {}", model_file.display());
            Box::new(ScriptedPredictor::load(model_file, device)?)
        }
        PredictorKind::ZeroVelocity => {
            info!("Using the zero-velocity baseline");
            Box::new(ZeroVelocity)
        }
    };
    Ok(predictor)
}
