#[cfg(feature = "onnx")]
use std::path::Path;

use crate::config::GopConfig;
use crate::error::GopError;
#[cfg(feature = "onnx")]
use crate::pipeline::traits::RawLogits;
use crate::pipeline::traits::RuntimeBackend;

pub(crate) fn build_runtime_backend(
    config: &GopConfig,
) -> Result<Box<dyn RuntimeBackend>, GopError> {
    #[cfg(feature = "onnx")]
    {
        Ok(Box::new(OnnxRuntimeBackend::load(config)?))
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = config;
        Err(GopError::runtime(
            "build runtime backend",
            "ONNX runtime support is disabled; enable the `onnx` cargo feature or inject a backend",
        ))
    }
}

#[cfg(feature = "onnx")]
struct OnnxRuntimeBackend {
    session: std::sync::Mutex<ort::session::Session>,
    device_label: String,
}

#[cfg(feature = "onnx")]
impl OnnxRuntimeBackend {
    fn load(config: &GopConfig) -> Result<Self, GopError> {
        let execution_providers = onnx_execution_providers(config.device.as_str())?;
        let session = ort::session::Session::builder()
            .map_err(|e| GopError::runtime("onnx session builder", e))?
            .with_execution_providers(execution_providers)
            .map_err(|e| GopError::runtime("onnx execution providers", e))?
            .commit_from_file(Path::new(&config.model_path))
            .map_err(|e| GopError::runtime("onnx model load", e))?;

        tracing::info!(
            inputs = session.inputs().len(),
            outputs = session.outputs().len(),
            model_path = %config.model_path,
            device = %config.device,
            "phoneme CTC ONNX runtime loaded"
        );

        let device_label = parse_onnx_device(config.device.as_str())?;
        Ok(Self {
            session: std::sync::Mutex::new(session),
            device_label: device_label.to_string(),
        })
    }
}

#[cfg(feature = "onnx")]
impl RuntimeBackend for OnnxRuntimeBackend {
    fn infer(&self, normalized_audio: &[f32]) -> Result<RawLogits, GopError> {
        let input = ort::value::TensorRef::from_array_view((
            [1usize, normalized_audio.len()],
            normalized_audio,
        ))
        .map_err(|e| GopError::runtime("onnx input tensor", e))?;
        let mut session = self
            .session
            .lock()
            .map_err(|_| GopError::runtime("onnx session lock", "session mutex poisoned"))?;
        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| GopError::runtime("onnx forward pass", e))?;
        if outputs.len() == 0 {
            return Err(GopError::runtime(
                "onnx forward pass",
                "model produced no outputs",
            ));
        }
        let output = &outputs[0];
        let (shape, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| GopError::runtime("onnx extract logits", e))?;
        Ok(RawLogits {
            dims: shape.iter().copied().collect(),
            logits: logits.to_vec(),
        })
    }

    fn device_label(&self) -> String {
        self.device_label.clone()
    }
}

#[cfg(feature = "onnx")]
fn onnx_execution_providers(
    device: &str,
) -> Result<Vec<ort::ep::ExecutionProviderDispatch>, GopError> {
    match parse_onnx_device(device)? {
        "cpu" => Ok(vec![ort::ep::CPU::default().build()]),
        "cuda" => Ok(vec![
            ort::ep::CUDA::default()
                .with_device_id(0)
                .build()
                .error_on_failure(),
            ort::ep::CPU::default().build(),
        ]),
        _ => Err(GopError::invalid_input(format!(
            "unsupported ONNX device '{device}', expected 'cpu' or 'cuda'"
        ))),
    }
}

#[cfg(feature = "onnx")]
fn parse_onnx_device(device: &str) -> Result<&'static str, GopError> {
    if device.eq_ignore_ascii_case("cpu") {
        Ok("cpu")
    } else if device.eq_ignore_ascii_case("cuda") {
        Ok("cuda")
    } else {
        Err(GopError::invalid_input(format!(
            "unsupported ONNX device '{device}', expected 'cpu' or 'cuda'"
        )))
    }
}

#[cfg(all(test, feature = "onnx"))]
mod tests {
    use super::*;

    #[test]
    fn parse_device_is_case_insensitive() {
        assert_eq!(parse_onnx_device("CPU").expect("cpu"), "cpu");
        assert_eq!(parse_onnx_device("Cuda").expect("cuda"), "cuda");
    }

    #[test]
    fn parse_device_rejects_unknown() {
        let err = parse_onnx_device("tpu").expect_err("unknown device must be rejected");
        assert!(err.to_string().contains("unsupported ONNX device"));
    }
}
