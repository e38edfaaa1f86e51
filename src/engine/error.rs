use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessorError {
    #[error("unsupported bus arrangement: inputs {inputs:?}, outputs {outputs:?} (expected one stereo output)")]
    UnsupportedBusArrangement {
        inputs: Vec<usize>,
        outputs: Vec<usize>,
    },
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("state blob has {found} bytes, expected {expected}")]
    Length { expected: usize, found: usize },
}
