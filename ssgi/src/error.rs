use thiserror::Error;

use crate::Kernel;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(
        "backend doesn't provide kernels {0:?}; is the SSGI shader out of date?"
    )]
    MissingKernels(Vec<Kernel>),
}
