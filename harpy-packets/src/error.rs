use thiserror::Error;

/// A buffer too short to hold the fixed layout it was decoded as.
///
/// On a shared medium this is expected noise: callers skip the packet and move on.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("malformed {layer} frame: need {expected} bytes, got {actual}")]
pub struct MalformedFrame {
    pub layer: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl MalformedFrame {
    pub(crate) fn check(layer: &'static str, expected: usize, data: &[u8]) -> Result<(), Self> {
        if data.len() < expected {
            return Err(MalformedFrame {
                layer,
                expected,
                actual: data.len(),
            });
        }
        Ok(())
    }
}
