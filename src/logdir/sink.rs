use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UpdateFreq {
    Epoch,
}

/// TensorBoard callback settings for one run.
///
/// Serialized field names match the keyword arguments of
/// `keras.callbacks.TensorBoard`, so a training script can splat them in.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TensorBoardSink {
    pub(crate) log_dir: PathBuf,
    pub(crate) histogram_freq: u32,
    pub(crate) write_graph: bool,
    pub(crate) write_images: bool,
    pub(crate) update_freq: UpdateFreq,
}

impl TensorBoardSink {
    /// Per-epoch histograms, graph and images
    pub(crate) fn per_epoch(log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            histogram_freq: 1,
            write_graph: true,
            write_images: true,
            update_freq: UpdateFreq::Epoch,
        }
    }
}
