use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which model to fetch and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Model", inline)]
#[serde(default)]
pub struct ModelOptions {
    /// Path or URL of the glTF asset, resolved by the asset source.
    #[schemars(skip)]
    pub path: String,
    /// Give up on a pending load after this many seconds. Unset waits
    /// forever.
    #[schemars(title = "Load Timeout (s)", range(min = 1.0, max = 600.0))]
    pub load_timeout_secs: Option<f32>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            path: "assets/models/scene.gltf".to_owned(),
            load_timeout_secs: None,
        }
    }
}

impl ModelOptions {
    /// The configured timeout, if a positive value that fits a
    /// [`Duration`] is set.
    #[must_use]
    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f32(secs).ok())
    }
}
