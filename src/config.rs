//! Shell configuration.

/// Configuration for the layer shell core
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Seat name reported in logs
    pub seat_name: String,
    /// Re-arrange the owning output as soon as a layer surface unmaps.
    /// When false, reclaiming the space waits for the next relevant commit.
    pub rearrange_on_unmap: bool,
    /// Upper bound on live layer surfaces. Creation requests beyond it are
    /// rejected as resource exhaustion.
    pub max_layer_surfaces: Option<usize>,
    /// Advertised zwlr_layer_shell_v1 version
    pub layer_shell_version: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            seat_name: "seat0".to_string(),
            rearrange_on_unmap: true,
            max_layer_surfaces: None,
            layer_shell_version: 4,
        }
    }
}
