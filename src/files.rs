use crate::hpss::HpssConfig;
use std::path::{Path, PathBuf};

/// Which separated component a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Harmonic,
    Percussive,
}

impl Component {
    fn label(self) -> &'static str {
        match self {
            Component::Harmonic => "harmonic",
            Component::Percussive => "percussive",
        }
    }
}

/// Build the output path for a separated component, next to the source.
///
/// The name encodes the full parameter tuple so runs with different
/// settings never collide:
/// `k(50)_alpha(0.3)_gamma(0.3)_harmonic_parts_of_mix.wav`.
pub fn component_path(source: &Path, config: &HpssConfig, component: Component) -> PathBuf {
    let file = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!(
        "k({})_alpha({})_gamma({})_{}_parts_of_{}",
        config.k_max,
        config.alpha,
        config.gamma,
        component.label(),
        file
    );
    source.with_file_name(name)
}
