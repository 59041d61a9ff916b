//! Boundary to the rendering layer.

use crate::navigation::navigator::Activation;

/// Mounts or updates the views of a completed navigation.
pub trait ViewRenderer: Send + Sync {
    fn mount(&self, activation: &Activation);
}

/// Renderer for headless hosts: records each mount as a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRenderer;

impl ViewRenderer for TracingRenderer {
    fn mount(&self, activation: &Activation) {
        let views: Vec<&str> = activation.views.iter().map(|v| v.unit.name.as_str()).collect();
        tracing::info!(
            sequence = activation.sequence,
            href = %activation.href,
            views = ?views,
            "Views mounted"
        );
    }
}
