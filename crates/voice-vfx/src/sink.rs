//! Parameter sink implementations.

use std::collections::HashMap;

use tracing::debug;
use voice_vfx_api::{ParameterSink, Rgba};

/// Sink that logs every write at debug level.
///
/// Stands in for a real particle system in the demo host.
#[derive(Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl ParameterSink for TracingSink {
    fn set_scalar(&mut self, name: &str, value: f32) {
        debug!("{} = {:.4}", name, value);
    }

    fn set_color(&mut self, name: &str, value: Rgba) {
        debug!(
            "{} = ({:.3}, {:.3}, {:.3}, {:.3})",
            name, value.r, value.g, value.b, value.a
        );
    }
}

/// Sink that records the last write per parameter name.
///
/// Backs the tests and any host that wants to poll current values.
#[derive(Default)]
pub struct MemorySink {
    scalars: HashMap<String, f32>,
    colors: HashMap<String, Rgba>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scalar(&self, name: &str) -> Option<f32> {
        self.scalars.get(name).copied()
    }

    pub fn color(&self, name: &str) -> Option<Rgba> {
        self.colors.get(name).copied()
    }
}

impl ParameterSink for MemorySink {
    fn set_scalar(&mut self, name: &str, value: f32) {
        self.scalars.insert(name.to_string(), value);
    }

    fn set_color(&mut self, name: &str, value: Rgba) {
        self.colors.insert(name.to_string(), value);
    }
}
