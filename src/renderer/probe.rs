//! Accelerated-context capability probe.

use log::{info, warn};

/// Check whether an accelerated graphics context can be created.
///
/// Requests a throwaway adapter from the graphics stack, without a
/// surface. Every failure mode (no compatible adapter, a panicking
/// driver) is absorbed and reported as `false`; this function never
/// raises. Synchronous and one-shot: callers decide once and keep the
/// verdict.
pub fn supports_accelerated() -> bool {
    let result = std::panic::catch_unwind(|| {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
    });

    match result {
        Ok(Some(adapter)) => {
            let adapter_info = adapter.get_info();
            info!(
                "accelerated context available: {} ({:?})",
                adapter_info.name, adapter_info.backend
            );
            true
        }
        Ok(None) => {
            warn!("no compatible graphics adapter found");
            false
        }
        Err(_) => {
            warn!("graphics adapter probe panicked");
            false
        }
    }
}
