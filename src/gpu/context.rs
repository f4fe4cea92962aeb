use std::sync::Arc;

use crate::error::{gpu_operation_error, TerrainError, TerrainResult};

/// Shared device/queue pair plus the capabilities the terrain code cares about
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    float32_filterable: bool,
    polygon_mode_line: bool,
    max_texture_dimension_2d: u32,
}

impl GpuContext {
    /// Wrap an existing device, e.g. one owned by a windowed renderer
    pub fn from_parts(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let features = device.features();
        let float32_filterable = features.contains(wgpu::Features::FLOAT32_FILTERABLE);
        let polygon_mode_line = features.contains(wgpu::Features::POLYGON_MODE_LINE);
        let max_texture_dimension_2d = device.limits().max_texture_dimension_2d;
        Self {
            device,
            queue,
            float32_filterable,
            polygon_mode_line,
            max_texture_dimension_2d,
        }
    }

    /// Acquire a device with no surface attached.
    ///
    /// Tries a high-performance adapter, then low-power, then the software
    /// fallback.
    pub async fn new_headless() -> TerrainResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        log::info!("[GpuContext::new_headless] Requesting GPU adapter...");
        let mut adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        };

        let adapter = match instance.request_adapter(&adapter_options).await {
            Some(adapter) => adapter,
            None => {
                log::warn!("[GpuContext::new_headless] No high-performance adapter, trying low-power...");
                adapter_options.power_preference = wgpu::PowerPreference::LowPower;
                match instance.request_adapter(&adapter_options).await {
                    Some(adapter) => adapter,
                    None => {
                        log::warn!("[GpuContext::new_headless] No low-power adapter, trying fallback...");
                        adapter_options.force_fallback_adapter = true;
                        instance
                            .request_adapter(&adapter_options)
                            .await
                            .ok_or_else(|| TerrainError::Gpu {
                                operation: "request_adapter".to_string(),
                                error: "no suitable GPU adapter found".to_string(),
                            })?
                    }
                }
            }
        };

        let info = adapter.get_info();
        log::info!("[GpuContext::new_headless] Adapter: {} ({:?})", info.name, info.device_type);
        log::info!("[GpuContext::new_headless] Backend: {:?}", info.backend);

        let required_features = adapter.features()
            & (wgpu::Features::FLOAT32_FILTERABLE | wgpu::Features::POLYGON_MODE_LINE);
        let adapter_limits = adapter.limits();
        log::info!(
            "[GpuContext::new_headless] max_texture_dimension_2d: {}",
            adapter_limits.max_texture_dimension_2d
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Terrain Scene Device"),
                    required_features,
                    required_limits: adapter_limits,
                },
                None,
            )
            .await
            .map_err(|e| gpu_operation_error("request_device", e))?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("[GPU] Uncaptured device error: {:?}", error);
        }));

        Ok(Self::from_parts(Arc::new(device), Arc::new(queue)))
    }

    /// Whether `R32Float` textures may use linear filtering on this device
    pub fn float32_filterable(&self) -> bool {
        self.float32_filterable
    }

    /// Whether pipelines may rasterize as wireframe
    pub fn polygon_mode_line(&self) -> bool {
        self.polygon_mode_line
    }

    pub fn max_texture_dimension_2d(&self) -> u32 {
        self.max_texture_dimension_2d
    }
}
