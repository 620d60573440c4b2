use std::sync::Arc;
use std::time::Instant;

use cgmath::Point2;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::color::Rgba;
use crate::config::{TARGET_FRAME_RATE, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use crate::error::AppError;
use crate::frame_limiter::FrameLimiter;
use crate::sketch::{Canvas, MouseButton, Sketch};

/// Corner of the unit quad every disc is stamped from.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 2],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

/// One filled disc, in window pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Disc {
    center: [f32; 2],
    radius: f32,
    color: [f32; 4],
}

impl Disc {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Disc>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _pad: [f32; 2],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-1.0, -1.0],
    },
    Vertex {
        position: [1.0, -1.0],
    },
    Vertex {
        position: [1.0, 1.0],
    },
    Vertex {
        position: [-1.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

const INITIAL_DISC_CAPACITY: usize = 1024;

/// Collects the shapes a sketch draws during one frame.
struct FrameCanvas {
    size: PhysicalSize<u32>,
    background: Rgba,
    frame_rate: u32,
    color: [f32; 4],
    /// Whether colors must be converted to linear light for the surface.
    linear: bool,
    discs: Vec<Disc>,
}

impl FrameCanvas {
    fn new(size: PhysicalSize<u32>) -> FrameCanvas {
        FrameCanvas {
            size,
            background: Rgba::BLACK,
            frame_rate: TARGET_FRAME_RATE,
            color: Rgba::gray(255).to_unorm(),
            linear: false,
            discs: Vec::new(),
        }
    }

    fn convert(&self, color: Rgba) -> [f32; 4] {
        if self.linear {
            color.to_linear()
        } else {
            color.to_unorm()
        }
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.convert(self.background);
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

impl Canvas for FrameCanvas {
    fn width(&self) -> f32 {
        self.size.width as f32
    }

    fn height(&self) -> f32 {
        self.size.height as f32
    }

    fn set_background(&mut self, color: Rgba) {
        self.background = color;
    }

    fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps;
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = self.convert(color);
    }

    fn circle(&mut self, center: Point2<f32>, radius: f32) {
        self.discs.push(Disc {
            center: [center.x, center.y],
            radius,
            color: self.color,
        });
    }
}

/// Prefers an sRGB format; an adapter offering no format at all cannot
/// present to the window.
fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Result<wgpu::TextureFormat, AppError> {
    formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first().copied())
        .ok_or(AppError::NoAdapter)
}

struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    disc_buffer: wgpu::Buffer,
    disc_capacity: usize,
    screen_buffer: wgpu::Buffer,
    screen_bind_group: wgpu::BindGroup,
}

impl GpuState {
    fn new(window: Arc<Window>) -> Result<GpuState, AppError> {
        let wgpu_instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            dx12_shader_compiler: wgpu::Dx12Compiler::Fxc,
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        for adapter in wgpu_instance.enumerate_adapters(wgpu::Backends::PRIMARY) {
            log::debug!("Available GPU: {:?}", adapter.get_info());
        }

        let surface = wgpu_instance.create_surface(window.clone())?;

        let size = window.inner_size();
        let adapter =
            pollster::block_on(wgpu_instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            }))
            .ok_or(AppError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Particle device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        let surface_capabilities = surface.get_capabilities(&adapter);

        let surface_format = choose_surface_format(&surface_capabilities.formats)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .ok_or(AppError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Disc shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let screen_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen uniform buffer"),
            contents: bytemuck::cast_slice(&[ScreenUniform {
                size: [config.width as f32, config.height as f32],
                _pad: [0.0; 2],
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Screen bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Screen bind group"),
            layout: &screen_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_buffer.as_entire_binding(),
            }],
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&screen_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Disc pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[Vertex::desc(), Disc::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex buffer"),
            contents: bytemuck::cast_slice(VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let disc_buffer = Self::create_disc_buffer(&device, INITIAL_DISC_CAPACITY);

        Ok(GpuState {
            window,
            surface,
            device,
            queue,
            config,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: INDICES.len() as u32,
            disc_buffer,
            disc_capacity: INITIAL_DISC_CAPACITY,
            screen_buffer,
            screen_bind_group,
        })
    }

    fn create_disc_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Disc buffer"),
            size: (capacity * std::mem::size_of::<Disc>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn uses_srgb(&self) -> bool {
        self.config.format.is_srgb()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.reconfigure();
            self.queue.write_buffer(
                &self.screen_buffer,
                0,
                bytemuck::cast_slice(&[ScreenUniform {
                    size: [new_size.width as f32, new_size.height as f32],
                    _pad: [0.0; 2],
                }]),
            );
        }
    }

    fn reconfigure(&self) {
        log::debug!(
            "Configuring surface at {}x{}",
            self.config.width,
            self.config.height
        );
        self.surface.configure(&self.device, &self.config);
    }

    fn upload(&mut self, discs: &[Disc]) {
        if discs.len() > self.disc_capacity {
            self.disc_capacity = discs.len().next_power_of_two();
            log::debug!("Growing disc buffer to {} entries", self.disc_capacity);
            self.disc_buffer = Self::create_disc_buffer(&self.device, self.disc_capacity);
        }
        self.queue
            .write_buffer(&self.disc_buffer, 0, bytemuck::cast_slice(discs));
    }

    fn render(&mut self, canvas: &FrameCanvas) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.upload(&canvas.discs);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(canvas.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.screen_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.disc_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.num_indices, 0, 0..canvas.discs.len() as u32);
        }

        // submit will accept anything that implements IntoIter
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Hosts a `Sketch` in a window: owns the GPU state and turns window events
/// into sketch callbacks.
struct WGPUApp<S: Sketch> {
    sketch: S,
    canvas: FrameCanvas,
    gpu: Option<GpuState>,
    limiter: FrameLimiter,
    cursor: Point2<f32>,
    held_buttons: Vec<MouseButton>,
    error: Option<AppError>,
}

impl<S: Sketch> WGPUApp<S> {
    fn new(sketch: S) -> WGPUApp<S> {
        WGPUApp {
            sketch,
            canvas: FrameCanvas::new(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
            gpu: None,
            limiter: FrameLimiter::new(TARGET_FRAME_RATE, Instant::now()),
            cursor: Point2::new(0.0, 0.0),
            held_buttons: Vec::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let gpu = GpuState::new(window)?;

        self.canvas.size = gpu.window.inner_size();
        self.canvas.linear = gpu.uses_srgb();
        self.sketch.setup(&mut self.canvas);
        self.limiter.set_frame_rate(self.canvas.frame_rate);
        log::info!(
            "Window ready at {}x{}, targeting {} fps",
            self.canvas.size.width,
            self.canvas.size.height,
            self.canvas.frame_rate
        );

        self.gpu = Some(gpu);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        log::debug!("The window was resized to {:?}", new_size);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(new_size);
        }
        if new_size.width > 0 && new_size.height > 0 {
            self.canvas.size = new_size;
            self.sketch
                .window_resized(new_size.width as f32, new_size.height as f32);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        self.sketch.update();
        self.canvas.discs.clear();
        self.sketch.draw(&mut self.canvas);

        match gpu.render(&self.canvas) {
            Ok(_) => {}
            // Reconfigure the surface if lost
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure()
            }
            // The system is out of memory, we should probably quit
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory; stopping");
                event_loop.exit();
            }
            // Timeouts should be resolved by the next frame
            Err(e) => log::warn!("Skipped frame: {:?}", e),
        }
    }
}

impl<S: Sketch> ApplicationHandler for WGPUApp<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point2::new(position.x as f32, position.y as f32);
                match self.held_buttons.last() {
                    Some(&button) => self.sketch.mouse_dragged(self.cursor, button),
                    None => self.sketch.mouse_moved(self.cursor),
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = MouseButton::from(button);
                match state {
                    ElementState::Pressed => {
                        self.held_buttons.push(button);
                        self.sketch.mouse_pressed(self.cursor, button);
                    }
                    ElementState::Released => {
                        self.held_buttons.retain(|&held| held != button);
                        self.sketch.mouse_released(self.cursor, button);
                    }
                }
            }
            WindowEvent::DroppedFile(path) => self.sketch.drag_event(path),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.sketch.key_pressed(key),
                        ElementState::Released => self.sketch.key_released(key),
                    }
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        if self.limiter.tick(Instant::now()) {
            gpu.window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.limiter.next_frame()));
    }
}

/// Opens the window and runs `sketch` until the window is closed.
pub fn run_wgpu_window<S: Sketch>(sketch: S) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = WGPUApp::new(sketch);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_layout_matches_attributes() {
        assert_eq!(std::mem::size_of::<Disc>(), 28);
        assert_eq!(std::mem::size_of::<ScreenUniform>(), 16);
    }

    #[test]
    fn canvas_records_discs_in_current_color() {
        let mut canvas = FrameCanvas::new(PhysicalSize::new(800, 600));
        canvas.set_color(Rgba::rgb(255, 0, 0));
        canvas.circle(Point2::new(10.0, 20.0), 0.8);
        canvas.set_color(Rgba::BLACK);
        canvas.circle(Point2::new(30.0, 40.0), 2.0);

        assert_eq!(canvas.width(), 800.0);
        assert_eq!(canvas.height(), 600.0);
        assert_eq!(
            canvas.discs,
            vec![
                Disc {
                    center: [10.0, 20.0],
                    radius: 0.8,
                    color: [1.0, 0.0, 0.0, 1.0],
                },
                Disc {
                    center: [30.0, 40.0],
                    radius: 2.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
            ]
        );
    }

    #[test]
    fn surface_format_prefers_srgb() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats).ok(),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            choose_surface_format(&formats[..1]).ok(),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
    }

    #[test]
    fn no_surface_formats_is_an_error() {
        assert!(matches!(
            choose_surface_format(&[]),
            Err(AppError::NoAdapter)
        ));
    }

    #[test]
    fn clear_color_follows_background() {
        let mut canvas = FrameCanvas::new(PhysicalSize::new(800, 600));
        canvas.set_background(Rgba::gray(51));
        let color = canvas.clear_color();
        assert!((color.r - 0.2).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }
}
