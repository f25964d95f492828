use anyhow::Result;
use atrium_render::{BackendKind, RoomRenderer};
use atrium_scene::{
    LightingMode, OrbitCamera, SceneConfig, AMBIENT_RANGE, DIRECTIONAL_RANGE, SHADOW_BIAS_RANGE,
};
use atrium_stats::{PerfSampler, StatsSnapshot};
use clap::Parser;
use egui::Context as EguiContext;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

mod hud;

#[derive(Parser)]
#[command(name = "atrium-viewer", about = "Furnished-room viewer with a performance overlay")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// GPU backend family: modern or legacy
    #[arg(long, default_value = "modern")]
    backend: String,

    /// Scene description file (JSON); defaults to the built-in living room
    #[arg(long)]
    scene: Option<String>,
}

/// Application state independent of the GPU context.
struct AppState {
    scene: SceneConfig,
    camera: OrbitCamera,
    backend: BackendKind,
    /// Backend requested from the controls panel; applied between frames.
    pending_backend: Option<BackendKind>,
    sampler: Option<PerfSampler>,
    snapshot: Option<StatsSnapshot>,
    show_overlay: bool,
    orbiting: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: SceneConfig, backend: BackendKind) -> Self {
        let mut camera = OrbitCamera::from_config(&scene.camera, 16.0 / 9.0);
        camera.begin_fly_in();

        Self {
            scene,
            camera,
            backend,
            pending_backend: None,
            sampler: Some(PerfSampler::new(Instant::now())),
            snapshot: None,
            show_overlay: true,
            orbiting: false,
            last_frame: Instant::now(),
        }
    }

    /// Mount or unmount the overlay. Remounting starts a fresh
    /// measurement window; unmounting publishes nothing further.
    fn toggle_overlay(&mut self) {
        self.show_overlay = !self.show_overlay;
        self.sampler = self.show_overlay.then(|| PerfSampler::new(Instant::now()));
        self.snapshot = None;
    }

    fn toggle_baked(&mut self) {
        let lighting = &mut self.scene.lighting;
        lighting.mode = if lighting.is_baked() {
            LightingMode::Dynamic
        } else {
            LightingMode::Baked
        };
        tracing::info!(baked = lighting.is_baked(), "lighting mode toggled");
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }
        match key {
            KeyCode::KeyB => self.toggle_baked(),
            KeyCode::F1 => self.toggle_overlay(),
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext, adapter_backend: &str) {
        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Renderer");
                egui::ComboBox::from_id_salt("backend")
                    .selected_text(self.backend.label())
                    .show_ui(ui, |ui| {
                        for kind in BackendKind::ALL {
                            if ui
                                .selectable_label(self.backend == kind, kind.label())
                                .clicked()
                                && kind != self.backend
                            {
                                self.pending_backend = Some(kind);
                            }
                        }
                    });
                ui.separator();

                let mut baked = self.scene.lighting.is_baked();
                if ui.checkbox(&mut baked, "Baked Lighting").changed() {
                    self.toggle_baked();
                }

                ui.add_enabled_ui(!baked, |ui| {
                    ui.collapsing("Lighting", |ui| {
                        let lighting = &mut self.scene.lighting;
                        ui.add(
                            egui::Slider::new(&mut lighting.ambient_intensity, AMBIENT_RANGE)
                                .text("Ambient"),
                        );
                        ui.add(
                            egui::Slider::new(
                                &mut lighting.directional_intensity,
                                DIRECTIONAL_RANGE,
                            )
                            .text("Directional"),
                        );
                        ui.add(
                            egui::Slider::new(&mut lighting.shadow_bias, SHADOW_BIAS_RANGE)
                                .text("Shadow Bias"),
                        );
                    });
                });

                let mut overlay = self.show_overlay;
                if ui.checkbox(&mut overlay, "Stats Overlay").changed() {
                    self.toggle_overlay();
                }

                ui.separator();
                ui.small("LMB: Orbit | Scroll: Zoom | B: Baked | F1: Overlay");
            });

        if self.show_overlay {
            hud::draw(
                ctx,
                self.snapshot.as_ref(),
                adapter_backend,
                self.backend == BackendKind::Modern,
            );
        }
    }
}

/// GPU resources; torn down and rebuilt whenever the backend changes.
struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: RoomRenderer,
    egui_renderer: egui_wgpu::Renderer,
    adapter_backend: String,
}

/// Whether the render loop may advance frames.
///
/// Held at `Halted` until GPU initialization completes; counters sampled
/// against a half-built context would be meaningless.
#[derive(PartialEq)]
enum Frameloop {
    Halted,
    Running,
}

struct ViewerApp {
    state: AppState,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    frameloop: Frameloop,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
}

impl ViewerApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            gpu: None,
            frameloop: Frameloop::Halted,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
        }
    }

    /// Bring up the GPU context for the currently selected backend and
    /// open the frame loop. The loop stays halted on failure.
    fn init_gpu(&mut self) -> Result<()> {
        let Some(window) = &self.window else {
            return Ok(());
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.state.backend.backends(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| {
            anyhow::anyhow!("no adapter available for {} backend", self.state.backend)
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("atrium_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = RoomRenderer::new(
            &device,
            surface_format,
            size.width,
            size.height,
            &self.state.scene,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let adapter_backend = adapter.get_info().backend.to_str().to_string();
        tracing::info!("GPU initialized with {adapter_backend} backend");

        self.gpu = Some(GpuContext {
            surface,
            device,
            queue,
            config,
            renderer,
            egui_renderer,
            adapter_backend,
        });
        self.frameloop = Frameloop::Running;

        // A fresh GPU context starts a fresh measurement window.
        self.state.sampler = self
            .state
            .show_overlay
            .then(|| PerfSampler::new(Instant::now()));
        self.state.snapshot = None;
        self.state.last_frame = Instant::now();

        Ok(())
    }

    fn apply_backend_switch(&mut self, kind: BackendKind) {
        let previous = self.state.backend;
        tracing::info!("switching backend: {previous} -> {kind}");

        self.frameloop = Frameloop::Halted;
        self.gpu = None;
        self.state.backend = kind;

        if let Err(e) = self.init_gpu() {
            tracing::error!("backend switch failed: {e}; reverting to {previous}");
            self.state.backend = previous;
            if let Err(e) = self.init_gpu() {
                tracing::error!("failed to restore {previous} backend: {e}");
            }
        }
    }

    fn redraw(&mut self) {
        if self.frameloop != Frameloop::Running {
            return;
        }
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.camera.update(dt);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.scene,
        );

        let report = gpu.renderer.counters().report();
        if let Some(sampler) = &mut self.state.sampler {
            if let Some(snapshot) = sampler.tick(now, &report) {
                self.state.snapshot = Some(snapshot);
            }
        }

        let window = self.window.as_ref().unwrap();
        let raw_input = self.egui_winit.as_mut().unwrap().take_egui_input(window);
        let adapter_backend = gpu.adapter_backend.clone();
        let full_output = self
            .egui_ctx
            .run(raw_input, |ctx| self.state.draw_ui(ctx, &adapter_backend));

        self.egui_winit
            .as_mut()
            .unwrap()
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            for (id, image_delta) in &full_output.textures_delta.set {
                gpu.egui_renderer
                    .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
            }
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("egui_encoder"),
                });
            gpu.egui_renderer.update_buffers(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                gpu.egui_renderer
                    .render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            gpu.queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                gpu.egui_renderer.free_texture(id);
            }
        }

        output.present();
        if let Some(window) = &self.window {
            window.request_redraw();
        }

        if let Some(kind) = self.state.pending_backend.take() {
            self.apply_backend_switch(kind);
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Atrium Viewer")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        self.window = Some(window);
        self.egui_winit = Some(egui_winit);

        self.init_gpu().expect("initialize GPU");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                    self.state.camera.aspect =
                        gpu.config.width as f32 / gpu.config.height.max(1) as f32;
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape && key_state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.orbiting = btn_state == ElementState::Pressed;
                if self.state.orbiting {
                    self.state.camera.cancel_glide();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.orbiting {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let backend: BackendKind = cli.backend.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let scene = match &cli.scene {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::living_room(),
    };

    tracing::info!(scene = %scene.name, %backend, "atrium-viewer starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(AppState::new(scene, backend));
    event_loop.run_app(&mut app)?;

    Ok(())
}
