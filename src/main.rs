use std::{
    collections::HashSet,
    ffi::CString,
    num::NonZeroU32,
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use anyhow::Result;
use glow::HasContext;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{info, LevelFilter};
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, ElementState, Event, KeyEvent, MouseButton, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

use glimpse::config::{load_or_create_config, ViewerConfig};
use glimpse::rendering::camera::CameraMovement;
use glimpse::rendering::renderer::{RenderMode, Renderer};

const MOVEMENT_BINDINGS: [(KeyCode, CameraMovement); 6] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
    (KeyCode::Space, CameraMovement::Up),
    (KeyCode::ShiftLeft, CameraMovement::Down),
];

struct App {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    gl: Arc<glow::Context>,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_winit: egui_winit::State,
    painter: egui_glow::Painter,
    pressed_keys: HashSet<KeyCode>,
    looking: bool,
    model_path_input: String,
    last_frame: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<()>, config: &ViewerConfig) -> Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_depth_size(24);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap()
            })
            .map_err(|e| anyhow::anyhow!("failed to create window: {e}"))?;

        let window = window.expect("display builder was given a window builder");
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        let gl_context = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .map_err(|e| anyhow::anyhow!("failed to create OpenGL context: {e}"))?
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .map_err(|e| anyhow::anyhow!("failed to create GL surface: {e}"))?
        };

        let gl_context = gl_context
            .make_current(&gl_surface)
            .map_err(|e| anyhow::anyhow!("failed to make context current: {e}"))?;

        let swap_interval = if config.window.vsync {
            SwapInterval::Wait(NonZeroU32::new(1).unwrap())
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = gl_surface.set_swap_interval(&gl_context, swap_interval) {
            log::warn!("failed to set swap interval: {e}");
        }

        let gl = Arc::new(unsafe {
            glow::Context::from_loader_function(|symbol| {
                let symbol = CString::new(symbol).unwrap();
                gl_display.get_proc_address(symbol.as_c_str())
            })
        });

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            let [r, g, b] = config.rendering.clear_color;
            gl.clear_color(r, g, b, 1.0);
        }

        let renderer = Renderer::new(gl.clone(), config)?;

        let egui_ctx = egui::Context::default();
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::from_hash_of(window.id()),
            event_loop,
            None,
            None,
        );
        let painter = egui_glow::Painter::new(gl.clone(), "", None)
            .map_err(|e| anyhow::anyhow!("failed to create egui painter: {e}"))?;

        Ok(Self {
            window,
            gl_context,
            gl_surface,
            gl,
            renderer,
            egui_ctx,
            egui_winit,
            painter,
            pressed_keys: HashSet::new(),
            looking: false,
            model_path_input: String::new(),
            last_frame: Instant::now(),
        })
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let width = size.width.max(1);
        let height = size.height.max(1);
        self.gl_surface.resize(
            &self.gl_context,
            NonZeroU32::new(width).unwrap(),
            NonZeroU32::new(height).unwrap(),
        );
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.renderer.set_resolution(width, height);
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.pressed_keys.insert(code),
            ElementState::Released => self.pressed_keys.remove(&code),
        };
    }

    fn apply_movement(&mut self, delta_time: f32) {
        for (key, direction) in MOVEMENT_BINDINGS {
            if self.pressed_keys.contains(&key) {
                self.renderer.move_camera(direction, delta_time);
            }
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.apply_movement(delta_time);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        self.egui_ctx.begin_frame(raw_input);
        self.show_panel();
        let full_output = self.egui_ctx.end_frame();
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        unsafe {
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        self.renderer.render();

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let size = self.window.inner_size();
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            full_output.pixels_per_point,
            &primitives,
            &full_output.textures_delta,
        );

        if let Err(e) = self.gl_surface.swap_buffers(&self.gl_context) {
            log::error!("failed to swap buffers: {e}");
        }
    }

    fn show_panel(&mut self) {
        let ctx = self.egui_ctx.clone();
        egui::Window::new("viewer").show(&ctx, |ui| {
            let mut fov = self.renderer.camera_fov();
            if ui
                .add(egui::Slider::new(&mut fov, 10.0..=120.0).text("FOV"))
                .changed()
            {
                self.renderer.set_camera_fov(fov);
            }

            let mut speed = self.renderer.camera_speed();
            if ui
                .add(egui::Slider::new(&mut speed, 0.1..=20.0).text("Movement speed"))
                .changed()
            {
                self.renderer.set_camera_speed(speed);
            }

            let mut mode = self.renderer.render_mode();
            egui::ComboBox::from_label("Render mode")
                .selected_text(mode.label())
                .show_ui(ui, |ui| {
                    for candidate in RenderMode::ALL {
                        if candidate == RenderMode::Custom && !self.renderer.has_custom_program() {
                            continue;
                        }
                        ui.selectable_value(&mut mode, candidate, candidate.label());
                    }
                });
            if mode != self.renderer.render_mode() {
                self.renderer.set_render_mode(mode);
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Model");
                ui.text_edit_singleline(&mut self.model_path_input);
            });
            if ui.button("Load").clicked() {
                let path = PathBuf::from(self.model_path_input.trim());
                if let Err(e) = self.renderer.load_model(&path) {
                    log::error!("failed to load {}: {}", path.display(), e);
                }
            }

            ui.separator();
            let stats = self.renderer.model_stats();
            ui.label(format!("meshes: {}", stats.meshes));
            ui.label(format!("vertices: {}", stats.vertices));
            ui.label(format!("triangles: {}", stats.triangles));
            ui.label(format!("textures: {}", stats.textures));
        });
    }

    fn destroy(&mut self) {
        self.painter.destroy();
    }
}

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).init()?;

    let config = load_or_create_config()?;
    let event_loop = EventLoop::new()?;
    let mut app = App::new(&event_loop, &config)?;

    // The configured size is logical; the surface is physical.
    let size = app.window.inner_size();
    app.handle_resize(size);

    let initial_model = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.assets.model_path.clone());
    if let Some(path) = initial_model {
        app.model_path_input = path.display().to_string();
        app.renderer.load_model(&path)?;
    } else {
        info!("no model given; pass a path or set assets.model_path in the config");
    }

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => {
            let response = app.egui_winit.on_window_event(&app.window, &event);
            if response.repaint {
                app.window.request_redraw();
            }

            match event {
                WindowEvent::CloseRequested => {
                    app.destroy();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => app.handle_resize(size),
                WindowEvent::RedrawRequested => app.redraw(),
                WindowEvent::KeyboardInput { event, .. } if !response.consumed => {
                    if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                        app.destroy();
                        elwt.exit();
                    } else {
                        app.handle_key(&event);
                    }
                }
                WindowEvent::MouseInput { button, state, .. } if !response.consumed => {
                    if button == MouseButton::Right {
                        app.looking = state == ElementState::Pressed;
                    }
                }
                _ => {}
            }
        }
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => {
            if app.looking {
                app.renderer
                    .look_around_camera(delta.0 as f32, -delta.1 as f32);
            }
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
