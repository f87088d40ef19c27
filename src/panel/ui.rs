use winit::window::Window;

use super::{ControlPanel, PanelAction, PANEL_MARGIN};
use crate::render::GpuState;

const BUTTON_SIZE: egui::Vec2 = egui::vec2(34.0, 34.0);

/// Output of one egui frame, ready for the GPU.
pub struct PanelFrame {
    pub primitives: Vec<egui::epaint::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
    pub actions: Vec<PanelAction>,
}

/// egui context, winit glue and wgpu renderer for the control panel.
pub struct PanelUi {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl PanelUi {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Run the egui frame for the panel and collect the buttons pressed.
    pub fn run_frame(
        &mut self,
        window: &Window,
        panel: &ControlPanel,
        screen_w: u32,
        screen_h: u32,
    ) -> PanelFrame {
        let raw_input = self.egui_state.take_egui_input(window);
        let mut actions = Vec::new();

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_panel(ctx, panel, &mut actions);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        PanelFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [screen_w, screen_h],
                pixels_per_point,
            },
            actions,
        }
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &PanelFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &frame.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.primitives,
            &frame.screen_descriptor,
        )
    }

    /// Render egui into the given render pass.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'static>, frame: &PanelFrame) {
        self.egui_renderer
            .render(render_pass, &frame.primitives, &frame.screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, frame: &PanelFrame) {
        for id in &frame.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn panel_button(ui: &mut egui::Ui, label: &str, hover: &str) -> egui::Response {
    ui.add(
        egui::Button::new(egui::RichText::new(label).size(18.0).color(egui::Color32::WHITE))
            .min_size(BUTTON_SIZE)
            .fill(egui::Color32::from_rgba_unmultiplied(60, 60, 60, 230))
            .corner_radius(6.0),
    )
    .on_hover_text(hover)
}

/// Whole wheel notches scrolled this frame; positive is up.
fn wheel_notches(ui: &egui::Ui) -> i8 {
    let dy = ui.input(|i| i.raw_scroll_delta.y);
    if dy > 0.0 {
        1
    } else if dy < 0.0 {
        -1
    } else {
        0
    }
}

fn draw_panel(ctx: &egui::Context, panel: &ControlPanel, actions: &mut Vec<PanelAction>) {
    let screen = ctx.content_rect().size();
    let rect = panel.rect(glam::Vec2::new(screen.x, screen.y));
    let max = rect.max();
    let outer = egui::Rect::from_min_max(egui::pos2(rect.min.x, rect.min.y), egui::pos2(max.x, max.y));
    let inner = panel.inner_size();
    let inner = egui::vec2(inner.x, inner.y);

    let frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 200))
        .corner_radius(8.0)
        .inner_margin(PANEL_MARGIN);

    egui::Area::new(egui::Id::new("control_panel"))
        .fixed_pos(outer.min)
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            frame.show(ui, |ui| {
                ui.set_min_size(inner);
                ui.set_max_size(inner);
                ui.horizontal(|ui| {
                    let (toggle, hint) = if panel.is_minimized() {
                        ("+", "Expand")
                    } else {
                        ("\u{2212}", "Minimize")
                    };
                    if panel_button(ui, toggle, hint).clicked() {
                        actions.push(PanelAction::ToggleMinimize);
                    }
                    if panel.is_minimized() {
                        return;
                    }

                    let (speaker, hint) = if panel.is_muted() {
                        ("\u{1F507}", "Unmute music (scroll for volume)")
                    } else {
                        ("\u{1F50A}", "Mute music (scroll for volume)")
                    };
                    let mute = panel_button(ui, speaker, hint);
                    if mute.clicked() {
                        actions.push(PanelAction::ToggleMute);
                    }
                    if mute.hovered() {
                        let steps = wheel_notches(ui);
                        if steps != 0 {
                            actions.push(PanelAction::AdjustVolume(steps));
                        }
                    }
                    if panel_button(ui, "\u{2715}", "Close").clicked() {
                        actions.push(PanelAction::Close);
                    }
                });
            });
        });
}
