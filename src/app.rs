use std::path::{Path, PathBuf};

use eframe::egui::{self, Sense, TextureHandle, TextureOptions, ViewportCommand};

use crate::cache::ImageCache;
use crate::controller::{
    DisplayRequest, ScrollDirection, ViewerController, ViewerEvent, ViewerState,
};
use crate::index::ParameterIndex;
use crate::renderer::{fit_size, render_rgba};

pub const APP_TITLE: &str = "ndplot";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const SIDE_PANEL_WIDTH: f32 = 280.0;

const AXIS_KEYS: [(egui::Key, u8); 9] = [
    (egui::Key::Num1, 1),
    (egui::Key::Num2, 2),
    (egui::Key::Num3, 3),
    (egui::Key::Num4, 4),
    (egui::Key::Num5, 5),
    (egui::Key::Num6, 6),
    (egui::Key::Num7, 7),
    (egui::Key::Num8, 8),
    (egui::Key::Num9, 9),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisWidget {
    value: f64,
    active: bool,
}

pub struct NdPlotApp {
    controller: ViewerController,
    axis_widgets: Vec<AxisWidget>,
    texture: Option<TextureHandle>,
    displayed_path: Option<PathBuf>,
    pending_requests: Vec<DisplayRequest>,
    status_line: String,
    scroll_accum: f32,
}

impl NdPlotApp {
    pub fn new(index: ParameterIndex) -> Self {
        let mut app = Self {
            controller: ViewerController::new(index, ImageCache::default()),
            axis_widgets: Vec::new(),
            texture: None,
            displayed_path: None,
            pending_requests: Vec::new(),
            status_line: String::new(),
            scroll_accum: 0.0,
        };
        app.start_session();
        app
    }

    fn start_session(&mut self) {
        self.axis_widgets = axis_widgets_for(self.controller.state());
        self.texture = None;
        self.displayed_path = None;
        self.scroll_accum = 0.0;
        match self.controller.initial_requests() {
            Ok(requests) => self.pending_requests = requests,
            Err(err) => self.report_error(err),
        }
    }

    fn report_error(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.status_line = format!("{err:#}");
    }

    fn open_directory(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .set_directory(self.controller.index().directory())
            .pick_folder();
        let Some(directory) = picked else {
            return;
        };

        match ParameterIndex::build(&directory) {
            Ok(index) => {
                self.controller = ViewerController::new(index, ImageCache::default());
                self.status_line.clear();
                self.start_session();
                ctx.send_viewport_cmd(ViewportCommand::Title(window_title(&directory)));
            }
            Err(err) => self.report_error(err.into()),
        }
    }

    fn dispatch(&mut self, event: ViewerEvent, ctx: &egui::Context) {
        match self.controller.handle(event) {
            Ok(requests) => self.apply_requests(requests, ctx),
            Err(err) => {
                // A slider may already show the value that failed to load.
                self.axis_widgets = axis_widgets_for(self.controller.state());
                self.report_error(err);
            }
        }
    }

    fn apply_requests(&mut self, requests: Vec<DisplayRequest>, ctx: &egui::Context) {
        for request in requests {
            match request {
                DisplayRequest::ShowImage { path, image } => {
                    let color_image = render_rgba(&image);
                    if let Some(texture) = self.texture.as_mut() {
                        texture.set(color_image, TextureOptions::LINEAR);
                    } else {
                        self.texture =
                            Some(ctx.load_texture("figure", color_image, TextureOptions::LINEAR));
                    }
                    self.displayed_path = Some(path);
                    self.status_line.clear();
                }
                DisplayRequest::SetAxisWidget {
                    axis,
                    value,
                    active,
                } => {
                    if active {
                        for widget in self.axis_widgets.iter_mut() {
                            widget.active = false;
                        }
                    }
                    if let Some(widget) = self.axis_widgets.get_mut(axis) {
                        widget.value = value;
                        widget.active = active;
                    }
                }
            }
        }
        ctx.request_repaint();
    }

    fn show_axis_panel(&mut self, ui: &mut egui::Ui, events: &mut Vec<ViewerEvent>) {
        let index = self.controller.index();
        ui.heading(
            index
                .directory()
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(APP_TITLE),
        );
        ui.label(format!("{} figure(s)", index.len()));
        ui.separator();

        for (axis, (name, range)) in index.names().iter().zip(index.ranges()).enumerate() {
            let Some(widget) = self.axis_widgets.get_mut(axis) else {
                continue;
            };
            let mut label = egui::RichText::new(format!("{}  {name}", axis + 1));
            if widget.active {
                label = label.strong().color(ui.visuals().strong_text_color());
            }
            ui.label(label);

            let mut value = widget.value;
            let response = ui.add_enabled(
                !range.is_fixed(),
                egui::Slider::new(&mut value, range.min()..=range.max()),
            );
            if response.changed() {
                widget.value = value;
                events.push(ViewerEvent::SetAxisValue { axis, value });
            }
            ui.add_space(4.0);
        }

        ui.separator();
        let state = self.controller.state();
        ui.label(format!("Coordinate {}", state.coordinate));
        if state.missing {
            ui.colored_label(egui::Color32::YELLOW, "No figure for this coordinate.");
        }
        if let Some(path) = self.displayed_path.as_deref() {
            ui.label(display_name(path));
        }
        if !self.status_line.is_empty() {
            ui.colored_label(egui::Color32::LIGHT_RED, &self.status_line);
        }
        ui.add_space(8.0);
        ui.small("Scroll over the figure to step the highlighted axis. Keys 1-9 select an axis.");
    }

    fn show_figure(&mut self, ui: &mut egui::Ui, events: &mut Vec<ViewerEvent>) {
        let (canvas_rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::hover());

        if response.hovered() {
            let (raw_scroll, smooth_scroll) =
                ui.input(|input| (input.raw_scroll_delta, input.smooth_scroll_delta));
            let scroll = dominant_scroll_axis(raw_scroll, smooth_scroll);
            let steps = step_from_scroll(&mut self.scroll_accum, scroll);
            let direction = if steps > 0 {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            for _ in 0..steps.unsigned_abs() {
                events.push(ViewerEvent::Step(direction));
            }
        }

        let Some(texture) = self.texture.as_ref() else {
            ui.painter().text(
                canvas_rect.center(),
                egui::Align2::CENTER_CENTER,
                "No figure loaded",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        let [width, height] = fit_size(texture.size(), [canvas_rect.width(), canvas_rect.height()]);
        let image_rect = egui::Rect::from_center_size(canvas_rect.center(), egui::vec2(width, height));
        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }
}

impl eframe::App for NdPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.pending_requests.is_empty() {
            let requests = std::mem::take(&mut self.pending_requests);
            self.apply_requests(requests, ctx);
        }

        let mut events = Vec::new();
        let mut close_requested = false;
        ctx.input_mut(|input| {
            if input.consume_key(egui::Modifiers::COMMAND, egui::Key::W) {
                close_requested = true;
            }
            for (key, digit) in AXIS_KEYS {
                if input.consume_key(egui::Modifiers::NONE, key) {
                    events.extend(ViewerEvent::from_digit_key(digit));
                }
            }
        });
        if close_requested {
            ctx.send_viewport_cmd(ViewportCommand::Close);
            return;
        }

        let mut open_directory_clicked = false;
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open directory…").clicked() {
                        open_directory_clicked = true;
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(ViewportCommand::Close);
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!("{APP_TITLE} v{APP_VERSION}"));
                });
            });
        });

        egui::SidePanel::left("axes")
            .resizable(true)
            .default_width(SIDE_PANEL_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.show_axis_panel(ui, &mut events);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                self.show_figure(ui, &mut events);
            });

        for event in events {
            self.dispatch(event, ctx);
        }

        if open_directory_clicked {
            self.open_directory(ctx);
        }
    }
}

fn axis_widgets_for(state: &ViewerState) -> Vec<AxisWidget> {
    state
        .widget_values
        .iter()
        .enumerate()
        .map(|(axis, &value)| AxisWidget {
            value,
            active: axis == state.active_axis,
        })
        .collect()
}

pub fn window_title(directory: &Path) -> String {
    format!("{APP_TITLE} - {}", directory.display())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn dominant_scroll_axis(raw_scroll: egui::Vec2, smooth_scroll: egui::Vec2) -> f32 {
    let pick = |delta: egui::Vec2| {
        if delta.y.abs() >= delta.x.abs() {
            delta.y
        } else {
            delta.x
        }
    };

    if smooth_scroll != egui::Vec2::ZERO {
        pick(smooth_scroll)
    } else {
        pick(raw_scroll)
    }
}

/// Whole steps contained in the accumulated wheel delta; positive is up.
fn step_from_scroll(scroll_accum: &mut f32, scroll: f32) -> i32 {
    const DEAD_ZONE: f32 = 0.5;
    const PIXELS_PER_STEP: f32 = 30.0;

    if scroll.abs() <= DEAD_ZONE {
        return 0;
    }

    // Reset stale residuals when the user reverses scroll direction.
    if *scroll_accum != 0.0 && scroll.signum() != scroll_accum.signum() {
        *scroll_accum = 0.0;
    }
    *scroll_accum += scroll;

    let steps = (*scroll_accum / PIXELS_PER_STEP).trunc() as i32;
    *scroll_accum -= steps as f32 * PIXELS_PER_STEP;
    steps
}
