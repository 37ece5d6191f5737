use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::data::dataset::Dataset;
use crate::data::loader::{self, LoadedTable};
use crate::data::remote::{HttpRegenerationClient, RegenerationClient, RegenerationRequest};
use crate::error::{ChartError, Result};
use crate::state::load_tracker::{Generation, LoadTracker, RequestQueue};
use crate::state::session::{ChartEvent, ChartSession, LoadMeta};
use crate::state::theme::Theme;
use crate::ui::chart_panel;
use crate::ui::controls_panel::{self, ControlsAction, FormState, ScaleControl};
use crate::ui::grid_panel;
use crate::ui::legend;
use crate::ui::toast::{ToastKind, Toasts};

/// Why a load was started; decides how its result is titled and reported.
#[derive(Debug, Clone)]
enum LoadKind {
    File,
    Url,
    Regeneration(RegenerationRequest),
}

/// A table fetched off the UI thread.
struct Fetched {
    table: LoadedTable,
    source: String,
    /// Name of the server-generated file, for regenerations.
    generated: Option<String>,
}

/// Pending async load result.
struct PendingLoad {
    generation: Generation,
    kind: LoadKind,
    result: Arc<Mutex<Option<Result<Fetched>>>>,
}

/// The main climcoords application.
pub struct ClimCoordsApp {
    config: AppConfig,
    theme: Theme,
    /// `None` until the first dataset loads.
    session: Option<ChartSession>,
    tracker: LoadTracker,
    queue: RequestQueue<RegenerationRequest>,
    client: Arc<dyn RegenerationClient>,
    pending: Vec<PendingLoad>,
    form: FormState,
    scale: ScaleControl,
    url_input: String,
    toasts: Toasts,
}

impl ClimCoordsApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::proportional(14.0),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::proportional(18.0),
        );
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.visuals.window_corner_radius = egui::CornerRadius::same(8);
        ctx.set_style(style);
        ctx.set_visuals(config.theme.visuals());

        let client: Arc<dyn RegenerationClient> = Arc::new(HttpRegenerationClient::new(
            &config.server_url,
            config.request_timeout(),
        ));

        let mut app = Self::with_client(config, client);
        if let Some(source) = app.config.default_dataset.clone() {
            app.open_source(&source);
        }
        app
    }

    fn with_client(config: AppConfig, client: Arc<dyn RegenerationClient>) -> Self {
        Self {
            theme: config.theme,
            form: FormState::new(&config.form),
            config,
            session: None,
            tracker: LoadTracker::new(),
            queue: RequestQueue::default(),
            client,
            pending: Vec::new(),
            scale: ScaleControl::default(),
            url_input: String::new(),
            toasts: Toasts::default(),
        }
    }

    /// Open a native file dialog and load the chosen file.
    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &["csv", "xls", "xlsx"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_path(&path);
        }
    }

    /// Load a path or an http(s) URL.
    fn open_source(&mut self, source: &str) {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            self.load_url(source);
        } else {
            self.load_path(Path::new(source));
        }
    }

    fn load_path(&mut self, path: &Path) {
        let generation = self.tracker.issue();
        let path_buf = path.to_path_buf();
        tracing::info!("Loading {:?} (generation {})", path_buf, generation.0);
        self.spawn(generation, LoadKind::File, move || {
            let table = loader::load_file(&path_buf)?;
            Ok(Fetched {
                table,
                source: path_buf.display().to_string(),
                generated: None,
            })
        });
    }

    fn load_url(&mut self, url: &str) {
        let generation = self.tracker.issue();
        let url = url.to_string();
        let timeout = self.config.request_timeout();
        tracing::info!("Fetching {url} (generation {})", generation.0);
        self.spawn(generation, LoadKind::Url, move || {
            let table = loader::fetch_csv(&url, timeout)?;
            Ok(Fetched {
                table,
                source: url,
                generated: None,
            })
        });
    }

    /// Queue a regeneration. At most one is in flight; a newer submission
    /// replaces one still waiting.
    fn submit_regeneration(&mut self, request: RegenerationRequest) {
        let generation = self.tracker.issue();
        match self.queue.submit(generation, request) {
            Some((generation, request)) => self.dispatch_regeneration(generation, request),
            None => tracing::info!("Regeneration {} queued behind the current request", generation.0),
        }
    }

    fn dispatch_regeneration(&mut self, generation: Generation, request: RegenerationRequest) {
        let client = Arc::clone(&self.client);
        let job_request = request.clone();
        self.spawn(generation, LoadKind::Regeneration(request), move || {
            let generated = client.regenerate(&job_request)?;
            Ok(Fetched {
                table: generated.table,
                source: generated.url,
                generated: Some(generated.file_name),
            })
        });
    }

    fn spawn<F>(&mut self, generation: Generation, kind: LoadKind, job: F)
    where
        F: FnOnce() -> Result<Fetched> + Send + 'static,
    {
        let result: Arc<Mutex<Option<Result<Fetched>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let fetched = job();
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(fetched);
            }
        });

        self.pending.push(PendingLoad {
            generation,
            kind,
            result,
        });
    }

    /// Move finished loads out of the pending list and apply them.
    fn poll_loads(&mut self) {
        for load in std::mem::take(&mut self.pending) {
            let done = load.result.lock().ok().and_then(|mut slot| slot.take());
            match done {
                Some(result) => self.finish_load(load.generation, load.kind, result),
                None => self.pending.push(load),
            }
        }
    }

    fn finish_load(&mut self, generation: Generation, kind: LoadKind, result: Result<Fetched>) {
        if matches!(kind, LoadKind::Regeneration(_)) {
            if let Some((next_generation, next)) = self.queue.settle(generation) {
                self.dispatch_regeneration(next_generation, next);
            }
        }

        if let Err(e) = self.tracker.accept(generation) {
            tracing::debug!("{e}; keeping {:?}", self.tracker.applied());
            return;
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                self.report(&kind, &e);
                return;
            }
        };

        let dataset = match Dataset::load(fetched.table.into_raw_rows(), &self.config.identifier_column) {
            Ok(dataset) => dataset,
            Err(e) => {
                self.report(&kind, &e);
                return;
            }
        };

        let title = match &kind {
            LoadKind::Regeneration(request) => request.plot_title(),
            LoadKind::File | LoadKind::Url => source_title(&fetched.source),
        };
        tracing::info!(
            "Loaded {} models x {} variables keyed by '{}' from {}",
            dataset.len(),
            dataset.variables().len(),
            dataset.identifier(),
            fetched.source
        );
        let meta = LoadMeta {
            source: fetched.source,
            title,
        };

        let session = match self.session.take() {
            Some(mut session) => {
                session.replace_dataset(dataset, meta, generation);
                session
            }
            None => ChartSession::new(
                dataset,
                meta,
                generation,
                egui::vec2(800.0, self.config.chart_height),
            ),
        };
        self.scale.reset(session.dataset().absolute_extent());
        tracing::debug!("Showing generation {}", session.generation().0);
        self.session = Some(session);

        if let Some(name) = fetched.generated {
            self.toasts.push(
                ToastKind::Success,
                format!("Created csv file for {name}"),
                self.config.toast_duration(),
            );
        }
    }

    fn report(&mut self, kind: &LoadKind, err: &ChartError) {
        if !err.is_user_visible() {
            return;
        }
        let message = match kind {
            LoadKind::Regeneration(_) => format!("Failed to regenerate: {err}"),
            LoadKind::File | LoadKind::Url => format!("Failed to load data: {err}"),
        };
        tracing::error!("{message}");
        self.toasts
            .push(ToastKind::Error, message, self.config.toast_duration());
    }

    fn is_regenerating(&self) -> bool {
        self.queue.is_busy()
    }
}

/// Title for a dataset loaded from a path or URL: its file name.
fn source_title(source: &str) -> String {
    let name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    if name.is_empty() {
        source.to_string()
    } else {
        name.to_string()
    }
}

/// The chart and grid each report hover changes on their own. A pointer that
/// moves from one to the other produces an end and a start in the same
/// frame; the start wins.
fn resolve_hover(events: Vec<ChartEvent>) -> Vec<ChartEvent> {
    let starts_hover = events
        .iter()
        .any(|e| matches!(e, ChartEvent::HoverRow(_) | ChartEvent::HoverSymbol(_)));
    if !starts_hover {
        return events;
    }
    events
        .into_iter()
        .filter(|e| !matches!(e, ChartEvent::HoverEnd))
        .collect()
}

impl eframe::App for ClimCoordsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ------------------------------------------------------------------
        // 1. Poll async loads
        // ------------------------------------------------------------------
        self.poll_loads();

        // ------------------------------------------------------------------
        // 2. Handle dropped files
        // ------------------------------------------------------------------
        let mut dropped_paths: Vec<PathBuf> = Vec::new();
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    dropped_paths.push(path.clone());
                }
            }
        });
        // Only the newest load is ever applied.
        if let Some(path) = dropped_paths.last() {
            self.load_path(path);
        }

        // ------------------------------------------------------------------
        // 3. Header
        // ------------------------------------------------------------------
        let mut open_file = false;
        let mut open_url = false;
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("climcoords");
                    ui.separator();

                    if ui.button("Open File").clicked() {
                        open_file = true;
                    }
                    let url_edit = ui.add(
                        egui::TextEdit::singleline(&mut self.url_input)
                            .hint_text("https://.../file.csv")
                            .desired_width(280.0),
                    );
                    let entered = url_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Open URL").clicked() || entered {
                        open_url = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.theme = self.theme.toggle();
                            ctx.set_visuals(self.theme.visuals());
                            tracing::info!("Switched to {} theme", self.theme.label());
                        }
                        if let Some(session) = &self.session {
                            ui.separator();
                            ui.label(egui::RichText::new(&session.meta().source).weak());
                        }
                    });
                });
            });

        if open_file {
            self.open_file_dialog();
        }
        if open_url && !self.url_input.trim().is_empty() {
            let url = self.url_input.trim().to_string();
            self.load_url(&url);
        }

        // ------------------------------------------------------------------
        // 4. Side panel: regeneration form, scale control, legend
        // ------------------------------------------------------------------
        let busy = self.is_regenerating();
        let mut action = None;
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = controls_panel::show_controls(
                        &mut self.form,
                        &mut self.scale,
                        &self.config.form,
                        busy,
                        ui,
                    );
                    if let Some(session) = &self.session {
                        ui.separator();
                        legend::show_legend(session, ui, &self.theme, self.config.symbol_size);
                    }
                });
            });

        match action {
            Some(ControlsAction::Regenerate(request)) => self.submit_regeneration(request),
            Some(ControlsAction::ApplyScale { low, high }) => {
                if let Some(session) = &mut self.session {
                    session.set_custom_scale(low, high);
                }
            }
            Some(ControlsAction::ResetScale) => {
                if let Some(session) = &mut self.session {
                    session.reset_scale();
                }
            }
            None => {}
        }

        // ------------------------------------------------------------------
        // 5. Chart and grid
        // ------------------------------------------------------------------
        let mut events: Vec<ChartEvent> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &mut self.session else {
                ui.add_space(40.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("No data loaded").strong().size(16.0));
                    ui.add_space(6.0);
                    ui.label(
                        egui::RichText::new(
                            "Open a CSV or Excel file, enter a URL, drag-and-drop a file, or submit the form.",
                        )
                        .weak(),
                    );
                });
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                let title = session.meta().title.clone();
                events.extend(chart_panel::show_chart(
                    session,
                    ui,
                    &self.theme,
                    &title,
                    self.config.chart_height,
                    self.config.symbol_size,
                ));
                ui.separator();
                events.extend(grid_panel::show_grid(session, ui, &self.theme));
            });
        });

        if let Some(session) = &mut self.session {
            for event in resolve_hover(events) {
                session.dispatch(event);
            }
        }

        // ------------------------------------------------------------------
        // 6. Loading indicator and toasts
        // ------------------------------------------------------------------
        if !self.pending.is_empty() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        let label = match (busy, self.queue.has_waiting()) {
                            (true, true) => "Regenerating (1 queued)...",
                            (true, false) => "Regenerating...",
                            _ => "Loading data...",
                        };
                        ui.label(label);
                    });
                });
            ctx.request_repaint();
        }

        self.toasts.show(ctx);
    }
}
