//! Main application UI and state management.
//! Handles deck management, the simulated review clock and review sessions.

use danish_flashcards::config::GradingMode;
use danish_flashcards::database::{ProgressStore, SqliteProgressStore, db};
use danish_flashcards::error::{Error, Result};
use danish_flashcards::export::json::{export_json_to_path, export_progress_to_path, import_json};
use danish_flashcards::models::sm2::{self, format_interval, preview_interval};
use danish_flashcards::models::{
    Deck, ProgressRecord, Quality, Rating, ReviewSession, ReviewableItem, Timestamp,
};
use eframe::egui;
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Review,
}

/// Main screen actions, applied after rendering to avoid borrowing conflicts
enum MainAction {
    NextDay,
    ShowExportDialog,
    Import,
    ExportProgress,
    CreateDeck,
    SelectDeck(usize),
    StartReview(usize),
    AddCard(usize),
}

const SCALE_LABELS: [&str; 6] = [
    "0 - Blackout",
    "1 - Wrong",
    "2 - Wrong (familiar)",
    "3 - Difficult",
    "4 - Correct",
    "5 - Perfect",
];

/// Main application state
pub struct FlashcardsApp {
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    decks: Vec<Deck>,
    due_counts: Vec<usize>,
    selected_deck_index: Option<usize>,
    new_deck_name: String,
    current_front: String,
    current_back: String,
    current_example: String,
    conn: Arc<Mutex<Connection>>,
    store: SqliteProgressStore,
    grading_mode: GradingMode,

    current_screen: AppScreen,
    review_session: Option<ReviewSession<SqliteProgressStore>>,

    current_time: Timestamp,
    reviews_today: u32,

    show_export_dialog: bool,
    show_message_dialog: bool,
    message: String,
}

impl eframe::App for FlashcardsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Review => self.render_review_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            let mut export_deck_index: Option<usize> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for (i, deck) in self.decks.iter().enumerate() {
                        if ui
                            .button(format!("{} ({} cards)", deck.name, deck.items.len()))
                            .clicked()
                        {
                            export_deck_index = Some(i);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(i) = export_deck_index {
                self.handle_export(i);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_message_dialog {
            egui::Window::new("Flashcards")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_message_dialog = false;
                    }
                });
        }
    }
}

impl FlashcardsApp {
    /// Creates the application over an open database
    pub fn new(conn: Arc<Mutex<Connection>>, grading_mode: GradingMode) -> Self {
        let store = SqliteProgressStore::new(Arc::clone(&conn));
        let mut app = Self {
            show_confirmation_dialog: false,
            allowed_to_close: false,
            decks: Vec::new(),
            due_counts: Vec::new(),
            selected_deck_index: None,
            new_deck_name: String::new(),
            current_front: String::new(),
            current_back: String::new(),
            current_example: String::new(),
            conn,
            store,
            grading_mode,
            current_screen: AppScreen::Main,
            review_session: None,
            current_time: sm2::now_millis(),
            reviews_today: 0,
            show_export_dialog: false,
            show_message_dialog: false,
            message: String::new(),
        };
        app.refresh();
        if !app.decks.is_empty() {
            app.selected_deck_index = Some(0);
        }
        app
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        f(&conn)
    }

    fn show_message(&mut self, message: String) {
        self.message = message;
        self.show_message_dialog = true;
    }

    fn show_error(&mut self, context: &str, error: Error) {
        warn!("{}: {}", context, error);
        self.show_message(format!("{}: {}", context, error));
    }

    /// Reloads decks, clock, counters and due counts from the database
    fn refresh(&mut self) {
        let loaded = self.with_conn(|conn| {
            let now = db::current_time(conn)?;
            Ok((db::load_all_decks(conn)?, now, db::reviews_today(now, conn)?))
        });
        let (decks, now, reviews_today) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return self.show_error("Failed to load decks", e),
        };

        let progress = match self.store.load_all() {
            Ok(progress) => progress,
            Err(e) => return self.show_error("Failed to load progress", e),
        };

        self.due_counts = decks
            .iter()
            .map(|deck| sm2::select_due(&deck.items, &progress, now).len())
            .collect();
        self.decks = decks;
        self.current_time = now;
        self.reviews_today = reviews_today;
    }

    /// Renders the main screen with deck management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        let mut action: Option<MainAction> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(db::format_day(self.current_time));
                if ui.button("Next Day").clicked() {
                    action = Some(MainAction::NextDay);
                }
                ui.label(format!("Reviews today: {}", self.reviews_today));
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    action = Some(MainAction::ShowExportDialog);
                }
                if ui.button("Import Deck").clicked() {
                    action = Some(MainAction::Import);
                }
                if ui.button("Export Progress").clicked() {
                    action = Some(MainAction::ExportProgress);
                }
            });

            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Deck name:");
                ui.text_edit_singleline(&mut self.new_deck_name);
                if ui.button("Create Deck").clicked() && !self.new_deck_name.trim().is_empty() {
                    action = Some(MainAction::CreateDeck);
                }
            });

            ui.separator();

            ui.heading(format!("Decks ({})", self.decks.len()));

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(150.0)
                .show(ui, |ui| {
                    for (i, deck) in self.decks.iter().enumerate() {
                        let is_selected = self.selected_deck_index == Some(i);
                        let due = self.due_counts.get(i).copied().unwrap_or(0);

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!(
                                        "{}. {} ({} cards, {} due)",
                                        i + 1,
                                        deck.name,
                                        deck.items.len(),
                                        due
                                    ),
                                )
                                .clicked()
                            {
                                action = Some(MainAction::SelectDeck(i));
                            }

                            if ui.add_enabled(due > 0, egui::Button::new("Review")).clicked() {
                                action = Some(MainAction::StartReview(i));
                            }
                        });
                    }
                });

            ui.separator();

            // Card management for selected deck
            match self.selected_deck_index.and_then(|i| self.decks.get(i).map(|d| (i, d))) {
                Some((deck_index, deck)) => {
                    ui.heading(format!("Selected Deck: {}", deck.name));

                    ui.horizontal(|ui| {
                        ui.label("Front:");
                        ui.text_edit_singleline(&mut self.current_front);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Back:");
                        ui.text_edit_singleline(&mut self.current_back);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Example:");
                        ui.text_edit_singleline(&mut self.current_example);
                    });
                    if ui.button("Add Card").clicked()
                        && !self.current_front.trim().is_empty()
                        && !self.current_back.trim().is_empty()
                    {
                        action = Some(MainAction::AddCard(deck_index));
                    }

                    ui.separator();

                    ui.heading(format!("Cards ({})", deck.items.len()));

                    egui::ScrollArea::vertical()
                        .id_source("cards_list")
                        .max_height(200.0)
                        .show(ui, |ui| {
                            for (i, item) in deck.items.iter().enumerate() {
                                ui.group(|ui| {
                                    ui.label(format!("{}. {}", i + 1, item.front));
                                    ui.label(format!("   {}", item.back));
                                    if let Some(example) = &item.example {
                                        ui.label(format!("   \"{}\"", example));
                                    }
                                });
                            }
                        });
                }
                None => {
                    ui.label("Select a deck to add cards");
                }
            }
        });

        match action {
            Some(MainAction::NextDay) => self.advance_day(),
            Some(MainAction::ShowExportDialog) => self.show_export_dialog = true,
            Some(MainAction::Import) => self.handle_import(),
            Some(MainAction::ExportProgress) => self.handle_export_progress(),
            Some(MainAction::CreateDeck) => self.create_deck(),
            Some(MainAction::SelectDeck(i)) => self.selected_deck_index = Some(i),
            Some(MainAction::StartReview(i)) => self.start_review_session(i),
            Some(MainAction::AddCard(i)) => self.add_card(i),
            None => {}
        }
    }

    /// Renders the review screen for the active session
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let mut action_reveal = false;
        let mut action_grade: Option<Quality> = None;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.review_session else {
                action_back = true;
                return;
            };

            ui.heading(format!("Review: {}", session.deck_name));
            ui.label(session.phase_message());
            ui.label(format!(
                "Card {} of {} • Reviews today: {}",
                session.position(),
                session.round_len(),
                self.reviews_today
            ));

            ui.add_space(20.0);

            if session.is_completed() {
                ui.heading("Well done!");
                ui.label(format!(
                    "You reviewed {} cards. Come back when more are due.",
                    session.reviewed_count()
                ));
            } else if let Some(card) = session.current_card() {
                let show_answer = session.show_answer;

                ui.group(|ui| {
                    ui.set_min_height(200.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.heading(&card.front);
                        ui.add_space(20.0);

                        if show_answer {
                            ui.label("Translation:");
                            ui.heading(&card.back);
                            if let Some(example) = &card.example {
                                ui.add_space(10.0);
                                ui.label("Example:");
                                ui.label(example);
                            }
                        } else {
                            ui.label("(Click 'Show answer' to reveal)");
                        }

                        ui.add_space(20.0);
                    });
                });

                ui.add_space(20.0);

                if !show_answer {
                    if ui.button("Show answer").clicked() {
                        action_reveal = true;
                    }
                } else {
                    let progress = session.current_progress(self.current_time).ok().flatten();
                    ui.label("Rate your response:");
                    action_grade = match self.grading_mode {
                        GradingMode::Scale => scale_buttons(ui, progress.as_ref()),
                        GradingMode::ThreeButton => rating_buttons(ui, progress.as_ref()),
                    };
                }
            }

            ui.add_space(20.0);

            if ui.button("Back to Main Screen").clicked() {
                action_back = true;
            }
        });

        if action_reveal {
            if let Some(session) = self.review_session.as_mut() {
                session.reveal_answer();
            }
        }
        if let Some(quality) = action_grade {
            self.grade_current_card(quality);
        }
        if action_back {
            self.current_screen = AppScreen::Main;
            self.review_session = None;
            self.refresh();
        }
    }

    /// Starts a review session with the deck's due cards
    fn start_review_session(&mut self, deck_index: usize) {
        let Some(deck) = self.decks.get(deck_index) else {
            return;
        };
        match ReviewSession::new(deck, self.store.clone(), self.current_time) {
            Ok(session) if session.is_completed() => self.show_message(format!(
                "No cards due in '{}'. Press 'Next Day' or come back later.",
                session.deck_name
            )),
            Ok(session) => {
                self.review_session = Some(session);
                self.current_screen = AppScreen::Review;
            }
            Err(e) => self.show_error("Failed to start review", e),
        }
    }

    fn grade_current_card(&mut self, quality: Quality) {
        let now = self.current_time;
        let Some(session) = self.review_session.as_mut() else {
            return;
        };
        if let Err(e) = session.grade_current_card(quality, now) {
            return self.show_error("Failed to save review", e);
        }
        match self.with_conn(|conn| db::record_review_today(now, conn)) {
            Ok(count) => self.reviews_today = count,
            Err(e) => self.show_error("Failed to update review counter", e),
        }
    }

    fn advance_day(&mut self) {
        match self.with_conn(db::advance_day) {
            Ok(_) => self.refresh(),
            Err(e) => self.show_error("Failed to advance the day", e),
        }
    }

    fn create_deck(&mut self) {
        let name = self.new_deck_name.trim().to_string();
        match self.with_conn(|conn| db::new_deck(&name, conn)) {
            Ok(()) => {
                self.new_deck_name.clear();
                self.refresh();
                self.selected_deck_index = self.decks.iter().position(|d| d.name == name);
            }
            Err(e) => self.show_error("Failed to create deck", e),
        }
    }

    fn add_card(&mut self, deck_index: usize) {
        let Some(deck_name) = self.decks.get(deck_index).map(|d| d.name.clone()) else {
            return;
        };
        let example = self.current_example.trim();
        let item = ReviewableItem::vocabulary(
            self.current_front.trim(),
            self.current_back.trim(),
            (!example.is_empty()).then_some(example),
        );
        match self.with_conn(|conn| db::add_item(&deck_name, &item, conn)) {
            Ok(()) => {
                self.current_front.clear();
                self.current_back.clear();
                self.current_example.clear();
                self.refresh();
            }
            Err(e) => self.show_error("Failed to add card", e),
        }
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_index: usize) {
        self.show_export_dialog = false;
        let Some(deck) = self.decks.get(deck_index) else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", deck.name))
            .add_filter("JSON files", &["json"])
            .save_file()
        else {
            return;
        };

        let message = match export_json_to_path(deck, &path) {
            Ok(()) => format!("Deck '{}' exported successfully!", deck.name),
            Err(e) => {
                warn!("Export failed: {}", e);
                format!("Export failed: {}", e)
            }
        };
        self.show_message(message);
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        let deck = match import_json(&path) {
            Ok(deck) => deck,
            Err(e) => {
                return self.show_error(
                    "Import failed (expected {\"name\": ..., \"items\": [...]})",
                    e,
                );
            }
        };

        match self.with_conn(|conn| db::import_deck(&deck, conn)) {
            Ok(()) => {
                self.refresh();
                self.show_message(format!(
                    "Deck '{}' imported successfully with {} cards!",
                    deck.name,
                    deck.items.len()
                ));
            }
            Err(e) => self.show_error("Import failed", e),
        }
    }

    fn handle_export_progress(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("progress.json")
            .add_filter("JSON files", &["json"])
            .save_file()
        else {
            return;
        };

        let result = self
            .store
            .load_all()
            .and_then(|progress| export_progress_to_path(&progress, &path).map(|()| progress.len()));
        match result {
            Ok(count) => self.show_message(format!("Exported progress for {} cards.", count)),
            Err(e) => self.show_error("Progress export failed", e),
        }
    }
}

fn interval_hint(progress: Option<&ProgressRecord>, quality: Quality) -> String {
    progress
        .map(|p| format!(" ({})", format_interval(preview_interval(p, quality))))
        .unwrap_or_default()
}

/// Quality rating buttons (0-5)
fn scale_buttons(ui: &mut egui::Ui, progress: Option<&ProgressRecord>) -> Option<Quality> {
    let mut grade = None;
    for (row_index, labels) in SCALE_LABELS.chunks(3).enumerate() {
        ui.horizontal(|ui| {
            for (offset, label) in labels.iter().enumerate() {
                let quality = Quality::new((row_index * 3 + offset) as i32);
                if ui
                    .button(format!("{}{}", label, interval_hint(progress, quality)))
                    .clicked()
                {
                    grade = Some(quality);
                }
            }
        });
    }
    grade
}

/// Hard / Medium / Easy buttons
fn rating_buttons(ui: &mut egui::Ui, progress: Option<&ProgressRecord>) -> Option<Quality> {
    let mut grade = None;
    ui.horizontal(|ui| {
        for rating in Rating::ALL {
            let quality = rating.quality();
            if ui
                .button(format!("{}{}", rating.label(), interval_hint(progress, quality)))
                .clicked()
            {
                grade = Some(quality);
            }
        }
    });
    grade
}
