use chrono::Local;
use eframe::egui::{self, pos2, Align2, Color32, CornerRadius, FontId, RichText, Sense, Stroke, Vec2};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::db::Database;
use crate::dialogs::{Dialog, Outcome};
use crate::error::{AppError, AppResult};
use crate::forms::{income_text, parse_income, ExpenseForm, SheetForm};
use crate::graph::{ChartScale, GraphWindow};
use crate::models::{format_money, Balance};
use crate::screen::Screen;
use crate::state::{Command, ViewState};
use crate::theme::{LayoutConfig, Theme};

/// 一帧内收集到的用户操作，绘制结束后统一处理
enum Action {
    Open(i64),
    OpenGraph,
    Back,
    ShowDialog(Dialog),
    Run(Command, String),
}

pub struct App {
    state: ViewState,
    settings: Settings,
    screen: Screen,
    dialog: Option<Dialog>,

    // 详情页收入输入框
    income_input: String,
    income_error: Option<String>,

    message: String,
    message_is_error: bool,
    message_timer: f32,
}

impl App {
    pub fn new(settings: Settings) -> AppResult<Self> {
        let db = Database::open(&settings.database_path())?;
        let state = ViewState::load(db)?;
        info!(sheets = state.sheets().len(), "loaded expense sheets");
        Ok(Self {
            state,
            settings,
            screen: Screen::default(),
            dialog: None,
            income_input: String::new(),
            income_error: None,
            message: String::new(),
            message_is_error: false,
            message_timer: 0.0,
        })
    }

    fn show_message(&mut self, msg: &str, is_error: bool) {
        self.message = msg.to_string();
        self.message_is_error = is_error;
        self.message_timer = 3.0;
    }

    /// 存储层失败不重试，只提示
    fn fail(&mut self, what: &str, err: AppError) {
        if err.is_validation() {
            warn!(error = %err, "{}", what);
        } else {
            error!(error = %err, "{}", what);
        }
        self.show_message(&format!("{}: {}", what, err), true);
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::Open(id) => match self.state.select_sheet(id) {
                Ok(()) => {
                    self.income_input = self
                        .state
                        .sheet(id)
                        .map(|s| income_text(s.income))
                        .unwrap_or_default();
                    self.income_error = None;
                    self.screen = std::mem::take(&mut self.screen)
                        .select(id)
                        .reconcile(&self.state);
                }
                Err(e) => self.fail("Could not open sheet", e),
            },
            Action::OpenGraph => match self.state.preload_all() {
                Ok(()) => {
                    self.screen = std::mem::take(&mut self.screen).open_graph(
                        self.state.sheets().len(),
                        self.settings.graph_window,
                        self.settings.drag_threshold,
                    );
                }
                Err(e) => self.fail("Could not load expenses", e),
            },
            Action::Back => self.screen = std::mem::take(&mut self.screen).back(),
            Action::ShowDialog(dialog) => self.dialog = Some(dialog),
            Action::Run(command, msg) => {
                match self.state.apply(command) {
                    Ok(_) => self.show_message(&msg, false),
                    Err(e) if e.is_foreign_key() => self.fail("Sheet no longer exists", e),
                    Err(e) => self.fail("Could not save changes", e),
                }
                self.screen = std::mem::take(&mut self.screen).reconcile(&self.state);
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 消息计时器
        if self.message_timer > 0.0 {
            self.message_timer -= ctx.input(|i| i.unstable_dt);
            if self.message_timer <= 0.0 {
                self.message.clear();
            }
            ctx.request_repaint();
        }

        let theme = Theme::default();
        let layout = LayoutConfig::default();
        theme.apply(ctx);

        let mut actions: Vec<Action> = Vec::new();
        let enabled = self.dialog.is_none();

        // ===== 底部状态栏 =====
        egui::TopBottomPanel::bottom("status_panel")
            .frame(egui::Frame::default().fill(theme.bg_color).inner_margin(egui::Margin::symmetric(
                layout.panel_margin as i8,
                10,
            )))
            .show(ctx, |ui| {
                ui.set_min_height(20.0);
                if !self.message.is_empty() {
                    let color = if self.message_is_error { theme.danger_color } else { theme.green_color };
                    ui.label(RichText::new(&self.message).size(14.0).color(color));
                }
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(theme.bg_color)
                    .inner_margin(egui::Margin::same(layout.panel_margin as i8)),
            )
            .show(ctx, |ui| {
                // 固定内容宽度，居中显示
                let available = ui.available_width();
                let content_width = layout.content_width.min(available);
                let side_margin = ((available - content_width) / 2.0).max(0.0);

                ui.horizontal(|ui| {
                    ui.add_space(side_margin);
                    ui.vertical(|ui| {
                        ui.set_width(content_width);
                        ui.add_enabled_ui(enabled, |ui| match &mut self.screen {
                            Screen::SheetList => {
                                sheet_list_view(ui, &self.state, &self.settings, &theme, &layout, &mut actions)
                            }
                            Screen::SheetDetail { sheet_id } => detail_view(
                                ui,
                                &self.state,
                                *sheet_id,
                                &mut self.income_input,
                                &mut self.income_error,
                                &self.settings,
                                &theme,
                                &layout,
                                &mut actions,
                            ),
                            Screen::Graph(window) => {
                                graph_view(ui, &self.state, window, &theme, &mut actions)
                            }
                        });
                    });
                });
            });

        if let Some(dialog) = self.dialog.as_mut() {
            match dialog.show(ctx, &theme, &self.settings.currency_symbol) {
                Outcome::Open => {}
                Outcome::Cancel => self.dialog = None,
                Outcome::Submit(command, msg) => {
                    self.dialog = None;
                    actions.push(Action::Run(command, msg));
                }
            }
        }

        for action in actions {
            self.handle(action);
        }
    }
}

fn card(theme: &Theme, layout: &LayoutConfig) -> egui::Frame {
    egui::Frame::default()
        .fill(theme.card_color)
        .corner_radius(CornerRadius::same(layout.card_rounding as u8))
        .inner_margin(egui::Margin::same(layout.card_inner_margin as i8))
}

fn filled_button(text: &str, fill: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(13.0).color(Color32::WHITE))
        .fill(fill)
        .corner_radius(CornerRadius::same(6))
}

fn outline_button(text: &str, color: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).size(12.0).color(color))
        .fill(Color32::TRANSPARENT)
        .stroke(Stroke::new(1.0, color))
        .corner_radius(CornerRadius::same(5))
        .min_size(Vec2::new(52.0, 26.0))
}

fn header(ui: &mut egui::Ui, theme: &Theme, title: &str, size: f32) {
    ui.label(RichText::new(title).font(FontId::proportional(size)).color(theme.text_primary));
}

// ===== 账单列表 =====
fn sheet_list_view(
    ui: &mut egui::Ui,
    state: &ViewState,
    settings: &Settings,
    theme: &Theme,
    layout: &LayoutConfig,
    actions: &mut Vec<Action>,
) {
    let symbol = settings.currency_symbol.as_str();

    ui.horizontal(|ui| {
        header(ui, theme, "Expense Sheets", 28.0);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_sized([72.0, 30.0], filled_button("+ Sheet", theme.green_color)).clicked() {
                let form = SheetForm::for_today(Local::now().date_naive());
                actions.push(Action::ShowDialog(Dialog::AddSheet(form)));
            }
            if ui.add_sized([72.0, 30.0], filled_button("Graph", theme.accent_color)).clicked() {
                actions.push(Action::OpenGraph);
            }
        });
    });
    ui.add_space(20.0);

    if state.sheets().is_empty() {
        ui.add_space(80.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No sheets yet.").color(theme.text_secondary).size(17.0));
            ui.add_space(8.0);
            ui.label(RichText::new("Click + Sheet to add one.").color(theme.text_secondary).size(13.0));
        });
        return;
    }

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for sheet in state.sheets() {
            card(theme, layout).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(sheet.title()).size(18.0).color(theme.text_primary));
                        let mut detail = format!("Income {}", format_money(sheet.income, symbol));
                        if state.is_cached(sheet.id) {
                            detail.push_str(&format!(
                                " · Expenses {}",
                                format_money(state.total_of(sheet.id), symbol)
                            ));
                        }
                        ui.label(RichText::new(detail).size(13.0).color(theme.text_secondary));
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(outline_button("Delete", theme.danger_color)).clicked() {
                            actions.push(Action::ShowDialog(Dialog::DeleteSheet {
                                id: sheet.id,
                                title: sheet.title(),
                            }));
                        }
                        if ui.add(outline_button("Edit", theme.text_secondary)).clicked() {
                            actions.push(Action::ShowDialog(Dialog::EditSheet {
                                id: sheet.id,
                                form: SheetForm::for_sheet(sheet),
                            }));
                        }
                        if ui.add(outline_button("Open", theme.accent_color)).clicked() {
                            actions.push(Action::Open(sheet.id));
                        }
                    });
                });
            });
            ui.add_space(8.0);
        }
    });
}

// ===== 账单详情 =====
#[allow(clippy::too_many_arguments)]
fn detail_view(
    ui: &mut egui::Ui,
    state: &ViewState,
    sheet_id: i64,
    income_input: &mut String,
    income_error: &mut Option<String>,
    settings: &Settings,
    theme: &Theme,
    layout: &LayoutConfig,
    actions: &mut Vec<Action>,
) {
    let Some(sheet) = state.sheet(sheet_id) else {
        return;
    };
    let symbol = settings.currency_symbol.as_str();

    ui.horizontal(|ui| {
        if ui.add_sized([64.0, 30.0], outline_button("Back", theme.text_secondary)).clicked() {
            actions.push(Action::Back);
        }
        ui.add_space(12.0);
        header(ui, theme, &format!("Expenses • {}", sheet.title()), 22.0);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_sized([84.0, 30.0], filled_button("+ Expense", theme.green_color)).clicked() {
                let form = ExpenseForm::for_today(Local::now().date_naive());
                actions.push(Action::ShowDialog(Dialog::AddExpense { sheet_id, form }));
            }
        });
    });
    ui.add_space(16.0);

    card(theme, layout).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.label(
            RichText::new(format!("Monthly Income ({})", symbol))
                .size(13.0)
                .color(theme.text_secondary),
        );
        let response = ui.add(
            egui::TextEdit::singleline(&mut *income_input)
                .desired_width(f32::INFINITY)
                .hint_text("0.00"),
        );
        // 失去焦点（或回车）时提交
        if response.lost_focus() {
            match parse_income(income_input.as_str()) {
                Ok(income) => {
                    *income_error = None;
                    if income != sheet.income {
                        actions.push(Action::Run(
                            Command::UpdateIncome { id: sheet_id, income },
                            "Income saved".to_string(),
                        ));
                    }
                }
                Err(e) => *income_error = Some(e.to_string()),
            }
        }
        if let Some(msg) = income_error.as_deref() {
            ui.label(RichText::new(msg).size(13.0).color(theme.danger_color));
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let total = state.total_of(sheet_id);
            ui.label(
                RichText::new(format!("Total Expenses: {}", format_money(total, symbol)))
                    .size(15.0)
                    .color(theme.text_primary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let balance = Balance::of(sheet.income, total);
                let color = match balance {
                    Balance::Remaining(_) => theme.green_color,
                    Balance::Deficit(_) => theme.danger_color,
                };
                ui.label(RichText::new(balance.label(symbol)).size(15.0).strong().color(color));
            });
        });
    });
    ui.add_space(16.0);

    let expenses = state.expenses(sheet_id);
    if expenses.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No expenses yet.").color(theme.text_secondary).size(15.0));
        });
        return;
    }

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for expense in expenses {
            card(theme, layout).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&expense.title).size(15.0).color(theme.text_primary));
                        ui.label(
                            RichText::new(expense.date.format("%Y-%m-%d").to_string())
                                .size(12.0)
                                .color(theme.text_secondary),
                        );
                        ui.label(
                            RichText::new(format_money(expense.amount, symbol))
                                .size(15.0)
                                .strong()
                                .color(theme.text_primary),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(outline_button("Delete", theme.danger_color)).clicked() {
                            actions.push(Action::Run(
                                Command::DeleteExpense { id: expense.id },
                                "Expense deleted".to_string(),
                            ));
                        }
                        if ui.add(outline_button("Edit", theme.text_secondary)).clicked() {
                            actions.push(Action::ShowDialog(Dialog::EditExpense {
                                id: expense.id,
                                form: ExpenseForm::for_expense(expense),
                            }));
                        }
                    });
                });
            });
            ui.add_space(8.0);
        }
    });
}

// ===== 收支折线图 =====
fn graph_view(
    ui: &mut egui::Ui,
    state: &ViewState,
    window: &mut GraphWindow,
    theme: &Theme,
    actions: &mut Vec<Action>,
) {
    ui.horizontal(|ui| {
        if ui.add_sized([64.0, 30.0], outline_button("Back", theme.text_secondary)).clicked() {
            actions.push(Action::Back);
        }
        ui.add_space(12.0);
        header(ui, theme, "Income/Expenses", 22.0);
    });
    ui.add_space(16.0);

    let all_sheets = state.sheets();
    let sheets = all_sheets.get(window.range()).unwrap_or(&[]);
    if sheets.is_empty() {
        ui.add_space(80.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No sheets yet.").color(theme.text_secondary).size(17.0));
        });
        return;
    }

    let incomes: Vec<f64> = sheets.iter().map(|s| s.income).collect();
    let expenses: Vec<f64> = sheets.iter().map(|s| state.total_of(s.id)).collect();

    let width = ui.available_width();
    let height = width.min(ui.available_height() - 60.0).max(220.0);
    let (response, painter) = ui.allocate_painter(Vec2::new(width, height), Sense::drag());
    if response.dragged() {
        window.drag(response.drag_delta().x);
    }

    painter.rect_filled(response.rect, CornerRadius::same(14), theme.card_color);
    let plot = response.rect.shrink(16.0);
    let values: Vec<f64> = incomes.iter().chain(expenses.iter()).copied().collect();
    let scale = ChartScale::new(
        &values,
        sheets.len(),
        (plot.min.x, plot.min.y),
        (plot.width(), plot.height()),
    );

    // 坐标轴
    let axis = Stroke::new(2.0, theme.axis_color);
    painter.line_segment([pos2(scale.x0, scale.bottom), pos2(scale.right, scale.bottom)], axis);
    painter.line_segment([pos2(scale.x0, scale.bottom), pos2(scale.x0, scale.top)], axis);

    // 0 与最大值参考线
    let guide = Stroke::new(1.0, theme.guide_color);
    for value in [0.0, scale.nice_max] {
        let y = scale.y(value);
        painter.line_segment([pos2(scale.x0, y), pos2(scale.right, y)], guide);
        painter.text(
            pos2(scale.x0 - 6.0, y),
            Align2::RIGHT_CENTER,
            format!("{:.0}", value),
            FontId::proportional(11.0),
            theme.text_secondary,
        );
    }

    for (values, color) in [(&incomes, theme.income_line), (&expenses, theme.expense_line)] {
        let points: Vec<egui::Pos2> = scale
            .polyline(values)
            .into_iter()
            .map(|(x, y)| pos2(x, y))
            .collect();
        if points.len() == 1 {
            painter.circle_filled(points[0], 4.0, color);
        } else {
            painter.add(egui::Shape::line(points, Stroke::new(4.0, color)));
        }
    }

    for (i, sheet) in sheets.iter().enumerate() {
        painter.text(
            pos2(scale.x(i), scale.bottom + 8.0),
            Align2::CENTER_TOP,
            sheet.short_label(),
            FontId::proportional(12.0),
            theme.text_primary,
        );
    }

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        legend(ui, theme, theme.income_line, "Income");
        ui.add_space(16.0);
        legend(ui, theme, theme.expense_line, "Expenses");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!(
                    "Months {}–{} of {} · drag to page",
                    window.start() + 1,
                    window.range().end,
                    all_sheets.len()
                ))
                .size(12.0)
                .color(theme.text_secondary),
            );
        });
    });
}

fn legend(ui: &mut egui::Ui, theme: &Theme, color: Color32, label: &str) {
    let (response, painter) = ui.allocate_painter(Vec2::splat(14.0), Sense::hover());
    painter.rect_filled(response.rect, CornerRadius::same(2), color);
    ui.add_space(6.0);
    ui.label(RichText::new(label).size(13.0).color(theme.text_primary));
}
