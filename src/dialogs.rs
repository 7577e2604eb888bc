use eframe::egui::{self, Align2, Color32, CornerRadius, RichText, Stroke};

use crate::forms::{ExpenseForm, SheetForm};
use crate::state::Command;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    AddSheet(SheetForm),
    EditSheet { id: i64, form: SheetForm },
    DeleteSheet { id: i64, title: String },
    AddExpense { sheet_id: i64, form: ExpenseForm },
    EditExpense { id: i64, form: ExpenseForm },
}

pub enum Outcome {
    Open,
    Cancel,
    /// 校验通过，交给 ViewState 执行
    Submit(Command, String),
}

impl Dialog {
    fn title(&self) -> &'static str {
        match self {
            Dialog::AddSheet(_) => "Create New Sheet",
            Dialog::EditSheet { .. } => "Edit Month/Year",
            Dialog::DeleteSheet { .. } => "Delete Sheet",
            Dialog::AddExpense { .. } => "Add Expense",
            Dialog::EditExpense { .. } => "Edit Expense",
        }
    }

    fn confirm_label(&self) -> &'static str {
        match self {
            Dialog::AddSheet(_) | Dialog::AddExpense { .. } => "Add",
            Dialog::EditSheet { .. } | Dialog::EditExpense { .. } => "Save",
            Dialog::DeleteSheet { .. } => "Delete",
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme, symbol: &str) -> Outcome {
        let mut confirmed = false;
        let mut cancelled = false;
        let title = self.title();
        let confirm_label = self.confirm_label();

        egui::Window::new(RichText::new(title).size(17.0).color(theme.text_primary))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(
                egui::Frame::default()
                    .fill(theme.card_color)
                    .stroke(Stroke::new(1.0, theme.accent_color))
                    .corner_radius(CornerRadius::same(14))
                    .inner_margin(egui::Margin::same(22)),
            )
            .show(ctx, |ui| {
                ui.set_width(320.0);
                match self {
                    Dialog::AddSheet(form) | Dialog::EditSheet { form, .. } => {
                        field(ui, theme, "Month (1–12)", &mut form.month);
                        field(ui, theme, "Year", &mut form.year);
                        error_line(ui, theme, form.error.as_deref());
                    }
                    Dialog::AddExpense { form, .. } | Dialog::EditExpense { form, .. } => {
                        field(ui, theme, "Title", &mut form.title);
                        field(ui, theme, &amount_label(symbol), &mut form.amount);
                        field(ui, theme, "Date (yyyy-MM-dd)", &mut form.date);
                        error_line(ui, theme, form.error.as_deref());
                    }
                    Dialog::DeleteSheet { title, .. } => {
                        ui.label(
                            RichText::new(format!(
                                "This will delete all expenses for {}. This action cannot be undone.",
                                title
                            ))
                            .color(theme.text_secondary),
                        );
                    }
                }

                ui.add_space(14.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let fill = if matches!(self, Dialog::DeleteSheet { .. }) {
                        theme.danger_color
                    } else {
                        theme.accent_color
                    };
                    let confirm = egui::Button::new(RichText::new(confirm_label).size(13.0).color(Color32::WHITE))
                        .fill(fill)
                        .corner_radius(CornerRadius::same(6));
                    if ui.add_sized([64.0, 30.0], confirm).clicked() {
                        confirmed = true;
                    }
                    let cancel = egui::Button::new(RichText::new("Cancel").size(13.0).color(theme.text_secondary))
                        .fill(theme.input_bg)
                        .corner_radius(CornerRadius::same(6));
                    if ui.add_sized([64.0, 30.0], cancel).clicked() {
                        cancelled = true;
                    }
                });
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            cancelled = true;
        }
        if cancelled {
            return Outcome::Cancel;
        }
        if confirmed {
            return self.submit();
        }
        Outcome::Open
    }

    /// 校验失败时把错误写回表单，对话框保持打开
    fn submit(&mut self) -> Outcome {
        match self {
            Dialog::AddSheet(form) => match form.validate() {
                Ok((month, year)) => Outcome::Submit(
                    Command::CreateSheet { month, year },
                    "Sheet created".to_string(),
                ),
                Err(e) => reject(&mut form.error, e),
            },
            Dialog::EditSheet { id, form } => match form.validate() {
                Ok((month, year)) => Outcome::Submit(
                    Command::EditSheet { id: *id, month, year },
                    "Sheet updated".to_string(),
                ),
                Err(e) => reject(&mut form.error, e),
            },
            Dialog::DeleteSheet { id, title } => {
                Outcome::Submit(Command::DeleteSheet { id: *id }, format!("Deleted {}", title))
            }
            Dialog::AddExpense { sheet_id, form } => match form.validate() {
                Ok(draft) => Outcome::Submit(
                    Command::AddExpense { sheet_id: *sheet_id, draft },
                    "Expense added".to_string(),
                ),
                Err(e) => reject(&mut form.error, e),
            },
            Dialog::EditExpense { id, form } => match form.validate() {
                Ok(draft) => Outcome::Submit(
                    Command::EditExpense { id: *id, draft },
                    "Expense updated".to_string(),
                ),
                Err(e) => reject(&mut form.error, e),
            },
        }
    }
}

fn reject(slot: &mut Option<String>, err: crate::error::AppError) -> Outcome {
    *slot = Some(err.to_string());
    Outcome::Open
}

fn amount_label(symbol: &str) -> String {
    format!("Amount ({})", symbol)
}

fn field(ui: &mut egui::Ui, theme: &Theme, label: &str, value: &mut String) {
    ui.label(RichText::new(label).size(13.0).color(theme.text_secondary));
    ui.add(
        egui::TextEdit::singleline(value)
            .desired_width(f32::INFINITY)
            .text_color(theme.text_primary),
    );
    ui.add_space(6.0);
}

fn error_line(ui: &mut egui::Ui, theme: &Theme, error: Option<&str>) {
    if let Some(msg) = error {
        ui.label(RichText::new(msg).size(13.0).color(theme.danger_color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_invalid_sheet_stays_open_with_error() {
        let mut dialog = Dialog::AddSheet(SheetForm {
            month: "13".into(),
            year: "2026".into(),
            error: None,
        });
        assert!(matches!(dialog.submit(), Outcome::Open));
        match dialog {
            Dialog::AddSheet(form) => assert_eq!(form.error.as_deref(), Some("Enter month 1–12")),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_valid_expense_submits_command() {
        let mut dialog = Dialog::AddExpense {
            sheet_id: 4,
            form: ExpenseForm {
                title: "Rent".into(),
                amount: "800".into(),
                date: "2026-03-01".into(),
                error: None,
            },
        };
        match dialog.submit() {
            Outcome::Submit(Command::AddExpense { sheet_id, draft }, _) => {
                assert_eq!(sheet_id, 4);
                assert_eq!(draft.amount, 800.0);
                assert_eq!(draft.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
            }
            _ => panic!("expected AddExpense"),
        }
    }

    #[test]
    fn test_amount_label_uses_currency_symbol() {
        assert_eq!(amount_label("€"), "Amount (€)");
        assert_eq!(amount_label("$"), "Amount ($)");
    }

    #[test]
    fn test_delete_needs_no_validation() {
        let mut dialog = Dialog::DeleteSheet { id: 9, title: "March 2026".into() };
        match dialog.submit() {
            Outcome::Submit(cmd, msg) => {
                assert_eq!(cmd, Command::DeleteSheet { id: 9 });
                assert_eq!(msg, "Deleted March 2026");
            }
            _ => panic!("expected submit"),
        }
    }
}
