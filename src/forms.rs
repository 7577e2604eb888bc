//! 对话框输入的缓冲区和校验。校验失败不会触碰存储。

use chrono::{Datelike, NaiveDate};

use crate::error::{AppError, AppResult};
use crate::models::{Expense, ExpenseDraft, ExpenseSheet};

pub const MIN_YEAR: i32 = 1900;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetForm {
    pub month: String,
    pub year: String,
    pub error: Option<String>,
}

impl SheetForm {
    /// 新建账单时默认当前年月
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            month: today.month().to_string(),
            year: today.year().to_string(),
            error: None,
        }
    }

    pub fn for_sheet(sheet: &ExpenseSheet) -> Self {
        Self {
            month: sheet.month.to_string(),
            year: sheet.year.to_string(),
            error: None,
        }
    }

    pub fn validate(&self) -> AppResult<(u32, i32)> {
        let month = self
            .month
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| AppError::validation("Enter month 1–12"))?;
        let year = self
            .year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| *y >= MIN_YEAR)
            .ok_or_else(|| AppError::validation("Enter valid year"))?;
        Ok((month, year))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseForm {
    pub title: String,
    pub amount: String,
    pub date: String,
    pub error: Option<String>,
}

impl ExpenseForm {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn for_expense(expense: &Expense) -> Self {
        Self {
            title: expense.title.clone(),
            amount: expense.amount.to_string(),
            date: expense.date.format("%Y-%m-%d").to_string(),
            error: None,
        }
    }

    pub fn validate(&self) -> AppResult<ExpenseDraft> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title required"));
        }
        let amount = parse_decimal(&self.amount)
            .filter(|a| *a > 0.0)
            .ok_or_else(|| AppError::validation("Enter amount > 0"))?;
        let date = parse_date(&self.date).ok_or_else(|| AppError::validation("Use yyyy-MM-dd"))?;
        Ok(ExpenseDraft {
            title: title.to_string(),
            amount,
            date,
        })
    }
}

/// 收入输入框：留空视为 0
pub fn parse_income(text: &str) -> AppResult<f64> {
    if text.trim().is_empty() {
        return Ok(0.0);
    }
    parse_decimal(text)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| AppError::validation("Enter income ≥ 0"))
}

pub fn income_text(income: f64) -> String {
    if income == 0.0 {
        String::new()
    } else {
        income.to_string()
    }
}

/// 接受逗号作为小数点
fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 固定宽度 YYYY-MM-DD
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let fixed_width = text.len() == 10
        && text.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !fixed_width {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_sheet_form_defaults_to_today() {
        let form = SheetForm::for_today(today());
        assert_eq!(form.month, "3");
        assert_eq!(form.year, "2026");
        assert_eq!(form.validate().unwrap(), (3, 2026));
    }

    #[test]
    fn test_sheet_form_rejects_bad_month_and_year() {
        let form = |m: &str, y: &str| SheetForm { month: m.into(), year: y.into(), error: None };

        assert_eq!(form("13", "2026").validate().unwrap_err().to_string(), "Enter month 1–12");
        assert_eq!(form("0", "2026").validate().unwrap_err().to_string(), "Enter month 1–12");
        assert_eq!(form("abc", "2026").validate().unwrap_err().to_string(), "Enter month 1–12");
        assert_eq!(form("12", "1899").validate().unwrap_err().to_string(), "Enter valid year");
        assert_eq!(form("12", "").validate().unwrap_err().to_string(), "Enter valid year");
        assert_eq!(form(" 12 ", "1900").validate().unwrap(), (12, 1900));
    }

    #[test]
    fn test_expense_form_prefills_today() {
        let form = ExpenseForm::for_today(today());
        assert_eq!(form.date, "2026-03-15");
        assert!(form.title.is_empty());
        assert!(form.amount.is_empty());
        assert!(form.error.is_none());
    }

    #[test]
    fn test_expense_form_valid() {
        let form = ExpenseForm {
            title: "  Food ".into(),
            amount: "150,50".into(),
            date: "2026-03-15".into(),
            error: None,
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.title, "Food");
        assert_eq!(draft.amount, 150.5);
        assert_eq!(draft.date, today());
    }

    #[test]
    fn test_expense_form_errors() {
        let mut form = ExpenseForm::for_today(today());
        form.amount = "10".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "Title required");

        form.title = "Rent".into();
        form.amount = "0".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "Enter amount > 0");
        form.amount = "-5".into();
        assert!(form.validate().unwrap_err().is_validation());
        form.amount = "ten".into();
        assert_eq!(form.validate().unwrap_err().to_string(), "Enter amount > 0");

        form.amount = "800".into();
        for bad in ["2026-3-1", "2026/03/01", "2026-02-30", "20260301", ""] {
            form.date = bad.into();
            assert_eq!(form.validate().unwrap_err().to_string(), "Use yyyy-MM-dd", "{bad}");
        }
    }

    #[test]
    fn test_expense_form_prefill_from_expense() {
        let expense = Expense {
            id: 1,
            sheet_id: 1,
            title: "Rent".into(),
            amount: 800.0,
            date: today(),
        };
        let form = ExpenseForm::for_expense(&expense);
        assert_eq!(form.amount, "800");
        assert_eq!(form.date, "2026-03-15");
        assert_eq!(form.validate().unwrap().amount, 800.0);
    }

    #[test]
    fn test_parse_income() {
        assert_eq!(parse_income("").unwrap(), 0.0);
        assert_eq!(parse_income("2000").unwrap(), 2000.0);
        assert_eq!(parse_income("1234,5").unwrap(), 1234.5);
        assert!(parse_income("-1").unwrap_err().is_validation());
        assert!(parse_income("lots").unwrap_err().is_validation());
        assert_eq!(income_text(0.0), "");
        assert_eq!(income_text(2000.0), "2000");
    }
}
