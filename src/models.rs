use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSheet {
    pub id: i64,
    pub month: u32,
    pub year: i32,
    pub income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub sheet_id: i64,
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// 新增或编辑支出时已校验过的输入
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
}

const MONTH_NAMES: [&str; 13] = [
    "", "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES.get(month as usize).copied().unwrap_or("")
}

impl ExpenseSheet {
    /// 例如 "March 2026"
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// 图表横轴标签，例如 "Mar 26"
    pub fn short_label(&self) -> String {
        let name: String = month_name(self.month).chars().take(3).collect();
        format!("{} {:02}", name, self.year.rem_euclid(100))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Balance {
    Remaining(f64),
    Deficit(f64),
}

impl Balance {
    pub fn of(income: f64, total: f64) -> Self {
        let remaining = income - total;
        if remaining >= 0.0 {
            Balance::Remaining(remaining)
        } else {
            Balance::Deficit(-remaining)
        }
    }

    pub fn label(&self, symbol: &str) -> String {
        match self {
            Balance::Remaining(v) => format!("Remaining: {}", format_money(*v, symbol)),
            Balance::Deficit(v) => format!("Deficit: {}", format_money(*v, symbol)),
        }
    }
}

/// 固定两位小数，货币符号前置
pub fn format_money(amount: f64, symbol: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}{:.2}", sign, symbol, amount.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(month: u32, year: i32) -> ExpenseSheet {
        ExpenseSheet { id: 1, month, year, income: 0.0 }
    }

    #[test]
    fn test_month_name_out_of_range() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn test_sheet_labels() {
        let s = sheet(3, 2026);
        assert_eq!(s.title(), "March 2026");
        assert_eq!(s.short_label(), "Mar 26");
        assert_eq!(sheet(1, 2005).short_label(), "Jan 05");
    }

    #[test]
    fn test_balance() {
        assert_eq!(Balance::of(2000.0, 950.5), Balance::Remaining(1049.5));
        assert_eq!(Balance::of(100.0, 150.0), Balance::Deficit(50.0));
        assert_eq!(Balance::of(0.0, 0.0), Balance::Remaining(0.0));
        assert_eq!(Balance::of(2000.0, 950.5).label("€"), "Remaining: €1049.50");
        assert_eq!(Balance::of(100.0, 150.0).label("€"), "Deficit: €50.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(950.5, "€"), "€950.50");
        assert_eq!(format_money(0.0, "€"), "€0.00");
        assert_eq!(format_money(-12.5, "€"), "-€12.50");
    }
}
