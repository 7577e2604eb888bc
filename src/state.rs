//! 界面与数据库之间的内存镜像。
//!
//! 所有修改先提交到数据库，成功后再刷新镜像；写入失败时镜像保持原样。

use std::collections::HashMap;
use tracing::debug;

use crate::db::Database;
use crate::error::AppResult;
use crate::models::{Balance, Expense, ExpenseDraft, ExpenseSheet};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateSheet { month: u32, year: i32 },
    EditSheet { id: i64, month: u32, year: i32 },
    DeleteSheet { id: i64 },
    UpdateIncome { id: i64, income: f64 },
    AddExpense { sheet_id: i64, draft: ExpenseDraft },
    EditExpense { id: i64, draft: ExpenseDraft },
    DeleteExpense { id: i64 },
}

pub struct ViewState {
    db: Database,
    sheets: Vec<ExpenseSheet>,
    /// 只缓存打开过的账单
    expenses: HashMap<i64, Vec<Expense>>,
}

impl ViewState {
    pub fn load(db: Database) -> AppResult<Self> {
        let sheets = db.get_sheets()?;
        Ok(Self {
            db,
            sheets,
            expenses: HashMap::new(),
        })
    }

    pub fn sheets(&self) -> &[ExpenseSheet] {
        &self.sheets
    }

    pub fn sheet(&self, id: i64) -> Option<&ExpenseSheet> {
        self.sheets.iter().find(|s| s.id == id)
    }

    pub fn expenses(&self, sheet_id: i64) -> &[Expense] {
        self.expenses.get(&sheet_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_cached(&self, sheet_id: i64) -> bool {
        self.expenses.contains_key(&sheet_id)
    }

    /// 每次选中都重新读取，不做脏检查
    pub fn select_sheet(&mut self, id: i64) -> AppResult<()> {
        match self.db.get_sheet(id)? {
            Some(fresh) => {
                if let Some(slot) = self.sheets.iter_mut().find(|s| s.id == id) {
                    *slot = fresh;
                }
            }
            None => self.refresh_sheets()?,
        }
        self.refresh_expenses(id)
    }

    /// 打开图表前把所有账单的支出读进缓存
    pub fn preload_all(&mut self) -> AppResult<()> {
        let ids: Vec<i64> = self.sheets.iter().map(|s| s.id).collect();
        for id in ids {
            self.refresh_expenses(id)?;
        }
        Ok(())
    }

    /// 未缓存的账单按 0 计，不会触发读取
    pub fn total_of(&self, sheet_id: i64) -> f64 {
        self.expenses(sheet_id).iter().map(|e| e.amount).sum()
    }

    pub fn balance_of(&self, sheet_id: i64) -> Option<Balance> {
        self.sheet(sheet_id)
            .map(|s| Balance::of(s.income, self.total_of(sheet_id)))
    }

    /// 返回新建对象的 id（如有）
    pub fn apply(&mut self, command: Command) -> AppResult<Option<i64>> {
        debug!(?command, "applying command");
        match command {
            Command::CreateSheet { month, year } => {
                let id = self.db.add_sheet(month, year, 0.0)?;
                self.refresh_sheets()?;
                Ok(Some(id))
            }
            Command::EditSheet { id, month, year } => {
                self.db.update_sheet_month_year(id, month, year)?;
                self.refresh_sheets()?;
                Ok(None)
            }
            Command::DeleteSheet { id } => {
                self.db.delete_sheet(id)?;
                self.expenses.remove(&id);
                self.refresh_sheets()?;
                Ok(None)
            }
            Command::UpdateIncome { id, income } => {
                self.db.update_sheet_income(id, income)?;
                self.refresh_sheets()?;
                Ok(None)
            }
            Command::AddExpense { sheet_id, draft } => {
                let id = self.db.add_expense(sheet_id, &draft)?;
                self.refresh_expenses(sheet_id)?;
                Ok(Some(id))
            }
            Command::EditExpense { id, draft } => {
                self.db.update_expense(id, &draft)?;
                if let Some(sheet_id) = self.owner_of(id) {
                    self.refresh_expenses(sheet_id)?;
                }
                Ok(None)
            }
            Command::DeleteExpense { id } => {
                let owner = self.owner_of(id);
                self.db.delete_expense(id)?;
                if let Some(sheet_id) = owner {
                    self.refresh_expenses(sheet_id)?;
                }
                Ok(None)
            }
        }
    }

    fn owner_of(&self, expense_id: i64) -> Option<i64> {
        self.expenses
            .values()
            .flatten()
            .find(|e| e.id == expense_id)
            .map(|e| e.sheet_id)
    }

    fn refresh_sheets(&mut self) -> AppResult<()> {
        self.sheets = self.db.get_sheets()?;
        Ok(())
    }

    fn refresh_expenses(&mut self, sheet_id: i64) -> AppResult<()> {
        let expenses = self.db.get_expenses(sheet_id)?;
        self.expenses.insert(sheet_id, expenses);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}
