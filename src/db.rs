use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{Expense, ExpenseDraft, ExpenseSheet};

pub const SCHEMA_VERSION: i64 = 2;

const CREATE_SHEETS: &str = "CREATE TABLE IF NOT EXISTS sheets (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        month  INTEGER NOT NULL,
        year   INTEGER NOT NULL,
        income REAL    NOT NULL DEFAULT 0
    )";

const CREATE_INDEXES: &str = "
    CREATE INDEX IF NOT EXISTS idx_expenses_sheetId ON expenses(sheetId);
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened expense database");
        Self::from_connection(conn, Local::now().date_naive())
    }

    #[cfg(test)]
    pub fn open_in_memory() -> AppResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, Local::now().date_naive())
    }

    /// `today` 是 v1 -> v2 升级时旧支出记录获得的日期
    pub fn from_connection(conn: Connection, today: NaiveDate) -> AppResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Database { conn };
        db.migrate(today)?;
        Ok(db)
    }

    pub fn schema_version(&self) -> AppResult<i64> {
        Ok(self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    fn migrate(&self, today: NaiveDate) -> AppResult<()> {
        let version = self.schema_version()?;
        match version {
            0 => {
                let tx = self.conn.unchecked_transaction()?;
                tx.execute_batch(CREATE_SHEETS)?;
                tx.execute_batch(
                    "CREATE TABLE IF NOT EXISTS expenses (
                        id      INTEGER PRIMARY KEY AUTOINCREMENT,
                        sheetId INTEGER NOT NULL,
                        title   TEXT    NOT NULL,
                        amount  REAL    NOT NULL,
                        date    TEXT    NOT NULL DEFAULT (date('now')),
                        FOREIGN KEY(sheetId) REFERENCES sheets(id) ON DELETE CASCADE
                    )",
                )?;
                tx.execute_batch(CREATE_INDEXES)?;
                tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
                tx.commit()?;
                info!(version = SCHEMA_VERSION, "created schema");
            }
            1 => {
                // ALTER TABLE 不接受 date('now') 这类非常量默认值，只能写入迁移当天的字面量
                let tx = self.conn.unchecked_transaction()?;
                tx.execute_batch(&format!(
                    "ALTER TABLE expenses ADD COLUMN date TEXT NOT NULL DEFAULT '{}'",
                    today.format("%Y-%m-%d")
                ))?;
                tx.execute_batch(CREATE_INDEXES)?;
                tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
                tx.commit()?;
                info!(from = 1, to = SCHEMA_VERSION, %today, "migrated schema");
            }
            SCHEMA_VERSION => {}
            found => return Err(AppError::UnsupportedSchema { found }),
        }
        Ok(())
    }

    // ===== 账单 =====

    pub fn add_sheet(&self, month: u32, year: i32, income: f64) -> AppResult<i64> {
        self.conn.execute(
            "INSERT INTO sheets (month, year, income) VALUES (?1, ?2, ?3)",
            params![month, year, income],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, month, year, "created sheet");
        Ok(id)
    }

    pub fn get_sheets(&self) -> AppResult<Vec<ExpenseSheet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, month, year, income FROM sheets ORDER BY year ASC, month ASC, id ASC")?;
        let sheets = stmt
            .query_map([], Self::sheet_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(count = sheets.len(), "loaded sheets");
        Ok(sheets)
    }

    pub fn get_sheet(&self, id: i64) -> AppResult<Option<ExpenseSheet>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, month, year, income FROM sheets WHERE id = ?1",
                [id],
                Self::sheet_from_row,
            )
            .optional()?)
    }

    fn sheet_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseSheet> {
        Ok(ExpenseSheet {
            id: row.get(0)?,
            month: row.get(1)?,
            year: row.get(2)?,
            income: row.get(3)?,
        })
    }

    /// 返回是否有记录被修改，id 不存在时静默忽略
    pub fn update_sheet_income(&self, id: i64, income: f64) -> AppResult<bool> {
        let n = self
            .conn
            .execute("UPDATE sheets SET income = ?1 WHERE id = ?2", params![income, id])?;
        Self::log_write("update sheet income", id, n);
        Ok(n > 0)
    }

    pub fn update_sheet_month_year(&self, id: i64, month: u32, year: i32) -> AppResult<bool> {
        let n = self.conn.execute(
            "UPDATE sheets SET month = ?1, year = ?2 WHERE id = ?3",
            params![month, year, id],
        )?;
        Self::log_write("update sheet month/year", id, n);
        Ok(n > 0)
    }

    /// 删除账单及其全部支出
    pub fn delete_sheet(&self, id: i64) -> AppResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let expenses = tx.execute("DELETE FROM expenses WHERE sheetId = ?1", [id])?;
        let n = tx.execute("DELETE FROM sheets WHERE id = ?1", [id])?;
        tx.commit()?;
        if n > 0 {
            info!(id, expenses, "deleted sheet");
        } else {
            warn!(id, "delete sheet: no such sheet");
        }
        Ok(n > 0)
    }

    // ===== 支出 =====

    pub fn add_expense(&self, sheet_id: i64, draft: &ExpenseDraft) -> AppResult<i64> {
        let result = self.conn.execute(
            "INSERT INTO expenses (sheetId, title, amount, date) VALUES (?1, ?2, ?3, ?4)",
            params![sheet_id, draft.title, draft.amount, draft.date],
        );
        match result {
            Ok(_) => {
                let id = self.conn.last_insert_rowid();
                info!(id, sheet_id, amount = draft.amount, "created expense");
                Ok(id)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Err(AppError::ForeignKey { sheet_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 按日期升序，同一天按创建顺序
    pub fn get_expenses(&self, sheet_id: i64) -> AppResult<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sheetId, title, amount, date FROM expenses WHERE sheetId = ?1 ORDER BY date ASC, id ASC",
        )?;
        let expenses = stmt
            .query_map([sheet_id], |row| {
                Ok(Expense {
                    id: row.get(0)?,
                    sheet_id: row.get(1)?,
                    title: row.get(2)?,
                    amount: row.get(3)?,
                    date: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(sheet_id, count = expenses.len(), "loaded expenses");
        Ok(expenses)
    }

    pub fn update_expense(&self, id: i64, draft: &ExpenseDraft) -> AppResult<bool> {
        let n = self.conn.execute(
            "UPDATE expenses SET title = ?1, amount = ?2, date = ?3 WHERE id = ?4",
            params![draft.title, draft.amount, draft.date, id],
        )?;
        Self::log_write("update expense", id, n);
        Ok(n > 0)
    }

    pub fn delete_expense(&self, id: i64) -> AppResult<bool> {
        let n = self.conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        Self::log_write("delete expense", id, n);
        Ok(n > 0)
    }

    /// 某账单的支出合计，没有支出时为 0
    pub fn sum_expenses(&self, sheet_id: i64) -> AppResult<f64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE sheetId = ?1",
            [sheet_id],
            |row| row.get(0),
        )?)
    }

    fn log_write(action: &str, id: i64, affected: usize) {
        if affected > 0 {
            info!(id, "{}", action);
        } else {
            warn!(id, "{}: no such row", action);
        }
    }
}
