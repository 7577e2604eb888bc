use crate::graph::GraphWindow;
use crate::state::ViewState;

/// 当前页面。详情页必然带着选中的账单 id
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Screen {
    #[default]
    SheetList,
    SheetDetail { sheet_id: i64 },
    Graph(GraphWindow),
}

impl Screen {
    pub fn select(self, sheet_id: i64) -> Screen {
        match self {
            Screen::SheetList => Screen::SheetDetail { sheet_id },
            other => other,
        }
    }

    pub fn open_graph(self, sheet_count: usize, window: usize, threshold: f32) -> Screen {
        match self {
            Screen::SheetList => Screen::Graph(GraphWindow::new(sheet_count, window, threshold)),
            other => other,
        }
    }

    pub fn back(self) -> Screen {
        Screen::SheetList
    }

    /// 选中的账单被删除后回到列表
    pub fn reconcile(self, state: &ViewState) -> Screen {
        match self {
            Screen::SheetDetail { sheet_id } if state.sheet(sheet_id).is_none() => Screen::SheetList,
            Screen::Graph(mut window) => {
                window.resize(state.sheets().len());
                Screen::Graph(window)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::state::Command;

    #[test]
    fn test_transitions() {
        let screen = Screen::default().select(3);
        assert_eq!(screen, Screen::SheetDetail { sheet_id: 3 });
        assert_eq!(screen.back(), Screen::SheetList);

        let graph = Screen::SheetList.open_graph(6, 4, 40.0);
        assert_eq!(graph, Screen::Graph(GraphWindow::new(6, 4, 40.0)));
        assert_eq!(graph.back(), Screen::SheetList);
    }

    #[test]
    fn test_transitions_only_from_list() {
        let detail = Screen::SheetDetail { sheet_id: 1 };
        assert_eq!(detail.clone().select(2), detail);
        assert_eq!(detail.clone().open_graph(3, 4, 40.0), detail);

        let graph = Screen::SheetList.open_graph(3, 4, 40.0);
        assert_eq!(graph.clone().select(1), graph);
        assert_eq!(Screen::SheetList.back(), Screen::SheetList);
    }

    #[test]
    fn test_reconcile_after_delete() {
        let mut state = ViewState::load(Database::open_in_memory().unwrap()).unwrap();
        let id = state.apply(Command::CreateSheet { month: 3, year: 2026 }).unwrap().unwrap();

        let screen = Screen::SheetList.select(id).reconcile(&state);
        assert_eq!(screen, Screen::SheetDetail { sheet_id: id });

        state.apply(Command::DeleteSheet { id }).unwrap();
        assert_eq!(screen.reconcile(&state), Screen::SheetList);
    }

    #[test]
    fn test_open_sheet_deleted_elsewhere_stays_on_list() {
        let db = Database::open_in_memory().unwrap();
        let id = db.add_sheet(3, 2026, 0.0).unwrap();
        let mut state = ViewState::load(db).unwrap();

        // 另一处直接删库，镜像里仍有这张账单
        state.db().delete_sheet(id).unwrap();
        assert!(state.sheet(id).is_some());

        state.select_sheet(id).unwrap();
        assert!(state.sheet(id).is_none());
        assert_eq!(Screen::SheetList.select(id).reconcile(&state), Screen::SheetList);
    }
}
