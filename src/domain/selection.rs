use crate::domain::value_objects::LineItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 已选行项目集合
///
/// 所有操作都返回新的集合，不修改原值；调用方通过替换整个值来更新状态。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    selected: BTreeSet<LineItemId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 存在则移除，不存在则加入
    pub fn toggle(&self, id: &LineItemId) -> Self {
        let mut selected = self.selected.clone();
        if !selected.remove(id) {
            selected.insert(id.clone());
        }
        Self { selected }
    }

    /// 用完整的id列表替换当前集合
    pub fn select_all<'a>(&self, all_ids: impl IntoIterator<Item = &'a LineItemId>) -> Self {
        Self {
            selected: all_ids.into_iter().cloned().collect(),
        }
    }

    pub fn clear(&self) -> Self {
        Self::default()
    }

    pub fn is_all_selected(&self, all_ids: &[LineItemId]) -> bool {
        !all_ids.is_empty() && self.selected.len() == all_ids.len()
    }

    /// 列表刷新后只保留仍然存在的id（交集）
    pub fn retain_present<'a>(&self, current_ids: impl IntoIterator<Item = &'a LineItemId>) -> Self {
        let current: BTreeSet<&LineItemId> = current_ids.into_iter().collect();
        Self {
            selected: self
                .selected
                .iter()
                .filter(|id| current.contains(id))
                .cloned()
                .collect(),
        }
    }

    pub fn contains(&self, id: &LineItemId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItemId> {
        self.selected.iter()
    }
}

impl FromIterator<LineItemId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = LineItemId>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}
