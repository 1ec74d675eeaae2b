//! # Selection
//!
//! What the user currently has picked. Commands read it to find their
//! targets; it never changes as a side effect of a structural job.
//!
//! A selection change always swaps in a whole new [`SelectionGroup`] and
//! bumps [`Selection::revision`]. Nothing selected is an empty objects group.

use fxom_model::{FxomDocument, ObjectId, PropertyName};
use std::collections::BTreeSet;

/// Opaque token for the realized node a pick landed on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HitNode(pub u64);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSelectionGroup {
    items: Vec<ObjectId>,
    hit_item: Option<ObjectId>,
    hit_node: Option<HitNode>,
}

impl ObjectSelectionGroup {
    /// Duplicates are dropped, first occurrence wins. The hit item defaults
    /// to the first item.
    pub fn new(
        items: impl IntoIterator<Item = ObjectId>,
        hit_item: Option<ObjectId>,
        hit_node: Option<HitNode>,
    ) -> Self {
        let mut unique = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        if let Some(hit) = hit_item {
            assert!(unique.contains(&hit), "hit item {:?} is not selected", hit);
        }
        let hit_item = hit_item.or_else(|| unique.first().copied());
        Self {
            items: unique,
            hit_item,
            hit_node,
        }
    }

    pub fn items(&self) -> &[ObjectId] {
        &self.items
    }

    pub fn hit_item(&self) -> Option<ObjectId> {
        self.hit_item
    }

    pub fn hit_node(&self) -> Option<HitNode> {
        self.hit_node
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.items.contains(&object)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridFeature {
    Row,
    Column,
}

impl GridFeature {
    /// Attached constraint carrying a child's row or column on `grid_type`
    pub fn index_property(&self, grid_type: &str) -> PropertyName {
        match self {
            GridFeature::Row => PropertyName::attached(grid_type, "rowIndex"),
            GridFeature::Column => PropertyName::attached(grid_type, "columnIndex"),
        }
    }
}

/// Rows or columns of a grid container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSelectionGroup {
    grid: ObjectId,
    feature: GridFeature,
    indexes: BTreeSet<usize>,
}

impl GridSelectionGroup {
    pub fn new(grid: ObjectId, feature: GridFeature, indexes: impl IntoIterator<Item = usize>) -> Self {
        let indexes: BTreeSet<usize> = indexes.into_iter().collect();
        assert!(!indexes.is_empty(), "grid selection needs at least one index");
        Self {
            grid,
            feature,
            indexes,
        }
    }

    pub fn grid(&self) -> ObjectId {
        self.grid
    }

    pub fn feature(&self) -> GridFeature {
        self.feature
    }

    pub fn indexes(&self) -> &BTreeSet<usize> {
        &self.indexes
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionGroup {
    Objects(ObjectSelectionGroup),
    Grid(GridSelectionGroup),
}

impl Default for SelectionGroup {
    fn default() -> Self {
        SelectionGroup::empty()
    }
}

impl SelectionGroup {
    pub fn empty() -> Self {
        SelectionGroup::Objects(ObjectSelectionGroup::default())
    }

    pub fn objects(items: impl IntoIterator<Item = ObjectId>) -> Self {
        SelectionGroup::Objects(ObjectSelectionGroup::new(items, None, None))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SelectionGroup::Objects(group) => group.is_empty(),
            SelectionGroup::Grid(_) => false,
        }
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        match self {
            SelectionGroup::Objects(group) => group.contains(object),
            SelectionGroup::Grid(group) => group.grid == object,
        }
    }

    /// Objects the group is made of; a grid group stands for its grid
    pub fn items(&self) -> Vec<ObjectId> {
        match self {
            SelectionGroup::Objects(group) => group.items.clone(),
            SelectionGroup::Grid(group) => vec![group.grid],
        }
    }

    /// Deepest object containing every selected item.
    ///
    /// `None` when nothing is selected, when an item is the root or
    /// detached, or when the items live in disjoint branches.
    pub fn ancestor(&self, document: &FxomDocument) -> Option<ObjectId> {
        let group = match self {
            SelectionGroup::Grid(group) => return Some(group.grid),
            SelectionGroup::Objects(group) => group,
        };

        let mut common: Option<Vec<ObjectId>> = None;
        for &item in &group.items {
            let parent = document.parent_object(item)?;
            let path = document.path_from_root(parent);
            if path.first().copied() != document.root() {
                return None;
            }
            common = Some(match common {
                None => path,
                Some(prefix) => prefix
                    .into_iter()
                    .zip(path)
                    .take_while(|(a, b)| a == b)
                    .map(|(a, _)| a)
                    .collect(),
            });
        }
        common?.last().copied()
    }

    /// Type shared by every item, if any
    pub fn common_type(&self, document: &FxomDocument) -> Option<String> {
        let items = self.items();
        let first = document.object(*items.first()?)?.type_name()?;
        items
            .iter()
            .all(|id| document.object(*id).and_then(|o| o.type_name()) == Some(first))
            .then(|| first.to_string())
    }

    /// Attached items in document order
    pub fn sorted_items(&self, document: &FxomDocument) -> Vec<ObjectId> {
        let items = self.items();
        document
            .document_order()
            .into_iter()
            .filter(|id| items.contains(id))
            .collect()
    }

    /// Sorted items without the ones nested inside another selected item
    pub fn top_most_items(&self, document: &FxomDocument) -> Vec<ObjectId> {
        let sorted = self.sorted_items(document);
        sorted
            .iter()
            .copied()
            .filter(|item| {
                !document
                    .ancestors(*item)
                    .iter()
                    .any(|ancestor| sorted.contains(ancestor))
            })
            .collect()
    }
}

/// Current selection of an editing session
#[derive(Clone, Debug, Default)]
pub struct Selection {
    group: SelectionGroup,
    revision: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self) -> &SelectionGroup {
        &self.group
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    pub fn is_selected(&self, object: ObjectId) -> bool {
        self.group.contains(object)
    }

    pub fn ancestor(&self, document: &FxomDocument) -> Option<ObjectId> {
        self.group.ancestor(document)
    }

    /// Swaps in `group`, returning the previous one
    pub fn replace(&mut self, group: SelectionGroup) -> SelectionGroup {
        if group == self.group {
            return group;
        }
        self.revision += 1;
        std::mem::replace(&mut self.group, group)
    }

    pub fn select(&mut self, object: ObjectId, hit_node: Option<HitNode>) {
        self.replace(SelectionGroup::Objects(ObjectSelectionGroup::new(
            [object],
            Some(object),
            hit_node,
        )));
    }

    pub fn select_all(&mut self, objects: impl IntoIterator<Item = ObjectId>) {
        self.replace(SelectionGroup::objects(objects));
    }

    /// Adds `object` to an objects selection, or removes it when present
    pub fn toggle(&mut self, object: ObjectId) {
        let group = match &self.group {
            SelectionGroup::Objects(group) if group.contains(object) => {
                let items: Vec<ObjectId> =
                    group.items.iter().copied().filter(|id| *id != object).collect();
                let hit = group.hit_item.filter(|hit| *hit != object);
                ObjectSelectionGroup::new(items, hit, None)
            }
            SelectionGroup::Objects(group) => ObjectSelectionGroup::new(
                group.items.iter().copied().chain([object]),
                Some(object),
                None,
            ),
            SelectionGroup::Grid(_) => ObjectSelectionGroup::new([object], Some(object), None),
        };
        self.replace(SelectionGroup::Objects(group));
    }

    pub fn select_grid(&mut self, grid: ObjectId, feature: GridFeature, index: usize) {
        self.replace(SelectionGroup::Grid(GridSelectionGroup::new(
            grid,
            feature,
            [index],
        )));
    }

    pub fn clear(&mut self) {
        self.replace(SelectionGroup::empty());
    }
}
