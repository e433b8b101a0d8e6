//! Arena-backed SOTA tree.
//!
//! This module provides:
//! - [`SotaTree`]: the binary tree of prototype cells grown during training
//! - [`TreeCell`]: a single node, either a leaf ("cell") or an internal node
//! - [`TreeValidationError`]: structural validation errors
//!
//! Cells live in a flat arena and refer to each other through [`CellId`]s.
//! Ownership is strictly parent → children; `ancestor` and `sister` are
//! lookup relations only.

use super::cell::CellValue;
use super::classes::ClassCounter;

/// Label reported by cells that never saw a class.
pub const DEFAULT_CLASS: &str = "NoClassDefined";

/// Index of a cell in its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// TreeCell
// ============================================================================

/// A node of the SOTA tree.
///
/// Leaves hold the prototype vector that training adjusts and the ids of the
/// rows currently assigned to them. Internal nodes keep their last prototype
/// (ancestors are still nudged while their split is fresh) and the row ids
/// they held before splitting.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeCell {
    pub(crate) data: Vec<CellValue>,
    pub(crate) is_leaf: bool,
    pub(crate) left: Option<CellId>,
    pub(crate) right: Option<CellId>,
    pub(crate) ancestor: Option<CellId>,
    pub(crate) sister: Option<CellId>,
    pub(crate) resource: f64,
    pub(crate) max_distance: f64,
    pub(crate) level: u32,
    pub(crate) hierarchy_level: u32,
    pub(crate) level_in_hierarchy: u32,
    pub(crate) data_ids: Vec<usize>,
    pub(crate) row_keys: Vec<String>,
    pub(crate) classes: ClassCounter,
}

impl TreeCell {
    /// Create a detached leaf with the given prototype and depth.
    pub fn leaf(data: Vec<CellValue>, level: u32) -> Self {
        Self {
            data,
            is_leaf: true,
            left: None,
            right: None,
            ancestor: None,
            sister: None,
            resource: 0.0,
            max_distance: 0.0,
            level,
            hierarchy_level: 0,
            level_in_hierarchy: 0,
            data_ids: Vec::new(),
            row_keys: Vec::new(),
            classes: ClassCounter::new(),
        }
    }

    #[inline]
    pub fn data(&self) -> &[CellValue] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [CellValue] {
        &mut self.data
    }

    /// Prototype values (`CellValue::value`) as a plain vector.
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(CellValue::value).collect()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    #[inline]
    pub fn left(&self) -> Option<CellId> {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Option<CellId> {
        self.right
    }

    #[inline]
    pub fn ancestor(&self) -> Option<CellId> {
        self.ancestor
    }

    #[inline]
    pub fn sister(&self) -> Option<CellId> {
        self.sister
    }

    /// Mean distance of the assigned rows to this cell, as of the last epoch.
    #[inline]
    pub fn resource(&self) -> f64 {
        self.resource
    }

    pub fn set_resource(&mut self, resource: f64) {
        self.resource = resource;
    }

    /// Maximum pairwise distance among the assigned rows (variability).
    #[inline]
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn set_max_distance(&mut self, max_distance: f64) {
        self.max_distance = max_distance;
    }

    /// Depth of the cell, the root being at level 1.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn hierarchy_level(&self) -> u32 {
        self.hierarchy_level
    }

    #[inline]
    pub fn level_in_hierarchy(&self) -> u32 {
        self.level_in_hierarchy
    }

    #[inline]
    pub fn data_ids(&self) -> &[usize] {
        &self.data_ids
    }

    pub fn data_ids_mut(&mut self) -> &mut Vec<usize> {
        &mut self.data_ids
    }

    /// Keys of rows assigned at earlier hierarchy levels.
    #[inline]
    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    /// Record a class label; `None` is ignored.
    pub fn add_class(&mut self, class: Option<&str>) {
        if let Some(c) = class {
            self.classes.add(c);
        }
    }

    #[inline]
    pub fn classes(&self) -> &ClassCounter {
        &self.classes
    }

    /// Most frequent class seen, ties going to the first seen.
    pub fn most_frequent_class(&self) -> Option<&str> {
        self.classes.most_frequent()
    }

    /// Most frequent class, or [`DEFAULT_CLASS`] if none was recorded.
    pub fn class_label(&self) -> &str {
        self.most_frequent_class().unwrap_or(DEFAULT_CLASS)
    }

    /// Prototype values formatted with `precision` decimals, comma separated.
    pub fn data_as_string(&self, precision: usize) -> String {
        self.data
            .iter()
            .map(|c| format!("{:.*}", precision, c.value()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`SotaTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no cells")]
    EmptyTree,

    #[error("cell {cell:?} references {child:?} outside the arena of {n_cells} cells")]
    ChildOutOfBounds {
        cell: CellId,
        child: CellId,
        n_cells: usize,
    },

    #[error("cell {cell:?} must be a leaf or have two children")]
    InconsistentLeafFlag { cell: CellId },

    #[error("cell {child:?} does not point back to its parent {parent:?}")]
    BrokenAncestor { parent: CellId, child: CellId },

    #[error("children of {parent:?} are not mutual sisters")]
    BrokenSisters { parent: CellId },

    #[error("cell {cell:?} was reached more than once")]
    DuplicateVisit { cell: CellId },

    #[error("cell {cell:?} is unreachable from the root")]
    UnreachableCell { cell: CellId },

    #[error("cell {cell:?} has {got} values, expected {expected}")]
    DimensionMismatch {
        cell: CellId,
        expected: usize,
        got: usize,
    },
}

// ============================================================================
// SotaTree
// ============================================================================

/// The SOTA binary tree.
///
/// The root is always cell 0. Cells are never removed, so ids stay stable for
/// the lifetime of the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct SotaTree {
    cells: Vec<TreeCell>,
}

impl SotaTree {
    /// Create a tree consisting of a single root leaf at level 1.
    pub fn new(root_data: Vec<CellValue>) -> Self {
        Self {
            cells: vec![TreeCell::leaf(root_data, 1)],
        }
    }

    /// Build a tree from an arena without validating it.
    pub(crate) fn from_cells(cells: Vec<TreeCell>) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn root_id(&self) -> CellId {
        CellId(0)
    }

    #[inline]
    pub fn root(&self) -> &TreeCell {
        &self.cells[0]
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of prototype values per cell.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.root().data.len()
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> &TreeCell {
        &self.cells[id.index()]
    }

    #[inline]
    pub fn cell_mut(&mut self, id: CellId) -> &mut TreeCell {
        &mut self.cells[id.index()]
    }

    #[inline]
    pub fn get(&self, id: CellId) -> Option<&TreeCell> {
        self.cells.get(id.index())
    }

    /// Iterate over `(id, cell)` pairs in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &TreeCell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellId(i as u32), c))
    }

    pub(crate) fn cells(&self) -> &[TreeCell] {
        &self.cells
    }

    /// Split the leaf `id` into two children.
    ///
    /// Both children receive a deep copy of the prototype, level
    /// `parent.level + 1`, zero resource and variability, and no rows. They
    /// are each other's sister and have `id` as ancestor. `hierarchy_level`
    /// tags the children with the hierarchy level being trained.
    ///
    /// Returns `false` and does nothing if `id` is already split.
    pub fn split(&mut self, id: CellId, hierarchy_level: u32) -> bool {
        let parent = &self.cells[id.index()];
        if !parent.is_leaf {
            return false;
        }

        let level_in_hierarchy = if parent.hierarchy_level != hierarchy_level {
            1
        } else {
            parent.level_in_hierarchy + 1
        };

        let mut child = TreeCell::leaf(parent.data.clone(), parent.level + 1);
        child.ancestor = Some(id);
        child.hierarchy_level = hierarchy_level;
        child.level_in_hierarchy = level_in_hierarchy;

        let left = CellId(self.cells.len() as u32);
        let right = CellId(left.0 + 1);

        let mut left_cell = child.clone();
        left_cell.sister = Some(right);
        child.sister = Some(left);

        self.cells.push(left_cell);
        self.cells.push(child);

        let parent = &mut self.cells[id.index()];
        parent.left = Some(left);
        parent.right = Some(right);
        parent.is_leaf = false;
        true
    }

    /// All current leaves, pre-order, left before right.
    pub fn leaves(&self) -> Vec<CellId> {
        self.leaves_under(self.root_id())
    }

    /// Leaves of the subtree rooted at `id`, pre-order, left before right.
    pub fn leaves_under(&self, id: CellId) -> Vec<CellId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let cell = &self.cells[current.index()];
            if cell.is_leaf {
                out.push(current);
            } else {
                // Push right first so left is visited first.
                if let Some(r) = cell.right {
                    stack.push(r);
                }
                if let Some(l) = cell.left {
                    stack.push(l);
                }
            }
        }
        out
    }

    /// Number of current leaves.
    pub fn n_leaves(&self) -> usize {
        self.cells.iter().filter(|c| c.is_leaf).count()
    }

    /// Maximum cell level in the tree.
    pub fn depth(&self) -> u32 {
        self.cells.iter().map(|c| c.level).max().unwrap_or(0)
    }

    /// Validate the structural invariants of the tree.
    ///
    /// Checks child bounds, the leaf/two-children exclusivity, ancestor and
    /// sister back-references, reachability, and that every cell has the
    /// root's dimension.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_cells = self.cells.len();
        if n_cells == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let dimension = self.cells[0].data.len();
        let mut visited = vec![false; n_cells];
        let mut stack = vec![CellId(0)];

        while let Some(id) = stack.pop() {
            if visited[id.index()] {
                return Err(TreeValidationError::DuplicateVisit { cell: id });
            }
            visited[id.index()] = true;
            let cell = &self.cells[id.index()];

            if cell.data.len() != dimension {
                return Err(TreeValidationError::DimensionMismatch {
                    cell: id,
                    expected: dimension,
                    got: cell.data.len(),
                });
            }

            match (cell.is_leaf, cell.left, cell.right) {
                (true, None, None) => {}
                (false, Some(l), Some(r)) => {
                    for child in [l, r] {
                        if child.index() >= n_cells {
                            return Err(TreeValidationError::ChildOutOfBounds {
                                cell: id,
                                child,
                                n_cells,
                            });
                        }
                        if self.cells[child.index()].ancestor != Some(id) {
                            return Err(TreeValidationError::BrokenAncestor { parent: id, child });
                        }
                    }
                    if self.cells[l.index()].sister != Some(r)
                        || self.cells[r.index()].sister != Some(l)
                    {
                        return Err(TreeValidationError::BrokenSisters { parent: id });
                    }
                    stack.push(r);
                    stack.push(l);
                }
                _ => return Err(TreeValidationError::InconsistentLeafFlag { cell: id }),
            }
        }

        if let Some(i) = visited.iter().position(|v| !v) {
            return Err(TreeValidationError::UnreachableCell {
                cell: CellId(i as u32),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_tree(values: &[f64]) -> SotaTree {
        SotaTree::new(values.iter().map(|&v| CellValue::Scalar(v)).collect())
    }

    #[test]
    fn new_tree_is_single_leaf() {
        let tree = scalar_tree(&[1.0, 2.0]);
        assert_eq!(tree.n_cells(), 1);
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().level(), 1);
        assert_eq!(tree.leaves(), vec![CellId(0)]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn split_creates_linked_children() {
        let mut tree = scalar_tree(&[1.0, 2.0]);
        tree.cell_mut(CellId(0)).data_ids_mut().extend([0, 1, 2]);
        tree.cell_mut(CellId(0)).set_resource(4.0);

        assert!(tree.split(CellId(0), 1));

        let root = tree.root();
        assert!(!root.is_leaf());
        let (l, r) = (root.left().unwrap(), root.right().unwrap());
        for (child, sister) in [(l, r), (r, l)] {
            let c = tree.cell(child);
            assert!(c.is_leaf());
            assert_eq!(c.ancestor(), Some(CellId(0)));
            assert_eq!(c.sister(), Some(sister));
            assert_eq!(c.level(), 2);
            assert_eq!(c.resource(), 0.0);
            assert!(c.data_ids().is_empty());
            assert_eq!(c.data(), root.data());
        }
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn split_twice_is_noop() {
        let mut tree = scalar_tree(&[0.0]);
        assert!(tree.split(CellId(0), 1));
        assert!(!tree.split(CellId(0), 1));
        assert_eq!(tree.n_cells(), 3);
    }

    #[test]
    fn hierarchy_bookkeeping() {
        let mut tree = scalar_tree(&[0.0]);
        tree.split(CellId(0), 1);
        let left = tree.root().left().unwrap();
        assert_eq!(tree.cell(left).level_in_hierarchy(), 1);

        tree.split(left, 1);
        let grandchild = tree.cell(left).left().unwrap();
        assert_eq!(tree.cell(grandchild).level_in_hierarchy(), 2);

        tree.split(grandchild, 2);
        let next = tree.cell(grandchild).right().unwrap();
        assert_eq!(tree.cell(next).hierarchy_level(), 2);
        assert_eq!(tree.cell(next).level_in_hierarchy(), 1);
    }

    #[test]
    fn leaves_are_pre_order_left_first() {
        let mut tree = scalar_tree(&[0.0]);
        tree.split(CellId(0), 1); // 1, 2
        tree.split(CellId(1), 1); // 3, 4
        tree.split(CellId(4), 1); // 5, 6
        assert_eq!(
            tree.leaves(),
            vec![CellId(3), CellId(5), CellId(6), CellId(2)]
        );
        assert_eq!(tree.leaves_under(CellId(1)), vec![CellId(3), CellId(5), CellId(6)]);
        assert_eq!(tree.n_leaves(), 4);
        assert_eq!(tree.depth(), 4);
    }

    #[test]
    fn cloned_tree_is_independent() {
        let mut tree = scalar_tree(&[1.0]);
        tree.split(CellId(0), 1);
        let mut copy = tree.clone();
        copy.cell_mut(CellId(1)).data_mut()[0] = CellValue::Scalar(9.0);
        copy.cell_mut(CellId(1)).data_ids_mut().push(3);

        assert_eq!(tree.cell(CellId(1)).data()[0], CellValue::Scalar(1.0));
        assert!(tree.cell(CellId(1)).data_ids().is_empty());
    }

    #[test]
    fn validate_detects_broken_sisters() {
        let mut tree = scalar_tree(&[1.0]);
        tree.split(CellId(0), 1);
        tree.cell_mut(CellId(1)).sister = None;
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::BrokenSisters { parent: CellId(0) })
        );
    }

    #[test]
    fn validate_detects_leaf_flag_mismatch() {
        let mut tree = scalar_tree(&[1.0]);
        tree.split(CellId(0), 1);
        tree.cell_mut(CellId(0)).is_leaf = true;
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::InconsistentLeafFlag { cell: CellId(0) })
        );
    }

    #[test]
    fn class_label_defaults() {
        let mut cell = TreeCell::leaf(vec![], 1);
        assert_eq!(cell.class_label(), DEFAULT_CLASS);
        cell.add_class(None);
        cell.add_class(Some("x"));
        assert_eq!(cell.class_label(), "x");
    }

    #[test]
    fn data_as_string_uses_precision() {
        let cell = TreeCell::leaf(vec![CellValue::Scalar(1.0), CellValue::Scalar(2.345)], 1);
        assert_eq!(cell.data_as_string(2), "1.00, 2.35");
    }
}
