//! SOTA training state machine.
//!
//! [`SotaManager`] grows a [`SotaTree`] over a [`DataTable`]:
//!
//! 1. [`initialize_tree`](SotaManager::initialize_tree) creates the root from
//!    the column means, splits it once and assigns every complete row.
//! 2. [`do_epoch`](SotaManager::do_epoch) moves every leaf towards its rows
//!    and recomputes resources.
//! 3. [`do_cycle`](SotaManager::do_cycle) runs epochs until the relative
//!    error change drops below `min_error`, then splits the cell with the
//!    highest resource.
//! 4. [`do_training`](SotaManager::do_training) runs cycles until the
//!    resource (or variability) criterion holds, per hierarchy level.
//!
//! Every inner loop checks the [`ExecutionMonitor`] for cancellation. A split
//! and the reassignment of its rows happen after the last check, so a
//! cancelled run leaves the tree as of its last completed split. Adjustments
//! made by an interrupted epoch are kept.

use super::{DistanceManager, HierarchyFilter, TrainingHelper};
use crate::data::{DataTable, Row};
use crate::model::sota::SotaConfig;
use crate::repr::sota::{CellId, CellKind, SotaTree, TreeCell};
use crate::training::{Cancelled, ExecutionMonitor, TrainingError, TrainingLogger};

/// Lifecycle of a [`SotaManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingState {
    Uninitialized,
    Initialized,
    Training,
    Converged,
}

/// Everything bound to one initialized training run.
struct Run<'a> {
    data: &'a dyn DataTable,
    monitor: &'a dyn ExecutionMonitor,
    class_column: Option<usize>,
    helper: TrainingHelper,
    distance: DistanceManager,
    filter: HierarchyFilter,
    tree: SotaTree,
}

/// Drives SOTA training.
///
/// ```
/// use treemine::data::Table;
/// use treemine::model::sota::SotaConfig;
/// use treemine::training::sota::SotaManager;
/// use treemine::training::NoopMonitor;
/// use ndarray::array;
///
/// let data = array![[0.0], [1.0], [10.0], [11.0]];
/// let table = Table::from_array(data.view());
/// let config = SotaConfig::builder().min_resource(5.0).build().unwrap();
///
/// let mut manager = SotaManager::new(config);
/// manager.initialize_tree(&table, None, &NoopMonitor).unwrap();
/// manager.do_training().unwrap();
/// assert!(manager.is_trained());
/// assert_eq!(manager.tree().unwrap().n_leaves(), 2);
/// ```
pub struct SotaManager<'a> {
    config: SotaConfig,
    logger: TrainingLogger,
    state: TrainingState,
    run: Option<Run<'a>>,
    epoch: u64,
    cycle: u64,
    max_resource: f64,
    max_resource_cell: Option<CellId>,
    last_cycle_split: bool,
}

impl<'a> SotaManager<'a> {
    pub fn new(config: SotaConfig) -> Self {
        let logger = TrainingLogger::new(config.verbosity);
        Self {
            config,
            logger,
            state: TrainingState::Uninitialized,
            run: None,
            epoch: 0,
            cycle: 0,
            max_resource: 0.0,
            max_resource_cell: None,
            last_cycle_split: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &SotaConfig {
        &self.config
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Whether [`do_training`](Self::do_training) completed.
    pub fn is_trained(&self) -> bool {
        self.state == TrainingState::Converged
    }

    pub fn tree(&self) -> Option<&SotaTree> {
        self.run.as_ref().map(|r| &r.tree)
    }

    pub fn root(&self) -> Option<&TreeCell> {
        self.tree().map(SotaTree::root)
    }

    /// Number of prototype values per cell; 0 before initialization.
    pub fn dimension(&self) -> usize {
        self.run.as_ref().map_or(0, |r| r.helper.dimension())
    }

    /// Whether the run trains fuzzy cells.
    pub fn is_fuzzy(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|r| r.helper.kind() == CellKind::Fuzzy)
    }

    /// Active feature column indices of the run.
    pub fn feature_columns(&self) -> &[usize] {
        match &self.run {
            Some(run) => run.helper.columns(),
            None => &[],
        }
    }

    /// Number of epochs run so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of splits performed by cycles so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Highest leaf resource of the last epoch, among leaves with > 1 row.
    pub fn max_resource(&self) -> f64 {
        self.max_resource
    }

    pub fn current_hierarchy_level(&self) -> u32 {
        self.run.as_ref().map_or(1, |r| r.filter.level())
    }

    pub fn max_hierarchy_level(&self) -> u32 {
        self.run.as_ref().map_or(1, |r| r.filter.max_level())
    }

    /// Drop the current run and return to [`TrainingState::Uninitialized`].
    pub fn reset(&mut self) {
        self.run = None;
        self.state = TrainingState::Uninitialized;
        self.epoch = 0;
        self.cycle = 0;
        self.max_resource = 0.0;
        self.max_resource_cell = None;
        self.last_cycle_split = false;
    }

    /// Take the grown tree, if any.
    pub fn into_tree(self) -> Option<SotaTree> {
        self.run.map(|r| r.tree)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Prepare a training run over `data`.
    ///
    /// Fuzzy mode is selected if the table has a fuzzy interval column or
    /// hierarchical fuzzy training is enabled. The root holds the mean of the
    /// complete rows and is split once; every complete row of the first
    /// hierarchy level is then assigned to the nearer child.
    ///
    /// `class_column` names a column whose string values are recorded as
    /// class labels of the cells rows are assigned to.
    ///
    /// # Errors
    ///
    /// - [`TrainingError::ClassColumnOutOfRange`] for a bad class column
    /// - [`TrainingError::NoFeatureColumns`] if no column can be trained on
    /// - [`TrainingError::NoTrainingRows`] if no row is complete
    /// - [`TrainingError::Cancelled`] if the monitor cancels
    pub fn initialize_tree(
        &mut self,
        data: &'a dyn DataTable,
        class_column: Option<usize>,
        monitor: &'a dyn ExecutionMonitor,
    ) -> Result<(), TrainingError> {
        self.reset();

        let schema = data.schema();
        if let Some(column) = class_column {
            if column >= schema.n_columns() {
                return Err(TrainingError::ClassColumnOutOfRange {
                    column,
                    n_columns: schema.n_columns(),
                });
            }
        }

        monitor.check_cancelled()?;
        monitor.set_progress(0.01, "Preparing data");

        let hierarchical = self.config.use_hierarchical_fuzzy_data;
        let kind = if schema.has_fuzzy() || hierarchical {
            CellKind::Fuzzy
        } else {
            CellKind::Scalar
        };
        let filter = if hierarchical {
            HierarchyFilter::new(data)
        } else {
            HierarchyFilter::flat()
        };

        let helper = TrainingHelper::new(schema, kind)?;
        let distance = DistanceManager::new(self.config.distance, helper.columns().to_vec());
        let rows = filter.rows(data);

        monitor.check_cancelled()?;
        let mut tree = helper.initialize_tree(data, &rows, filter.level(), monitor)?;

        let root = tree.root_id();
        let n_rows = rows.len().max(1) as f64;
        for (i, &r) in rows.iter().enumerate() {
            monitor.check_cancelled()?;
            if helper.is_complete(data.row(r)) {
                tree.cell_mut(root).data_ids_mut().push(r);
            }
            monitor.set_progress(0.01 + 0.1 * (i + 1) as f64 / n_rows, "Assigning data");
        }

        self.logger
            .start_training(rows.len(), helper.dimension(), kind.is_fuzzy());

        let mut run = Run {
            data,
            monitor,
            class_column,
            helper,
            distance,
            filter,
            tree,
        };
        run.assign_to_children(&self.config, root);

        self.run = Some(run);
        self.state = TrainingState::Initialized;
        Ok(())
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Run one epoch and return the summed leaf resource.
    ///
    /// Each leaf is adjusted towards each of its rows (its sister and
    /// ancestor too while the sister is a leaf). Then every leaf's resource
    /// is set to the mean distance of its rows, and the leaf with the highest
    /// resource among those holding more than one row becomes the split
    /// candidate.
    pub fn do_epoch(&mut self) -> Result<f64, TrainingError> {
        let run = self.run.as_mut().ok_or(TrainingError::NotInitialized)?;
        let data = run.data;
        let leaves = run.tree.leaves();

        for &leaf in &leaves {
            let ids = run.tree.cell(leaf).data_ids().to_vec();
            for id in ids {
                run.monitor.check_cancelled()?;
                run.adjust(&self.config, leaf, data.row(id), None);
            }
        }

        let mut error = 0.0;
        let mut max_resource = 0.0;
        let mut max_resource_cell = None;

        for &leaf in &leaves {
            let cell = run.tree.cell(leaf);
            let n = cell.data_ids().len();
            let mut resource = 0.0;
            for &id in cell.data_ids() {
                run.monitor.check_cancelled()?;
                resource += run.distance.row_to_cell(data.row(id), cell.data());
            }
            if n > 0 {
                resource /= n as f64;
            }
            run.tree.cell_mut(leaf).set_resource(resource);
            error += resource;

            if max_resource < resource && n > 1 {
                max_resource = resource;
                max_resource_cell = Some(leaf);
            }
        }

        self.max_resource = max_resource;
        self.max_resource_cell = max_resource_cell;
        self.epoch += 1;
        self.logger.log_epoch(self.epoch, error);
        Ok(error)
    }

    /// Run epochs until convergence, then split the split candidate.
    ///
    /// Epochs repeat while `|(e2 - e1) / e1| >= min_error`. With variability
    /// enabled each leaf's variability (maximum pairwise row distance) is
    /// computed and the largest is returned; otherwise 0 is returned. The
    /// candidate is split if the active criterion is still above its minimum.
    pub fn do_cycle(&mut self) -> Result<f64, TrainingError> {
        if self.state == TrainingState::Uninitialized {
            return Err(TrainingError::NotInitialized);
        }

        let mut e1 = self.do_epoch()?;
        let mut e2 = self.do_epoch()?;
        while relative_change(e1, e2) >= self.config.min_error {
            self.check_cancelled()?;
            e1 = e2;
            e2 = self.do_epoch()?;
        }

        let run = self.run.as_mut().ok_or(TrainingError::NotInitialized)?;

        let mut variability = 0.0;
        if self.config.use_variability {
            let leaves = run.tree.leaves();
            let (tree, data, distance, monitor) = (&run.tree, run.data, &run.distance, run.monitor);
            let values = self.config.parallelism.maybe_par_map(leaves.clone(), |leaf| {
                leaf_variability(tree.cell(leaf).data_ids(), data, distance, monitor)
            });
            for (leaf, value) in leaves.into_iter().zip(values) {
                let value = value?;
                run.tree.cell_mut(leaf).set_max_distance(value);
                if value > variability {
                    variability = value;
                }
            }
        }

        self.last_cycle_split = false;
        if let Some(cell) = self.max_resource_cell {
            let pending = if self.config.use_variability {
                variability > self.config.min_variability
            } else {
                self.max_resource > self.config.min_resource
            };
            if pending && run.tree.split(cell, run.filter.level()) {
                run.assign_to_children(&self.config, cell);
                self.cycle += 1;
                self.last_cycle_split = true;
                self.max_resource_cell = None;
            }
        }

        let n_leaves = run.tree.n_leaves();
        self.logger
            .log_cycle(self.cycle, n_leaves, self.max_resource, variability);
        Ok(variability)
    }

    /// Train until the stopping criterion holds on every hierarchy level.
    ///
    /// Cycles run while the maximum resource exceeds `min_resource` (or the
    /// variability exceeds `min_variability` when enabled). A cycle that does
    /// not split ends the level. Between hierarchy levels the row keys of the
    /// assigned rows are kept in `row_keys`, assignments are cleared and the
    /// next level's rows are assigned to their nearest leaf.
    ///
    /// Returns the variability of the last cycle.
    pub fn do_training(&mut self) -> Result<f64, TrainingError> {
        if self.run.is_none() {
            return Err(TrainingError::NotInitialized);
        }
        self.state = TrainingState::Training;

        let mut variability;
        loop {
            if let Some(run) = &self.run {
                let n_rows = run.filter.rows(run.data).len();
                self.logger
                    .log_level(run.filter.level(), run.filter.max_level(), n_rows);
            }

            self.check_cancelled()?;
            variability = self.do_cycle()?;
            let span_var = variability - self.config.min_variability;
            let span_res = self.max_resource - self.config.min_resource;

            loop {
                let (remaining, span) = if self.config.use_variability {
                    (variability - self.config.min_variability, span_var)
                } else {
                    (self.max_resource - self.config.min_resource, span_res)
                };
                if remaining <= 0.0 || !self.last_cycle_split {
                    break;
                }
                let progress = if span > 0.0 { 1.0 - remaining / span } else { 0.0 };
                self.set_progress(
                    progress.clamp(0.0, 1.0),
                    &format!("Cycle: {} has been trained", self.cycle),
                );

                self.check_cancelled()?;
                variability = self.do_cycle()?;
            }

            let run = self.run.as_mut().ok_or(TrainingError::NotInitialized)?;
            if !run.filter.advance() {
                break;
            }
            run.next_level();
        }

        self.set_progress(1.0, "Training is finished");
        self.state = TrainingState::Converged;
        if let Some(run) = &self.run {
            self.logger
                .finish_training(run.tree.n_leaves(), self.epoch, self.cycle);
        }
        Ok(variability)
    }

    fn check_cancelled(&self) -> Result<(), Cancelled> {
        match &self.run {
            Some(run) => run.monitor.check_cancelled(),
            None => Ok(()),
        }
    }

    fn set_progress(&self, fraction: f64, message: &str) {
        if let Some(run) = &self.run {
            run.monitor.set_progress(fraction, message);
        }
    }
}

impl<'a> Run<'a> {
    /// Adjust `winner` towards `row`; while its sister is a leaf, adjust the
    /// sister and the ancestor as well.
    fn adjust(&mut self, config: &SotaConfig, winner: CellId, row: &Row, class: Option<&str>) {
        self.helper
            .adjust_cell(self.tree.cell_mut(winner), row, config.lr_winner, class);

        let cell = self.tree.cell(winner);
        if let (Some(sister), Some(ancestor)) = (cell.sister(), cell.ancestor()) {
            if self.tree.cell(sister).is_leaf() {
                self.helper
                    .adjust_cell(self.tree.cell_mut(sister), row, config.lr_sister, class);
                self.helper
                    .adjust_cell(self.tree.cell_mut(ancestor), row, config.lr_ancestor, class);
            }
        }
    }

    /// Distribute the rows of a freshly split cell over its children.
    ///
    /// With more than two rows each goes to the nearer child (ties to the
    /// left) which is then adjusted towards it. Two rows go left and right in
    /// order; a single row goes left. The parent keeps its row ids.
    fn assign_to_children(&mut self, config: &SotaConfig, parent: CellId) {
        let cell = self.tree.cell(parent);
        let (Some(left), Some(right)) = (cell.left(), cell.right()) else {
            return;
        };
        let ids = cell.data_ids().to_vec();
        let data = self.data;

        match ids.len() {
            0 => {}
            1 => {
                let row = data.row(ids[0]);
                self.tree.cell_mut(left).data_ids_mut().push(ids[0]);
                self.adjust(config, left, row, class_of(self.class_column, row));
            }
            2 => {
                for (id, child) in [(ids[0], left), (ids[1], right)] {
                    let row = data.row(id);
                    self.tree.cell_mut(child).data_ids_mut().push(id);
                    self.adjust(config, child, row, class_of(self.class_column, row));
                }
            }
            _ => {
                for id in ids {
                    let row = data.row(id);
                    let d_left = self.distance.row_to_cell(row, self.tree.cell(left).data());
                    let d_right = self.distance.row_to_cell(row, self.tree.cell(right).data());
                    let winner = if d_left > d_right { right } else { left };

                    let winner_ids = self.tree.cell_mut(winner).data_ids_mut();
                    if !winner_ids.contains(&id) {
                        winner_ids.push(id);
                    }
                    self.adjust(config, winner, row, class_of(self.class_column, row));
                }
            }
        }
    }

    /// Move to the rows of the (already advanced) hierarchy level.
    fn next_level(&mut self) {
        let data = self.data;
        let leaves = self.tree.leaves();

        for &leaf in &leaves {
            let cell = self.tree.cell_mut(leaf);
            let keys: Vec<String> = cell
                .data_ids()
                .iter()
                .map(|&id| data.row(id).key().to_string())
                .collect();
            cell.row_keys.extend(keys);
            cell.data_ids_mut().clear();
        }

        for r in self.filter.rows(data) {
            let row = data.row(r);
            if !self.helper.is_complete(row) {
                continue;
            }
            let mut winner = None;
            let mut min_dist = f64::MAX;
            for &leaf in &leaves {
                let d = self.distance.row_to_cell(row, self.tree.cell(leaf).data());
                if d < min_dist {
                    min_dist = d;
                    winner = Some(leaf);
                }
            }
            if let Some(w) = winner {
                self.tree.cell_mut(w).data_ids_mut().push(r);
            }
        }
    }
}

/// Class label of `row`, read from a string cell of the class column.
fn class_of(class_column: Option<usize>, row: &Row) -> Option<&str> {
    class_column.and_then(|c| row.cell(c).as_str())
}

/// `|(e2 - e1) / e1|`, with `0/0` taken as no change.
fn relative_change(e1: f64, e2: f64) -> f64 {
    if e1 == 0.0 {
        if e2 == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        ((e2 - e1) / e1).abs()
    }
}

/// Maximum pairwise distance among the given rows.
fn leaf_variability(
    ids: &[usize],
    data: &dyn DataTable,
    distance: &DistanceManager,
    monitor: &dyn ExecutionMonitor,
) -> Result<f64, Cancelled> {
    let mut max = 0.0f64;
    for (i, &a) in ids.iter().enumerate() {
        let row_a = data.row(a);
        for &b in &ids[i + 1..] {
            monitor.check_cancelled()?;
            max = max.max(distance.row_to_row(row_a, data.row(b)));
        }
    }
    Ok(max)
}
