use crate::{
    algorithm::propagation::{PropagationMode, PropagationReport, propagate},
    algorithm::selection::{RandomSelector, select_min_entropy_cell},
    analysis::adjacency::AdjacencyModel,
    analysis::patterns::{Pattern, PatternCatalog, PatternId, Sample},
    analysis::weights::WeightTable,
    io::configuration::{GenerationOptions, MAX_GRID_DIMENSION},
    io::error::{Result, WfcError, invalid_parameter},
    spatial::{Direction, Grid},
};
use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Complete generation state: the grid plus everything learned from the sample
///
/// A state is exclusively owned by whoever drives it. [`WfcState::tick`]
/// consumes the state and hands back the advanced one, so a live grid is
/// never shared between concurrent collapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfcState {
    pub(crate) grid: Grid,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) weights: WeightTable,
    pub(crate) adjacency: AdjacencyModel,
    pub(crate) pattern_size: usize,
    #[serde(default)]
    pub(crate) mode: PropagationMode,
    #[serde(default)]
    pub(crate) complete: bool,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvent {
    /// Collapsed cell and the pattern it received, if a collapse happened
    pub collapsed: Option<((usize, usize), PatternId)>,
    /// Entropy of the chosen cell before the collapse
    pub entropy: f64,
    /// Cells narrowed by propagation
    pub propagation: PropagationReport,
    /// Collapsed cells after the tick
    pub collapsed_count: usize,
    /// Total cells in the grid
    pub cell_count: usize,
}

impl WfcState {
    /// Learn patterns from `sample` and open a `width x height` grid
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The sample is smaller than `pattern_size` in either dimension
    /// - `pattern_size` is zero
    /// - `width` or `height` is zero or exceeds the maximum grid dimension
    pub fn init(sample: &Sample, pattern_size: usize, width: usize, height: usize) -> Result<Self> {
        Self::init_with(
            sample,
            pattern_size,
            width,
            height,
            GenerationOptions::default(),
        )
    }

    /// As [`WfcState::init`], with explicit generation options
    ///
    /// # Errors
    ///
    /// Same conditions as [`WfcState::init`]
    pub fn init_with(
        sample: &Sample,
        pattern_size: usize,
        width: usize,
        height: usize,
        options: GenerationOptions,
    ) -> Result<Self> {
        validate_dimension("width", width)?;
        validate_dimension("height", height)?;

        let catalog = PatternCatalog::extract(sample, pattern_size)?;
        let weights = WeightTable::from_catalog(&catalog);
        let patterns = catalog.into_patterns();
        let adjacency = AdjacencyModel::build(&patterns);
        let grid = Grid::new(width, height, patterns.len());

        info!(
            "Initialized {width}x{height} grid with {} patterns (size {pattern_size}, {:?} propagation)",
            patterns.len(),
            options.mode
        );

        Ok(Self {
            grid,
            width,
            height,
            patterns,
            weights,
            adjacency,
            pattern_size,
            mode: options.mode,
            complete: false,
        })
    }

    /// Collapse the least uncertain cell and propagate the consequences
    ///
    /// Returns the advanced state and whether every cell is now collapsed.
    /// A state with nothing left to collapse reports completion without
    /// further work the first time it is ticked.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Completion was already reported for this state (`NoUncollapsedCells`)
    /// - Propagation emptied a cell's domain (`Contradiction`)
    pub fn tick(self, selector: &mut RandomSelector) -> Result<(Self, bool)> {
        let (state, event) = self.tick_with_event(selector)?;
        let complete = state.complete;
        debug!(
            "Tick collapsed {:?}, {}/{} cells fixed",
            event.collapsed, event.collapsed_count, event.cell_count
        );
        Ok((state, complete))
    }

    /// As [`WfcState::tick`], also describing what the tick did
    ///
    /// # Errors
    ///
    /// Same conditions as [`WfcState::tick`]
    pub fn tick_with_event(mut self, selector: &mut RandomSelector) -> Result<(Self, TickEvent)> {
        if self.complete {
            return Err(WfcError::NoUncollapsedCells);
        }

        let cell_count = self.width * self.height;
        let Some(choice) = select_min_entropy_cell(&self.grid, &self.weights) else {
            self.complete = true;
            let event = TickEvent {
                collapsed: None,
                entropy: 0.0,
                propagation: PropagationReport::default(),
                collapsed_count: self.grid.collapsed_count(),
                cell_count,
            };
            return Ok((self, event));
        };

        let (x, y) = (choice.x, choice.y);
        let pattern = self
            .grid
            .get(x, y)
            .and_then(|cell| selector.choose_pattern(&cell.domain, &self.weights))
            .ok_or(WfcError::Contradiction { x, y })?;

        if let Some(cell) = self.grid.get_mut(x, y) {
            cell.collapse_to(pattern);
        }

        let propagation = propagate(&mut self.grid, &self.adjacency, (x, y), self.mode)?;
        self.complete = self.grid.uncollapsed_count() == 0;

        let event = TickEvent {
            collapsed: Some(((x, y), pattern)),
            entropy: choice.entropy,
            propagation,
            collapsed_count: self.grid.collapsed_count(),
            cell_count,
        };
        Ok((self, event))
    }

    /// Pattern id of every cell, `None` where the cell is not yet collapsed
    ///
    /// Indexed `[y, x]`; safe to call at any point of a run.
    pub fn output(&self) -> Array2<Option<PatternId>> {
        self.grid
            .cells()
            .map(|cell| if cell.collapsed { cell.tile } else { None })
    }

    /// Sample tile shown by each cell: the top-left tile of its pattern
    pub fn render_tiles(&self) -> Array2<Option<usize>> {
        self.output().map(|&id| {
            id.and_then(|id| self.patterns.get(id))
                .and_then(Pattern::anchor_tile)
        })
    }

    /// True once a tick has reported that every cell is collapsed
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of collapsed cells
    pub fn collapsed_count(&self) -> usize {
        self.grid.collapsed_count()
    }

    /// The cell grid
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Output width in cells
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Output height in cells
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Patterns in id order
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Pattern weights
    pub const fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Adjacency rules
    pub const fn adjacency(&self) -> &AdjacencyModel {
        &self.adjacency
    }

    /// Side length of the patterns
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Propagation mode fixed at initialization
    pub const fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Check that a state received from outside is internally coherent
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first inconsistency found
    pub fn validate(&self) -> Result<()> {
        if self.grid.width() != self.width || self.grid.height() != self.height {
            return Err(invalid_parameter(
                "grid",
                &format!("{}x{}", self.grid.width(), self.grid.height()),
                &format!("does not match declared {}x{}", self.width, self.height),
            ));
        }

        let count = self.patterns.len();
        if count == 0 {
            return Err(invalid_parameter("patterns", &0, &"state has no patterns"));
        }
        if self.weights.len() != count || self.adjacency.pattern_count() != count {
            return Err(invalid_parameter(
                "patterns",
                &count,
                &"weights or adjacency cover a different number of patterns",
            ));
        }
        if let Some((index, pattern)) = self
            .patterns
            .iter()
            .enumerate()
            .find(|(index, pattern)| pattern.id != *index)
        {
            return Err(invalid_parameter(
                "patterns",
                &pattern.id,
                &format!("pattern at position {index} carries a different id"),
            ));
        }

        if let Some(pattern) = self
            .patterns
            .iter()
            .find(|pattern| pattern.cells.dim() != (self.pattern_size, self.pattern_size))
        {
            let (rows, cols) = pattern.cells.dim();
            return Err(invalid_parameter(
                "patterns",
                &format!("{cols}x{rows}"),
                &format!(
                    "pattern {} is not {size}x{size}",
                    pattern.id,
                    size = self.pattern_size
                ),
            ));
        }
        if let Some(weight) = self
            .weights
            .as_slice()
            .iter()
            .find(|w| !w.is_finite() || **w < 0.0)
        {
            return Err(invalid_parameter(
                "weights",
                weight,
                &"weights must be finite and non-negative",
            ));
        }
        for direction in Direction::ALL {
            let compatible = &self.adjacency.rules(direction).compatible;
            if compatible.len() != count || compatible.iter().any(|set| set.capacity() != count) {
                return Err(invalid_parameter(
                    "adjacency",
                    &direction,
                    &format!("rules do not cover exactly {count} patterns"),
                ));
            }
        }

        for ((x, y), cell) in self.grid.iter_row_major() {
            if cell.domain.capacity() != count || !cell.is_consistent() || cell.domain.is_empty()
            {
                return Err(invalid_parameter(
                    "grid",
                    &format!("({x}, {y})"),
                    &"cell domain does not match its collapsed flag or pattern count",
                ));
            }
        }

        let uncollapsed = self.grid.uncollapsed_count();
        if self.complete && uncollapsed > 0 {
            return Err(invalid_parameter(
                "complete",
                &true,
                &format!("{uncollapsed} cells are still uncollapsed"),
            ));
        }

        Ok(())
    }
}

fn validate_dimension(parameter: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(invalid_parameter(parameter, &value, &"must be at least 1"));
    }
    if value > MAX_GRID_DIMENSION {
        return Err(invalid_parameter(
            parameter,
            &value,
            &format!("must not exceed {MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}
