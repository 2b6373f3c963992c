//! Interpolation engine interface.
//!
//! The fill pass drives an engine through four calls: initialise with
//! parameters, load points, run once, then pull the filled surface back one
//! row at a time (south to north). All coordinates are in zero-based grid
//! units with corner-post semantics (see `coords`).

/// One known value fed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Grid-unit bounding box the engine covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Parameters handed to the engine at initialisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    pub x_interval: f64,
    pub y_interval: f64,
    /// Convergence criterion.
    pub delta: f64,
    /// Spacing (in nodes) of the regional pre-grid.
    pub reg_interval: u32,
    pub search_radius: f64,
    /// Number of neighbouring points considered per node.
    pub error_factor: u32,
    pub max_value: f64,
    pub min_value: f64,
    /// Distance weighting exponent.
    pub weight: i32,
    pub bounds: GridBox,
}

impl EngineParams {
    /// The parameters used for a `cols` x `rows` grid.
    pub fn for_grid(cols: u32, rows: u32) -> Self {
        Self {
            x_interval: 1.0,
            y_interval: 1.0,
            delta: 0.05,
            reg_interval: 4,
            search_radius: 20.0,
            error_factor: 20,
            max_value: 999_999.0,
            min_value: -999_999.0,
            weight: 2,
            bounds: GridBox {
                min_x: 0.0,
                min_y: 0.0,
                max_x: f64::from(cols),
                max_y: f64::from(rows),
            },
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let b = &self.bounds;
        if !(self.x_interval > 0.0 && self.y_interval > 0.0) {
            return Err(EngineError::InvalidParams("grid intervals must be > 0".to_string()));
        }
        if !(b.max_x > b.min_x && b.max_y > b.min_y) {
            return Err(EngineError::InvalidParams(format!(
                "empty bounding box [{}, {}] x [{}, {}]",
                b.min_x, b.max_x, b.min_y, b.max_y
            )));
        }
        if !(self.search_radius > 0.0) {
            return Err(EngineError::InvalidParams("search radius must be > 0".to_string()));
        }
        if self.error_factor == 0 {
            return Err(EngineError::InvalidParams("error factor must be >= 1".to_string()));
        }
        if !(self.max_value > self.min_value) {
            return Err(EngineError::InvalidParams("max value must exceed min value".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("engine used before initialisation")]
    NotInitialized,
    #[error("no points were loaded")]
    NoPoints,
    #[error("row {row} has {len} values, the grid needs {needed}")]
    ShortRow { row: u32, len: usize, needed: usize },
}

/// A gridding engine.
pub trait SurfaceEngine {
    fn init(&mut self, params: &EngineParams) -> Result<(), EngineError>;

    fn load(&mut self, point: SurfacePoint) -> Result<(), EngineError>;

    /// Compute the surface. Called once, after all points are loaded.
    fn run(&mut self) -> Result<(), EngineError>;

    /// The next row of the surface, or `None` when no more rows can be produced.
    fn next_row(&mut self) -> Option<Vec<f32>>;
}
