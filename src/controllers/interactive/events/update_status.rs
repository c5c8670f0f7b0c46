/// What a consumer should do with the raster returned by `update_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// First delivery of a raster for the current parameters; replace any
    /// previous display state.
    InitialUpdate,
    /// Refinement of the raster already delivered; redraw in place.
    PartialUpdate,
    /// Converged raster; no further notifications until parameters change.
    FullUpdate,
}
