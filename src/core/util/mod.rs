pub mod calculate_row_bands;
pub mod fuzzy_compare;
pub mod pixel_to_plane_coords;
