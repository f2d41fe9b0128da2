/// Edge length of one spatial-index zone, in world units
pub const DEFAULT_ZONE_SIZE: f32 = 1000.0;

/// Maximum gap between two free ends that autoconnect will still link
pub const MAX_CONNECT_DISTANCE: f32 = 0.05;

/// Maximum orientation mismatch (degrees) that autoconnect will still link
pub const MAX_CONNECT_ANGLE: f32 = 5.0;

/// Endpoint gap above which a neighbour is considered reversed during traversal
pub const REVERSAL_TOLERANCE: f32 = 0.05;

/// Orientation tolerance (degrees) for treating two flex-track ends as collinear
pub const FLEX_COLLINEAR_ANGLE: f32 = 0.5;

/// Default length of a regular piece laid by the placement tool
pub const DEFAULT_PIECE_LENGTH: f32 = 5.0;

/// Default length of a short straight piece
pub const DEFAULT_SHORT_LENGTH: f32 = 2.0;

/// Default turn (degrees) of a curved piece laid by the placement tool
pub const DEFAULT_CURVE_ANGLE: f32 = 15.0;

/// Length of the entry piece of a junction
pub const DEFAULT_JUNCTION_ENTRY_LENGTH: f32 = 2.0;

/// Version written at the head of every saved network
pub const CURRENT_FORMAT_VERSION: u32 = 1;
