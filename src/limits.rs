use crate::model::Ms;

/// Earliest accepted timestamp: 1970-01-01T00:00:00Z.
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// Latest accepted timestamp: 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// Bookings are stored at minute resolution.
pub const MINUTE_MS: Ms = 60_000;

/// Span of a freshly proposed booking when the user selects an empty slot.
pub const DEFAULT_PROPOSAL_SPAN_MS: Ms = 3_600_000;

pub const MAX_NAME_LEN: usize = 256;

/// Capacity of the notice broadcast channel.
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;
