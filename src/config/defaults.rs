pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;
pub const MIN_FRAGMENT: usize = 64;
pub const MAX_FRAGMENT: usize = 65_536;
pub const MAX_CHANNELS: u16 = 8;
pub const MIN_CHANNEL_CAPACITY: usize = 8;
pub const MAX_CHANNEL_CAPACITY: usize = 1024;
pub const MIN_UTC_OFFSET_HOURS: i8 = -12;
pub const MAX_UTC_OFFSET_HOURS: i8 = 14;
pub const MAX_NODE_NAME_LEN: usize = 64;
