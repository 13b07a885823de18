/// Logical table names shared by the stock pipeline layout.
/// Overridable per run through `[tables]` in the config file.
pub const HOSTS_BRONZE: &str = "hosts_bronze";
pub const LISTINGS_BRONZE: &str = "listings_bronze";
pub const HOSTS_SILVER: &str = "hosts_silver";
pub const LISTINGS_SILVER: &str = "listings_silver";
pub const LISTINGS_W_HOSTS_GOLD: &str = "listings_w_hosts_gold";

/// Substituted for hosts that arrive without a name
pub const ANONYMOUS_HOST_NAME: &str = "Anonymous";

/// Fixed timestamp layout of the raw hosts export (`DD-MM-YY HH:MM`)
pub const HOST_TIMESTAMP_FORMAT: &str = "%d-%m-%y %H:%M";

/// Layout used when writing timestamps into materialized tables.
/// `%.f` prints nothing for whole seconds.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub const ACCEPTED_ROOM_TYPES: [&str; 4] = ["Entire home/apt", "Private room", "Shared room", "Hotel room"];

pub const ACCEPTED_SUPERHOST_VALUES: [&str; 2] = ["t", "f"];

/// Sanity ceiling for nightly prices in the gold table
pub const DEFAULT_PRICE_CEILING: f64 = 5000.0;

pub fn is_accepted_room_type(room_type: &str) -> bool {
    ACCEPTED_ROOM_TYPES.contains(&room_type)
}

pub fn is_accepted_superhost_flag(flag: &str) -> bool {
    ACCEPTED_SUPERHOST_VALUES.contains(&flag)
}
