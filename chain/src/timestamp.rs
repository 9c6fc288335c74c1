use time;

/// Unix timestamp, in seconds.
pub type Timestamp = u64;

/// Current wall-clock time.
pub fn current_timestamp() -> Timestamp {
	time::get_time().sec as Timestamp
}
