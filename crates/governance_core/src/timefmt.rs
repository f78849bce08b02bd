use schemars::JsonSchema;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

/// 9999-12-29T00:00:00Z. Later instants could leave the calendar range
/// once a viewer offset is applied.
const MAX_EPOCH: u64 = 253_402_041_600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DisplayTimestamp {
    pub date: String,
    pub time: String,
}

/// Formats epoch seconds in the viewer's calendar.
///
/// The hour is `hour % 12`, so both midnight and noon render with a `0`
/// hour ("0:5 AM", "0:30 PM"). Minutes carry no zero padding.
pub fn format_timestamp(epoch: u64, offset: UtcOffset) -> DisplayTimestamp {
    let local = local_datetime(epoch, offset);
    DisplayTimestamp {
        date: format!("{} {}, {}", local.month(), local.day(), local.year()),
        time: format!(
            "{}:{} {}",
            local.hour() % 12,
            local.minute(),
            if local.hour() >= 12 { "PM" } else { "AM" }
        ),
    }
}

pub fn format_date(epoch: u64, offset: UtcOffset) -> String {
    format_timestamp(epoch, offset).date
}

pub fn format_time(epoch: u64, offset: UtcOffset) -> String {
    format_timestamp(epoch, offset).time
}

fn local_datetime(epoch: u64, offset: UtcOffset) -> OffsetDateTime {
    let utc = if epoch > MAX_EPOCH {
        warn!(epoch, "timestamp beyond calendar range, showing epoch instead");
        OffsetDateTime::UNIX_EPOCH
    } else {
        // MAX_EPOCH fits in i64 and in the supported calendar range.
        OffsetDateTime::from_unix_timestamp(epoch as i64).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    };
    utc.to_offset(offset)
}
