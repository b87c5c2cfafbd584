//! 时间工具函数: 业务时区转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 本地时间 → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
fn local_to_millis(naive: NaiveDateTime, tz: Tz) -> i64 {
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    local_to_millis(date.and_time(NaiveTime::MIN), tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// 闭区间日期 → `[start, end)` millis
///
/// 任一端可缺省；起始晚于结束时报 `date_from` 字段错误。
pub fn day_range_millis(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    tz: Tz,
) -> AppResult<(Option<i64>, Option<i64>)> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(AppError::field(
            "date_from",
            format!("date_from ({from}) must not be after date_to ({to})"),
        ));
    }
    Ok((
        from.map(|d| day_start_millis(d, tz)),
        to.map(|d| day_end_millis(d, tz)),
    ))
}
