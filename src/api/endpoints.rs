use chrono::{Duration, Local, NaiveDateTime};

use super::{ApiResponse, Client};

/// The date-time format Dexcom expects for `startDate` and `endDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How far back [`Client::test_endpoint`] looks for calibrations.
const TEST_WINDOW_DAYS: i64 = 29;

/// A `startDate`/`endDate` range, in the user's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// The `days` days ending at `now`.
    ///
    /// Returns `None` for a negative span or one reaching before the earliest
    /// representable date.
    pub fn last_days(now: NaiveDateTime, days: i64) -> Option<Self> {
        if days < 0 {
            return None;
        }
        let start = now.checked_sub_signed(Duration::try_days(days)?)?;
        Some(Self { start, end: now })
    }

    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.format(DATE_FORMAT).to_string()),
            ("endDate", self.end.format(DATE_FORMAT).to_string()),
        ]
    }
}

impl Client {
    /// Estimated glucose values recorded within `window`.
    pub async fn egvs(&self, window: &DateWindow) -> ApiResponse {
        self.get("/users/self/egvs", &window.query()).await
    }

    pub async fn calibrations(&self, window: &DateWindow) -> ApiResponse {
        self.get("/users/self/calibrations", &window.query()).await
    }

    /// User-entered events such as carbs, insulin and exercise.
    pub async fn events(&self, window: &DateWindow) -> ApiResponse {
        self.get("/users/self/events", &window.query()).await
    }

    pub async fn devices(&self, window: &DateWindow) -> ApiResponse {
        self.get("/users/self/devices", &window.query()).await
    }

    /// The earliest and latest record times available for the user.
    pub async fn data_range(&self) -> ApiResponse {
        self.get("/users/self/dataRange", &()).await
    }

    /// Fetches the last 29 days of calibrations and reports only whether that worked.
    ///
    /// Handy for checking that a token and environment are usable at all.
    pub async fn test_endpoint(&self) -> bool {
        let now = Local::now().naive_local();
        let Some(window) = DateWindow::last_days(now, TEST_WINDOW_DAYS) else {
            return false;
        };
        self.calibrations(&window).await.status()
    }
}
