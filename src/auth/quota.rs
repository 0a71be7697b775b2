//! Daily usage quotas
//!
//! Two independent counters (login attempts and chat requests), each held
//! in a day window that resets when the UTC date rolls over. Counters are
//! mutex-guarded so concurrent request paths never lose increments.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

/// Which ceiling a request counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaKind {
    AuthAttempt,
    ChatRequest,
}

impl QuotaKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuotaKind::AuthAttempt => "login attempts",
            QuotaKind::ChatRequest => "chat requests",
        }
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Exceeded,
}

#[derive(Debug)]
struct DayWindow {
    day: NaiveDate,
    count: u64,
}

impl DayWindow {
    fn new(day: NaiveDate) -> Self {
        Self { day, count: 0 }
    }

    /// Increment within `today`'s window, resetting the count first if the
    /// date has rolled over. Returns the count after the increment.
    fn bump(&mut self, today: NaiveDate) -> u64 {
        if self.day != today {
            self.day = today;
            self.count = 0;
        }
        self.count += 1;
        self.count
    }
}

/// Process-wide quota counters
pub struct QuotaLedger {
    auth_attempts: Mutex<DayWindow>,
    chat_requests: Mutex<DayWindow>,
    auth_limit: u64,
    request_limit: u64,
}

impl QuotaLedger {
    pub fn new(auth_limit: u64, request_limit: u64) -> Self {
        let today = Utc::now().date_naive();
        Self {
            auth_attempts: Mutex::new(DayWindow::new(today)),
            chat_requests: Mutex::new(DayWindow::new(today)),
            auth_limit,
            request_limit,
        }
    }

    /// Count a request against its ceiling for the current UTC date
    pub fn check(&self, kind: QuotaKind) -> QuotaDecision {
        self.check_on(kind, Utc::now().date_naive())
    }

    /// Count a request within an explicit day window. The first `limit`
    /// calls of a day are allowed; every later call is rejected until the
    /// date changes.
    pub fn check_on(&self, kind: QuotaKind, today: NaiveDate) -> QuotaDecision {
        let (window, limit) = match kind {
            QuotaKind::AuthAttempt => (&self.auth_attempts, self.auth_limit),
            QuotaKind::ChatRequest => (&self.chat_requests, self.request_limit),
        };

        let count = window.lock().bump(today);
        if count > limit {
            QuotaDecision::Exceeded
        } else {
            QuotaDecision::Allowed
        }
    }

    /// Current count for a kind within today's window
    pub fn usage(&self, kind: QuotaKind) -> u64 {
        self.usage_on(kind, Utc::now().date_naive())
    }

    /// Count for a kind within an explicit day window. A stored window
    /// from an earlier date reads as zero; it resets lazily on the next
    /// `check_on`.
    pub fn usage_on(&self, kind: QuotaKind, today: NaiveDate) -> u64 {
        let window = match kind {
            QuotaKind::AuthAttempt => self.auth_attempts.lock(),
            QuotaKind::ChatRequest => self.chat_requests.lock(),
        };
        if window.day == today {
            window.count
        } else {
            0
        }
    }
}
