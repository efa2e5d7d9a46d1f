use std::fmt;

/// Display string used whenever a duration code cannot be interpreted
pub const UNKNOWN_PERIOD: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingPeriodError {
    #[error("Billing period must look like P<n><unit>: {0:?}")]
    Malformed(String),

    #[error("Billing period count must be a single digit 1-9: {0:?}")]
    MalformedCount(String),

    #[error("Unrecognized billing period unit: {0:?}")]
    UnrecognizedUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "D" => Some(Self::Day),
            "W" => Some(Self::Week),
            "M" => Some(Self::Month),
            "Y" => Some(Self::Year),
            _ => None,
        }
    }

    /// Approximate length in days, good enough to order plans
    pub fn days(&self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// A parsed `P<n><unit>` billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl BillingPeriod {
    /// Parse a provider duration code.
    ///
    /// Only single-digit counts are accepted. ISO-8601 allows longer counts but
    /// no provider payload seen so far emits them, so `P10D` is rejected as
    /// malformed instead of being guessed at.
    pub fn parse(code: &str) -> Result<Self, BillingPeriodError> {
        let rest = code
            .strip_prefix('P')
            .ok_or_else(|| BillingPeriodError::Malformed(code.to_string()))?;

        let mut chars = rest.chars();
        let count = chars
            .next()
            .ok_or_else(|| BillingPeriodError::Malformed(code.to_string()))?;
        let unit = chars.as_str();

        let count = match count.to_digit(10) {
            Some(n) if n > 0 => n,
            _ => return Err(BillingPeriodError::MalformedCount(code.to_string())),
        };

        if unit.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(BillingPeriodError::MalformedCount(code.to_string()));
        }

        let unit = PeriodUnit::from_code(unit)
            .ok_or_else(|| BillingPeriodError::UnrecognizedUnit(unit.to_string()))?;

        Ok(Self { count, unit })
    }

    pub fn days(&self) -> u32 {
        self.count * self.unit.days()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.count > 1 { "s" } else { "" };
        write!(f, "{} {}{}", self.count, self.unit.as_str(), plural)
    }
}

/// Human readable period such as "3 months"; "Unknown" when the code is not understood
pub fn format_billing_period(code: &str) -> String {
    match BillingPeriod::parse(code) {
        Ok(period) => period.to_string(),
        Err(e) => {
            tracing::debug!(code, error = %e, "Falling back to unknown billing period");
            UNKNOWN_PERIOD.to_string()
        }
    }
}

/// Approximate day count used for sort ordering only, never for money.
/// Unparseable codes count as zero days.
pub fn billing_period_days(code: &str) -> u32 {
    BillingPeriod::parse(code).map(|p| p.days()).unwrap_or(0)
}
