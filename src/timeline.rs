use log::trace;

/// Balances under half a cent count as repaid.
pub const PAID_OFF_THRESHOLD: f64 = 0.005;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelinePoint {
    pub month: u32,
    pub balance: f64,
}

/// Month-by-month balance of a loan repaid with a level payment.
///
/// Starts with month 0 at `balance`. Each month adds `balance * monthly_rate`
/// then subtracts `payment`, clamping at zero; less than half a cent left
/// over counts as zero. Stops once the balance reaches
/// zero or after `horizon_months` months, whichever comes first.
pub fn balance_timeline(
    balance: f64,
    monthly_rate: f64,
    payment: f64,
    horizon_months: u32,
) -> Vec<TimelinePoint> {
    let mut points = vec![TimelinePoint { month: 0, balance }];
    let mut remaining = balance;
    let mut month = 0;

    while remaining > 0. && month < horizon_months {
        month += 1;
        remaining = (remaining + remaining * monthly_rate - payment).max(0.);
        // rounding residue from the closed-form payment
        if remaining < PAID_OFF_THRESHOLD {
            remaining = 0.;
        }
        trace!("timeline month {}, balance {}", month, remaining);
        points.push(TimelinePoint {
            month,
            balance: remaining,
        });
    }
    points
}

/// Named repayment timeline, one per debt and one for the consolidated loan.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineSeries {
    pub name: String,
    pub points: Vec<TimelinePoint>,
}

impl TimelineSeries {
    pub fn new(name: impl Into<String>, balance: f64, monthly_rate: f64, payment: f64, horizon_months: u32) -> Self {
        Self {
            name: name.into(),
            points: balance_timeline(balance, monthly_rate, payment, horizon_months),
        }
    }

    /// Months simulated; equals the horizon when the balance never cleared.
    pub fn payoff_months(&self) -> u32 {
        self.points.last().map_or(0, |p| p.month)
    }

    pub fn is_paid_off(&self) -> bool {
        self.points.last().is_some_and(|p| p.balance == 0.)
    }
}
