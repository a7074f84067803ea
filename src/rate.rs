use std::fmt;

/// Days in a year for daily accrual on revolving balances.
pub const DAYS_PER_YEAR: f64 = 365.;

/// Days simulated per billing month. Not calendar accurate; every revolving
/// figure depends on it.
pub const DAYS_PER_MONTH: u32 = 30;

/// How often a nominal annual rate compounds.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Compounding {
    Daily,
    Monthly,
    Quarterly,
    /// Mortgage-market convention, used for every fixed loan unless overridden.
    #[default]
    SemiAnnually,
    Annually,
}

impl Compounding {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Compounding::Daily => DAYS_PER_YEAR,
            Compounding::Monthly => 12.,
            Compounding::Quarterly => 4.,
            Compounding::SemiAnnually => 2.,
            Compounding::Annually => 1.,
        }
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Daily => "daily",
            Compounding::Monthly => "monthly",
            Compounding::Quarterly => "quarterly",
            Compounding::SemiAnnually => "semi-annually",
            Compounding::Annually => "annually",
        };
        write!(f, "{}", name)
    }
}

/// Converts a nominal annual rate (as a fraction, e.g. 0.05) into the
/// effective rate per monthly payment.
///
/// The nominal rate is first turned into an effective annual rate under the
/// given compounding, `(1 + r/k)^k - 1`, which is then spread over twelve
/// payments, `(1 + effective)^(1/12) - 1`.
///
/// A zero rate yields exactly zero. Callers must not feed a zero periodic rate
/// into the annuity formula; see [`crate::loan::monthly_payment`].
pub fn periodic_rate(annual_rate: f64, compounding: Compounding) -> f64 {
    if annual_rate == 0. {
        return 0.;
    }
    let periods = compounding.periods_per_year();
    let effective_rate = (1. + annual_rate / periods).powf(periods) - 1.;
    (1. + effective_rate).powf(1. / 12.) - 1.
}

/// Monthly periodic rate for a nominal rate compounded semi-annually.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    periodic_rate(annual_rate, Compounding::SemiAnnually)
}

/// Growth of a revolving balance over one simulated billing month: daily
/// compounding at `annual_rate / 365` for thirty days.
pub fn revolving_monthly_rate(annual_rate: f64) -> f64 {
    (1. + annual_rate / DAYS_PER_YEAR).powi(DAYS_PER_MONTH as i32) - 1.
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn test_zero_rate_is_zero() {
        assert_eq!(monthly_rate(0.), 0.);
        assert_eq!(periodic_rate(0., Compounding::Daily), 0.);
        assert_eq!(revolving_monthly_rate(0.), 0.);
    }

    #[test]
    fn test_semi_annual_conversion() {
        // 6% nominal: effective 6.09%, then the twelfth root.
        assert_abs_diff_eq!(monthly_rate(0.06), 0.004938622031196882, epsilon = 1e-12);
        assert_abs_diff_eq!(monthly_rate(0.05), 0.0041239154651442345, epsilon = 1e-12);
    }

    #[test]
    fn test_monthly_compounding_is_nominal_over_twelve() {
        assert_abs_diff_eq!(
            periodic_rate(0.06, Compounding::Monthly),
            0.005,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_more_frequent_compounding_costs_more() {
        let rate = 0.07;
        let daily = periodic_rate(rate, Compounding::Daily);
        let monthly = periodic_rate(rate, Compounding::Monthly);
        let quarterly = periodic_rate(rate, Compounding::Quarterly);
        let semi = periodic_rate(rate, Compounding::SemiAnnually);
        let annual = periodic_rate(rate, Compounding::Annually);
        assert!(daily > monthly);
        assert!(monthly > quarterly);
        assert!(quarterly > semi);
        assert!(semi > annual);
    }

    #[test]
    fn test_revolving_monthly_rate() {
        assert_abs_diff_eq!(
            1000. * revolving_monthly_rate(0.24),
            19.915259546986253,
            epsilon = 1e-9
        );
    }
}
