use std::fmt;

use api::{Distribution, MetropolisRequest};
use thiserror::Error;

use crate::t;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetropolisValidationError {
    #[error("Iterations must be a whole number of at least 1.")]
    Iterations,
    #[error("Proposal scale (sigma) must be a positive number.")]
    Sigma,
    #[error("Starting point must be a pair of numbers.")]
    Start,
    #[error("Parameter {0} is out of range.")]
    Parameter(&'static str),
}

impl MetropolisValidationError {
    pub fn message(&self) -> String {
        match self {
            Self::Iterations => t!("error-iterations"),
            Self::Sigma => t!("error-sigma"),
            Self::Start => t!("error-start-point"),
            Self::Parameter(name) => t!("error-parameter", name = name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistributionKind {
    #[default]
    Bimodal,
    Bivariate,
    Poisson,
    Binomial,
    Beta,
    Student,
    Chi2,
    Fisher,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 8] = [
        DistributionKind::Bimodal,
        DistributionKind::Bivariate,
        DistributionKind::Poisson,
        DistributionKind::Binomial,
        DistributionKind::Beta,
        DistributionKind::Student,
        DistributionKind::Chi2,
        DistributionKind::Fisher,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bimodal => "bimodal",
            Self::Bivariate => "bivariate",
            Self::Poisson => "poisson",
            Self::Binomial => "binomial",
            Self::Beta => "beta",
            Self::Student => "student",
            Self::Chi2 => "chi2",
            Self::Fisher => "fisher",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Parameter inputs shown for this target. Only these are validated and
    /// sent.
    pub fn fields(self) -> &'static [ParamField] {
        use ParamField::*;
        match self {
            Self::Bimodal | Self::Bivariate => &[],
            Self::Poisson => &[Lambda],
            Self::Binomial => &[N, P],
            Self::Beta => &[Alpha, Beta],
            Self::Student => &[Nu],
            Self::Chi2 => &[K],
            Self::Fisher => &[D1, D2],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Lambda,
    N,
    P,
    Alpha,
    Beta,
    Nu,
    K,
    D1,
    D2,
}

impl ParamField {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lambda => "λ",
            Self::N => "n",
            Self::P => "p",
            Self::Alpha => "α",
            Self::Beta => "β",
            Self::Nu => "ν",
            Self::K => "k",
            Self::D1 => "d1",
            Self::D2 => "d2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetropolisForm {
    pub kind: DistributionKind,
    pub iterations: String,
    pub start_x: String,
    pub start_y: String,
    pub sigma: String,
    pub lambda: String,
    pub n: String,
    pub p: String,
    pub alpha: String,
    pub beta: String,
    pub nu: String,
    pub k: String,
    pub d1: String,
    pub d2: String,
}

impl Default for MetropolisForm {
    fn default() -> Self {
        Self {
            kind: DistributionKind::default(),
            iterations: "2000".into(),
            start_x: "0".into(),
            start_y: "0".into(),
            sigma: "1.0".into(),
            lambda: "4".into(),
            n: "10".into(),
            p: "0.5".into(),
            alpha: "2".into(),
            beta: "2".into(),
            nu: "3".into(),
            k: "4".into(),
            d1: "5".into(),
            d2: "10".into(),
        }
    }
}

impl MetropolisForm {
    pub fn param(&self, field: ParamField) -> &str {
        match field {
            ParamField::Lambda => &self.lambda,
            ParamField::N => &self.n,
            ParamField::P => &self.p,
            ParamField::Alpha => &self.alpha,
            ParamField::Beta => &self.beta,
            ParamField::Nu => &self.nu,
            ParamField::K => &self.k,
            ParamField::D1 => &self.d1,
            ParamField::D2 => &self.d2,
        }
    }

    pub fn set_param(&mut self, field: ParamField, value: String) {
        let slot = match field {
            ParamField::Lambda => &mut self.lambda,
            ParamField::N => &mut self.n,
            ParamField::P => &mut self.p,
            ParamField::Alpha => &mut self.alpha,
            ParamField::Beta => &mut self.beta,
            ParamField::Nu => &mut self.nu,
            ParamField::K => &mut self.k,
            ParamField::D1 => &mut self.d1,
            ParamField::D2 => &mut self.d2,
        };
        *slot = value;
    }

    pub fn validate(&self) -> Result<MetropolisRequest, MetropolisValidationError> {
        let iterations = self
            .iterations
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or(MetropolisValidationError::Iterations)?;
        let sigma = number(&self.sigma)
            .filter(|s| *s > 0.0)
            .ok_or(MetropolisValidationError::Sigma)?;
        let start_x = number(&self.start_x).ok_or(MetropolisValidationError::Start)?;
        let start_y = number(&self.start_y).ok_or(MetropolisValidationError::Start)?;

        Ok(MetropolisRequest {
            distribution: self.distribution()?,
            iterations,
            start_x,
            start_y,
            sigma,
        })
    }

    fn distribution(&self) -> Result<Distribution, MetropolisValidationError> {
        let positive = |field: ParamField| {
            number(self.param(field))
                .filter(|v| *v > 0.0)
                .ok_or(MetropolisValidationError::Parameter(field.symbol()))
        };

        Ok(match self.kind {
            DistributionKind::Bimodal => Distribution::Bimodal,
            DistributionKind::Bivariate => Distribution::Bivariate,
            DistributionKind::Poisson => Distribution::Poisson {
                lambda: positive(ParamField::Lambda)?,
            },
            DistributionKind::Binomial => Distribution::Binomial {
                n: self
                    .n
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or(MetropolisValidationError::Parameter(ParamField::N.symbol()))?,
                p: number(&self.p)
                    .filter(|p| (0.0..=1.0).contains(p))
                    .ok_or(MetropolisValidationError::Parameter(ParamField::P.symbol()))?,
            },
            DistributionKind::Beta => Distribution::Beta {
                alpha: positive(ParamField::Alpha)?,
                beta: positive(ParamField::Beta)?,
            },
            DistributionKind::Student => Distribution::Student {
                nu: positive(ParamField::Nu)?,
            },
            DistributionKind::Chi2 => Distribution::Chi2 {
                k: positive(ParamField::K)?,
            },
            DistributionKind::Fisher => Distribution::Fisher {
                d1: positive(ParamField::D1)?,
                d2: positive(ParamField::D2)?,
            },
        })
    }
}

fn number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_selected_kind_is_validated() {
        let form = MetropolisForm {
            kind: DistributionKind::Poisson,
            alpha: "-1".into(),
            ..MetropolisForm::default()
        };
        let request = form.validate().unwrap();
        assert_eq!(request.distribution, Distribution::Poisson { lambda: 4.0 });
        assert_eq!(request.iterations, 2000);
    }

    #[test]
    fn sampler_settings_are_checked() {
        let form = MetropolisForm {
            iterations: "0".into(),
            ..MetropolisForm::default()
        };
        assert_eq!(form.validate(), Err(MetropolisValidationError::Iterations));

        let form = MetropolisForm {
            sigma: "0".into(),
            ..MetropolisForm::default()
        };
        assert_eq!(form.validate(), Err(MetropolisValidationError::Sigma));
    }

    #[test]
    fn binomial_probability_must_be_a_probability() {
        let mut form = MetropolisForm {
            kind: DistributionKind::Binomial,
            p: "1.5".into(),
            ..MetropolisForm::default()
        };
        assert_eq!(form.validate(), Err(MetropolisValidationError::Parameter("p")));

        form.set_param(ParamField::P, "0.3".into());
        assert_eq!(
            form.validate().unwrap().distribution,
            Distribution::Binomial { n: 10, p: 0.3 }
        );
    }

    #[test]
    fn every_kind_round_trips_and_lists_its_fields() {
        for kind in DistributionKind::ALL {
            assert_eq!(DistributionKind::parse(kind.as_str()), Some(kind));
            let form = MetropolisForm {
                kind,
                ..MetropolisForm::default()
            };
            let request = form.validate().unwrap();
            assert_eq!(request.distribution.kind(), kind.as_str());
        }
        assert_eq!(DistributionKind::Fisher.fields(), &[ParamField::D1, ParamField::D2]);
        assert!(DistributionKind::Bimodal.fields().is_empty());
    }

    #[test]
    fn parameter_message_names_the_field() {
        assert_eq!(
            MetropolisValidationError::Parameter("p").message(),
            "Parameter p is out of range."
        );
    }
}
