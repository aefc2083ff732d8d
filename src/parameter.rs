//! Atomic meteorological measures.

use crate::granularity::Granularity;
use crate::validator::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Temp,
    Tmin,
    Tmax,
    Dwpt,
    Rhum,
    Prcp,
    Snwd,
    Wdir,
    Wspd,
    Wpgt,
    Pres,
    Tsun,
    Cldc,
    Coco,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    /// Continuous quantity, stored as `f64` with `NaN` as the missing sentinel.
    Float,
    /// Categorical code (wind direction bucket, weather condition code),
    /// stored as a small unsigned integer; `None`/absent is the missing
    /// sentinel, never a numeric "0 means missing" convention.
    SmallUint,
}

pub struct ParameterMeta {
    pub id: &'static str,
    pub unit: &'static str,
    pub dtype: Dtype,
    pub granularities: &'static [Granularity],
    /// `true` for parameters that must be resolved by nearest-neighbor
    /// rather than inverse-distance weighting during interpolation.
    pub categorical: bool,
}

impl Parameter {
    pub fn meta(&self) -> ParameterMeta {
        use Dtype::*;
        use Granularity::*;
        match self {
            Parameter::Temp => ParameterMeta {
                id: "temp",
                unit: "C",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly, Normals],
                categorical: false,
            },
            Parameter::Tmin => ParameterMeta {
                id: "tmin",
                unit: "C",
                dtype: Float,
                granularities: &[Daily, Monthly, Normals],
                categorical: false,
            },
            Parameter::Tmax => ParameterMeta {
                id: "tmax",
                unit: "C",
                dtype: Float,
                granularities: &[Daily, Monthly, Normals],
                categorical: false,
            },
            Parameter::Dwpt => ParameterMeta {
                id: "dwpt",
                unit: "C",
                dtype: Float,
                granularities: &[Hourly],
                categorical: false,
            },
            Parameter::Rhum => ParameterMeta {
                id: "rhum",
                unit: "pct",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly],
                categorical: false,
            },
            Parameter::Prcp => ParameterMeta {
                id: "prcp",
                unit: "mm",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly, Normals],
                categorical: false,
            },
            Parameter::Snwd => ParameterMeta {
                id: "snwd",
                unit: "mm",
                dtype: Float,
                granularities: &[Daily],
                categorical: false,
            },
            Parameter::Wdir => ParameterMeta {
                id: "wdir",
                unit: "deg",
                dtype: SmallUint,
                granularities: &[Hourly, Daily],
                categorical: true,
            },
            Parameter::Wspd => ParameterMeta {
                id: "wspd",
                unit: "kmh",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly, Normals],
                categorical: false,
            },
            Parameter::Wpgt => ParameterMeta {
                id: "wpgt",
                unit: "kmh",
                dtype: Float,
                granularities: &[Hourly, Daily],
                categorical: false,
            },
            Parameter::Pres => ParameterMeta {
                id: "pres",
                unit: "hpa",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly],
                categorical: false,
            },
            Parameter::Tsun => ParameterMeta {
                id: "tsun",
                unit: "min",
                dtype: Float,
                granularities: &[Hourly, Daily, Monthly],
                categorical: false,
            },
            Parameter::Cldc => ParameterMeta {
                id: "cldc",
                unit: "okta",
                dtype: Float,
                granularities: &[Hourly, Daily],
                categorical: false,
            },
            Parameter::Coco => ParameterMeta {
                id: "coco",
                unit: "code",
                dtype: SmallUint,
                granularities: &[Hourly, Daily],
                categorical: true,
            },
        }
    }

    pub fn id(&self) -> &'static str {
        self.meta().id
    }

    /// `None` means "no range check" (e.g. categorical codes validated by
    /// membership elsewhere).
    pub fn validators(&self) -> Vec<Validator> {
        match self {
            Parameter::Temp | Parameter::Tmin | Parameter::Tmax | Parameter::Dwpt => {
                vec![Validator::minimum(-90.0), Validator::maximum(60.0)]
            }
            Parameter::Rhum => vec![Validator::minimum(0.0), Validator::maximum(100.0)],
            Parameter::Prcp | Parameter::Snwd | Parameter::Tsun => vec![Validator::minimum(0.0)],
            Parameter::Wdir => vec![Validator::minimum(0.0), Validator::maximum(360.0)],
            Parameter::Wspd | Parameter::Wpgt => {
                vec![Validator::minimum(0.0), Validator::maximum(300.0)]
            }
            Parameter::Pres => vec![Validator::minimum(850.0), Validator::maximum(1100.0)],
            Parameter::Cldc => vec![Validator::minimum(0.0), Validator::maximum(8.0)],
            Parameter::Coco => vec![Validator::minimum(1.0), Validator::maximum(27.0)],
        }
    }

    pub fn validate(&self, value: f64) -> bool {
        self.validators().iter().all(|v| v.check(value))
    }

    pub fn supports(&self, granularity: Granularity) -> bool {
        self.meta().granularities.contains(&granularity)
    }

    pub const DAILY_DEFAULTS: &'static [Parameter] = &[
        Parameter::Temp,
        Parameter::Tmin,
        Parameter::Tmax,
        Parameter::Rhum,
        Parameter::Prcp,
        Parameter::Snwd,
        Parameter::Wspd,
        Parameter::Wpgt,
        Parameter::Pres,
        Parameter::Tsun,
        Parameter::Cldc,
    ];

    pub const HOURLY_DEFAULTS: &'static [Parameter] = &[
        Parameter::Temp,
        Parameter::Dwpt,
        Parameter::Rhum,
        Parameter::Prcp,
        Parameter::Wdir,
        Parameter::Wspd,
        Parameter::Wpgt,
        Parameter::Pres,
        Parameter::Tsun,
        Parameter::Coco,
    ];

    pub const MONTHLY_DEFAULTS: &'static [Parameter] = &[
        Parameter::Temp,
        Parameter::Tmin,
        Parameter::Tmax,
        Parameter::Prcp,
        Parameter::Wspd,
        Parameter::Pres,
        Parameter::Tsun,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_id() {
        assert_eq!(Parameter::Temp.id(), "temp");
    }

    #[test]
    fn wdir_is_categorical_small_uint() {
        let meta = Parameter::Wdir.meta();
        assert!(meta.categorical);
        assert_eq!(meta.dtype, Dtype::SmallUint);
    }

    #[test]
    fn validate_range() {
        assert!(Parameter::Rhum.validate(50.0));
        assert!(!Parameter::Rhum.validate(150.0));
        assert!(!Parameter::Rhum.validate(f64::NAN));
    }
}
