use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

const MAX_ITERATIONS: usize = 800;
const COST_TOLERANCE: f64 = 1e-12;
const GRADIENT_TOLERANCE: f64 = 1e-14;
const STEP_TOLERANCE: f64 = 1e-10;
const MAX_DAMPING: f64 = 1e16;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("At least {required} points are required, got {found}")]
    InsufficientData { required: usize, found: usize },
    #[error("Input contains non-finite values")]
    NonFinite,
    #[error("Fit did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

/// Parameters of `y = a * exp(-b * x) + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ExponentialDecay {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (-self.b * x).exp() + self.c
    }

    fn from_vector(p: &Vector3<f64>) -> Self {
        Self {
            a: p[0],
            b: p[1],
            c: p[2],
        }
    }

    fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.c)
    }
}

fn sum_of_squares(xs: &[f64], ys: &[f64], model: &ExponentialDecay) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (y - model.evaluate(x)).powi(2))
        .sum()
}

fn normal_equations(
    xs: &[f64],
    ys: &[f64],
    model: &ExponentialDecay,
) -> (Matrix3<f64>, Vector3<f64>) {
    let mut jtj = Matrix3::zeros();
    let mut jtr = Vector3::zeros();
    for (&x, &y) in xs.iter().zip(ys) {
        let e = (-model.b * x).exp();
        let jacobian_row = Vector3::new(e, -model.a * x * e, 1.0);
        let residual = y - (model.a * e + model.c);
        jtj += jacobian_row * jacobian_row.transpose();
        jtr += jacobian_row * residual;
    }
    (jtj, jtr)
}

/// Least-squares fit of an exponential decay with the Levenberg–Marquardt method.
///
/// # Errors
///
/// Returns [`FitError::InsufficientData`] for fewer than three points,
/// [`FitError::NonFinite`] if inputs or the initial guess are not finite, and
/// [`FitError::NoConvergence`] if no stationary point is reached.
pub fn fit_exponential_decay(
    xs: &[f64],
    ys: &[f64],
    initial: ExponentialDecay,
) -> Result<ExponentialDecay, FitError> {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return Err(FitError::InsufficientData {
            required: 3,
            found: n,
        });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    if xs.iter().chain(ys).any(|v| !v.is_finite())
        || !initial.to_vector().iter().all(|v| v.is_finite())
    {
        return Err(FitError::NonFinite);
    }

    let mut params = initial.to_vector();
    let mut model = initial;
    let mut cost = sum_of_squares(xs, ys, &model);
    let mut damping = 1e-3;

    for _ in 0..MAX_ITERATIONS {
        let (jtj, jtr) = normal_equations(xs, ys, &model);
        if jtr.norm() <= GRADIENT_TOLERANCE || cost == 0.0 {
            return Ok(model);
        }

        let mut improved = false;
        while damping <= MAX_DAMPING {
            let mut damped = jtj;
            for k in 0..3 {
                damped[(k, k)] += damping * jtj[(k, k)].max(1e-12);
            }
            let Some(step) = damped.lu().solve(&jtr) else {
                damping *= 10.0;
                continue;
            };
            let trial_params = params + step;
            let trial = ExponentialDecay::from_vector(&trial_params);
            let trial_cost = sum_of_squares(xs, ys, &trial);
            if trial_cost.is_finite() && trial_cost < cost {
                let reduction = cost - trial_cost;
                let step_is_small =
                    step.norm() <= STEP_TOLERANCE * (params.norm() + STEP_TOLERANCE);
                params = trial_params;
                model = trial;
                cost = trial_cost;
                damping = (damping / 10.0).max(1e-15);
                improved = true;
                if step_is_small && reduction <= COST_TOLERANCE * cost.max(COST_TOLERANCE) {
                    return Ok(model);
                }
                break;
            }
            damping *= 10.0;
        }

        if !improved {
            // No downhill step exists at any damping: the current point is stationary.
            return Ok(model);
        }
    }

    Err(FitError::NoConvergence {
        iterations: MAX_ITERATIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn initial_guess() -> ExponentialDecay {
        ExponentialDecay {
            a: 1.0,
            b: 0.1,
            c: 0.01,
        }
    }

    #[test]
    fn recovers_parameters_of_noise_free_decay() {
        let truth = ExponentialDecay {
            a: 0.9,
            b: 0.2,
            c: 0.05,
        };
        let xs: Vec<f64> = (0..60).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| truth.evaluate(x)).collect();

        let fit = fit_exponential_decay(&xs, &ys, initial_guess()).unwrap();

        assert!(f64_approx_equal(fit.a, truth.a));
        assert!(f64_approx_equal(fit.b, truth.b));
        assert!(f64_approx_equal(fit.c, truth.c));
    }

    #[test]
    fn fast_decay_is_recovered_from_distant_guess() {
        let truth = ExponentialDecay {
            a: 1.0,
            b: 1.5,
            c: 0.0,
        };
        let xs: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| truth.evaluate(x)).collect();

        let fit = fit_exponential_decay(&xs, &ys, initial_guess()).unwrap();

        assert!((fit.b - truth.b).abs() < 1e-4);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let result = fit_exponential_decay(&[0.0, 1.0], &[1.0, 0.5], initial_guess());
        assert_eq!(
            result,
            Err(FitError::InsufficientData {
                required: 3,
                found: 2
            })
        );
    }

    #[test]
    fn non_finite_input_is_an_error() {
        let result =
            fit_exponential_decay(&[0.0, 1.0, 2.0], &[1.0, f64::NAN, 0.2], initial_guess());
        assert_eq!(result, Err(FitError::NonFinite));
    }
}
