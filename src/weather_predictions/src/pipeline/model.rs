use nalgebra::{DMatrix, DVector};

use crate::pipeline::api::PipelineError;

/// Ridge-regularized linear regression, solved in closed form:
/// w = (XᵀX + αI)⁻¹ Xᵀy on centered data, with the intercept recovered as
/// ȳ − x̄·w. Deterministic: no iterative solver, no randomness.
#[derive(Debug, Clone)]
pub struct RidgeModel {
    alpha: f64,
    weights: Option<DVector<f64>>,
    intercept: Option<f64>,
}

impl RidgeModel {
    pub fn new(alpha: f64) -> Result<Self, PipelineError> {
        if alpha < 0.0 || !alpha.is_finite() {
            return Err(PipelineError::Validation(format!(
                "regularization strength must be finite and non-negative, got {}",
                alpha
            )));
        }
        Ok(RidgeModel {
            alpha,
            weights: None,
            intercept: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn weights(&self) -> Option<&DVector<f64>> {
        self.weights.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    /// Fit on an (n x p) design matrix and length-n target vector. With
    /// alpha > 0 the regularized normal equations are positive definite, so
    /// even a single-row train set produces finite weights.
    pub fn fit(&mut self, design: &DMatrix<f64>, target: &DVector<f64>) -> Result<(), PipelineError> {
        let rows = design.nrows();
        if rows == 0 {
            return Err(PipelineError::Validation(
                "cannot fit on an empty train set".to_string(),
            ));
        }
        if rows != target.len() {
            return Err(PipelineError::Validation(format!(
                "design has {} rows but target has {}",
                rows,
                target.len()
            )));
        }

        let column_means = design.row_mean();
        let target_mean = target.mean();

        let mut centered = design.clone();
        for mut row in centered.row_iter_mut() {
            row -= &column_means;
        }
        let centered_target = target.map(|v| v - target_mean);

        let p = design.ncols();
        let gram = centered.transpose() * &centered + DMatrix::identity(p, p) * self.alpha;
        let inverse = gram.try_inverse().ok_or_else(|| {
            PipelineError::ModelFit("regularized normal equations are singular".to_string())
        })?;
        let weights = inverse * centered.transpose() * centered_target;

        let intercept = target_mean - column_means.transpose().dot(&weights);
        self.weights = Some(weights);
        self.intercept = Some(intercept);
        Ok(())
    }

    pub fn predict(&self, design: &DMatrix<f64>) -> Result<DVector<f64>, PipelineError> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| PipelineError::ModelFit("model has not been fitted".to_string()))?;
        let intercept = self
            .intercept
            .ok_or_else(|| PipelineError::ModelFit("model has not been fitted".to_string()))?;
        if design.ncols() != weights.len() {
            return Err(PipelineError::Validation(format!(
                "expected {} predictor columns, got {}",
                weights.len(),
                design.ncols()
            )));
        }
        Ok((design * weights).map(|v| v + intercept))
    }
}

#[cfg(test)]
mod test_model {
    use super::*;

    #[test]
    fn negative_alpha_is_rejected() {
        assert!(matches!(
            RidgeModel::new(-0.5),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn near_zero_alpha_recovers_a_linear_relationship() {
        // y = 1 + 2 * x
        let design = DMatrix::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
        let target = DVector::from_vec(vec![3.0, 5.0, 7.0, 9.0]);
        let mut model = RidgeModel::new(1e-9).unwrap();
        model.fit(&design, &target).unwrap();
        let weights = model.weights().unwrap();
        assert!((weights[0] - 2.0).abs() < 1e-6);
        assert!((model.intercept().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn larger_alpha_shrinks_the_weights() {
        let design = DMatrix::from_row_slice(5, 2, &[
            1.0, 2.0,
            2.0, 1.0,
            3.0, 4.0,
            4.0, 3.0,
            5.0, 6.0,
        ]);
        let target = DVector::from_vec(vec![5.0, 4.0, 11.0, 10.0, 17.0]);

        let mut loose = RidgeModel::new(0.01).unwrap();
        loose.fit(&design, &target).unwrap();
        let mut tight = RidgeModel::new(100.0).unwrap();
        tight.fit(&design, &target).unwrap();

        assert!(tight.weights().unwrap().norm() < loose.weights().unwrap().norm());
    }

    #[test]
    fn single_row_train_set_predicts_finitely() {
        let design = DMatrix::from_row_slice(1, 3, &[10.0, 5.0, 0.0]);
        let target = DVector::from_vec(vec![12.0]);
        let mut model = RidgeModel::new(0.1).unwrap();
        model.fit(&design, &target).unwrap();

        let test = DMatrix::from_row_slice(1, 3, &[12.0, 6.0, 0.0]);
        let prediction = model.predict(&test).unwrap();
        assert!(prediction[0].is_finite());
        // Centering a single row leaves no signal, so it predicts the mean.
        assert!((prediction[0] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn predicting_before_fitting_fails() {
        let model = RidgeModel::new(1.0).unwrap();
        let design = DMatrix::from_row_slice(1, 1, &[1.0]);
        assert!(matches!(
            model.predict(&design),
            Err(PipelineError::ModelFit(_))
        ));
    }

    #[test]
    fn fitting_is_deterministic() {
        let design = DMatrix::from_row_slice(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 7.0]);
        let target = DVector::from_vec(vec![2.0, 3.0, 5.0]);
        let mut first = RidgeModel::new(0.5).unwrap();
        first.fit(&design, &target).unwrap();
        let mut second = RidgeModel::new(0.5).unwrap();
        second.fit(&design, &target).unwrap();
        assert_eq!(first.weights(), second.weights());
        assert_eq!(first.intercept(), second.intercept());
    }
}
