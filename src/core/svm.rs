// src/core/svm.rs
use crate::core::types::{Category, DecisionScores};
use crate::core::vectorizer::SparseVector;
use crate::error::{Result, TriageError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const PROJECTED_GRADIENT_EPS: f64 = 1e-12;
const LINE_SEARCH_SIGMA: f64 = 0.01;
const LINE_SEARCH_STEPS: usize = 20;

/// Which optimization problem to solve for each binary separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverChoice {
    /// Dual when there are fewer samples than features, primal otherwise.
    #[default]
    Auto,
    Dual,
    Primal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    Dual,
    Primal,
}

impl SolverChoice {
    pub fn resolve(self, n_samples: usize, n_features: usize) -> SolverKind {
        match self {
            SolverChoice::Dual => SolverKind::Dual,
            SolverChoice::Primal => SolverKind::Primal,
            SolverChoice::Auto if n_samples < n_features => SolverKind::Dual,
            SolverChoice::Auto => SolverKind::Primal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub tolerance: f64,
    pub max_iter: usize,
    pub seed: u64,
    pub solver: SolverChoice,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self { c: 1.0, tolerance: 1e-4, max_iter: 1000, seed: 42, solver: SolverChoice::Auto }
    }
}

/// How fitting went, one entry per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub solver: SolverKind,
    pub iterations: Vec<usize>,
    pub converged: bool,
}

/// One-vs-rest linear SVM with squared hinge loss and L2 penalty.
///
/// The intercept is learned as the weight of a constant feature of value 1,
/// so it is regularized together with the other weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    classes: Vec<Category>,
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl LinearSvc {
    pub fn fit(
        rows: &[SparseVector],
        labels: &[Category],
        n_features: usize,
        params: &SvmParams,
    ) -> Result<(Self, FitReport)> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(TriageError::EmptyCorpus);
        }
        let mut classes: Vec<Category> = labels.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(TriageError::TooFewClasses(classes.len()));
        }

        let solver = params.solver.resolve(rows.len(), n_features);
        let mut weights = Vec::with_capacity(classes.len());
        let mut biases = Vec::with_capacity(classes.len());
        let mut iterations = Vec::with_capacity(classes.len());
        let mut converged = true;

        for (k, &class) in classes.iter().enumerate() {
            let y: Vec<f64> = labels
                .iter()
                .map(|&l| if l == class { 1.0 } else { -1.0 })
                .collect();
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(k as u64));
            let outcome = match solver {
                SolverKind::Dual => solve_dual(rows, &y, n_features, params, &mut rng),
                SolverKind::Primal => solve_primal(rows, &y, n_features, params, &mut rng),
            };
            debug!(
                class = %class,
                iterations = outcome.iterations,
                converged = outcome.converged,
                "fitted binary separator"
            );
            if !outcome.converged {
                warn!(
                    class = %class,
                    max_iter = params.max_iter,
                    "solver did not converge; increase max_iter"
                );
            }
            converged &= outcome.converged;
            iterations.push(outcome.iterations);

            let mut w = outcome.w;
            biases.push(w.pop().unwrap_or(0.0));
            weights.push(w);
        }

        Ok((Self { classes, weights, biases }, FitReport { solver, iterations, converged }))
    }

    /// w_k · x + b_k for every class, in class order.
    pub fn decision_function(&self, x: &SparseVector) -> DecisionScores {
        DecisionScores(
            self.classes
                .iter()
                .zip(self.weights.iter().zip(&self.biases))
                .map(|(&class, (w, b))| (class, x.dot(w) + b))
                .collect(),
        )
    }

    /// Arg-max class. With an all-zero row this is decided by the biases alone.
    pub fn predict(&self, x: &SparseVector) -> (Category, DecisionScores) {
        let scores = self.decision_function(x);
        let category = scores.best().unwrap_or(self.classes[0]);
        (category, scores)
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub(crate) fn validate(&self, n_features: usize) -> Result<()> {
        if self.classes.len() < 2
            || self.weights.len() != self.classes.len()
            || self.biases.len() != self.classes.len()
        {
            return Err(TriageError::CorruptArtifact("class/weight count mismatch".into()));
        }
        if self.weights.iter().any(|w| w.len() != n_features) {
            return Err(TriageError::CorruptArtifact(
                "weight vector length does not match vocabulary".into(),
            ));
        }
        Ok(())
    }
}

struct BinaryOutcome {
    /// Feature weights followed by the intercept.
    w: Vec<f64>,
    iterations: usize,
    converged: bool,
}

/// Dual coordinate descent with shrinking for the L2-loss SVM.
fn solve_dual(
    rows: &[SparseVector],
    y: &[f64],
    n_features: usize,
    params: &SvmParams,
    rng: &mut StdRng,
) -> BinaryOutcome {
    let l = rows.len();
    let diag = 0.5 / params.c;
    let bias = n_features;
    let qd: Vec<f64> = rows.iter().map(|x| diag + x.squared_norm() + 1.0).collect();

    let mut w = vec![0.0; n_features + 1];
    let mut alpha = vec![0.0; l];
    let mut index: Vec<usize> = (0..l).collect();
    let mut active = l;
    let mut pg_max_old = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iter {
        let mut pg_max_new = f64::NEG_INFINITY;
        let mut pg_min_new = f64::INFINITY;

        for i in 0..active {
            let j = i + rng.gen_range(0..active - i);
            index.swap(i, j);
        }

        let mut s = 0;
        while s < active {
            let i = index[s];
            let yi = y[i];
            let g = yi * (rows[i].dot(&w) + w[bias]) - 1.0 + diag * alpha[i];

            let mut pg = 0.0;
            if alpha[i] == 0.0 {
                if g > pg_max_old {
                    active -= 1;
                    index.swap(s, active);
                    continue;
                } else if g < 0.0 {
                    pg = g;
                }
            } else {
                pg = g;
            }

            pg_max_new = pg_max_new.max(pg);
            pg_min_new = pg_min_new.min(pg);

            if pg.abs() > PROJECTED_GRADIENT_EPS {
                let old = alpha[i];
                alpha[i] = (alpha[i] - g / qd[i]).max(0.0);
                let d = (alpha[i] - old) * yi;
                for (j, v) in rows[i].iter() {
                    w[j] += d * v;
                }
                w[bias] += d;
            }
            s += 1;
        }

        iterations += 1;

        if pg_max_new - pg_min_new <= params.tolerance {
            if active == l {
                converged = true;
                break;
            }
            // Shrunk set converged; re-check against every sample.
            active = l;
            pg_max_old = f64::INFINITY;
            continue;
        }

        pg_max_old = if pg_max_new <= 0.0 { f64::INFINITY } else { pg_max_new };
    }

    BinaryOutcome { w, iterations, converged }
}

/// Primal coordinate descent (Newton direction plus backtracking line search)
/// on 0.5·|w|² + C·Σ max(0, 1 − yᵢ·w·xᵢ)².
fn solve_primal(
    rows: &[SparseVector],
    y: &[f64],
    n_features: usize,
    params: &SvmParams,
    rng: &mut StdRng,
) -> BinaryOutcome {
    let l = rows.len();
    let c = params.c;

    // Column view; the last column is the constant intercept feature.
    let mut columns: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_features + 1];
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.iter() {
            columns[j].push((i, v));
        }
        columns[n_features].push((i, 1.0));
    }

    let mut w = vec![0.0; n_features + 1];
    // margins[i] = 1 - y_i * w·x_i
    let mut margins = vec![1.0; l];
    let mut order: Vec<usize> = (0..=n_features).collect();
    let mut initial_violation = None;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iter {
        for i in 0..order.len() {
            let j = i + rng.gen_range(0..order.len() - i);
            order.swap(i, j);
        }

        let mut max_violation: f64 = 0.0;
        for &j in &order {
            let column = &columns[j];
            let mut grad = w[j];
            let mut hess = 1.0;
            for &(i, v) in column {
                if margins[i] > 0.0 {
                    grad -= 2.0 * c * y[i] * v * margins[i];
                    hess += 2.0 * c * v * v;
                }
            }
            max_violation = max_violation.max(grad.abs());
            if grad.abs() <= PROJECTED_GRADIENT_EPS {
                continue;
            }

            let direction = -grad / hess;
            let mut step = 1.0;
            for _ in 0..LINE_SEARCH_STEPS {
                let z = step * direction;
                let mut delta = w[j] * z + 0.5 * z * z;
                for &(i, v) in column {
                    let before = margins[i].max(0.0);
                    let after = (margins[i] - y[i] * v * z).max(0.0);
                    delta += c * (after * after - before * before);
                }
                if delta <= -LINE_SEARCH_SIGMA * z * z {
                    w[j] += z;
                    for &(i, v) in column {
                        margins[i] -= y[i] * v * z;
                    }
                    break;
                }
                step *= 0.5;
            }
        }

        iterations += 1;
        let reference = *initial_violation.get_or_insert(max_violation);
        if max_violation <= params.tolerance * reference.max(1.0) {
            converged = true;
            break;
        }
    }

    BinaryOutcome { w, iterations, converged }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(usize, f64)]) -> SparseVector {
        SparseVector {
            indices: entries.iter().map(|e| e.0).collect(),
            values: entries.iter().map(|e| e.1).collect(),
        }
    }

    fn toy() -> (Vec<SparseVector>, Vec<Category>) {
        let rows = vec![
            row(&[(0, 1.0)]),
            row(&[(0, 0.8), (2, 0.6)]),
            row(&[(1, 1.0)]),
            row(&[(1, 0.6), (2, 0.8)]),
            row(&[(3, 1.0)]),
            row(&[(3, 0.8), (2, 0.6)]),
        ];
        let labels = vec![
            Category::Hardware,
            Category::Hardware,
            Category::Network,
            Category::Network,
            Category::Software,
            Category::Software,
        ];
        (rows, labels)
    }

    #[test]
    fn auto_picks_dual_for_wide_data() {
        assert_eq!(SolverChoice::Auto.resolve(10, 100), SolverKind::Dual);
        assert_eq!(SolverChoice::Auto.resolve(100, 100), SolverKind::Primal);
        assert_eq!(SolverChoice::Dual.resolve(100, 10), SolverKind::Dual);
    }

    #[test]
    fn both_solvers_separate_training_rows() {
        let (rows, labels) = toy();
        for solver in [SolverChoice::Dual, SolverChoice::Primal] {
            let params = SvmParams { solver, ..SvmParams::default() };
            let (svm, report) = LinearSvc::fit(&rows, &labels, 4, &params).unwrap();
            assert!(report.converged, "{solver:?} did not converge");
            assert_eq!(svm.classes(), &[Category::Hardware, Category::Network, Category::Software]);
            for (x, &label) in rows.iter().zip(&labels) {
                assert_eq!(svm.predict(x).0, label, "{solver:?}");
            }
        }
    }

    #[test]
    fn dual_and_primal_agree_on_weights() {
        let (rows, labels) = toy();
        let tight = SvmParams { tolerance: 1e-8, max_iter: 10_000, ..SvmParams::default() };
        let (dual, _) =
            LinearSvc::fit(&rows, &labels, 4, &SvmParams { solver: SolverChoice::Dual, ..tight })
                .unwrap();
        let (primal, _) =
            LinearSvc::fit(&rows, &labels, 4, &SvmParams { solver: SolverChoice::Primal, ..tight })
                .unwrap();
        for (a, b) in dual.weights.iter().flatten().zip(primal.weights.iter().flatten()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
        for (a, b) in dual.biases().iter().zip(primal.biases()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn zero_row_falls_back_to_biases() {
        let (rows, labels) = toy();
        let (svm, _) = LinearSvc::fit(&rows, &labels, 4, &SvmParams::default()).unwrap();
        let (category, scores) = svm.predict(&SparseVector::default());
        for (&(_, score), &bias) in scores.0.iter().zip(svm.biases()) {
            assert_eq!(score, bias);
        }
        assert_eq!(Some(category), scores.best());
    }

    #[test]
    fn fitting_is_reproducible() {
        let (rows, labels) = toy();
        let (a, _) = LinearSvc::fit(&rows, &labels, 4, &SvmParams::default()).unwrap();
        let (b, _) = LinearSvc::fit(&rows, &labels, 4, &SvmParams::default()).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.biases, b.biases);
    }

    #[test]
    fn single_class_is_rejected() {
        let rows = vec![row(&[(0, 1.0)])];
        let err = LinearSvc::fit(&rows, &[Category::Hardware], 1, &SvmParams::default());
        assert!(matches!(err, Err(TriageError::TooFewClasses(1))));
    }
}
