//! Bounded Nelder-Mead simplex minimiser.
//!
//! Bounds are enforced by clamping every candidate vertex, which is enough for
//! the box-constrained smoothing parameters fitted in [`crate::forecast`].

#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop once `f(worst) - f(best)` drops below this.
    pub ftol: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            ftol: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Clone)]
struct Vertex {
    x: Vec<f64>,
    f: f64,
}

/// Minimises `objective` starting from `x0`.
///
/// `steps[i]` is the initial simplex offset along dimension `i`; `bounds[i]`
/// optionally restricts that dimension to `[lo, hi]`. NaN objective values are
/// treated as `+inf`.
pub fn nelder_mead<F>(
    mut objective: F,
    x0: &[f64],
    steps: &[f64],
    bounds: &[Option<(f64, f64)>],
    cfg: NelderMeadConfig,
) -> NelderMeadResult
where
    F: FnMut(&[f64]) -> f64,
{
    let dims = x0.len();
    let clamp = |x: &mut Vec<f64>| {
        for (i, v) in x.iter_mut().enumerate() {
            if let Some(Some((lo, hi))) = bounds.get(i) {
                *v = if v.is_nan() { (lo + hi) / 2.0 } else { v.clamp(*lo, *hi) };
            }
        }
    };
    let mut eval = |x: &[f64]| {
        let f = objective(x);
        if f.is_nan() { f64::INFINITY } else { f }
    };

    if dims == 0 {
        let value = eval(x0);
        return NelderMeadResult {
            x: Vec::new(),
            value,
            iterations: 0,
            converged: true,
        };
    }

    let mut start = x0.to_vec();
    clamp(&mut start);
    let mut simplex = Vec::with_capacity(dims + 1);
    simplex.push(Vertex {
        f: eval(&start),
        x: start.clone(),
    });
    for i in 0..dims {
        let mut x = start.clone();
        let step = steps.get(i).copied().unwrap_or(0.05);
        x[i] += step;
        clamp(&mut x);
        // A start on the upper bound would collapse the simplex; step inward instead.
        if x[i] == start[i] {
            x[i] -= step;
            clamp(&mut x);
        }
        simplex.push(Vertex { f: eval(&x), x });
    }

    let mut iterations = 0usize;
    let mut converged = false;
    while iterations < cfg.max_iter {
        simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
        let best_f = simplex[0].f;
        let worst_f = simplex[dims].f;
        if best_f.is_finite() && worst_f.is_finite() && (worst_f - best_f).abs() < cfg.ftol {
            converged = true;
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; dims];
        for v in simplex.iter().take(dims) {
            for (c, x) in centroid.iter_mut().zip(&v.x) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= dims as f64;
        }
        let worst = simplex[dims].x.clone();

        let mut xr = toward(&centroid, &worst, -cfg.reflection);
        clamp(&mut xr);
        let fr = eval(&xr);

        if fr < simplex[0].f {
            let mut xe = toward(&centroid, &xr, cfg.expansion);
            clamp(&mut xe);
            let fe = eval(&xe);
            simplex[dims] = if fe < fr {
                Vertex { x: xe, f: fe }
            } else {
                Vertex { x: xr, f: fr }
            };
            continue;
        }

        if fr < simplex[dims - 1].f {
            simplex[dims] = Vertex { x: xr, f: fr };
            continue;
        }

        let mut xc = if fr < simplex[dims].f {
            toward(&centroid, &xr, cfg.contraction)
        } else {
            toward(&centroid, &worst, cfg.contraction)
        };
        clamp(&mut xc);
        let fc = eval(&xc);
        if fc < simplex[dims].f.min(fr) {
            simplex[dims] = Vertex { x: xc, f: fc };
            continue;
        }

        let best = simplex[0].x.clone();
        for v in simplex.iter_mut().skip(1) {
            let mut x = toward(&best, &v.x, cfg.shrink);
            clamp(&mut x);
            v.f = eval(&x);
            v.x = x;
        }
    }

    simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
    let best = simplex.swap_remove(0);
    NelderMeadResult {
        x: best.x,
        value: best.f,
        iterations,
        converged,
    }
}

/// `from + coef * (to - from)`, per coordinate.
fn toward(from: &[f64], to: &[f64], coef: f64) -> Vec<f64> {
    from.iter()
        .zip(to)
        .map(|(c, t)| c + coef * (t - c))
        .collect()
}
