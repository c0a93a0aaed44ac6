// src/planning/engine.rs

use crate::error::{Cancelled, ModelError, SolverError};
use crate::model::Product;
use crate::planning::config::OptimizerConfig;
use crate::planning::result::{
    MonthlyBreakdown, OptimizationResult, OptimizationStatus, OrderLine, ProductTotal, SolveStats,
};
use crate::solver::{
    solve_with_budget, CancelToken, LinearExpr, MilpModel, MilpSolver, RawSolution, SolveStatus,
    VarId,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// The integer program for one call plus the map back to (product, month).
struct OrderModel {
    model: MilpModel,
    /// `vars[product][month - 1]`
    vars: Vec<Vec<VarId>>,
}

/// Multi-period purchase planning over a fixed product list.
///
/// Holds no state between calls, so one optimizer can serve concurrent
/// `optimize` calls on shared product slices.
#[derive(Debug, Clone)]
pub struct PurchaseOrderOptimizer {
    config: OptimizerConfig,
    solver: Option<Arc<dyn MilpSolver>>,
}

impl PurchaseOrderOptimizer {
    /// Use the engine named in `config.solver`.
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            solver: None,
        }
    }

    /// Use an explicit engine, ignoring `config.solver`.
    pub fn with_solver(config: OptimizerConfig, solver: Arc<dyn MilpSolver>) -> Self {
        Self {
            config,
            solver: Some(solver),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    fn resolve_solver(&self) -> Result<Arc<dyn MilpSolver>, SolverError> {
        match &self.solver {
            Some(solver) => Ok(Arc::clone(solver)),
            None => self.config.solver.solver(),
        }
    }

    /// Build, solve, and read back the purchase plan.
    ///
    /// Every failure other than cancellation comes back as a status-tagged
    /// result.
    #[instrument(
        skip_all,
        fields(products = products.len(), months = self.config.planning_months)
    )]
    pub fn optimize(
        &self,
        products: &[Product],
        cancel: &CancelToken,
    ) -> Result<OptimizationResult, Cancelled> {
        let started = Instant::now();

        let solver = match self.resolve_solver() {
            Ok(solver) => solver,
            Err(e) => {
                warn!(error = %e, "no solver available");
                return Ok(OptimizationResult::error(e.to_string()));
            }
        };

        // =================================================================
        // PHASE 1: Model construction
        // =================================================================
        let order_model = match self.build_model(products) {
            Ok(order_model) => order_model,
            Err(e) => {
                warn!(error = %e, "model construction failed");
                return Ok(OptimizationResult::error(e.to_string()));
            }
        };
        let OrderModel { model, vars } = order_model;
        let model = Arc::new(model);
        info!(
            engine = solver.name(),
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            "model built"
        );

        // =================================================================
        // PHASE 2: Solve
        // =================================================================
        let outcome = solve_with_budget(
            Arc::clone(&solver),
            Arc::clone(&model),
            self.config.time_limit(),
            cancel,
        );
        let stats = SolveStats {
            variables: model.num_variables(),
            constraints: model.num_constraints(),
            engine: solver.name().to_string(),
            elapsed: started.elapsed(),
        };

        // =================================================================
        // PHASE 3: Result extraction
        // =================================================================
        let result = match outcome {
            Ok(raw) => self.extract(products, &model, &vars, raw),
            Err(SolverError::Cancelled) => return Err(Cancelled),
            Err(SolverError::Infeasible) => {
                warn!("constraint set is infeasible");
                OptimizationResult::infeasible()
            }
            Err(e) => {
                warn!(error = %e, "solve failed");
                OptimizationResult::error(e.to_string())
            }
        };

        info!(
            status = %result.status,
            objective = result.objective_value,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "optimization finished"
        );
        Ok(result.with_stats(stats))
    }

    fn validate(&self, products: &[Product]) -> Result<(), ModelError> {
        self.config.validate()?;
        let mut seen = HashSet::with_capacity(products.len());
        for product in products {
            product.validate()?;
            if !seen.insert(product.id.as_str()) {
                return Err(ModelError::DuplicateId(product.id.clone()));
            }
        }
        Ok(())
    }

    fn build_model(&self, products: &[Product]) -> Result<OrderModel, ModelError> {
        self.validate(products)?;

        let months = self.config.planning_months;
        let shipping = &self.config.shipping;
        let duty_rate = shipping.effective_duty_rate();
        let mut model = MilpModel::new();

        // One bounded integer variable per (product, month), objective in the same pass.
        let mut vars = Vec::with_capacity(products.len());
        for product in products {
            let bounds = product
                .demand_forecast
                .upper_bounds(months, self.config.demand_multiplier);
            let unit_profit = product.margin()
                - shipping.cost_per_kg * product.weight_kg()
                - shipping.cost_per_m3 * product.volume_m3()
                - duty_rate * product.wholesale_price;

            let mut row = Vec::with_capacity(months as usize);
            for (month, upper) in (1..=months).zip(bounds) {
                let name = format!("q_{}_m{}", product.id, month);
                let var = model.add_integer_var(name, upper as f64);
                model.objective.add_term(var, unit_profit);
                row.push(var);
            }
            vars.push(row);
        }

        let month_sum = |month: u32, coefficient: &dyn Fn(&Product) -> f64| {
            let mut expr = LinearExpr::new();
            for (product, row) in products.iter().zip(&vars) {
                expr.add_term(row[(month - 1) as usize], coefficient(product));
            }
            expr
        };

        for month in 1..=months {
            model.add_leq(
                format!("budget_m{month}"),
                month_sum(month, &|p: &Product| p.wholesale_price),
                self.config.budget_per_month,
            );
        }

        // Inventory accumulates, so the warehouse bound spans the horizon.
        let mut warehouse = LinearExpr::new();
        for (product, row) in products.iter().zip(&vars) {
            for &var in row {
                warehouse.add_term(var, product.volume_m3());
            }
        }
        model.add_leq("warehouse_capacity", warehouse, self.config.warehouse_capacity_m3);

        for month in 1..=months {
            model.add_leq(
                format!("shipping_weight_m{month}"),
                month_sum(month, &Product::weight_kg),
                shipping.max_weight_kg,
            );
        }
        for month in 1..=months {
            model.add_leq(
                format!("shipping_volume_m{month}"),
                month_sum(month, &Product::volume_m3),
                shipping.max_volume_m3,
            );
        }

        Ok(OrderModel { model, vars })
    }

    fn extract(
        &self,
        products: &[Product],
        model: &MilpModel,
        vars: &[Vec<VarId>],
        raw: RawSolution,
    ) -> OptimizationResult {
        let status = match raw.status {
            SolveStatus::Optimal => OptimizationStatus::Optimal,
            SolveStatus::Feasible => {
                warn!("solver stopped before proving optimality");
                OptimizationStatus::Feasible
            }
        };

        // Solvers report near-integers; snap before anything is derived.
        let rounded: Vec<f64> = raw
            .values
            .iter()
            .map(|v| if v.is_finite() { v.round().max(0.0) } else { 0.0 })
            .collect();
        if rounded.len() != model.num_variables() {
            return OptimizationResult::error(format!(
                "solver returned {} values for {} variables",
                rounded.len(),
                model.num_variables()
            ));
        }
        debug!(
            raw_objective = raw.objective_value,
            "solver objective before rounding"
        );

        let shipping = &self.config.shipping;
        let mut purchase_orders = BTreeMap::new();
        let mut monthly_breakdown = BTreeMap::new();

        for month in 1..=self.config.planning_months {
            let mut orders = BTreeMap::new();
            let mut month_total = MonthlyBreakdown::default();

            for (product, row) in products.iter().zip(vars) {
                let VarId(index) = row[(month - 1) as usize];
                let quantity = rounded[index] as u64;
                if quantity == 0 {
                    continue;
                }
                let qty = quantity as f64;
                let line = OrderLine {
                    name: product.name.clone(),
                    quantity,
                    unit_wholesale: product.wholesale_price,
                    total_cost: product.wholesale_price * qty,
                    unit_retail: product.retail_price,
                    total_revenue: product.retail_price * qty,
                    margin: product.margin() * qty,
                    weight_kg: product.weight_kg() * qty,
                    volume_m3: product.volume_m3() * qty,
                };
                month_total.product_cost += line.total_cost;
                month_total.product_revenue += line.total_revenue;
                month_total.weight_kg += line.weight_kg;
                month_total.volume_m3 += line.volume_m3;
                orders.insert(product.id.clone(), line);
            }

            month_total.gross_margin = month_total.product_revenue - month_total.product_cost;
            month_total.weight_shipping = shipping.cost_per_kg * month_total.weight_kg;
            month_total.volume_shipping = shipping.cost_per_m3 * month_total.volume_m3;
            month_total.customs_duty = shipping.effective_duty_rate() * month_total.product_cost;
            month_total.total_costs = month_total.product_cost
                + month_total.weight_shipping
                + month_total.volume_shipping
                + month_total.customs_duty;
            month_total.net_profit = month_total.product_revenue - month_total.total_costs;
            month_total.items_ordered = orders.len();

            purchase_orders.insert(month, orders);
            monthly_breakdown.insert(month, month_total);
        }

        let mut product_totals = BTreeMap::new();
        for product in products {
            let mut total = ProductTotal {
                name: product.name.clone(),
                total_quantity: 0,
                total_cost: 0.0,
                total_revenue: 0.0,
                total_margin: 0.0,
            };
            for line in purchase_orders
                .values()
                .filter_map(|orders: &BTreeMap<String, OrderLine>| orders.get(&product.id))
            {
                total.total_quantity += line.quantity;
                total.total_cost += line.total_cost;
                total.total_revenue += line.total_revenue;
            }
            if total.total_quantity > 0 {
                total.total_margin = total.total_revenue - total.total_cost;
                product_totals.insert(product.id.clone(), total);
            }
        }

        OptimizationResult {
            status,
            message: None,
            objective_value: model.objective.evaluate(&rounded),
            purchase_orders,
            monthly_breakdown,
            product_totals,
            stats: SolveStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::{DemandForecast, ForecastDefaults, SeasonalFactors};
    use crate::model::ShippingOption;
    use std::time::Duration;

    fn product(id: &str, wholesale: f64, retail: f64, base_demand: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product_{id}"),
            wholesale_price: wholesale,
            retail_price: retail,
            size_cm3: 1_000.0,
            weight_g: 500.0,
            category: "General".to_string(),
            shipping_cost_multiplier: 1.0,
            demand_forecast: DemandForecast::new(
                base_demand,
                Arc::new(SeasonalFactors::flat()),
                ForecastDefaults {
                    trend_factor: 1.0,
                    demand_buffer: 1.5,
                },
            ),
        }
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig {
            planning_months: 1,
            budget_per_month: 1_000.0,
            warehouse_capacity_m3: 10.0,
            shipping: ShippingOption {
                cost_per_kg: 2.0,
                cost_per_m3: 50.0,
                max_weight_kg: 1_000.0,
                max_volume_m3: 10.0,
                crosses_border: false,
                ..ShippingOption::default()
            },
            ..OptimizerConfig::default()
        }
    }

    /// Returns whatever assignment it was built with.
    #[derive(Debug)]
    struct Scripted(Result<RawSolution, SolverError>);

    impl MilpSolver for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn solve(
            &self,
            _model: &MilpModel,
            _limit: Duration,
            _cancel: &CancelToken,
        ) -> Result<RawSolution, SolverError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_model_shape() {
        let optimizer = PurchaseOrderOptimizer::new(OptimizerConfig {
            planning_months: 3,
            ..config()
        });
        let products = vec![product("A", 10.0, 20.0, 100.0), product("B", 5.0, 9.0, 40.0)];
        let OrderModel { model, vars } = optimizer.build_model(&products).unwrap();

        assert_eq!(model.num_variables(), 6);
        // 3 budget + 1 warehouse + 3 weight + 3 volume
        assert_eq!(model.num_constraints(), 10);
        assert_eq!(vars.len(), 2);
        assert_eq!(model.variables[vars[0][0].0].upper, 150.0);
        assert_eq!(model.variables[vars[1][2].0].upper, 60.0);
        assert_eq!(model.variables[vars[1][2].0].name, "q_B_m3");
    }

    #[test]
    fn test_objective_coefficients_include_duty_across_border() {
        let mut cfg = config();
        cfg.shipping.crosses_border = true;
        cfg.shipping.customs_duty_rate = 0.1;
        let optimizer = PurchaseOrderOptimizer::new(cfg);
        let OrderModel { model, .. } = optimizer
            .build_model(&[product("A", 10.0, 20.0, 100.0)])
            .unwrap();

        // 10 margin - 1.0 weight - 0.05 volume - 1.0 duty
        let (_, coefficient) = model.objective.terms[0];
        assert!((coefficient - 7.95).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_ids_are_an_error_result() {
        let optimizer = PurchaseOrderOptimizer::new(config());
        let products = vec![product("A", 10.0, 20.0, 100.0), product("A", 5.0, 9.0, 40.0)];
        let result = optimizer.optimize(&products, &CancelToken::new()).unwrap();
        assert_eq!(result.status, OptimizationStatus::Error);
        assert!(result.message.unwrap().contains("duplicate"));
    }

    #[test]
    fn test_negative_weight_is_an_error_result() {
        let optimizer = PurchaseOrderOptimizer::new(config());
        let mut bad = product("A", 10.0, 20.0, 100.0);
        bad.weight_g = -1.0;
        let result = optimizer.optimize(&[bad], &CancelToken::new()).unwrap();
        assert_eq!(result.status, OptimizationStatus::Error);
        assert!(result.purchase_orders.is_empty());
        assert_eq!(result.objective_value, 0.0);
    }

    #[test]
    fn test_feasible_result_is_rounded_and_recomputed() {
        let solver = Scripted(Ok(RawSolution {
            status: SolveStatus::Feasible,
            values: vec![49.999_999_8],
            objective_value: 447.0,
        }));
        let optimizer = PurchaseOrderOptimizer::with_solver(config(), Arc::new(solver));
        let result = optimizer
            .optimize(&[product("A", 10.0, 20.0, 100.0)], &CancelToken::new())
            .unwrap();

        assert_eq!(result.status, OptimizationStatus::Feasible);
        assert_eq!(result.quantity(1, "A"), 50);
        let month = &result.monthly_breakdown[&1];
        assert!((month.product_cost - 500.0).abs() < 1e-9);
        assert!((month.weight_shipping - 50.0).abs() < 1e-9);
        assert!((month.volume_shipping - 2.5).abs() < 1e-9);
        assert_eq!(month.customs_duty, 0.0);
        assert!((month.net_profit - 447.5).abs() < 1e-9);
        assert!((result.objective_value - 447.5).abs() < 1e-9);
        assert_eq!(result.product_totals["A"].total_quantity, 50);
        assert_eq!(result.stats.engine, "scripted");
    }

    #[test]
    fn test_solver_failures_become_statuses() {
        let products = [product("A", 10.0, 20.0, 100.0)];
        let cancel = CancelToken::new();

        let failing = |err: SolverError| {
            PurchaseOrderOptimizer::with_solver(config(), Arc::new(Scripted(Err(err))))
                .optimize(&products, &cancel)
        };

        let infeasible = failing(SolverError::Infeasible).unwrap();
        assert_eq!(infeasible.status, OptimizationStatus::Infeasible);
        assert!(infeasible.product_totals.is_empty());

        let unbounded = failing(SolverError::Unbounded).unwrap();
        assert_eq!(unbounded.status, OptimizationStatus::Error);

        let cancelled = failing(SolverError::Cancelled);
        assert_eq!(cancelled, Err(Cancelled));
    }

    #[test]
    fn test_wrong_value_count_is_an_error() {
        let solver = Scripted(Ok(RawSolution {
            status: SolveStatus::Optimal,
            values: vec![],
            objective_value: 0.0,
        }));
        let result = PurchaseOrderOptimizer::with_solver(config(), Arc::new(solver))
            .optimize(&[product("A", 10.0, 20.0, 100.0)], &CancelToken::new())
            .unwrap();
        assert_eq!(result.status, OptimizationStatus::Error);
    }

    #[test]
    fn test_no_products_is_an_empty_optimal_plan() {
        let result = PurchaseOrderOptimizer::new(OptimizerConfig {
            planning_months: 2,
            ..config()
        })
        .optimize(&[], &CancelToken::new())
        .unwrap();
        assert_eq!(result.status, OptimizationStatus::Optimal);
        assert_eq!(result.purchase_orders.len(), 2);
        assert!(result.purchase_orders.values().all(BTreeMap::is_empty));
        assert_eq!(result.objective_value, 0.0);
    }
}
