//! # planlevel-render
//!
//! Rendering backends for leveling results.
//!
//! This crate provides:
//! - Text reports for terminal output
//! - Multi-sheet Excel exports via `rust_xlsxwriter`
//!
//! Renderers consume the plan and the finished allocation; they never
//! mutate either.
//!
//! ## Example
//!
//! ```rust,ignore
//! use planlevel_core::Renderer;
//! use planlevel_render::{ExcelRenderer, TextRenderer};
//!
//! let report = TextRenderer::new(3300).render(&plan, &allocation)?;
//! let xlsx = ExcelRenderer::new(3300).render(&plan, &allocation)?;
//! std::fs::write("leveled.xlsx", xlsx)?;
//! ```

pub mod excel;

pub use excel::ExcelRenderer;

use planlevel_core::{Allocation, Plan, Qty, RenderError, Renderer};
use planlevel_engine::{achievement, overloaded_days, utilization};

/// Plain-text report renderer.
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Daily capacity, for utilization and overload lines
    pub daily_capacity: Qty,
    /// Echo the input demand table above the allocation table
    pub show_input: bool,
}

impl TextRenderer {
    pub fn new(daily_capacity: Qty) -> Self {
        Self {
            daily_capacity,
            show_input: false,
        }
    }

    /// Include the input demand table (builder pattern)
    pub fn with_input(mut self) -> Self {
        self.show_input = true;
        self
    }

    fn column_widths(&self, plan: &Plan) -> (usize, Vec<usize>) {
        let id_width = plan
            .rows
            .iter()
            .map(|r| r.id.len())
            .chain(["Day total".len()].into_iter())
            .max()
            .unwrap_or(8);
        let day_widths = plan
            .days
            .iter()
            .map(|d| d.label.len().max(6))
            .collect();
        (id_width, day_widths)
    }

    fn write_table(
        &self,
        out: &mut String,
        plan: &Plan,
        cells: impl Fn(usize, usize) -> Qty,
        id_width: usize,
        day_widths: &[usize],
    ) {
        out.push_str(&format!("{:<id_width$}  Unit", "Product"));
        for (day, &width) in plan.days.iter().zip(day_widths) {
            out.push_str(&format!("  {:>width$}", day.label));
        }
        out.push_str("   Total\n");

        for (row_idx, row) in plan.rows.iter().enumerate() {
            out.push_str(&format!("{:<id_width$}  {:>4}", row.id, row.effective_unit()));
            let mut total = 0;
            for (day, &width) in (0..plan.horizon()).zip(day_widths) {
                let qty = cells(row_idx, day);
                total += qty;
                out.push_str(&format!("  {qty:>width$}"));
            }
            out.push_str(&format!("  {total:>6}\n"));
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, plan: &Plan, allocation: &Allocation) -> Result<String, RenderError> {
        if allocation.rows.len() != plan.rows.len() || allocation.horizon != plan.horizon() {
            return Err(RenderError::InvalidData(
                "allocation shape does not match plan".into(),
            ));
        }

        let (id_width, day_widths) = self.column_widths(plan);
        let mut out = String::new();

        out.push_str(&format!(
            "Plan: {}  ({} rows x {} days, capacity {})\n\n",
            plan.name,
            plan.rows.len(),
            plan.horizon(),
            self.daily_capacity
        ));

        if self.show_input {
            out.push_str("Input demand\n");
            self.write_table(
                &mut out,
                plan,
                |row, day| plan.rows[row].demand[day],
                id_width,
                &day_widths,
            );
            out.push('\n');
        }

        out.push_str("Allocation\n");
        self.write_table(
            &mut out,
            plan,
            |row, day| allocation.get(row, day),
            id_width,
            &day_widths,
        );

        let totals = allocation.day_totals();
        out.push_str(&format!("{:<id_width$}      ", "Day total"));
        for (&total, &width) in totals.iter().zip(&day_widths) {
            out.push_str(&format!("  {total:>width$}"));
        }
        out.push_str(&format!("  {:>6}\n", allocation.total_allocated()));

        let util = utilization(plan, allocation, self.daily_capacity);
        out.push_str(&format!("{:<id_width$}      ", "Capacity %"));
        for (day, &width) in util.days.iter().zip(&day_widths) {
            out.push_str(&format!("  {:>width$.1}", day.percent));
        }
        out.push('\n');

        let ach = achievement(plan, allocation);
        out.push_str(&format!(
            "\nAchievement: {}/{} ({:.1}%)\n",
            ach.total_allocated, ach.total_demand, ach.overall_percent
        ));
        for row in &ach.rows {
            out.push_str(&format!(
                "  {:<id_width$}  {}/{} ({:.1}%)\n",
                row.row_id, row.allocated, row.demand, row.percent
            ));
        }

        let overloads = overloaded_days(plan, allocation, self.daily_capacity);
        if overloads.is_empty() {
            out.push_str(&format!(
                "\nAll day totals within capacity {}\n",
                self.daily_capacity
            ));
        } else {
            out.push_str(&format!("\nWARNING: {} day(s) over capacity:\n", overloads.len()));
            for over in &overloads {
                out.push_str(&format!(
                    "  {} total {} > {}\n",
                    over.label, over.total, over.capacity
                ));
            }
        }

        Ok(out)
    }
}
