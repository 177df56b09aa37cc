//! Excel leveling report renderer
//!
//! Generates XLSX files with multiple sheets:
//! - Input Plan: the demand matrix as imported
//! - Allocation: the leveled matrix with a TOTAL row
//! - Daily Totals: per-day totals, utilization and achievement summary
//!
//! Over-capacity day totals are highlighted so planners can spot overload
//! without re-running the numbers.
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Allocation
//! | Product    | Unit | MON  | TUE  | WED  | Total |
//! |------------|------|------|------|------|-------|
//! | FAN-630    | 10   | 40   | 40   | 0    | 80    |
//! | FLANGE-200 | 10   | 30   | 30   | 30   | 90    |
//! | TOTAL      |      | 70   | 70   | 30   | 170   |
//!
//! Sheet: Daily Totals
//! | Day | Label | Total | Capacity | Utilization % |
//! |-----|-------|-------|----------|---------------|
//! | 1   | MON   | 70    | 100      | 70.0          |
//! ```

use planlevel_core::{Allocation, Plan, Qty, RenderError, Renderer};
use planlevel_engine::{achievement, overloaded_days, utilization};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

fn fmt_err(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

/// Excel leveling report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Daily capacity, for utilization and overload highlighting
    pub daily_capacity: Qty,
    /// Whether to include the Input Plan sheet
    pub include_input: bool,
    /// Whether to include the Daily Totals sheet
    pub include_totals: bool,
}

impl ExcelRenderer {
    pub fn new(daily_capacity: Qty) -> Self {
        Self {
            daily_capacity,
            include_input: true,
            include_totals: true,
        }
    }

    /// Skip the Input Plan sheet (allocation only)
    pub fn no_input(mut self) -> Self {
        self.include_input = false;
        self
    }

    /// Skip the Daily Totals sheet
    pub fn no_totals(mut self) -> Self {
        self.include_totals = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(
        &self,
        plan: &Plan,
        allocation: &Allocation,
    ) -> Result<Vec<u8>, RenderError> {
        if allocation.rows.len() != plan.rows.len() || allocation.horizon != plan.horizon() {
            return Err(RenderError::InvalidData(
                "allocation shape does not match plan".into(),
            ));
        }

        let mut workbook = Workbook::new();
        let formats = Self::create_formats();

        if self.include_input {
            self.add_matrix_sheet(&mut workbook, plan, "Input Plan", &formats, |row, day| {
                plan.rows[row].demand[day]
            })?;
        }

        self.add_matrix_sheet(&mut workbook, plan, "Allocation", &formats, |row, day| {
            allocation.get(row, day)
        })?;

        if self.include_totals {
            self.add_totals_sheet(&mut workbook, plan, allocation, &formats)?;
        }

        workbook.save_to_buffer().map_err(fmt_err)
    }

    /// Create reusable formats
    fn create_formats() -> ExcelFormats {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let restricted_header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x808080)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let integer = Format::new()
            .set_num_format("#,##0")
            .set_border(FormatBorder::Thin);

        let percent = Format::new()
            .set_num_format("0.0")
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let total_row = Format::new()
            .set_bold()
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        let total_integer = Format::new()
            .set_bold()
            .set_num_format("#,##0")
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        let overload = Format::new()
            .set_num_format("#,##0")
            .set_background_color(0xFFC7CE)
            .set_font_color(0x9C0006)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            header,
            restricted_header,
            integer,
            percent,
            text,
            total_row,
            total_integer,
            overload,
        }
    }

    /// Add a product × day matrix sheet with a TOTAL row
    fn add_matrix_sheet(
        &self,
        workbook: &mut Workbook,
        plan: &Plan,
        name: &str,
        formats: &ExcelFormats,
        cells: impl Fn(usize, usize) -> Qty,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(fmt_err)?;

        Self::write_day_headers(sheet, plan, formats)?;

        let day_count = plan.horizon() as u16;
        let total_col = 2 + day_count;

        let mut row = 1u32;
        let mut day_totals: Vec<Qty> = vec![0; plan.horizon()];
        let mut grand_total: Qty = 0;

        for (row_idx, product) in plan.rows.iter().enumerate() {
            sheet
                .write_with_format(row, 0, &product.id, &formats.text)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 1, product.effective_unit() as f64, &formats.integer)
                .map_err(fmt_err)?;

            let mut row_total: Qty = 0;
            for day in 0..plan.horizon() {
                let qty = cells(row_idx, day);
                row_total += qty;
                day_totals[day] += qty;
                sheet
                    .write_with_format(row, 2 + day as u16, qty as f64, &formats.integer)
                    .map_err(fmt_err)?;
            }
            grand_total += row_total;
            sheet
                .write_with_format(row, total_col, row_total as f64, &formats.total_integer)
                .map_err(fmt_err)?;
            row += 1;
        }

        // TOTAL row, over-capacity days highlighted
        sheet
            .write_with_format(row, 0, "TOTAL", &formats.total_row)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(row, 1, "", &formats.total_row)
            .map_err(fmt_err)?;
        for (day, &total) in day_totals.iter().enumerate() {
            let fmt = if total > self.daily_capacity {
                &formats.overload
            } else {
                &formats.total_integer
            };
            sheet
                .write_with_format(row, 2 + day as u16, total as f64, fmt)
                .map_err(fmt_err)?;
        }
        sheet
            .write_with_format(row, total_col, grand_total as f64, &formats.total_integer)
            .map_err(fmt_err)?;

        sheet.set_freeze_panes(1, 2).ok();

        Ok(())
    }

    /// Write Product / Unit / day label headers
    fn write_day_headers(
        sheet: &mut Worksheet,
        plan: &Plan,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet
            .write_with_format(0, 0, "Product", &formats.header)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(0, 1, "Unit", &formats.header)
            .map_err(fmt_err)?;

        for (day_idx, day) in plan.days.iter().enumerate() {
            let fmt = if day.restricted {
                &formats.restricted_header
            } else {
                &formats.header
            };
            sheet
                .write_with_format(0, 2 + day_idx as u16, &day.label, fmt)
                .map_err(fmt_err)?;
            sheet.set_column_width(2 + day_idx as u16, 8).ok();
        }
        sheet
            .write_with_format(0, 2 + plan.horizon() as u16, "Total", &formats.header)
            .map_err(fmt_err)?;

        sheet.set_column_width(0, 18).ok();
        sheet.set_column_width(1, 6).ok();

        Ok(())
    }

    /// Add Daily Totals sheet: per-day utilization plus achievement summary
    fn add_totals_sheet(
        &self,
        workbook: &mut Workbook,
        plan: &Plan,
        allocation: &Allocation,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Daily Totals").map_err(fmt_err)?;

        let headers = ["Day", "Label", "Total", "Capacity", "Utilization %"];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(fmt_err)?;
        }
        sheet.set_column_width(0, 6).ok();
        sheet.set_column_width(1, 12).ok();
        sheet.set_column_width(2, 10).ok();
        sheet.set_column_width(3, 10).ok();
        sheet.set_column_width(4, 13).ok();

        let util = utilization(plan, allocation, self.daily_capacity);
        let mut row = 1u32;
        for day in &util.days {
            let total_fmt = if day.total > self.daily_capacity {
                &formats.overload
            } else {
                &formats.integer
            };
            sheet
                .write_with_format(row, 0, row as f64, &formats.integer)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 1, &day.label, &formats.text)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 2, day.total as f64, total_fmt)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 3, self.daily_capacity as f64, &formats.integer)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 4, day.percent, &formats.percent)
                .map_err(fmt_err)?;
            row += 1;
        }

        // Achievement summary below the table
        let ach = achievement(plan, allocation);
        row += 1;
        sheet
            .write_with_format(row, 0, "Achievement", &formats.total_row)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(row, 1, "", &formats.total_row)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(row, 2, ach.total_allocated as f64, &formats.total_integer)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(row, 3, ach.total_demand as f64, &formats.total_integer)
            .map_err(fmt_err)?;
        sheet
            .write_with_format(row, 4, ach.overall_percent, &formats.percent)
            .map_err(fmt_err)?;

        row += 1;
        for product in &ach.rows {
            sheet
                .write_with_format(row, 1, &product.row_id, &formats.text)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 2, product.allocated as f64, &formats.integer)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 3, product.demand as f64, &formats.integer)
                .map_err(fmt_err)?;
            sheet
                .write_with_format(row, 4, product.percent, &formats.percent)
                .map_err(fmt_err)?;
            row += 1;
        }

        // Overload note below the summary
        let overloads = overloaded_days(plan, allocation, self.daily_capacity);
        if !overloads.is_empty() {
            row += 1;
            let note = format!(
                "{} day(s) exceed capacity {}",
                overloads.len(),
                self.daily_capacity
            );
            sheet.write(row, 0, note.as_str()).map_err(fmt_err)?;
        }

        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, plan: &Plan, allocation: &Allocation) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(plan, allocation)
    }
}

/// Reusable cell formats for the workbook
struct ExcelFormats {
    header: Format,
    restricted_header: Format,
    integer: Format,
    percent: Format,
    text: Format,
    total_row: Format,
    total_integer: Format,
    overload: Format,
}
