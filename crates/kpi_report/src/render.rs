use std::fmt;
use std::fmt::Write;

use kpi_engine::aggregator::KpiReport;
use kpi_engine::deviation::Deviation;
use kpi_engine::period::ReportingPeriod;
use work_order_records::history::HistoryRecord;
use work_order_records::work_order::PlanningRecord;

/// Plain-text rendering of a report for the terminal.
pub fn human(report: &KpiReport, period: ReportingPeriod) -> Result<String, fmt::Error>
{
    let mut out = String::new();

    writeln!(out, "KPI report ({period})")?;
    writeln!(out, "  delivered orders    {}", report.total_ots)?;
    writeln!(out, "  compliance rate     {}%", report.compliance_rate)?;
    writeln!(out, "  pending / urgent    {} / {}", report.pending_count, report.urgent_count)?;
    writeln!(out, "  preventive          {}", report.prev_vs_corr.preventive)?;
    writeln!(out, "  corrective          {}", report.prev_vs_corr.corrective)?;

    writeln!(out, "\nEquipment with most corrective work")?;
    if report.top_equipments.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for equipment in &report.top_equipments {
        writeln!(out, "  {:<30} {}", equipment.name, equipment.count)?;
    }

    writeln!(out, "\nTechnician performance (on time / late / total)")?;
    if report.tech_performance.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for technician in &report.tech_performance {
        writeln!(out, "  {:<30} {} / {} / {}", technician.name, technician.on_time, technician.late, technician.total)?;
    }

    write_deviations(&mut out, "Late deliveries", &report.late_list)?;
    write_deviations(&mut out, "On-time deliveries", &report.early_list)?;

    Ok(out)
}

fn write_deviations(out: &mut String, title: &str, deviations: &[Deviation]) -> fmt::Result
{
    writeln!(out, "\n{title} ({})", deviations.len())?;
    for deviation in deviations {
        let record = &deviation.record;
        let days = if deviation.days == 1 { "day" } else { "days" };
        writeln!(out, "  {:<12} {:<24} {} {days}", record.order_number, record.assigned_technician, deviation.days)?;
    }
    Ok(())
}

/// One line per order, in board order.
pub fn board(rows: &[PlanningRecord]) -> Result<String, fmt::Error>
{
    let mut out = String::new();
    if rows.is_empty() {
        writeln!(out, "No orders on this board")?;
    }
    for record in rows {
        write_planning_row(&mut out, record)?;
    }
    Ok(out)
}

pub fn search_results(planning: &[&PlanningRecord], history: &[&HistoryRecord]) -> Result<String, fmt::Error>
{
    let mut out = String::new();

    writeln!(out, "Planning ({})", planning.len())?;
    for record in planning {
        write_planning_row(&mut out, record)?;
    }

    writeln!(out, "\nHistory ({})", history.len())?;
    for record in history {
        writeln!(
            out,
            "  {:<12} {:<12} {:<24} {:<24} {}",
            record.processed_on, record.order_number, record.order_type, record.equipment_name, record.responsible_technician
        )?;
    }

    Ok(out)
}

fn write_planning_row(out: &mut String, record: &PlanningRecord) -> fmt::Result
{
    writeln!(
        out,
        "  {:<10} {:<12} {:<24} {:<24} due {}",
        record.status.label(),
        record.order_number,
        record.assigned_technician,
        record.equipment_name,
        record.due_on.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests
{
    use kpi_engine::aggregator::EquipmentFailures;
    use kpi_engine::aggregator::TechnicianPerformance;
    use work_order_records::work_order::OrderStatus;

    use super::*;

    #[test]
    fn test_empty_report()
    {
        let text = human(&KpiReport::default(), ReportingPeriod::LastMonth).unwrap();

        assert!(text.starts_with("KPI report (last_month)\n"));
        assert!(text.contains("compliance rate     0%"));
        assert!(text.contains("Late deliveries (0)"));
        assert_eq!(text.matches("(none)").count(), 2);
    }

    #[test]
    fn test_report_lists()
    {
        let late = PlanningRecord::new("P002", "Juan", OrderStatus::Entregado, "03/05/2024");
        let report = KpiReport {
            total_ots: 2,
            compliance_rate: 50,
            top_equipments: vec![EquipmentFailures {
                name: "Bomba 3".to_string(),
                count: 2,
            }],
            tech_performance: vec![TechnicianPerformance {
                name: "Juan".to_string(),
                on_time: 0,
                late: 1,
                total: 1,
            }],
            late_list: vec![Deviation { record: late, days: 1 }],
            ..Default::default()
        };

        let text = human(&report, ReportingPeriod::ThisMonth).unwrap();

        assert!(text.contains("compliance rate     50%"));
        assert!(text.contains("Bomba 3"));
        assert!(text.contains("0 / 1 / 1"));
        assert!(text.contains("Late deliveries (1)"));
        assert!(text.contains("1 day\n"));
        assert!(text.contains("On-time deliveries (0)"));
    }

    #[test]
    fn test_board_rows()
    {
        let rows = vec![
            PlanningRecord::new("P7", "Ana Diaz", OrderStatus::Urgente, "02/05/2024").with_due_on("04/05/2024"),
            PlanningRecord::new("P3", "Ana Diaz", OrderStatus::Pendiente, "01/05/2024"),
        ];

        let text = board(&rows).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("URGENTE") && lines[0].contains("P7") && lines[0].ends_with("due 04/05/2024"));
        assert!(lines[1].ends_with("due -"));
        assert_eq!(board(&[]).unwrap(), "No orders on this board\n");
    }

    #[test]
    fn test_search_results()
    {
        let order = PlanningRecord::new("P7", "Ana Diaz", OrderStatus::Pendiente, "02/05/2024");
        let entry = HistoryRecord::new("03/05/2024", "CORRECTIVA", "Bomba 3");

        let text = search_results(&[&order], &[&entry]).unwrap();

        assert!(text.starts_with("Planning (1)\n"));
        assert!(text.contains("History (1)"));
        assert!(text.contains("CORRECTIVA"));
    }
}
