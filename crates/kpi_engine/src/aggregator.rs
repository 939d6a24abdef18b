use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::Local;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use work_order_records::history::HistoryRecord;
use work_order_records::work_order::OrderStatus;
use work_order_records::work_order::PlanningRecord;

use crate::config::KpiConfig;
use crate::deviation::Deviation;
use crate::deviation::Timeliness;
use crate::deviation::classify;
use crate::period::ReportingPeriod;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PreventiveVsCorrective
{
    pub preventive: usize,
    pub corrective: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown
{
    pub delivered: usize,
    pub pending: usize,
    pub urgent: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EquipmentFailures
{
    pub name: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianPerformance
{
    pub name: String,
    pub on_time: usize,
    pub late: usize,
    pub total: usize,
}

/// Everything the KPI dashboard shows for one reporting period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport
{
    /// Delivered orders in the period.
    #[serde(rename = "totalOTs")]
    pub total_ots: usize,
    /// Delivered over planned, as a rounded percentage. Zero when nothing was planned.
    pub compliance_rate: u32,
    pub pending_count: usize,
    pub urgent_count: usize,
    pub prev_vs_corr: PreventiveVsCorrective,
    pub status_breakdown: StatusBreakdown,
    pub top_equipments: Vec<EquipmentFailures>,
    pub tech_performance: Vec<TechnicianPerformance>,
    pub late_list: Vec<Deviation>,
    pub early_list: Vec<Deviation>,
}

#[derive(Clone, Debug, Default)]
pub struct KpiAggregator
{
    config: KpiConfig,
}

impl KpiAggregator
{
    pub fn new(config: KpiConfig) -> Self
    {
        Self { config }
    }

    pub fn config(&self) -> &KpiConfig
    {
        &self.config
    }

    /// Recomputes the report from scratch. Identical inputs always give an
    /// identical report.
    pub fn aggregate(&self, planning: &[PlanningRecord], history: &[HistoryRecord], period: ReportingPeriod, today: NaiveDate) -> KpiReport
    {
        let planning = period.filter(planning, today, self.config.week_starts_on);
        let history = period.filter(history, today, self.config.week_starts_on);

        let status_breakdown = status_breakdown(&planning);
        let compliance_rate = compliance_rate(status_breakdown.delivered, planning.len());

        let prev_vs_corr = PreventiveVsCorrective {
            preventive: history.iter().filter(|record| record.is_preventive()).count(),
            corrective: history.iter().filter(|record| record.is_corrective()).count(),
        };

        let top_equipments = self.top_equipments(&history);
        let (tech_performance, late_list, early_list) = self.deviations(&planning);

        debug!(
            %period,
            %today,
            planned = planning.len(),
            logged = history.len(),
            delivered = status_breakdown.delivered,
            late = late_list.len(),
            early = early_list.len(),
            "Aggregated KPI report"
        );

        KpiReport {
            total_ots: status_breakdown.delivered,
            compliance_rate,
            pending_count: status_breakdown.pending,
            urgent_count: status_breakdown.urgent,
            prev_vs_corr,
            status_breakdown,
            top_equipments,
            tech_performance,
            late_list,
            early_list,
        }
    }

    /// Equipment with the most corrective entries, most first. Equal counts
    /// keep the order in which the equipment was first seen.
    fn top_equipments(&self, history: &[&HistoryRecord]) -> Vec<EquipmentFailures>
    {
        let mut equipments: Vec<EquipmentFailures> = Vec::new();
        let mut indices: HashMap<&str, usize> = HashMap::new();

        for record in history.iter().filter(|record| record.is_corrective()) {
            let name = if record.equipment_name.is_empty() {
                self.config.unnamed_equipment_label.as_str()
            } else {
                record.equipment_name.as_str()
            };

            match indices.entry(name) {
                Entry::Occupied(index) => equipments[*index.get()].count += 1,
                Entry::Vacant(slot) => {
                    slot.insert(equipments.len());
                    equipments.push(EquipmentFailures {
                        name: name.to_string(),
                        count: 1,
                    });
                }
            }
        }

        equipments.sort_by(|left, right| right.count.cmp(&left.count));
        equipments.truncate(self.config.top_equipment_limit);
        equipments
    }

    /// Technician names are bucketed verbatim: "Ana" and "ana " are two
    /// technicians here.
    fn deviations(&self, planning: &[&PlanningRecord]) -> (Vec<TechnicianPerformance>, Vec<Deviation>, Vec<Deviation>)
    {
        let mut performance: Vec<TechnicianPerformance> = Vec::new();
        let mut indices: HashMap<&str, usize> = HashMap::new();
        let mut late_list = Vec::new();
        let mut early_list = Vec::new();

        for record in planning {
            let Some(outcome) = classify(record) else {
                continue;
            };

            let name = if record.assigned_technician.is_empty() {
                self.config.unknown_technician_label.as_str()
            } else {
                record.assigned_technician.as_str()
            };

            let index = *indices.entry(name).or_insert_with(|| {
                performance.push(TechnicianPerformance {
                    name: name.to_string(),
                    on_time: 0,
                    late: 0,
                    total: 0,
                });
                performance.len() - 1
            });
            let technician = &mut performance[index];
            technician.total += 1;

            let deviation = Deviation {
                record: (*record).clone(),
                days: outcome.days,
            };

            match outcome.timeliness {
                Timeliness::OnTime => {
                    technician.on_time += 1;
                    early_list.push(deviation);
                }
                Timeliness::Late => {
                    technician.late += 1;
                    late_list.push(deviation);
                }
            }
        }

        performance.sort_by(|left, right| right.total.cmp(&left.total));
        (performance, late_list, early_list)
    }
}

fn status_breakdown(planning: &[&PlanningRecord]) -> StatusBreakdown
{
    let mut breakdown = StatusBreakdown::default();
    for record in planning {
        match record.status {
            OrderStatus::Entregado => breakdown.delivered += 1,
            OrderStatus::Pendiente => breakdown.pending += 1,
            OrderStatus::Urgente => breakdown.urgent += 1,
        }
    }
    breakdown
}

/// `round(100 * delivered / planned)` with halves rounded up, in integer
/// arithmetic.
pub fn compliance_rate(delivered: usize, planned: usize) -> u32
{
    if planned == 0 {
        return 0;
    }

    let rate = (200 * delivered as u64 + planned as u64) / (2 * planned as u64);
    u32::try_from(rate).unwrap_or(u32::MAX)
}

/// Aggregates against the local wall-clock date with the default config.
pub fn aggregate(planning: &[PlanningRecord], history: &[HistoryRecord], period: ReportingPeriod) -> KpiReport
{
    KpiAggregator::default().aggregate(planning, history, period, Local::now().date_naive())
}

#[cfg(test)]
mod tests
{
    use chrono::NaiveDate;

    use super::*;

    fn today() -> NaiveDate
    {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn corrective(equipment: &str, count: usize) -> Vec<HistoryRecord>
    {
        (0..count).map(|_| HistoryRecord::new("03/05/2024", "CORRECTIVA", equipment)).collect()
    }

    fn delivered(order: &str, technician: &str, executed_on: &str, due_on: &str) -> PlanningRecord
    {
        PlanningRecord::new(order, technician, OrderStatus::Entregado, "02-05-2024")
            .with_executed_on(executed_on)
            .with_due_on(due_on)
    }

    #[test]
    fn test_empty_snapshots_give_zeroed_report()
    {
        let aggregator = KpiAggregator::default();

        for period in ReportingPeriod::ALL {
            let report = aggregator.aggregate(&[], &[], period, today());
            assert_eq!(report, KpiReport::default());
            assert_eq!(report.compliance_rate, 0);
        }
    }

    #[test]
    fn test_compliance_rate_rounding()
    {
        assert_eq!(compliance_rate(0, 0), 0);
        assert_eq!(compliance_rate(3, 4), 75);
        assert_eq!(compliance_rate(1, 8), 13);
        assert_eq!(compliance_rate(1, 3), 33);
        assert_eq!(compliance_rate(2, 3), 67);
        assert_eq!(compliance_rate(5, 5), 100);
        assert_eq!(compliance_rate(0, 7), 0);
    }

    #[test]
    fn test_status_counts_and_compliance()
    {
        let planning = vec![
            PlanningRecord::new("OT-1", "Ana", OrderStatus::Entregado, "02-05-2024"),
            PlanningRecord::new("OT-2", "Ana", OrderStatus::Entregado, "03-05-2024"),
            PlanningRecord::new("OT-3", "Juan", OrderStatus::Entregado, "04-05-2024"),
            PlanningRecord::new("OT-4", "Juan", OrderStatus::Urgente, "05-05-2024"),
            PlanningRecord::new("OT-5", "Juan", OrderStatus::Pendiente, "05-04-2024"),
        ];

        let report = KpiAggregator::default().aggregate(&planning, &[], ReportingPeriod::ThisMonth, today());

        assert_eq!(report.total_ots, 3);
        assert_eq!(report.compliance_rate, 75);
        assert_eq!(report.urgent_count, 1);
        assert_eq!(report.pending_count, 0);
        assert_eq!(
            report.status_breakdown,
            StatusBreakdown {
                delivered: 3,
                pending: 0,
                urgent: 1
            }
        );
    }

    #[test]
    fn test_top_equipments_order_and_limit()
    {
        let mut history = Vec::new();
        history.extend(corrective("A", 3));
        history.extend(corrective("B", 5));
        history.extend(corrective("C", 1));
        history.push(HistoryRecord::new("03/05/2024", "PREVENTIVA", "D"));

        let report = KpiAggregator::default().aggregate(&[], &history, ReportingPeriod::All, today());

        let names: Vec<_> = report.top_equipments.iter().map(|equipment| equipment.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(report.prev_vs_corr, PreventiveVsCorrective { preventive: 1, corrective: 9 });
    }

    #[test]
    fn test_top_equipments_ties_keep_first_seen_and_truncate()
    {
        let mut history = Vec::new();
        for name in ["F", "E", "", "D", "C", "B", "A"] {
            history.extend(corrective(name, 2));
        }
        history.extend(corrective("A", 1));

        let report = KpiAggregator::default().aggregate(&[], &history, ReportingPeriod::All, today());

        let names: Vec<_> = report.top_equipments.iter().map(|equipment| equipment.name.as_str()).collect();
        assert_eq!(names, vec!["A", "F", "E", "S/N", "D"]);
        assert_eq!(report.top_equipments[0].count, 3);
    }

    #[test]
    fn test_deviation_lists_and_technician_performance()
    {
        let planning = vec![
            delivered("OT-1", "Ana", "10-05-2024", "10-05-2024"),
            delivered("OT-2", "Juan", "12-05-2024", "10-05-2024"),
            delivered("OT-3", "Juan", "08-05-2024", "10-05-2024"),
            delivered("OT-4", "", "11-05-2024", "10-05-2024"),
            delivered("OT-5", "Juan", "11-05-2024", "10-05-2024"),
            PlanningRecord::new("OT-6", "Ana", OrderStatus::Entregado, "02-05-2024").with_due_on("10-05-2024"),
        ];

        let report = KpiAggregator::default().aggregate(&planning, &[], ReportingPeriod::ThisMonth, today());

        assert_eq!(
            report.tech_performance,
            vec![
                TechnicianPerformance {
                    name: "Juan".to_string(),
                    on_time: 1,
                    late: 2,
                    total: 3
                },
                TechnicianPerformance {
                    name: "Ana".to_string(),
                    on_time: 1,
                    late: 0,
                    total: 1
                },
                TechnicianPerformance {
                    name: "unknown".to_string(),
                    on_time: 0,
                    late: 1,
                    total: 1
                },
            ]
        );

        let late: Vec<_> = report.late_list.iter().map(|deviation| (deviation.record.order_number.as_str(), deviation.days)).collect();
        let early: Vec<_> = report.early_list.iter().map(|deviation| (deviation.record.order_number.as_str(), deviation.days)).collect();
        assert_eq!(late, vec![("OT-2", 2), ("OT-4", 1), ("OT-5", 1)]);
        assert_eq!(early, vec![("OT-1", 0), ("OT-3", 2)]);
        assert_eq!(report.total_ots, 6);
    }

    #[test]
    fn test_technician_names_are_not_normalized()
    {
        let planning = vec![
            delivered("OT-1", "Ana", "10-05-2024", "10-05-2024"),
            delivered("OT-2", "ana", "10-05-2024", "10-05-2024"),
            delivered("OT-3", "Ana ", "10-05-2024", "10-05-2024"),
        ];

        let report = KpiAggregator::default().aggregate(&planning, &[], ReportingPeriod::All, today());

        assert_eq!(report.tech_performance.len(), 3);
    }

    #[test]
    fn test_deviation_only_uses_records_in_period()
    {
        let mut outside = delivered("OT-1", "Ana", "20-04-2024", "10-04-2024");
        outside.assigned_on = "01-04-2024".to_string();
        let planning = vec![outside, delivered("OT-2", "Ana", "09-05-2024", "10-05-2024")];

        let report = KpiAggregator::default().aggregate(&planning, &[], ReportingPeriod::ThisMonth, today());

        assert!(report.late_list.is_empty());
        assert_eq!(report.early_list.len(), 1);
    }

    #[test]
    fn test_aggregate_is_repeatable()
    {
        let planning = vec![
            delivered("OT-1", "Ana", "10-05-2024", "10-05-2024"),
            PlanningRecord::new("OT-2", "Juan", OrderStatus::Pendiente, "03-05-2024"),
        ];
        let history = corrective("Bomba", 2);
        let aggregator = KpiAggregator::default();

        let first = aggregator.aggregate(&planning, &history, ReportingPeriod::ThisMonth, today());
        let second = aggregator.aggregate(&planning, &history, ReportingPeriod::ThisMonth, today());

        assert_eq!(first, second);
        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
    }

    #[test]
    fn test_report_json_keys()
    {
        let planning = vec![delivered("OT-1", "Ana", "12-05-2024", "10-05-2024")];
        let report = KpiAggregator::default().aggregate(&planning, &[], ReportingPeriod::All, today());

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalOTs"], 1);
        assert_eq!(json["complianceRate"], 100);
        assert_eq!(json["techPerformance"][0]["onTime"], 0);
        assert_eq!(json["lateList"][0]["numero_ot"], "OT-1");
        assert_eq!(json["lateList"][0]["days"], 2);
        assert!(json["earlyList"].as_array().unwrap().is_empty());
    }
}
