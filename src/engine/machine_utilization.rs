// ==========================================
// 瓦楞纸箱生产运营看板 - 机台利用率
// ==========================================
// 职责: 机台台账 → 总数 / 忙碌 / 空闲 / 保养 / 停用 + 按机型分组
// 说明: 每次聚合只读取一次机台台账，不按作业重复查询
// ==========================================

use crate::domain::job::{MachineRecord, MachineStatus};
use crate::domain::snapshot::{percentage, MachineUtilization};

const UNSPECIFIED_TYPE: &str = "Unspecified";

pub fn summarize_machines(machines: &[MachineRecord]) -> MachineUtilization {
    let mut summary = MachineUtilization::default();

    for machine in machines {
        summary.total_machines += 1;

        // isActive=false 一律按停用计
        let status = if machine.is_active == Some(false) {
            MachineStatus::Inactive
        } else {
            machine.status
        };

        let machine_type = machine
            .machine_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNSPECIFIED_TYPE)
            .to_string();
        let usage = summary.by_type.entry(machine_type).or_default();
        usage.total += 1;

        match status {
            MachineStatus::Busy => {
                summary.active_machines += 1;
                usage.busy += 1;
            }
            MachineStatus::Available => summary.available_machines += 1,
            MachineStatus::Maintenance => summary.maintenance_machines += 1,
            MachineStatus::Inactive => summary.inactive_machines += 1,
            MachineStatus::Unknown => {}
        }
    }

    summary.utilization_rate = percentage(summary.active_machines, summary.total_machines);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(machine_type: Option<&str>, status: MachineStatus, is_active: Option<bool>) -> MachineRecord {
        MachineRecord {
            id: None,
            machine_code: None,
            machine_type: machine_type.map(str::to_string),
            unit: None,
            status,
            is_active,
        }
    }

    #[test]
    fn test_summary_counts() {
        let machines = vec![
            machine(Some("Corrugator"), MachineStatus::Busy, Some(true)),
            machine(Some("Corrugator"), MachineStatus::Available, None),
            machine(Some("Printer"), MachineStatus::Maintenance, None),
            machine(Some("Printer"), MachineStatus::Busy, Some(false)),
            machine(None, MachineStatus::Unknown, None),
        ];

        let summary = summarize_machines(&machines);
        assert_eq!(summary.total_machines, 5);
        assert_eq!(summary.active_machines, 1);
        assert_eq!(summary.available_machines, 1);
        assert_eq!(summary.maintenance_machines, 1);
        assert_eq!(summary.inactive_machines, 1);
        assert_eq!(summary.utilization_rate, 20);
        assert_eq!(summary.by_type["Corrugator"].busy, 1);
        assert_eq!(summary.by_type["Printer"].total, 2);
        assert_eq!(summary.by_type[UNSPECIFIED_TYPE].total, 1);
    }

    #[test]
    fn test_empty_inventory() {
        let summary = summarize_machines(&[]);
        assert_eq!(summary, MachineUtilization::default());
    }
}
