use std::collections::HashSet;

use crate::work_order::PlanningRecord;

/// Who is looking at the task board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardViewer
{
    /// Sees every planned order.
    Supervisor,
    /// Sees the orders whose assigned name overlaps this display name.
    Technician(String),
}

/// Loose name comparison used between free-text sheet names and display
/// names: either one, lower-cased, contains the other. Empty names never
/// overlap.
pub fn names_overlap(left: &str, right: &str) -> bool
{
    let left = left.trim().to_lowercase();
    let right = right.trim().to_lowercase();

    if left.is_empty() || right.is_empty() {
        return false;
    }

    left.contains(&right) || right.contains(&left)
}

pub fn match_roster<'a>(name: &str, roster: &'a [String]) -> Option<&'a str>
{
    roster.iter().find(|candidate| names_overlap(candidate, name)).map(String::as_str)
}

/// Upper-cases the first alphanumeric character of every whitespace
/// separated word and lower-cases the rest of that word.
pub fn title_case(raw: &str) -> String
{
    let mut result = String::with_capacity(raw.len());
    let mut word_started = false;

    for character in raw.chars() {
        if character.is_whitespace() {
            word_started = false;
            result.push(character);
        } else if !word_started && character.is_alphanumeric() {
            word_started = true;
            result.extend(character.to_uppercase());
        } else if word_started {
            result.extend(character.to_lowercase());
        } else {
            result.push(character);
        }
    }

    result
}

/// Planned orders visible to `viewer`, minus the ones they archived,
/// most pressing first. Orders with the same status keep sheet order.
pub fn technician_board(planning: &[PlanningRecord], viewer: &BoardViewer, archived: &HashSet<String>) -> Vec<PlanningRecord>
{
    let mut board: Vec<PlanningRecord> = planning
        .iter()
        .filter(|record| match viewer {
            BoardViewer::Supervisor => true,
            BoardViewer::Technician(name) => names_overlap(&record.assigned_technician, name),
        })
        .filter(|record| !archived.contains(&record.order_number))
        .cloned()
        .collect();

    board.sort_by_key(|record| record.status.board_rank());
    board
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::work_order::OrderStatus;

    fn planning() -> Vec<PlanningRecord>
    {
        vec![
            PlanningRecord::new("OT-1", "Juan Perez", OrderStatus::Entregado, "01-05-2024"),
            PlanningRecord::new("OT-2", "juan", OrderStatus::Pendiente, "02-05-2024"),
            PlanningRecord::new("OT-3", "Ana Diaz", OrderStatus::Urgente, "03-05-2024"),
            PlanningRecord::new("OT-4", "JUAN PEREZ", OrderStatus::Urgente, "04-05-2024"),
            PlanningRecord::new("OT-5", "", OrderStatus::Pendiente, "05-05-2024"),
        ]
    }

    fn order_numbers(records: &[PlanningRecord]) -> Vec<&str>
    {
        records.iter().map(|record| record.order_number.as_str()).collect()
    }

    #[test]
    fn test_names_overlap()
    {
        assert!(names_overlap("Juan Perez", "juan"));
        assert!(names_overlap("juan", "JUAN PEREZ "));
        assert!(!names_overlap("Ana", "Juan"));
        assert!(!names_overlap("", "Juan"));
        assert!(!names_overlap("Juan", "   "));
    }

    #[test]
    fn test_title_case()
    {
        assert_eq!(title_case("JUAN PEREZ"), "Juan Perez");
        assert_eq!(title_case("maría  de la o"), "María  De La O");
        assert_eq!(title_case("(juan) o'BRIEN"), "(Juan) O'brien");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_technician_board_filters_by_name()
    {
        let board = technician_board(&planning(), &BoardViewer::Technician(" Juan Perez ".to_string()), &HashSet::new());

        assert_eq!(order_numbers(&board), vec!["OT-4", "OT-2", "OT-1"]);
    }

    #[test]
    fn test_technician_board_supervisor_sees_all_in_priority_order()
    {
        let board = technician_board(&planning(), &BoardViewer::Supervisor, &HashSet::new());

        assert_eq!(order_numbers(&board), vec!["OT-3", "OT-4", "OT-2", "OT-5", "OT-1"]);
    }

    #[test]
    fn test_technician_board_hides_archived()
    {
        let archived: HashSet<String> = ["OT-4".to_string(), "OT-1".to_string()].into_iter().collect();
        let board = technician_board(&planning(), &BoardViewer::Technician("juan".to_string()), &archived);

        assert_eq!(order_numbers(&board), vec!["OT-2"]);
    }
}
