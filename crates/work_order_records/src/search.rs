use crate::history::HistoryRecord;
use crate::work_order::PlanningRecord;

/// Records that can be found through the dashboard's free-text search box.
pub trait Searchable
{
    fn text_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match against any field. An empty query
    /// matches everything.
    fn matches_query(&self, query: &str) -> bool
    {
        let query = query.to_lowercase();
        query.is_empty() || self.text_fields().iter().any(|field| field.to_lowercase().contains(&query))
    }
}

impl Searchable for PlanningRecord
{
    fn text_fields(&self) -> Vec<&str>
    {
        let mut fields = vec![
            self.order_number.as_str(),
            self.assigned_technician.as_str(),
            self.status.label(),
            self.assigned_on.as_str(),
            self.equipment_name.as_str(),
            self.asset_code.as_str(),
        ];
        fields.extend([&self.due_on, &self.executed_on, &self.evidence_url].into_iter().flatten().map(String::as_str));
        fields
    }
}

impl Searchable for HistoryRecord
{
    fn text_fields(&self) -> Vec<&str>
    {
        let mut fields = vec![
            self.processed_on.as_str(),
            self.order_type.as_str(),
            self.order_number.as_str(),
            self.equipment_name.as_str(),
            self.area.as_str(),
            self.group.as_str(),
            self.subgroup.as_str(),
            self.asset_code.as_str(),
            self.responsible_technician.as_str(),
            self.registered_by.as_str(),
        ];
        fields.extend(self.evidence_url.as_deref());
        fields
    }
}

pub fn search<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T>
{
    records.iter().filter(|record| record.matches_query(query)).collect()
}
