//! Client record submitted for scoring

use serde::{Deserialize, Serialize};

/// One bank client's attributes, as collected by the form.
///
/// Missing fields in JSON input take the form's default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientRecord {
    /// Age in years
    pub age: i64,
    /// Type of job
    pub job: String,
    /// Marital status
    pub marital: String,
    /// Education level
    pub education: String,
    /// Has credit in default?
    pub default: String,
    /// Average yearly balance in euros
    pub balance: i64,
    /// Has housing loan?
    pub housing: String,
    /// Has personal loan?
    pub loan: String,
    /// Contact communication type
    pub contact: String,
    /// Day of the month of the last contact
    pub day: i64,
    /// Month of the last contact
    pub month: String,
    /// Duration of the last contact in seconds
    pub duration: i64,
    /// Number of contacts during this campaign
    pub campaign: i64,
    /// Days since the client was last contacted (-1 = never)
    pub pdays: i64,
    /// Number of contacts before this campaign
    pub previous: i64,
    /// Outcome of the previous campaign
    pub poutcome: String,
}

/// A single attribute value, borrowed from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    Number(i64),
    Category(&'a str),
}

impl ClientRecord {
    /// Look up an attribute by its column name
    pub fn attribute(&self, name: &str) -> Option<AttributeValue<'_>> {
        use AttributeValue::{Category, Number};

        let value = match name {
            "age" => Number(self.age),
            "job" => Category(&self.job),
            "marital" => Category(&self.marital),
            "education" => Category(&self.education),
            "default" => Category(&self.default),
            "balance" => Number(self.balance),
            "housing" => Category(&self.housing),
            "loan" => Category(&self.loan),
            "contact" => Category(&self.contact),
            "day" => Number(self.day),
            "month" => Category(&self.month),
            "duration" => Number(self.duration),
            "campaign" => Number(self.campaign),
            "pdays" => Number(self.pdays),
            "previous" => Number(self.previous),
            "poutcome" => Category(&self.poutcome),
            _ => return None,
        };
        Some(value)
    }

    /// Overwrite a numeric attribute. Returns false for unknown or categorical names.
    pub fn set_number(&mut self, name: &str, value: i64) -> bool {
        let slot = match name {
            "age" => &mut self.age,
            "balance" => &mut self.balance,
            "day" => &mut self.day,
            "duration" => &mut self.duration,
            "campaign" => &mut self.campaign,
            "pdays" => &mut self.pdays,
            "previous" => &mut self.previous,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Overwrite a categorical attribute. Returns false for unknown or numeric names.
    pub fn set_category(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "job" => &mut self.job,
            "marital" => &mut self.marital,
            "education" => &mut self.education,
            "default" => &mut self.default,
            "housing" => &mut self.housing,
            "loan" => &mut self.loan,
            "contact" => &mut self.contact,
            "month" => &mut self.month,
            "poutcome" => &mut self.poutcome,
            _ => return false,
        };
        value.clone_into(slot);
        true
    }
}

impl Default for ClientRecord {
    fn default() -> Self {
        Self {
            age: 30,
            job: "admin.".to_string(),
            marital: "married".to_string(),
            education: "unknown".to_string(),
            default: "no".to_string(),
            balance: 0,
            housing: "no".to_string(),
            loan: "no".to_string(),
            contact: "unknown".to_string(),
            day: 15,
            month: "jan".to_string(),
            duration: 0,
            campaign: 1,
            pdays: -1,
            previous: 0,
            poutcome: "unknown".to_string(),
        }
    }
}
