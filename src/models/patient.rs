use serde::{Deserialize, Serialize};

/// Sparse patient metadata recovered from a report.
///
/// Every field is optional; sources fill what they can. Priority order
/// across sources is: previously stored values, regex extraction from OCR
/// text, regex extraction from the filename, analyzer-model output. An
/// earlier non-empty value survives unless a later one is strictly longer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
}

impl PatientInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.date_of_birth.is_none()
            && self.patient_id.is_none()
            && self.collection_date.is_none()
            && self.report_date.is_none()
            && self.doctor_name.is_none()
            && self.hospital_name.is_none()
    }

    /// Merge a later-priority record into this one.
    ///
    /// Existing non-empty values win; an incoming value replaces only when
    /// the slot is empty or the incoming string is strictly longer. Age has
    /// no length notion, so the first value sticks.
    pub fn absorb(&mut self, later: &PatientInfo) {
        prefer_longer(&mut self.name, &later.name);
        if self.age.is_none() {
            self.age = later.age;
        }
        prefer_longer(&mut self.gender, &later.gender);
        prefer_longer(&mut self.date_of_birth, &later.date_of_birth);
        prefer_longer(&mut self.patient_id, &later.patient_id);
        prefer_longer(&mut self.collection_date, &later.collection_date);
        prefer_longer(&mut self.report_date, &later.report_date);
        prefer_longer(&mut self.doctor_name, &later.doctor_name);
        prefer_longer(&mut self.hospital_name, &later.hospital_name);
    }

    /// Force stored name/age/gender over whatever the models supplied.
    /// Those three fields take absolute priority when previously stored.
    pub fn override_identity(
        &mut self,
        name: Option<&str>,
        age: Option<u32>,
        gender: Option<&str>,
    ) {
        if let Some(n) = name.map(str::trim).filter(|n| !n.is_empty()) {
            self.name = Some(n.to_string());
        }
        if age.is_some() {
            self.age = age;
        }
        if let Some(g) = gender.map(str::trim).filter(|g| !g.is_empty()) {
            self.gender = Some(g.to_string());
        }
    }
}

/// Keep the existing value unless the incoming one is strictly longer.
/// Empty and whitespace-only strings count as absent.
fn prefer_longer(slot: &mut Option<String>, incoming: &Option<String>) {
    let incoming = match incoming.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return,
    };
    let keep = matches!(slot.as_deref().map(str::trim), Some(s) if !s.is_empty() && incoming.chars().count() <= s.chars().count());
    if !keep {
        *slot = Some(incoming.to_string());
    }
}
