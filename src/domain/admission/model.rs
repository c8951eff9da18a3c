//! Admission domain entity

use chrono::{DateTime, Utc};

/// A ward stay. Active while `discharge_date` is `None`.
#[derive(Debug, Clone)]
pub struct Admission {
    pub id: String,
    pub patient_id: String,
    pub ward: String,
    pub bed: String,
    pub admitting_doctor_id: Option<String>,
    pub diagnosis: Option<String>,
    /// Minor currency units per started day.
    pub daily_bed_rate: i32,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admission {
    pub fn is_active(&self) -> bool {
        self.discharge_date.is_none()
    }

    /// Billable days up to discharge (or `now` while still admitted).
    /// Every started day counts and the minimum is one.
    pub fn billable_days(&self, now: DateTime<Utc>) -> i64 {
        let end = self.discharge_date.unwrap_or(now);
        let secs = (end - self.admission_date).num_seconds().max(0);
        let days = (secs + 86_399) / 86_400;
        days.max(1)
    }

    /// Accrued bed charge in minor currency units.
    pub fn bed_charge(&self, now: DateTime<Utc>) -> i64 {
        self.billable_days(now) * i64::from(self.daily_bed_rate)
    }
}

#[derive(Debug, Clone)]
pub struct NewAdmission {
    pub patient_id: String,
    pub ward: String,
    pub bed: String,
    pub admitting_doctor_id: Option<String>,
    pub diagnosis: Option<String>,
    pub daily_bed_rate: i32,
    pub admission_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn admission(admitted: DateTime<Utc>, discharged: Option<DateTime<Utc>>) -> Admission {
        Admission {
            id: "a1".into(),
            patient_id: "p1".into(),
            ward: "General".into(),
            bed: "G-12".into(),
            admitting_doctor_id: None,
            diagnosis: None,
            daily_bed_rate: 15_000,
            admission_date: admitted,
            discharge_date: discharged,
            created_at: admitted,
            updated_at: admitted,
        }
    }

    #[test]
    fn same_day_discharge_bills_one_day() {
        let t0 = Utc::now();
        let a = admission(t0, Some(t0 + Duration::hours(3)));
        assert_eq!(a.billable_days(t0), 1);
        assert_eq!(a.bed_charge(t0), 15_000);
    }

    #[test]
    fn started_days_are_rounded_up() {
        let t0 = Utc::now();
        let a = admission(t0, None);
        assert!(a.is_active());
        assert_eq!(a.billable_days(t0 + Duration::hours(49)), 3);
    }
}
