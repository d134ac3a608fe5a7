pub mod activity_log;
pub mod association;
pub mod caretaker;
pub mod financial_report;
pub mod issue;
pub mod monitoring_record;
pub mod performance_assessment;
pub mod pig;
pub mod project;
pub mod project_buyer;
pub mod user_profile;

/// Resolve a nullable patch field against the stored value.
///
/// An absent field keeps `current`; an explicit `null` (`Some(None)`) clears it.
pub fn patch_nullable<'a, T>(
    update: &'a Option<Option<T>>,
    current: &'a Option<T>,
) -> Option<&'a T> {
    match update {
        Some(value) => value.as_ref(),
        None => current.as_ref(),
    }
}
