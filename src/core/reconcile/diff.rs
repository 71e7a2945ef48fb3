//! Generic keyed diff and its per-entity instantiations

use super::keys::Keyed;
use crate::domain::records::{Admission, Bed, BedStatus, ExamResult, Stay};
use std::collections::{HashMap, HashSet};

/// Records to insert and records whose tracked attribute changed
#[derive(Debug, Clone, PartialEq)]
pub struct Delta<T> {
    pub new: Vec<T>,
    pub changed: Vec<T>,
}

impl<T> Delta<T> {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.changed.is_empty()
    }
}

impl<T> Default for Delta<T> {
    fn default() -> Self {
        Self {
            new: Vec::new(),
            changed: Vec::new(),
        }
    }
}

/// Source records whose key is absent from the destination
///
/// Output keeps source order. Duplicate keys inside `source` are kept.
pub fn diff<T: Keyed + Clone>(source: &[T], destination: &[T]) -> Vec<T> {
    let known: HashSet<T::Key> = destination.iter().map(Keyed::key).collect();
    source
        .iter()
        .filter(|record| !known.contains(&record.key()))
        .cloned()
        .collect()
}

/// Like [`diff`], also reporting records present on both sides whose
/// projection through `detector` differs
pub fn diff_with_changes<T, C, F>(source: &[T], destination: &[T], detector: F) -> Delta<T>
where
    T: Keyed + Clone,
    C: PartialEq,
    F: Fn(&T) -> C,
{
    let known: HashMap<T::Key, C> = destination
        .iter()
        .map(|record| (record.key(), detector(record)))
        .collect();

    let mut delta = Delta::default();
    for record in source {
        match known.get(&record.key()) {
            None => delta.new.push(record.clone()),
            Some(current) if *current != detector(record) => delta.changed.push(record.clone()),
            Some(_) => {}
        }
    }
    delta
}

pub fn diff_admissions(source: &[Admission], destination: &[Admission]) -> Vec<Admission> {
    diff(source, destination)
}

pub fn diff_stays(source: &[Stay], destination: &[Stay]) -> Vec<Stay> {
    diff(source, destination)
}

/// New exams, never including cancelled results
pub fn diff_exams(source: &[ExamResult], destination: &[ExamResult]) -> Vec<ExamResult> {
    let mut new = diff(source, destination);
    new.retain(|exam| !exam.is_cancelled());
    new
}

/// New beds plus beds whose status differs from the destination
pub fn diff_beds(source: &[Bed], destination: &[Bed]) -> Delta<Bed> {
    diff_with_changes(source, destination, |bed| -> BedStatus { bed.status })
}
