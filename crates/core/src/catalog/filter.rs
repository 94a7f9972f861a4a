//! Typed listing predicates.

/// A single listing constraint.
///
/// Multi-valued clauses match when the product has *any* of the listed
/// values. Clauses of different kinds are combined with AND by
/// [`CatalogFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPredicate {
    /// Product name contains the text, case-insensitively.
    NameContains(String),
    /// Product belongs to the menu with this name.
    MenuEquals(String),
    /// Product belongs to the sub-category with this name.
    SubCategoryEquals(String),
    /// Product is offered in at least one of these colours.
    ColorIn(Vec<String>),
    /// Product is offered in at least one of these sizes.
    SizeIn(Vec<String>),
    /// Product is tagged with at least one of these hashtags.
    HashtagIn(Vec<String>),
}

impl CatalogPredicate {
    /// Trim values and drop blanks and duplicates.
    ///
    /// Returns `None` when nothing constraining is left, e.g. an empty colour
    /// list or a whitespace-only search word.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        match self {
            Self::NameContains(s) => non_blank(s).map(Self::NameContains),
            Self::MenuEquals(s) => non_blank(s).map(Self::MenuEquals),
            Self::SubCategoryEquals(s) => non_blank(s).map(Self::SubCategoryEquals),
            Self::ColorIn(v) => non_empty(v).map(Self::ColorIn),
            Self::SizeIn(v) => non_empty(v).map(Self::SizeIn),
            Self::HashtagIn(v) => non_empty(v).map(Self::HashtagIn),
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == s.len() {
        Some(s)
    } else {
        Some(trimmed.to_owned())
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values.into_iter().filter_map(non_blank) {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Conjunction of [`CatalogPredicate`]s.
///
/// Vacuous predicates are discarded on insertion, so an empty filter means
/// "whole catalog".
///
/// ```
/// use threadline_core::{CatalogFilter, CatalogPredicate};
///
/// let filter = CatalogFilter::default()
///     .and(CatalogPredicate::SubCategoryEquals("Shirts".into()))
///     .and(CatalogPredicate::ColorIn(vec!["Red".into(), "Blue".into()]))
///     .and(CatalogPredicate::SizeIn(vec![]));
///
/// assert_eq!(filter.predicates().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    predicates: Vec<CatalogPredicate>,
}

impl CatalogFilter {
    /// Add a predicate unless it is vacuous.
    #[must_use]
    pub fn and(mut self, predicate: CatalogPredicate) -> Self {
        self.push(predicate);
        self
    }

    /// Add a predicate when `value` is present.
    #[must_use]
    pub fn and_some<T>(self, value: Option<T>, clause: impl FnOnce(T) -> CatalogPredicate) -> Self {
        match value {
            Some(v) => self.and(clause(v)),
            None => self,
        }
    }

    /// In-place variant of [`and`](Self::and).
    pub fn push(&mut self, predicate: CatalogPredicate) {
        if let Some(p) = predicate.normalized() {
            self.predicates.push(p);
        }
    }

    /// Clauses in insertion order.
    #[must_use]
    pub fn predicates(&self) -> &[CatalogPredicate] {
        &self.predicates
    }

    /// True when no clause constrains the result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl FromIterator<CatalogPredicate> for CatalogFilter {
    fn from_iter<I: IntoIterator<Item = CatalogPredicate>>(iter: I) -> Self {
        let mut filter = Self::default();
        for predicate in iter {
            filter.push(predicate);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_empty_filter_by_default() {
        assert!(CatalogFilter::default().is_empty());
    }

    #[test]
    fn test_blank_word_is_dropped() {
        let filter = CatalogFilter::default().and(CatalogPredicate::NameContains("   ".into()));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_word_is_trimmed() {
        let filter = CatalogFilter::default().and(CatalogPredicate::NameContains(" linen ".into()));
        assert_eq!(
            filter.predicates(),
            &[CatalogPredicate::NameContains("linen".into())]
        );
    }

    #[test]
    fn test_list_values_are_deduplicated() {
        let filter = CatalogFilter::default().and(CatalogPredicate::ColorIn(strings(&[
            "Red", " Red", "", "Blue",
        ])));
        assert_eq!(
            filter.predicates(),
            &[CatalogPredicate::ColorIn(strings(&["Red", "Blue"]))]
        );
    }

    #[test]
    fn test_list_of_blanks_is_dropped() {
        let filter = CatalogFilter::default()
            .and(CatalogPredicate::HashtagIn(strings(&["", "  "])))
            .and(CatalogPredicate::SizeIn(Vec::new()));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_and_some_skips_none() {
        let filter = CatalogFilter::default()
            .and_some(None::<String>, CatalogPredicate::MenuEquals)
            .and_some(Some("Women".to_owned()), CatalogPredicate::MenuEquals);
        assert_eq!(
            filter.predicates(),
            &[CatalogPredicate::MenuEquals("Women".into())]
        );
    }

    #[test]
    fn test_collect_keeps_insertion_order() {
        let filter: CatalogFilter = [
            CatalogPredicate::SubCategoryEquals("Shirts".into()),
            CatalogPredicate::ColorIn(Vec::new()),
            CatalogPredicate::SizeIn(strings(&["M"])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            filter.predicates(),
            &[
                CatalogPredicate::SubCategoryEquals("Shirts".into()),
                CatalogPredicate::SizeIn(strings(&["M"])),
            ]
        );
    }
}
